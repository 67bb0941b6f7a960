//! Metadata Module
//!
//! Fetches page metadata for a URL before it is saved.
//!
//! ## Responsibilities
//! - Fetch the page within a bounded time
//! - Extract title, description and preview image
//! - Treat missing tags as empty values, not failures
//!
//! Only a failed fetch (network, HTTP status, timeout) is an error.

mod html;
mod http;

pub use html::parse_metadata;
pub use http::HttpScraper;

use crate::context::Context;
use crate::error::Result;

/// Metadata extracted from a page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub preview_image_url: Option<String>,
}

/// Anything that can turn a URL into page metadata
pub trait MetadataScraper: Send + Sync {
    fn scrape_metadata(&self, ctx: &Context, url: &str) -> Result<PageMetadata>;
}
