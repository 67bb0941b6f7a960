//! HTTP scraper
//!
//! Blocking fetch + HTML extraction.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use tracing::debug;

use super::{parse_metadata, MetadataScraper, PageMetadata};
use crate::context::Context;
use crate::error::{Result, VaultError};

/// Fetches pages over HTTP(S) and parses their metadata tags
pub struct HttpScraper {
    client: Client,

    /// Upper bound for one fetch; a shorter context deadline wins
    timeout: Duration,
}

impl HttpScraper {
    const USER_AGENT: &'static str = "Mozilla/5.0 (compatible; linkvault/0.1)";
    const MAX_REDIRECTS: usize = 5;

    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(Self::USER_AGENT)
            .redirect(Policy::limited(Self::MAX_REDIRECTS))
            .build()
            .map_err(|e| VaultError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, timeout })
    }
}

impl MetadataScraper for HttpScraper {
    fn scrape_metadata(&self, ctx: &Context, url: &str) -> Result<PageMetadata> {
        ctx.check()?;

        let timeout = ctx
            .remaining()
            .map_or(self.timeout, |remaining| remaining.min(self.timeout));
        if timeout.is_zero() {
            return Err(VaultError::DeadlineExceeded);
        }

        let fail = |reason: String| VaultError::Scrape {
            url: url.to_string(),
            reason,
        };

        debug!(url, timeout_ms = timeout.as_millis() as u64, "fetching page metadata");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    fail(format!("timed out after {:?}", timeout))
                } else {
                    fail(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(fail(format!("HTTP error: {}", response.status())));
        }

        let body = response.text().map_err(|e| fail(e.to_string()))?;
        ctx.check()?;

        let metadata = parse_metadata(&body);
        if metadata.title.is_empty() {
            debug!(url, "page has no title");
        }
        if metadata.description.is_empty() {
            debug!(url, "page has no description");
        }

        Ok(metadata)
    }
}
