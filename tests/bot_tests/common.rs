//! Shared fakes for bot tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use linkvault::bot::LinkBot;
use linkvault::metadata::{MetadataScraper, PageMetadata};
use linkvault::{Config, Context, LinkStore, Result, VaultError};
use tempfile::TempDir;

/// Scraper that answers every URL with the same metadata
pub struct FixedScraper {
    pub metadata: PageMetadata,
    pub calls: AtomicUsize,
}

impl FixedScraper {
    pub fn titled(title: &str) -> Self {
        Self {
            metadata: PageMetadata {
                title: title.to_string(),
                description: format!("About {}", title),
                preview_image_url: Some("https://img.example/preview.png".to_string()),
            },
            calls: AtomicUsize::new(0),
        }
    }
}

impl MetadataScraper for FixedScraper {
    fn scrape_metadata(&self, ctx: &Context, _url: &str) -> Result<PageMetadata> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        ctx.check()?;
        Ok(self.metadata.clone())
    }
}

/// Scraper whose fetches always fail
pub struct FailingScraper;

impl MetadataScraper for FailingScraper {
    fn scrape_metadata(&self, _ctx: &Context, url: &str) -> Result<PageMetadata> {
        Err(VaultError::Scrape {
            url: url.to_string(),
            reason: "connection refused".to_string(),
        })
    }
}

pub fn setup_bot<S: MetadataScraper>(scraper: S) -> (TempDir, Arc<LinkStore>, LinkBot<S>) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .cache_size_bytes(1024 * 1024)
        .build();
    let store = Arc::new(LinkStore::open(config).unwrap());
    let bot = LinkBot::new(Arc::clone(&store), scraper, Duration::from_secs(5));
    (temp_dir, store, bot)
}
