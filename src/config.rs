//! Configuration for linkvault
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a linkvault instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── links.redb           (embedded engine file)
    ///     └── links.redb.reclaim   (only while a reclaim pass runs)
    pub data_dir: PathBuf,

    /// Page cache handed to the embedded engine (in bytes)
    pub cache_size_bytes: usize,

    // -------------------------------------------------------------------------
    // Maintenance Configuration
    // -------------------------------------------------------------------------
    /// Whether the background reclaim routine runs at all
    pub reclaim_enabled: bool,

    /// Interval between reclaim passes
    pub reclaim_interval: Duration,

    // -------------------------------------------------------------------------
    // Scraper Configuration
    // -------------------------------------------------------------------------
    /// Upper bound for a single metadata fetch
    pub scrape_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./linkvault_data"),
            cache_size_bytes: 64 * 1024 * 1024, // 64 MB
            reclaim_enabled: true,
            reclaim_interval: Duration::from_secs(5 * 60),
            scrape_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    /// Name of the engine file inside `data_dir`
    pub const DATABASE_FILENAME: &'static str = "links.redb";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Scratch file a reclaim pass copies the live set into
    pub const RECLAIM_FILENAME: &'static str = "links.redb.reclaim";

    /// Full path of the engine file
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(Self::DATABASE_FILENAME)
    }

    /// Full path of the reclaim scratch file
    pub fn reclaim_path(&self) -> PathBuf {
        self.data_dir.join(Self::RECLAIM_FILENAME)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the engine cache size (in bytes)
    pub fn cache_size_bytes(mut self, size: usize) -> Self {
        self.config.cache_size_bytes = size;
        self
    }

    /// Enable or disable the background reclaim routine
    pub fn reclaim_enabled(mut self, enabled: bool) -> Self {
        self.config.reclaim_enabled = enabled;
        self
    }

    /// Set the interval between reclaim passes
    pub fn reclaim_interval(mut self, interval: Duration) -> Self {
        self.config.reclaim_interval = interval;
        self
    }

    /// Set the per-fetch scrape timeout
    pub fn scrape_timeout(mut self, timeout: Duration) -> Self {
        self.config.scrape_timeout = timeout;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
