//! Link record
//!
//! The single entity kept by the store. `(user_id, url)` is its natural key.

use chrono::{DateTime, Utc};

use crate::error::{Result, VaultError};

/// A saved link and the metadata scraped for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Resource identifier, unique per user
    pub url: String,

    /// Page title (empty when extraction failed)
    pub title: String,

    /// Page description (empty when extraction failed)
    pub description: String,

    /// Owning account
    pub user_id: i64,

    /// Save time. `UNIX_EPOCH` means "unset"; the store fills it in.
    pub timestamp: DateTime<Utc>,

    /// Optional ordered tags
    pub tags: Vec<String>,

    /// Whether the user marked the link as read
    pub read: bool,

    /// Open Graph preview image, if the page had one
    pub preview_image_url: Option<String>,
}

impl Link {
    /// Create a link with empty metadata and an unset timestamp
    pub fn new(user_id: i64, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            description: String::new(),
            user_id,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            tags: Vec::new(),
            read: false,
            preview_image_url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preview_image_url(mut self, url: impl Into<String>) -> Self {
        self.preview_image_url = Some(url.into());
        self
    }

    /// True while the timestamp is still the zero value
    pub fn timestamp_unset(&self) -> bool {
        self.timestamp == DateTime::<Utc>::UNIX_EPOCH
    }

    /// Reject records that would land under a degenerate key
    pub fn validate(&self) -> Result<()> {
        validate_key(self.user_id, &self.url)
    }
}

/// Key fields must be set: a non-zero user and a non-empty URL
pub(crate) fn validate_key(user_id: i64, url: &str) -> Result<()> {
    if user_id == 0 {
        return Err(VaultError::Validation("user_id must be non-zero".to_string()));
    }
    if url.is_empty() {
        return Err(VaultError::Validation("url must not be empty".to_string()));
    }
    Ok(())
}
