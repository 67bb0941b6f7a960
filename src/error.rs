//! Error types for linkvault
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using VaultError
pub type Result<T> = std::result::Result<T, VaultError>;

/// Unified error type for linkvault operations
#[derive(Debug, Error)]
pub enum VaultError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Validation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid link: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Failed to encode link for user {user_id}: {reason}")]
    Encoding { user_id: i64, reason: String },

    #[error("Failed to decode link at key {key}: {reason}")]
    Decoding { key: String, reason: String },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Failed to open store: {0}")]
    StorageOpen(#[source] redb::Error),

    #[error("Storage write failed during {op} for user {user_id}: {source}")]
    StorageWrite {
        op: &'static str,
        user_id: i64,
        #[source]
        source: redb::Error,
    },

    #[error("Storage read failed during {op} for user {user_id}: {source}")]
    StorageRead {
        op: &'static str,
        user_id: i64,
        #[source]
        source: redb::Error,
    },

    #[error("Store is closed")]
    StoreClosed,

    #[error("Maintenance failed: {0}")]
    Maintenance(String),

    // -------------------------------------------------------------------------
    // Cancellation Errors
    // -------------------------------------------------------------------------
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation deadline exceeded")]
    DeadlineExceeded,

    // -------------------------------------------------------------------------
    // Collaborator Errors
    // -------------------------------------------------------------------------
    #[error("Scrape failed for {url}: {reason}")]
    Scrape { url: String, reason: String },

    #[error("Transport error: {0}")]
    Transport(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// True when the error came from a cancelled or expired [`Context`](crate::Context)
    pub fn is_cancellation(&self) -> bool {
        matches!(self, VaultError::Cancelled | VaultError::DeadlineExceeded)
    }
}

/// Attach operation context to raw engine errors
pub(crate) trait StorageResultExt<T> {
    fn on_write(self, op: &'static str, user_id: i64) -> Result<T>;
    fn on_read(self, op: &'static str, user_id: i64) -> Result<T>;
}

impl<T, E: Into<redb::Error>> StorageResultExt<T> for std::result::Result<T, E> {
    fn on_write(self, op: &'static str, user_id: i64) -> Result<T> {
        self.map_err(|e| VaultError::StorageWrite {
            op,
            user_id,
            source: e.into(),
        })
    }

    fn on_read(self, op: &'static str, user_id: i64) -> Result<T> {
        self.map_err(|e| VaultError::StorageRead {
            op,
            user_id,
            source: e.into(),
        })
    }
}
