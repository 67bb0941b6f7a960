//! # linkvault
//!
//! A per-user link store for chat bots:
//! - Upsert, list, flag and delete links keyed by (user, URL)
//! - Snapshot-isolated per-user prefix scans, newest first
//! - Checksummed record encoding with fail-fast decoding
//! - Cancellable operations and background space reclamation
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Chat Transport                           │
//! │                 (user_id, text) events                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       LinkBot                                │
//! │        parse command → scrape metadata → store call          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      LinkStore                               │
//! │         (Open → Closed, one transaction per call)            │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │  Key Scheme +   │            │   Maintenance   │
//!   │  Record Codec   │            │ (reclaim thread)│
//!   └────────┬────────┘            └────────┬────────┘
//!            │                              │
//!            ▼                              ▼
//!   ┌─────────────────────────────────────────────────┐
//!   │            redb (embedded KV engine)             │
//!   └─────────────────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod context;

pub mod link;
pub mod codec;
pub mod store;
pub mod metadata;
pub mod bot;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, VaultError};
pub use config::Config;
pub use context::Context;
pub use link::Link;
pub use store::{LinkStore, Maintenance, Reclaim, ReclaimOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of linkvault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
