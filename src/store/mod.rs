//! Store Module
//!
//! The per-user link store and its background maintenance.
//!
//! ## Responsibilities
//! - Upsert, list, fetch, flag and delete link records
//! - Snapshot-isolated per-user prefix scans
//! - Open → Closed lifecycle of the engine handle
//! - Space reclamation next to CRUD traffic, on a cancellable background thread
//!
//! ## Engine Choice
//! redb, linked in-process:
//! - Byte-ordered keys with range scans
//! - One writer at a time, MVCC snapshots for readers
//! - Atomic commit; an uncommitted transaction leaves no trace

mod link_store;
mod maintenance;

pub use link_store::{LinkStore, ReclaimOutcome, LINKS_TABLE};
pub use maintenance::{Maintenance, Reclaim};
