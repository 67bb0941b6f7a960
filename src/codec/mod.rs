//! Codec Module
//!
//! Byte layouts for everything the store persists. Together they are the
//! on-disk contract: changing either layout is a breaking migration.
//!
//! ## Key Format
//! ```text
//! ┌────────────┬──────────────────┬─────────┬──────────────────────┐
//! │ "link/" (5)│ user_id (8, BE)  │ "/" (1) │ url (raw bytes)      │
//! └────────────┴──────────────────┴─────────┴──────────────────────┘
//! ```
//! `user_id` has its sign bit flipped so keys sort by signed id. The fixed
//! width keeps every user prefix the same length, so no prefix can match
//! another user's keys whatever the URL contains.
//!
//! ## Value Format
//! ```text
//! ┌─────────────┬─────────────┬─────────────┬───────────────────────┐
//! │ Version (1) │  CRC32 (4)  │ Length (4)  │ bincode payload       │
//! └─────────────┴─────────────┴─────────────┴───────────────────────┘
//! ```

mod key;
mod record;

pub(crate) use key::describe_key;
pub use key::{link_key, parse_link_key, user_prefix, KEY_PREFIX, USER_PREFIX_LEN};
pub use record::{decode_link, encode_link, FORMAT_VERSION, HEADER_SIZE};
