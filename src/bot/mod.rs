//! Bot Module
//!
//! Chat-facing layer: parses messages, calls the scraper and the store,
//! and replies.
//!
//! ## Commands
//! - `/start`, `/help`
//! - `/list` - saved links, most recent first
//! - `/delete <url>`
//! - `/read <url>`, `/unread <url>`
//! - any text with an http(s) URL - save it, `#words` become tags
//!
//! Users only ever see a generic failure notice; error details are logged.

mod command;
mod handler;
mod transport;

pub use command::{first_url, hashtags, BotCommand};
pub use handler::{LinkBot, FAILURE_REPLY};
pub use transport::{serve, InboundMessage, LineTransport, Transport};
