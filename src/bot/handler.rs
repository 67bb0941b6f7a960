//! Message handler
//!
//! Routes parsed commands to the store and builds the reply text.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::BotCommand;
use crate::context::Context;
use crate::error::Result;
use crate::link::Link;
use crate::metadata::{MetadataScraper, PageMetadata};
use crate::store::LinkStore;

/// Reply shown for any internal failure; details stay in the logs
pub const FAILURE_REPLY: &str = "Sorry, something went wrong. Please try again later.";

const WELCOME_REPLY: &str =
    "Welcome to linkvault! Send me a website link and I'll save its title and description for you.";

const HELP_REPLY: &str = "Send me a link to save it. Add #tags to the message to tag it.\n\
/list - show your saved links\n\
/delete <url> - remove a link\n\
/read <url> - mark a link as read\n\
/unread <url> - mark a link as unread";

const UNRECOGNIZED_REPLY: &str = "Send me a link (http:// or https://) to save it, or /help.";

/// Chat bot logic on top of a link store
pub struct LinkBot<S> {
    store: Arc<LinkStore>,
    scraper: S,

    /// Budget for one metadata fetch; the write transaction opens after it
    scrape_timeout: Duration,
}

impl<S: MetadataScraper> LinkBot<S> {
    pub fn new(store: Arc<LinkStore>, scraper: S, scrape_timeout: Duration) -> Self {
        Self {
            store,
            scraper,
            scrape_timeout,
        }
    }

    pub fn store(&self) -> &Arc<LinkStore> {
        &self.store
    }

    pub fn scraper(&self) -> &S {
        &self.scraper
    }

    /// Handle one inbound message and return the reply
    ///
    /// Never fails: internal errors are logged and answered with
    /// [`FAILURE_REPLY`].
    pub fn handle(&self, ctx: &Context, user_id: i64, text: &str) -> String {
        let command = BotCommand::parse(text);
        debug!(user_id, ?command, "message received");

        match self.dispatch(ctx, user_id, command) {
            Ok(reply) => reply,
            Err(e) if e.is_cancellation() => {
                warn!(user_id, error = %e, "message handling cancelled");
                FAILURE_REPLY.to_string()
            }
            Err(e) => {
                error!(user_id, error = %e, "failed to handle message");
                FAILURE_REPLY.to_string()
            }
        }
    }

    fn dispatch(&self, ctx: &Context, user_id: i64, command: BotCommand) -> Result<String> {
        match command {
            BotCommand::Start => Ok(WELCOME_REPLY.to_string()),
            BotCommand::Help => Ok(HELP_REPLY.to_string()),
            BotCommand::List => self.list(ctx, user_id),
            BotCommand::Delete { url } => {
                self.store.delete_link(ctx, user_id, &url)?;
                Ok(format!("Removed {} from your links.", url))
            }
            BotCommand::MarkRead { url, read } => {
                if self.store.mark_read(ctx, user_id, &url, read)? {
                    let state = if read { "read" } else { "unread" };
                    Ok(format!("Marked {} as {}.", url, state))
                } else {
                    Ok(format!("{} is not in your links.", url))
                }
            }
            BotCommand::Save { url, tags } => self.save(ctx, user_id, url, tags),
            BotCommand::Invalid { usage } => Ok(format!("Usage: {}", usage)),
            BotCommand::Unrecognized => Ok(UNRECOGNIZED_REPLY.to_string()),
        }
    }

    /// Scrape first, then write; no transaction is open during the fetch
    fn save(&self, ctx: &Context, user_id: i64, url: String, tags: Vec<String>) -> Result<String> {
        let scrape_ctx = ctx.with_timeout(self.scrape_timeout);
        let metadata = match self.scraper.scrape_metadata(&scrape_ctx, &url) {
            Ok(metadata) => metadata,
            Err(e) => {
                // Only the caller's own cancellation aborts; a failed fetch
                // still saves the link without metadata.
                ctx.check()?;
                warn!(user_id, url = %url, error = %e, "metadata scrape failed, saving without it");
                PageMetadata::default()
            }
        };

        let mut link = Link::new(user_id, url)
            .with_title(metadata.title)
            .with_description(metadata.description)
            .with_tags(tags);
        link.preview_image_url = metadata.preview_image_url;

        let link = self.store.save_link(ctx, link)?;
        info!(user_id, url = %link.url, "link saved for user");

        let label = if link.title.is_empty() { &link.url } else { &link.title };
        Ok(format!("Saved: {}", label))
    }

    fn list(&self, ctx: &Context, user_id: i64) -> Result<String> {
        let links = self.store.links_by_user(ctx, user_id)?;
        if links.is_empty() {
            return Ok("You have no saved links yet.".to_string());
        }

        let mut reply = format!("Your links ({}):", links.len());
        for (index, link) in links.iter().enumerate() {
            let title = if link.title.is_empty() { &link.url } else { &link.title };
            let marker = if link.read { " [read]" } else { "" };
            let _ = write!(reply, "\n{}. {}{}\n   {}", index + 1, title, marker, link.url);
            if !link.tags.is_empty() {
                let tags: Vec<String> = link.tags.iter().map(|tag| format!("#{}", tag)).collect();
                let _ = write!(reply, "\n   {}", tags.join(" "));
            }
        }
        Ok(reply)
    }
}
