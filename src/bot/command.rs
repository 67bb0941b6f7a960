//! Bot command definitions
//!
//! Turns raw chat text into a command.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// What a chat message asks the bot to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `/start`
    Start,

    /// `/help`
    Help,

    /// `/list` (or `/mylist`)
    List,

    /// `/delete <url>`
    Delete { url: String },

    /// `/read <url>` and `/unread <url>`
    MarkRead { url: String, read: bool },

    /// Plain text carrying a link
    Save { url: String, tags: Vec<String> },

    /// A known command used wrong; carries the usage line
    Invalid { usage: &'static str },

    /// Nothing the bot understands
    Unrecognized,
}

impl BotCommand {
    /// Parse a chat message
    ///
    /// Commands may carry a `@botname` suffix (`/list@linkvault_bot`).
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(rest) = text.strip_prefix('/') {
            let (name, argument) = match rest.split_once(char::is_whitespace) {
                Some((name, argument)) => (name, argument.trim()),
                None => (rest, ""),
            };
            let name = name.split('@').next().unwrap_or(name);

            return match name.to_ascii_lowercase().as_str() {
                "start" => BotCommand::Start,
                "help" => BotCommand::Help,
                "list" | "mylist" => BotCommand::List,
                "delete" | "remove" => match first_url(argument) {
                    Some(url) => BotCommand::Delete { url },
                    None => BotCommand::Invalid {
                        usage: "/delete <url>",
                    },
                },
                "read" => match first_url(argument) {
                    Some(url) => BotCommand::MarkRead { url, read: true },
                    None => BotCommand::Invalid { usage: "/read <url>" },
                },
                "unread" => match first_url(argument) {
                    Some(url) => BotCommand::MarkRead { url, read: false },
                    None => BotCommand::Invalid {
                        usage: "/unread <url>",
                    },
                },
                _ => BotCommand::Unrecognized,
            };
        }

        match first_url(text) {
            Some(url) => BotCommand::Save {
                url,
                tags: hashtags(text),
            },
            None => BotCommand::Unrecognized,
        }
    }
}

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"https?://[^\s<>"']+"#).expect("URL pattern is a valid regex")
    })
}

/// First well-formed http(s) URL in `text`, as written
pub fn first_url(text: &str) -> Option<String> {
    url_pattern()
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ')', ';', '!', '?']))
        .find(|candidate| {
            Url::parse(candidate)
                .map(|parsed| {
                    matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
                })
                .unwrap_or(false)
        })
        .map(str::to_string)
}

/// `#tags` in `text`, without the `#`, in order, without duplicates
pub fn hashtags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        let Some(tag) = word.strip_prefix('#') else {
            continue;
        };
        let tag = tag.trim_end_matches(|c: char| !c.is_alphanumeric() && c != '_' && c != '-');
        if !tag.is_empty() && !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
