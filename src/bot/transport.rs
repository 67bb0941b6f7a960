//! Chat transport
//!
//! Delivers inbound `(user_id, text)` events and carries replies back.

use std::io::{BufRead, Write};

use tracing::{info, warn};

use super::LinkBot;
use crate::context::Context;
use crate::error::{Result, VaultError};
use crate::metadata::MetadataScraper;

/// One inbound chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub user_id: i64,
    pub text: String,
}

/// Source of inbound messages and sink for replies
pub trait Transport {
    /// Next message, `None` once the source is exhausted
    ///
    /// A malformed message is reported as `VaultError::Transport`; the caller
    /// may keep receiving after it.
    fn receive(&mut self) -> Result<Option<InboundMessage>>;

    fn send(&mut self, user_id: i64, text: &str) -> Result<()>;
}

/// Line protocol over any reader/writer pair
///
/// Inbound: `<user_id> <text>` per line.
/// Outbound: every reply line is written as `<user_id> <line>`.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
    line: String,
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
        }
    }

    /// Give back the writer (lets tests inspect replies)
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Transport for LineTransport<R, W> {
    fn receive(&mut self) -> Result<Option<InboundMessage>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            let (user, text) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let user_id = user.parse::<i64>().map_err(|_| {
                VaultError::Transport(format!("expected '<user_id> <text>', got {:?}", line))
            })?;

            return Ok(Some(InboundMessage {
                user_id,
                text: text.trim().to_string(),
            }));
        }
    }

    fn send(&mut self, user_id: i64, text: &str) -> Result<()> {
        for line in text.lines() {
            writeln!(self.writer, "{} {}", user_id, line)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Feed messages from `transport` through `bot` until input ends or `ctx` ends
///
/// Each message is handled synchronously and answered before the next is
/// read. Returns the number of messages answered.
pub fn serve<T, S>(ctx: &Context, transport: &mut T, bot: &LinkBot<S>) -> Result<u64>
where
    T: Transport,
    S: MetadataScraper,
{
    let mut handled = 0u64;

    loop {
        if let Err(e) = ctx.check() {
            info!(handled, reason = %e, "transport loop stopping");
            return Ok(handled);
        }

        let message = match transport.receive() {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(VaultError::Transport(reason)) => {
                warn!(%reason, "skipping malformed message");
                continue;
            }
            Err(e) => return Err(e),
        };

        let reply = bot.handle(ctx, message.user_id, &message.text);
        transport.send(message.user_id, &reply)?;
        handled += 1;
    }

    info!(handled, "transport input exhausted");
    Ok(handled)
}
