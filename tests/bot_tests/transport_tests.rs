//! Tests for the line transport and the serve loop

use std::io::Cursor;

use linkvault::bot::{serve, InboundMessage, LineTransport, Transport};
use linkvault::{Context, VaultError};

use crate::common::{setup_bot, FixedScraper};

fn transport(input: &str) -> LineTransport<Cursor<&[u8]>, Vec<u8>> {
    LineTransport::new(Cursor::new(input.as_bytes()), Vec::new())
}

// =============================================================================
// LineTransport Tests
// =============================================================================

#[test]
fn test_receive_messages() {
    let mut transport = transport("1 hello world\n\n   \n-42 /list\n");

    assert_eq!(
        transport.receive().unwrap(),
        Some(InboundMessage {
            user_id: 1,
            text: "hello world".to_string()
        })
    );
    assert_eq!(
        transport.receive().unwrap(),
        Some(InboundMessage {
            user_id: -42,
            text: "/list".to_string()
        })
    );
    assert_eq!(transport.receive().unwrap(), None);
}

#[test]
fn test_receive_user_without_text() {
    let mut transport = transport("7\n");

    assert_eq!(
        transport.receive().unwrap(),
        Some(InboundMessage {
            user_id: 7,
            text: String::new()
        })
    );
}

#[test]
fn test_receive_malformed_then_continue() {
    let mut transport = transport("alice hi\n2 ok\n");

    assert!(matches!(transport.receive(), Err(VaultError::Transport(_))));
    assert_eq!(
        transport.receive().unwrap().map(|message| message.user_id),
        Some(2)
    );
}

#[test]
fn test_send_prefixes_every_line() {
    let mut transport = transport("");

    transport.send(9, "first\nsecond").unwrap();

    let output = String::from_utf8(transport.into_writer()).unwrap();
    assert_eq!(output, "9 first\n9 second\n");
}

// =============================================================================
// Serve Loop Tests
// =============================================================================

#[test]
fn test_serve_until_input_ends() {
    let (_temp, store, bot) = setup_bot(FixedScraper::titled("Example"));
    let ctx = Context::background();
    let mut transport = transport(
        "5 /start\n\
         not-a-user https://ignored.example\n\
         5 https://example.com #tag\n\
         5 /list\n",
    );

    let handled = serve(&ctx, &mut transport, &bot).unwrap();
    assert_eq!(handled, 3);

    let output = String::from_utf8(transport.into_writer()).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert!(lines[0].starts_with("5 Welcome"));
    assert_eq!(lines[1], "5 Saved: Example");
    assert_eq!(lines[2], "5 Your links (1):");
    assert!(lines.iter().all(|line| line.starts_with("5 ")));
    assert!(!output.contains("ignored.example"));

    assert_eq!(store.count_links(&ctx, 5).unwrap(), 1);
}

#[test]
fn test_serve_stops_on_cancelled_context() {
    let (_temp, store, bot) = setup_bot(FixedScraper::titled("Example"));
    let ctx = Context::background();
    ctx.cancel();
    let mut transport = transport("5 https://example.com\n");

    let handled = serve(&ctx, &mut transport, &bot).unwrap();
    assert_eq!(handled, 0);
    assert!(transport.into_writer().is_empty());
    assert_eq!(
        store.count_links(&Context::background(), 5).unwrap(),
        0
    );
}
