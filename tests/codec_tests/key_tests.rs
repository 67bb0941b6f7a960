//! Tests for the key scheme
//!
//! These tests verify:
//! - Layout of link keys and user prefixes
//! - Prefix isolation between users whose ids share digits
//! - Key ordering by signed user id
//! - Parsing keys back into (user_id, url)

use linkvault::codec::{link_key, parse_link_key, user_prefix, KEY_PREFIX, USER_PREFIX_LEN};
use linkvault::VaultError;

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_user_prefix_layout() {
    let prefix = user_prefix(1);

    assert_eq!(prefix.len(), USER_PREFIX_LEN);
    assert!(prefix.starts_with(KEY_PREFIX));
    assert_eq!(prefix.last(), Some(&b'/'));
}

#[test]
fn test_link_key_extends_user_prefix() {
    let key = link_key(42, "https://example.com/page");

    assert!(key.starts_with(&user_prefix(42)));
    assert_eq!(&key[USER_PREFIX_LEN..], b"https://example.com/page");
}

#[test]
fn test_user_prefix_has_fixed_width() {
    for user_id in [1, 12, 123, 1_000_000, -1, i64::MIN, i64::MAX] {
        assert_eq!(user_prefix(user_id).len(), USER_PREFIX_LEN);
    }
}

// =============================================================================
// Isolation Tests
// =============================================================================

#[test]
fn test_prefixes_of_digit_sharing_users_do_not_overlap() {
    let ids = [1i64, 12, 123, 2, 21, -1, -12];

    for &a in &ids {
        for &b in &ids {
            if a == b {
                continue;
            }
            let key_of_a = link_key(a, "https://example.com");
            assert!(
                !key_of_a.starts_with(&user_prefix(b)),
                "key of user {} matched prefix of user {}",
                a,
                b
            );
        }
    }
}

#[test]
fn test_url_containing_key_literals_stays_with_owner() {
    // A URL that looks like another key must not move the record to user 2
    let tricky_url = "link/\u{0}\u{0}/https://evil.example";
    let key = link_key(1, tricky_url);

    assert!(key.starts_with(&user_prefix(1)));
    assert!(!key.starts_with(&user_prefix(2)));
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_keys_sort_by_signed_user_id() {
    let mut ids = vec![5i64, -3, 0, i64::MAX, i64::MIN, 12, 1];
    let mut prefixes: Vec<(Vec<u8>, i64)> = ids.iter().map(|&id| (user_prefix(id), id)).collect();

    prefixes.sort();
    ids.sort();

    let sorted_ids: Vec<i64> = prefixes.into_iter().map(|(_, id)| id).collect();
    assert_eq!(sorted_ids, ids);
}

#[test]
fn test_keys_of_one_user_are_contiguous() {
    let mut keys = vec![
        link_key(1, "https://b.com"),
        link_key(2, "https://a.com"),
        link_key(1, "https://a.com"),
        link_key(12, "https://a.com"),
        link_key(1, "https://z.com"),
    ];
    keys.sort();

    let prefix = user_prefix(1);
    let positions: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| key.starts_with(&prefix))
        .map(|(i, _)| i)
        .collect();

    assert_eq!(positions, vec![0, 1, 2]);
}

// =============================================================================
// Parse Tests
// =============================================================================

#[test]
fn test_parse_link_key() {
    let key = link_key(-77, "https://example.com/a/b?c=d");
    let (user_id, url) = parse_link_key(&key).unwrap();

    assert_eq!(user_id, -77);
    assert_eq!(url, "https://example.com/a/b?c=d");
}

#[test]
fn test_parse_link_key_extreme_ids() {
    for user_id in [i64::MIN, i64::MAX] {
        let (parsed, url) = parse_link_key(&link_key(user_id, "u")).unwrap();
        assert_eq!(parsed, user_id);
        assert_eq!(url, "u");
    }
}

#[test]
fn test_parse_short_key_fails() {
    let result = parse_link_key(b"link/");
    assert!(matches!(result, Err(VaultError::Decoding { .. })));
}

#[test]
fn test_parse_wrong_literal_fails() {
    let mut key = link_key(1, "https://example.com");
    key[0] = b'x';

    let result = parse_link_key(&key);
    assert!(matches!(result, Err(VaultError::Decoding { .. })));
}

#[test]
fn test_parse_missing_separator_fails() {
    let mut key = link_key(1, "https://example.com");
    key[USER_PREFIX_LEN - 1] = b':';

    let result = parse_link_key(&key);
    assert!(matches!(result, Err(VaultError::Decoding { .. })));
}

#[test]
fn test_parse_non_utf8_url_fails() {
    let mut key = user_prefix(1);
    key.extend_from_slice(&[0xFF, 0xFE]);

    let result = parse_link_key(&key);
    assert!(matches!(result, Err(VaultError::Decoding { .. })));
}
