//! Key scheme
//!
//! Composite keys for (user_id, url) pairs and per-user scan prefixes.

use bytes::{Buf, BufMut};

use crate::error::{Result, VaultError};

/// Literal every link key starts with
pub const KEY_PREFIX: &[u8] = b"link/";

/// Separator between the user id and the URL
const SEPARATOR: u8 = b'/';

/// Length of `user_prefix`: literal + 8-byte id + separator
pub const USER_PREFIX_LEN: usize = KEY_PREFIX.len() + 8 + 1;

/// Map a signed id onto an unsigned value with the same ordering
fn ordered_id(user_id: i64) -> u64 {
    (user_id as u64) ^ (1 << 63)
}

fn id_from_ordered(raw: u64) -> i64 {
    (raw ^ (1 << 63)) as i64
}

/// Scan prefix covering exactly the keys of one user
pub fn user_prefix(user_id: i64) -> Vec<u8> {
    let mut key = Vec::with_capacity(USER_PREFIX_LEN);
    key.put_slice(KEY_PREFIX);
    key.put_u64(ordered_id(user_id));
    key.put_u8(SEPARATOR);
    key
}

/// Storage key of a (user_id, url) pair
pub fn link_key(user_id: i64, url: &str) -> Vec<u8> {
    let mut key = user_prefix(user_id);
    key.reserve(url.len());
    key.put_slice(url.as_bytes());
    key
}

/// Split a storage key back into (user_id, url)
pub fn parse_link_key(key: &[u8]) -> Result<(i64, String)> {
    let malformed = |reason: &str| VaultError::Decoding {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: reason.to_string(),
    };

    if key.len() < USER_PREFIX_LEN {
        return Err(malformed("key shorter than user prefix"));
    }
    if !key.starts_with(KEY_PREFIX) {
        return Err(malformed("missing link key literal"));
    }
    if key[USER_PREFIX_LEN - 1] != SEPARATOR {
        return Err(malformed("missing separator after user id"));
    }

    let mut id_bytes = &key[KEY_PREFIX.len()..USER_PREFIX_LEN - 1];
    let user_id = id_from_ordered(id_bytes.get_u64());

    let url = std::str::from_utf8(&key[USER_PREFIX_LEN..])
        .map_err(|_| malformed("url segment is not valid UTF-8"))?;

    Ok((user_id, url.to_string()))
}

/// Human-readable rendering of a key for error messages and logs
pub(crate) fn describe_key(key: &[u8]) -> String {
    match parse_link_key(key) {
        Ok((user_id, url)) => format!("user:{}:link:{}", user_id, url),
        Err(_) => String::from_utf8_lossy(key).into_owned(),
    }
}
