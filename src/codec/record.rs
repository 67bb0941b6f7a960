//! Record codec
//!
//! Encodes a [`Link`] into a versioned, checksummed envelope and back.

use bytes::{Buf, BufMut, BytesMut};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VaultError};
use crate::link::Link;

/// Envelope version written by this build
pub const FORMAT_VERSION: u8 = 1;

/// Header size: 1 byte version + 4 bytes CRC32 + 4 bytes payload length
pub const HEADER_SIZE: usize = 9;

/// Persisted shape of a link
///
/// Kept apart from `Link` so the public type can evolve without touching the
/// stored bytes. The timestamp is split into seconds and nanoseconds so the
/// round trip is exact.
#[derive(Serialize, Deserialize)]
struct StoredLink {
    url: String,
    title: String,
    description: String,
    user_id: i64,
    timestamp_secs: i64,
    timestamp_nanos: u32,
    tags: Vec<String>,
    read: bool,
    preview_image_url: Option<String>,
}

impl From<&Link> for StoredLink {
    fn from(link: &Link) -> Self {
        Self {
            url: link.url.clone(),
            title: link.title.clone(),
            description: link.description.clone(),
            user_id: link.user_id,
            timestamp_secs: link.timestamp.timestamp(),
            timestamp_nanos: link.timestamp.timestamp_subsec_nanos(),
            tags: link.tags.clone(),
            read: link.read,
            preview_image_url: link.preview_image_url.clone(),
        }
    }
}

/// Encode a link to its stored bytes
///
/// Format: version (1) + crc32 (4) + payload_len (4) + payload
pub fn encode_link(link: &Link) -> Result<Vec<u8>> {
    let payload = bincode::serialize(&StoredLink::from(link)).map_err(|e| VaultError::Encoding {
        user_id: link.user_id,
        reason: e.to_string(),
    })?;

    let payload_len = u32::try_from(payload.len()).map_err(|_| VaultError::Encoding {
        user_id: link.user_id,
        reason: format!("payload of {} bytes does not fit the length field", payload.len()),
    })?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u8(FORMAT_VERSION);
    buf.put_u32(crc32fast::hash(&payload));
    buf.put_u32(payload_len);
    buf.put_slice(&payload);

    Ok(buf.to_vec())
}

/// Decode stored bytes back into a link
///
/// Any framing, checksum or payload problem is reported as `Decoding`; the
/// key is left as `<value>` here and filled in by the store, which knows it.
pub fn decode_link(bytes: &[u8]) -> Result<Link> {
    let corrupt = |reason: String| VaultError::Decoding {
        key: "<value>".to_string(),
        reason,
    };

    if bytes.len() < HEADER_SIZE {
        return Err(corrupt(format!(
            "incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let version = header.get_u8();
    let expected_crc = header.get_u32();
    let payload_len = header.get_u32() as usize;

    if version != FORMAT_VERSION {
        return Err(corrupt(format!("unknown format version: {}", version)));
    }

    let payload = &bytes[HEADER_SIZE..];
    if payload.len() != payload_len {
        return Err(corrupt(format!(
            "payload length mismatch: header says {}, found {}",
            payload_len,
            payload.len()
        )));
    }

    let actual_crc = crc32fast::hash(payload);
    if actual_crc != expected_crc {
        return Err(corrupt(format!(
            "checksum mismatch: expected {:08x}, computed {:08x}",
            expected_crc, actual_crc
        )));
    }

    let stored: StoredLink =
        bincode::deserialize(payload).map_err(|e| corrupt(format!("bincode: {}", e)))?;

    let timestamp = DateTime::from_timestamp(stored.timestamp_secs, stored.timestamp_nanos)
        .ok_or_else(|| {
            corrupt(format!(
                "timestamp out of range: {}s {}ns",
                stored.timestamp_secs, stored.timestamp_nanos
            ))
        })?;

    Ok(Link {
        url: stored.url,
        title: stored.title,
        description: stored.description,
        user_id: stored.user_id,
        timestamp,
        tags: stored.tags,
        read: stored.read,
        preview_image_url: stored.preview_image_url,
    })
}
