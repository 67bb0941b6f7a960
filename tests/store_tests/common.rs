//! Shared helpers for store tests

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use linkvault::codec::{encode_link, link_key};
use linkvault::store::LINKS_TABLE;
use linkvault::{Config, Link, LinkStore};
use tempfile::TempDir;

pub fn test_config(dir: &Path) -> Config {
    Config::builder()
        .data_dir(dir)
        .cache_size_bytes(1024 * 1024) // 1 MB
        .build()
}

pub fn setup_temp_store() -> (TempDir, LinkStore) {
    let temp_dir = TempDir::new().unwrap();
    let store = LinkStore::open(test_config(temp_dir.path())).unwrap();
    (temp_dir, store)
}

/// Fixed base instant so ordering assertions do not depend on the clock
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

pub fn minutes_after_t0(minutes: i64) -> DateTime<Utc> {
    t0() + Duration::minutes(minutes)
}

pub fn bulk_url(i: usize) -> String {
    format!("https://bulk.example/{:06}", i)
}

/// Write `count` links with large descriptions for `user_id` straight into the
/// engine file, then delete all but every `keep_every`-th one
///
/// Goes through the engine in two transactions so large stores are quick to
/// build. Returns the number of links left.
pub fn seed_with_garbage(dir: &Path, user_id: i64, count: usize, keep_every: usize) -> usize {
    let path = test_config(dir).database_path();
    fs::create_dir_all(dir).unwrap();
    let db = redb::Database::create(&path).unwrap();
    let description = "x".repeat(4096);

    let txn = db.begin_write().unwrap();
    {
        let mut table = txn.open_table(LINKS_TABLE).unwrap();
        for i in 0..count {
            let link = Link::new(user_id, bulk_url(i))
                .with_description(description.as_str())
                .with_timestamp(t0());
            let key = link_key(user_id, &link.url);
            let value = encode_link(&link).unwrap();
            table.insert(key.as_slice(), value.as_slice()).unwrap();
        }
    }
    txn.commit().unwrap();

    let mut kept = 0;
    let txn = db.begin_write().unwrap();
    {
        let mut table = txn.open_table(LINKS_TABLE).unwrap();
        for i in 0..count {
            if i % keep_every == 0 {
                kept += 1;
                continue;
            }
            table.remove(link_key(user_id, &bulk_url(i)).as_slice()).unwrap();
        }
    }
    txn.commit().unwrap();

    kept
}

pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).unwrap().len()
}
