//! Tests for store open / close / reopen

use linkvault::{Config, Context, Link, LinkStore, VaultError};
use tempfile::TempDir;

use crate::common::{setup_temp_store, t0};

fn assert_closed<T: std::fmt::Debug>(result: linkvault::Result<T>) {
    match result {
        Err(VaultError::StoreClosed) => {}
        other => panic!("Expected StoreClosed, got {:?}", other),
    }
}

#[test]
fn test_open_creates_data_dir_and_file() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("data");

    let store = LinkStore::open(Config::builder().data_dir(&data_dir).build()).unwrap();

    assert!(data_dir.is_dir());
    assert!(store.path().is_file());
    assert_eq!(store.path(), data_dir.join(Config::DATABASE_FILENAME));
    assert!(!store.is_closed());
}

#[test]
fn test_new_store_is_empty() {
    let (_temp, store) = setup_temp_store();
    let ctx = Context::background();

    assert!(store.links_by_user(&ctx, 1).unwrap().is_empty());
}

#[test]
fn test_reopen_persists_links() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = Context::background();

    let saved = Link::new(42, "https://persisted.example")
        .with_title("Persisted")
        .with_tags(["keep"])
        .with_timestamp(t0());

    {
        let store = LinkStore::open_path(temp_dir.path()).unwrap();
        store.save_link(&ctx, saved.clone()).unwrap();
        store
            .save_link(&ctx, Link::new(42, "https://deleted.example"))
            .unwrap();
        store
            .delete_link(&ctx, 42, "https://deleted.example")
            .unwrap();
        store.close().unwrap();
    }

    let store = LinkStore::open_path(temp_dir.path()).unwrap();
    assert_eq!(store.links_by_user(&ctx, 42).unwrap(), vec![saved]);
}

#[test]
fn test_drop_without_close_persists_links() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = Context::background();

    {
        let store = LinkStore::open_path(temp_dir.path()).unwrap();
        store
            .save_link(&ctx, Link::new(1, "https://example.com"))
            .unwrap();
    }

    let store = LinkStore::open_path(temp_dir.path()).unwrap();
    assert_eq!(store.count_links(&ctx, 1).unwrap(), 1);
}

#[test]
fn test_operations_after_close_fail() {
    let (_temp, store) = setup_temp_store();
    let ctx = Context::background();

    store
        .save_link(&ctx, Link::new(1, "https://example.com"))
        .unwrap();
    store.close().unwrap();
    assert!(store.is_closed());

    assert_closed(store.save_link(&ctx, Link::new(1, "https://other.com")));
    assert_closed(store.links_by_user(&ctx, 1));
    assert_closed(store.get_link(&ctx, 1, "https://example.com"));
    assert_closed(store.count_links(&ctx, 1));
    assert_closed(store.mark_read(&ctx, 1, "https://example.com", true));
    assert_closed(store.delete_link(&ctx, 1, "https://example.com"));
    assert_closed(store.reclaim());
}

#[test]
fn test_close_twice_fails() {
    let (_temp, store) = setup_temp_store();

    store.close().unwrap();
    assert_closed(store.close());
}

#[test]
fn test_reopen_after_close_sees_writes() {
    let (temp, store) = setup_temp_store();
    let ctx = Context::background();

    for i in 0..10 {
        store
            .save_link(&ctx, Link::new(7, format!("https://example.com/{}", i)))
            .unwrap();
    }
    store.close().unwrap();

    let store = LinkStore::open_path(temp.path()).unwrap();
    assert_eq!(store.count_links(&ctx, 7).unwrap(), 10);
}
