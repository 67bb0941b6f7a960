//! Link Store
//!
//! Transactional CRUD for link records over the embedded engine.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use redb::{Builder, Database, ReadableTable, TableDefinition, WriteTransaction};
use tracing::{debug, error, info, warn};

use crate::codec::{decode_link, describe_key, encode_link, link_key, parse_link_key, user_prefix};
use crate::config::Config;
use crate::context::Context;
use crate::error::{Result, StorageResultExt, VaultError};
use crate::link::{validate_key, Link};

/// The single engine table: link key → encoded record
pub const LINKS_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("links");

/// Result of one reclaim pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimOutcome {
    /// The engine file was replaced by a smaller copy of the live set
    Compacted,

    /// The copy would not have been smaller; the file was left alone
    NothingToReclaim,

    /// Another pass was already running; this one was skipped
    Busy,
}

/// Per-user link store
///
/// ## Concurrency Model
///
/// - **Reads and writes** take the read side of `db`; the engine itself
///   gives MVCC snapshot reads and serializes write transactions
/// - **reclaim** copies the live set next to CRUD traffic and takes the
///   write side only to catch up on keys written meanwhile and swap files
/// - **close** takes the write side
///
/// ## Lifecycle
///
/// Open → Closed, once. After `close` the handle is `None` and every
/// operation fails with `StoreClosed`.
pub struct LinkStore {
    config: Config,

    /// Engine handle; `None` once closed
    db: RwLock<Option<Database>>,

    /// Keys committed while a reclaim pass runs; `None` when no pass runs
    reclaim_dirty: Mutex<Option<BTreeSet<Vec<u8>>>>,

    /// Held for a whole reclaim pass
    reclaim_running: Mutex<()>,
}

impl LinkStore {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Drop any scratch file left by an interrupted reclaim pass
    /// 3. Open (or create) the engine file with the links table
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        remove_if_exists(&config.reclaim_path())?;

        let path = config.database_path();
        let db = open_engine(&config, &path)?;

        info!(path = %path.display(), "link store opened");

        Ok(Self {
            config,
            db: RwLock::new(Some(db)),
            reclaim_dirty: Mutex::new(None),
            reclaim_running: Mutex::new(()),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Save a link, replacing any record with the same (user_id, url)
    ///
    /// A zero timestamp is set to the current time. Returns the record as
    /// stored.
    pub fn save_link(&self, ctx: &Context, mut link: Link) -> Result<Link> {
        const OP: &str = "save_link";

        link.validate()?;
        ctx.check()?;

        if link.timestamp_unset() {
            link.timestamp = Utc::now();
        }

        let key = link_key(link.user_id, &link.url);
        let value = encode_link(&link)?;
        let user_id = link.user_id;

        self.with_db(|db| {
            let txn = db.begin_write().on_write(OP, user_id)?;
            {
                let mut table = txn.open_table(LINKS_TABLE).on_write(OP, user_id)?;
                table
                    .insert(key.as_slice(), value.as_slice())
                    .on_write(OP, user_id)?;
            }
            commit_unless_cancelled(ctx, txn, OP, user_id)?;
            self.note_write(&key);
            Ok(())
        })?;

        debug!(user_id, url = %link.url, "link saved");
        Ok(link)
    }

    /// All links of a user, most recent first
    ///
    /// Reads one snapshot. A single undecodable value fails the whole call;
    /// no partial results are returned. Records with equal timestamps keep
    /// key order (URL ascending).
    pub fn links_by_user(&self, ctx: &Context, user_id: i64) -> Result<Vec<Link>> {
        const OP: &str = "links_by_user";

        ctx.check()?;
        let prefix = user_prefix(user_id);

        let mut links = self.with_db(|db| {
            let txn = db.begin_read().on_read(OP, user_id)?;
            let table = txn.open_table(LINKS_TABLE).on_read(OP, user_id)?;

            let mut links = Vec::new();
            for entry in table.range(prefix.as_slice()..).on_read(OP, user_id)? {
                ctx.check()?;
                let (key, value) = entry.on_read(OP, user_id)?;
                let key = key.value();
                if !key.starts_with(&prefix) {
                    break;
                }
                links.push(decode_entry(key, value.value())?);
            }
            Ok(links)
        })?;

        links.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        debug!(user_id, link_count = links.len(), "links listed");
        Ok(links)
    }

    /// Fetch one link
    pub fn get_link(&self, ctx: &Context, user_id: i64, url: &str) -> Result<Option<Link>> {
        const OP: &str = "get_link";

        validate_key(user_id, url)?;
        ctx.check()?;
        let key = link_key(user_id, url);

        self.with_db(|db| {
            let txn = db.begin_read().on_read(OP, user_id)?;
            let table = txn.open_table(LINKS_TABLE).on_read(OP, user_id)?;
            let found = table.get(key.as_slice()).on_read(OP, user_id)?;
            let link = match found {
                Some(value) => Some(decode_entry(&key, value.value())?),
                None => None,
            };
            Ok(link)
        })
    }

    /// Number of links a user has saved (values are not decoded)
    pub fn count_links(&self, ctx: &Context, user_id: i64) -> Result<usize> {
        const OP: &str = "count_links";

        ctx.check()?;
        let prefix = user_prefix(user_id);

        self.with_db(|db| {
            let txn = db.begin_read().on_read(OP, user_id)?;
            let table = txn.open_table(LINKS_TABLE).on_read(OP, user_id)?;

            let mut count = 0;
            for entry in table.range(prefix.as_slice()..).on_read(OP, user_id)? {
                ctx.check()?;
                let (key, _) = entry.on_read(OP, user_id)?;
                if !key.value().starts_with(&prefix) {
                    break;
                }
                count += 1;
            }
            Ok(count)
        })
    }

    /// Set the read flag of an existing link
    ///
    /// Returns `false` when the link does not exist. Read, modify and write
    /// happen in one transaction.
    pub fn mark_read(&self, ctx: &Context, user_id: i64, url: &str, read: bool) -> Result<bool> {
        const OP: &str = "mark_read";

        validate_key(user_id, url)?;
        ctx.check()?;
        let key = link_key(user_id, url);

        let updated = self.with_db(|db| {
            let txn = db.begin_write().on_write(OP, user_id)?;
            let updated = {
                let mut table = txn.open_table(LINKS_TABLE).on_write(OP, user_id)?;
                let existing = table
                    .get(key.as_slice())
                    .on_write(OP, user_id)?
                    .map(|value| value.value().to_vec());

                match existing {
                    Some(bytes) => {
                        let mut link = decode_entry(&key, &bytes)?;
                        link.read = read;
                        let value = encode_link(&link)?;
                        table
                            .insert(key.as_slice(), value.as_slice())
                            .on_write(OP, user_id)?;
                        true
                    }
                    None => false,
                }
            };

            if updated {
                commit_unless_cancelled(ctx, txn, OP, user_id)?;
                self.note_write(&key);
            } else {
                txn.abort().on_write(OP, user_id)?;
            }
            Ok(updated)
        })?;

        debug!(user_id, url, read, updated, "link read flag set");
        Ok(updated)
    }

    /// Delete a link
    ///
    /// Deleting a missing link succeeds, so callers can delete without
    /// checking first. A pair that can never be saved (user 0, empty URL)
    /// is missing by definition.
    pub fn delete_link(&self, ctx: &Context, user_id: i64, url: &str) -> Result<()> {
        const OP: &str = "delete_link";

        ctx.check()?;
        if validate_key(user_id, url).is_err() {
            debug!(user_id, url, "delete of unsavable key, nothing to do");
            return self.with_db(|_| Ok(()));
        }
        let key = link_key(user_id, url);

        let removed = self.with_db(|db| {
            let txn = db.begin_write().on_write(OP, user_id)?;
            let removed = {
                let mut table = txn.open_table(LINKS_TABLE).on_write(OP, user_id)?;
                let removed = table.remove(key.as_slice()).on_write(OP, user_id)?.is_some();
                removed
            };
            commit_unless_cancelled(ctx, txn, OP, user_id)?;
            self.note_write(&key);
            Ok(removed)
        })?;

        debug!(user_id, url, removed, "link deleted");
        Ok(())
    }

    /// One space-reclamation pass over the engine file
    ///
    /// Copy-and-swap:
    /// 1. Copy every live entry from a read snapshot into a scratch file.
    ///    CRUD keeps running; committed keys are noted meanwhile.
    /// 2. If the copy is not smaller, drop it: `NothingToReclaim`.
    /// 3. Otherwise take the handle exclusively, replay the noted keys into
    ///    the copy, and swap it in place of the engine file: `Compacted`.
    ///
    /// Only step 3 excludes CRUD, and its cost is the writes that landed
    /// during the copy, not the size of the file.
    pub fn reclaim(&self) -> Result<ReclaimOutcome> {
        let Some(_running) = self.reclaim_running.try_lock() else {
            return Ok(ReclaimOutcome::Busy);
        };

        let copy_path = self.config.reclaim_path();
        *self.reclaim_dirty.lock() = Some(BTreeSet::new());
        let outcome = self.reclaim_pass(&copy_path);
        *self.reclaim_dirty.lock() = None;

        if !matches!(outcome, Ok(ReclaimOutcome::Compacted)) {
            if let Err(e) = remove_if_exists(&copy_path) {
                warn!(path = %copy_path.display(), error = %e, "failed to remove reclaim scratch file");
            }
        }
        outcome
    }

    fn reclaim_pass(&self, copy_path: &Path) -> Result<ReclaimOutcome> {
        remove_if_exists(copy_path)?;

        // Copy phase: shares the handle with CRUD
        let (copy, copied) = self.with_db(|db| {
            let copy = Builder::new()
                .set_cache_size(self.config.cache_size_bytes)
                .create(copy_path)
                .map_err(reclaim_error)?;
            let copied = copy_live_entries(db, &copy)?;
            Ok((copy, copied))
        })?;

        let path = self.path();
        let old_size = fs::metadata(&path)?.len();
        let new_size = fs::metadata(copy_path)?.len();
        if new_size >= old_size {
            debug!(old_size, new_size, "reclaim copy is not smaller, keeping engine file");
            return Ok(ReclaimOutcome::NothingToReclaim);
        }

        // Swap phase: exclusive, bounded by writes made during the copy
        let mut guard = self.db.write();
        let db = guard.as_ref().ok_or(VaultError::StoreClosed)?;

        let dirty = self
            .reclaim_dirty
            .lock()
            .as_mut()
            .map(mem::take)
            .unwrap_or_default();
        replay_keys(db, &copy, &dirty)?;
        drop(copy);

        // The old handle must be gone before its file is replaced
        guard.take();
        let swapped = fs::rename(copy_path, &path);
        match open_engine(&self.config, &path) {
            Ok(db) => *guard = Some(db),
            Err(e) => {
                error!(path = %path.display(), error = %e, "failed to reopen engine after reclaim, store is closed");
                return Err(e);
            }
        }
        swapped?;

        info!(copied, replayed = dirty.len(), old_size, new_size, "engine file compacted");
        Ok(ReclaimOutcome::Compacted)
    }

    /// Close the store and release the engine handle
    ///
    /// Irreversible. Closing twice fails with `StoreClosed`. Waits for the
    /// copy phase of a running reclaim pass.
    pub fn close(&self) -> Result<()> {
        let db = self.db.write().take().ok_or(VaultError::StoreClosed)?;
        drop(db);

        info!(path = %self.config.database_path().display(), "link store closed");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn is_closed(&self) -> bool {
        self.db.read().is_none()
    }

    /// True while a reclaim pass runs
    pub fn is_reclaiming(&self) -> bool {
        self.reclaim_dirty.lock().is_some()
    }

    /// Get the engine file path
    pub fn path(&self) -> PathBuf {
        self.config.database_path()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `f` against the open handle, or fail with `StoreClosed`
    fn with_db<T>(&self, f: impl FnOnce(&Database) -> Result<T>) -> Result<T> {
        let guard = self.db.read();
        let db = guard.as_ref().ok_or(VaultError::StoreClosed)?;
        f(db)
    }

    /// Note a committed key for a running reclaim pass
    ///
    /// Called with the read side held, so the swap phase sees every key
    /// committed before it.
    fn note_write(&self, key: &[u8]) {
        if let Some(dirty) = self.reclaim_dirty.lock().as_mut() {
            dirty.insert(key.to_vec());
        }
    }
}

/// Open (or create) an engine file and make sure the links table exists
fn open_engine(config: &Config, path: &Path) -> Result<Database> {
    let db = Builder::new()
        .set_cache_size(config.cache_size_bytes)
        .create(path)
        .map_err(|e| VaultError::StorageOpen(e.into()))?;

    let txn = db
        .begin_write()
        .map_err(|e| VaultError::StorageOpen(e.into()))?;
    txn.open_table(LINKS_TABLE)
        .map_err(|e| VaultError::StorageOpen(e.into()))?;
    txn.commit().map_err(|e| VaultError::StorageOpen(e.into()))?;

    Ok(db)
}

/// Copy every entry visible in one snapshot of `source` into `target`
fn copy_live_entries(source: &Database, target: &Database) -> Result<u64> {
    let read = source.begin_read().map_err(reclaim_error)?;
    let from = read.open_table(LINKS_TABLE).map_err(reclaim_error)?;

    let write = target.begin_write().map_err(reclaim_error)?;
    let mut copied = 0;
    {
        let mut to = write.open_table(LINKS_TABLE).map_err(reclaim_error)?;
        for entry in from.iter().map_err(reclaim_error)? {
            let (key, value) = entry.map_err(reclaim_error)?;
            to.insert(key.value(), value.value()).map_err(reclaim_error)?;
            copied += 1;
        }
    }
    write.commit().map_err(reclaim_error)?;
    Ok(copied)
}

/// Bring `target` up to date with `source` for the given keys
fn replay_keys(source: &Database, target: &Database, keys: &BTreeSet<Vec<u8>>) -> Result<()> {
    let read = source.begin_read().map_err(reclaim_error)?;
    let from = read.open_table(LINKS_TABLE).map_err(reclaim_error)?;

    let write = target.begin_write().map_err(reclaim_error)?;
    {
        let mut to = write.open_table(LINKS_TABLE).map_err(reclaim_error)?;
        for key in keys {
            let current = from
                .get(key.as_slice())
                .map_err(reclaim_error)?
                .map(|value| value.value().to_vec());
            match current {
                Some(value) => {
                    to.insert(key.as_slice(), value.as_slice())
                        .map_err(reclaim_error)?;
                }
                None => {
                    to.remove(key.as_slice()).map_err(reclaim_error)?;
                }
            }
        }
    }
    write.commit().map_err(reclaim_error)?;
    Ok(())
}

fn reclaim_error(e: impl Into<redb::Error>) -> VaultError {
    VaultError::Maintenance(e.into().to_string())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Commit, unless the context ended while the transaction was open
fn commit_unless_cancelled(
    ctx: &Context,
    txn: WriteTransaction,
    op: &'static str,
    user_id: i64,
) -> Result<()> {
    if let Err(cancelled) = ctx.check() {
        txn.abort().on_write(op, user_id)?;
        return Err(cancelled);
    }
    txn.commit().on_write(op, user_id)
}

/// Decode a stored value and check it belongs under `key`
fn decode_entry(key: &[u8], value: &[u8]) -> Result<Link> {
    let link = decode_link(value).map_err(|e| match e {
        VaultError::Decoding { reason, .. } => VaultError::Decoding {
            key: describe_key(key),
            reason,
        },
        other => other,
    })?;

    let (user_id, url) = parse_link_key(key)?;
    if link.user_id != user_id || link.url != url {
        return Err(VaultError::Decoding {
            key: describe_key(key),
            reason: format!(
                "record for user {} url {} does not match its key",
                link.user_id, link.url
            ),
        });
    }

    Ok(link)
}
