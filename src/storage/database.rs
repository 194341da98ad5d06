// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded graph database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! Entity tables map an id to the JSON-serialized record:
//!
//! - `clusters`, `mints`, `apps`, `app_envs`, `app_mints`,
//!   `app_transactions`, `users`
//!
//! Index tables hold composite keys (`parent|...|child`) whose value is the
//! child id, so a parent's children are a single prefix range scan:
//!
//! - `mint_index`: `cluster_id|address` → mint_id (address unique per cluster)
//! - `app_env_index`: `app_id|seq_be|env_id` → env_id (creation order)
//! - `app_mint_index`: `env_id|mint_id` → app_mint_id (mint added once per env)
//! - `env_tx_index`: `env_id|!micros_be|tx_id` → tx_id (newest first)
//! - `user_apps`: `user_id|app_id` → app_id
//!
//! Remaining lookup tables:
//!
//! - `app_keys`: `index|name` → app_id (unique App identity)
//! - `app_users`: `app_id|user_id` → serialized AppUser
//! - `usernames`: normalized username → user_id

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, Table, TableDefinition,
    WriteTransaction,
};
use serde::{de::DeserializeOwned, Serialize};

use super::error::{StoreError, StoreResult};
use super::stats_cache::StatsCache;
use crate::config::StorageLocation;

// =============================================================================
// Table Definitions
// =============================================================================

pub(crate) const CLUSTERS: TableDefinition<&str, &[u8]> = TableDefinition::new("clusters");
pub(crate) const MINTS: TableDefinition<&str, &[u8]> = TableDefinition::new("mints");
pub(crate) const APPS: TableDefinition<&str, &[u8]> = TableDefinition::new("apps");
pub(crate) const APP_ENVS: TableDefinition<&str, &[u8]> = TableDefinition::new("app_envs");
pub(crate) const APP_MINTS: TableDefinition<&str, &[u8]> = TableDefinition::new("app_mints");
pub(crate) const APP_TRANSACTIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("app_transactions");
pub(crate) const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

pub(crate) const MINT_INDEX: TableDefinition<&[u8], &str> = TableDefinition::new("mint_index");
pub(crate) const APP_ENV_INDEX: TableDefinition<&[u8], &str> =
    TableDefinition::new("app_env_index");
pub(crate) const APP_MINT_INDEX: TableDefinition<&[u8], &str> =
    TableDefinition::new("app_mint_index");
pub(crate) const ENV_TX_INDEX: TableDefinition<&[u8], &str> = TableDefinition::new("env_tx_index");
pub(crate) const USER_APPS: TableDefinition<&[u8], &str> = TableDefinition::new("user_apps");

pub(crate) const APP_KEYS: TableDefinition<&str, &str> = TableDefinition::new("app_keys");
pub(crate) const APP_USERS: TableDefinition<&[u8], &[u8]> = TableDefinition::new("app_users");
pub(crate) const USERNAMES: TableDefinition<&str, &str> = TableDefinition::new("usernames");

pub(crate) type RecordTable<'txn> = Table<'txn, &'static str, &'static [u8]>;

// =============================================================================
// Index Key Helpers
// =============================================================================

const SEPARATOR: u8 = b'|';

/// Join key parts with the `|` separator.
pub(crate) fn index_key(parts: &[&[u8]]) -> Vec<u8> {
    let len = parts.iter().map(|p| p.len() + 1).sum();
    let mut key = Vec::with_capacity(len);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(SEPARATOR);
        }
        key.extend_from_slice(part);
    }
    key
}

/// Lower bound of the range holding every key under `parent`.
pub(crate) fn prefix(parent: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(parent.len() + 1);
    key.extend_from_slice(parent.as_bytes());
    key.push(SEPARATOR);
    key
}

/// Exclusive upper bound matching [`prefix`]: the separator's successor byte.
pub(crate) fn prefix_end(parent: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(parent.len() + 1);
    key.extend_from_slice(parent.as_bytes());
    key.push(SEPARATOR + 1);
    key
}

/// Inverted timestamp so that forward scans return the newest entry first.
pub(crate) fn newest_first(at: DateTime<Utc>) -> [u8; 8] {
    (!(at.timestamp_micros() as u64)).to_be_bytes()
}

// =============================================================================
// Record Helpers
// =============================================================================

pub(crate) fn get_json<T, R>(table: &R, id: &str) -> StoreResult<Option<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(id)? {
        Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
        None => Ok(None),
    }
}

/// Like [`get_json`], reporting a missing record as `NotFound`.
pub(crate) fn require_json<T, R>(table: &R, entity: &'static str, id: &str) -> StoreResult<T>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    get_json(table, id)?.ok_or_else(|| StoreError::not_found(entity, id))
}

pub(crate) fn put_json<T: Serialize>(
    table: &mut RecordTable<'_>,
    id: &str,
    record: &T,
) -> StoreResult<()> {
    let json = serde_json::to_vec(record)?;
    table.insert(id, json.as_slice())?;
    Ok(())
}

pub(crate) fn all_json<T, R>(table: &R) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    let mut records = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        records.push(serde_json::from_slice(value.value())?);
    }
    Ok(records)
}

/// Child ids stored under `parent` in an index table, in key order.
pub(crate) fn scan_ids<R>(table: &R, parent: &str) -> StoreResult<Vec<String>>
where
    R: ReadableTable<&'static [u8], &'static str>,
{
    let start = prefix(parent);
    let end = prefix_end(parent);
    let mut ids = Vec::new();
    for entry in table.range(start.as_slice()..end.as_slice())? {
        let (_, value) = entry?;
        ids.push(value.value().to_string());
    }
    Ok(ids)
}

/// JSON records stored under `parent` in a composite-key table, in key order.
pub(crate) fn scan_json<T, R>(table: &R, parent: &str) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static [u8], &'static [u8]>,
{
    let start = prefix(parent);
    let end = prefix_end(parent);
    let mut records = Vec::new();
    for entry in table.range(start.as_slice()..end.as_slice())? {
        let (_, value) = entry?;
        records.push(serde_json::from_slice(value.value())?);
    }
    Ok(records)
}

/// Load each id from an entity table, skipping dangling index entries.
pub(crate) fn load_each<T, R>(table: &R, ids: &[String]) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<&'static str, &'static [u8]>,
{
    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        match get_json(table, id)? {
            Some(record) => records.push(record),
            None => tracing::warn!(id = %id, "Index entry points at a missing record"),
        }
    }
    Ok(records)
}

// =============================================================================
// GraphStore
// =============================================================================

/// Embedded ACID store for the application graph.
///
/// Every multi-record flow runs inside a single redb write transaction via
/// [`GraphStore::write`]; an error from the closure aborts the transaction
/// and nothing is persisted.
pub struct GraphStore {
    db: Database,
    stats_cache: StatsCache,
}

impl GraphStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::init(Database::create(path)?)
    }

    /// Volatile database held entirely in memory.
    pub fn in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    pub fn from_location(location: &StorageLocation) -> StoreResult<Self> {
        match location {
            StorageLocation::InMemory => Self::in_memory(),
            StorageLocation::File(path) => Self::open(path),
        }
    }

    fn init(db: Database) -> StoreResult<Self> {
        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CLUSTERS)?;
            let _ = write_txn.open_table(MINTS)?;
            let _ = write_txn.open_table(APPS)?;
            let _ = write_txn.open_table(APP_ENVS)?;
            let _ = write_txn.open_table(APP_MINTS)?;
            let _ = write_txn.open_table(APP_TRANSACTIONS)?;
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(MINT_INDEX)?;
            let _ = write_txn.open_table(APP_ENV_INDEX)?;
            let _ = write_txn.open_table(APP_MINT_INDEX)?;
            let _ = write_txn.open_table(ENV_TX_INDEX)?;
            let _ = write_txn.open_table(USER_APPS)?;
            let _ = write_txn.open_table(APP_KEYS)?;
            let _ = write_txn.open_table(APP_USERS)?;
            let _ = write_txn.open_table(USERNAMES)?;
        }
        write_txn.commit()?;

        Ok(Self {
            db,
            stats_cache: StatsCache::default(),
        })
    }

    /// Verify a read transaction can be opened against the schema.
    pub fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(CLUSTERS)?;
        Ok(())
    }

    /// Run `f` in a read transaction (consistent snapshot).
    pub(crate) fn read<T>(
        &self,
        f: impl FnOnce(&ReadTransaction) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let read_txn = self.db.begin_read()?;
        f(&read_txn)
    }

    /// Run `f` in a write transaction, committing only if it succeeds.
    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&WriteTransaction) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let write_txn = self.db.begin_write()?;
        match f(&write_txn) {
            Ok(value) => {
                write_txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                write_txn.abort()?;
                Err(err)
            }
        }
    }

    pub(crate) fn stats_cache(&self) -> &StatsCache {
        &self.stats_cache
    }
}
