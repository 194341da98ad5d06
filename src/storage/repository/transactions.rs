// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AppTransaction repository.
//!
//! Transactions are written by the transfer pipeline and only read through
//! the operation endpoint. `env_tx_index` keys embed an inverted creation
//! timestamp so a forward scan yields the newest transaction first.

use chrono::Utc;
use redb::ReadableTable;

use crate::models::{AppEnv, AppEnvStats, AppTransaction, AppTransactionStatus};
use crate::storage::database::{
    index_key, load_each, newest_first, put_json, require_json, scan_ids, APP_ENVS,
    APP_TRANSACTIONS, ENV_TX_INDEX,
};
use crate::storage::{GraphStore, StoreError, StoreResult};

pub struct TransactionRepository<'a> {
    store: &'a GraphStore,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Store a new transaction for an existing environment.
    pub fn record(&self, tx: &AppTransaction) -> StoreResult<()> {
        self.store.write(|txn| {
            require_json::<AppEnv, _>(&txn.open_table(APP_ENVS)?, "AppEnv", &tx.app_env_id)?;

            let mut table = txn.open_table(APP_TRANSACTIONS)?;
            if table.get(tx.id.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!(
                    "AppTransaction {} already exists",
                    tx.id
                )));
            }
            put_json(&mut table, &tx.id, tx)?;

            let key = index_key(&[
                tx.app_env_id.as_bytes(),
                &newest_first(tx.created_at),
                tx.id.as_bytes(),
            ]);
            txn.open_table(ENV_TX_INDEX)?
                .insert(key.as_slice(), tx.id.as_str())?;
            Ok(())
        })?;
        self.store.stats_cache().invalidate(&tx.app_env_id);
        tracing::debug!(tx_id = %tx.id, app_env_id = %tx.app_env_id, "AppTransaction recorded");
        Ok(())
    }

    /// Replace a stored transaction. The environment and creation time of
    /// the stored record are kept.
    pub fn update(&self, tx: &AppTransaction) -> StoreResult<AppTransaction> {
        let updated = self.store.write(|txn| {
            let mut table = txn.open_table(APP_TRANSACTIONS)?;
            let existing: AppTransaction = require_json(&table, "AppTransaction", &tx.id)?;

            let mut updated = tx.clone();
            updated.app_env_id = existing.app_env_id;
            updated.created_at = existing.created_at;
            updated.updated_at = Utc::now();
            put_json(&mut table, &updated.id, &updated)?;
            Ok(updated)
        })?;
        self.store.stats_cache().invalidate(&updated.app_env_id);
        tracing::debug!(
            tx_id = %updated.id,
            status = updated.status.as_str(),
            "AppTransaction updated"
        );
        Ok(updated)
    }

    pub fn get(&self, tx_id: &str) -> StoreResult<AppTransaction> {
        self.store
            .read(|txn| require_json(&txn.open_table(APP_TRANSACTIONS)?, "AppTransaction", tx_id))
    }

    /// Transactions of an environment, newest first.
    pub fn list_for_env(&self, app_env_id: &str) -> StoreResult<Vec<AppTransaction>> {
        self.store.read(|txn| {
            let ids = scan_ids(&txn.open_table(ENV_TX_INDEX)?, app_env_id)?;
            load_each(&txn.open_table(APP_TRANSACTIONS)?, &ids)
        })
    }

    /// Counters over the environment's transactions, one entry per status.
    pub fn stats(&self, app_env_id: &str) -> StoreResult<AppEnvStats> {
        let cache = self.store.stats_cache();
        if let Some(stats) = cache.get(app_env_id) {
            return Ok(stats);
        }

        // Taken before the snapshot so a write committing mid-read voids the fill.
        let generation = cache.generation();
        let mut stats = AppEnvStats::default();
        for status in AppTransactionStatus::ALL {
            stats
                .transaction_count_by_status
                .insert(status.as_str().to_string(), 0);
        }
        for tx in self.list_for_env(app_env_id)? {
            stats.transaction_count += 1;
            *stats
                .transaction_count_by_status
                .entry(tx.status.as_str().to_string())
                .or_insert(0) += 1;
        }

        cache.put(app_env_id, stats.clone(), generation);
        Ok(stats)
    }
}
