// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mint repository.
//!
//! A mint's address is unique within its cluster. The `mint_index` table
//! (`cluster_id|address` → mint_id) enforces that and lists a cluster's
//! mints in one range scan.

use chrono::Utc;
use redb::{ReadableTable, WriteTransaction};
use uuid::Uuid;

use super::clusters::cluster_in;
use crate::models::{Mint, MintCreateInput};
use crate::storage::database::{
    index_key, load_each, put_json, require_json, scan_ids, MINTS, MINT_INDEX,
};
use crate::storage::{GraphStore, StoreError, StoreResult};

pub struct MintRepository<'a> {
    store: &'a GraphStore,
}

impl<'a> MintRepository<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    pub fn get(&self, mint_id: &str) -> StoreResult<Mint> {
        self.store
            .read(|txn| require_json(&txn.open_table(MINTS)?, "Mint", mint_id))
    }

    /// Create a mint on an existing cluster. The input must already be
    /// validated; `decimals` is range-checked there.
    pub fn create(&self, input: &MintCreateInput, is_default: bool) -> StoreResult<Mint> {
        let mint = self.store.write(|txn| create_mint_in(txn, input, is_default))?;
        tracing::info!(
            mint_id = %mint.id,
            cluster_id = %mint.cluster_id,
            address = %mint.address,
            "Mint created"
        );
        Ok(mint)
    }

    /// Mints of a cluster ordered by `order`.
    pub fn list_by_cluster(&self, cluster_id: &str) -> StoreResult<Vec<Mint>> {
        self.store.read(|txn| {
            let ids = scan_ids(&txn.open_table(MINT_INDEX)?, cluster_id)?;
            let mut mints: Vec<Mint> = load_each(&txn.open_table(MINTS)?, &ids)?;
            mints.sort_by_key(|m| m.order);
            Ok(mints)
        })
    }

    pub fn find_by_address(&self, cluster_id: &str, address: &str) -> StoreResult<Option<Mint>> {
        Ok(self
            .list_by_cluster(cluster_id)?
            .into_iter()
            .find(|m| m.address == address))
    }
}

pub(crate) fn create_mint_in(
    txn: &WriteTransaction,
    input: &MintCreateInput,
    is_default: bool,
) -> StoreResult<Mint> {
    let cluster = cluster_in(txn, &input.cluster_id)?;
    let decimals = u8::try_from(input.decimals)
        .map_err(|_| StoreError::Invalid("decimals must be a non-negative integer".into()))?;

    let key = index_key(&[cluster.id.as_bytes(), input.address.as_bytes()]);
    let mut index = txn.open_table(MINT_INDEX)?;
    if index.get(key.as_slice())?.is_some() {
        return Err(StoreError::Conflict(format!(
            "Mint {} already exists on cluster {}",
            input.address, cluster.id
        )));
    }
    let order = u32::try_from(scan_ids(&index, &cluster.id)?.len()).unwrap_or(u32::MAX);

    let mint = Mint {
        id: Uuid::new_v4().to_string(),
        address: input.address.clone(),
        cluster_id: cluster.id,
        decimals,
        name: input.name.trim().to_string(),
        symbol: input.symbol.trim().to_string(),
        logo_url: input.logo_url.clone(),
        coin_gecko_id: input.coin_gecko_id.clone(),
        is_default,
        order,
        created_at: Utc::now(),
    };

    index.insert(key.as_slice(), mint.id.as_str())?;
    let mut mints = txn.open_table(MINTS)?;
    put_json(&mut mints, &mint.id, &mint)?;
    Ok(mint)
}

/// Default mints of a cluster, ordered by `order`.
pub(crate) fn default_mints_in(txn: &WriteTransaction, cluster_id: &str) -> StoreResult<Vec<Mint>> {
    let ids = scan_ids(&txn.open_table(MINT_INDEX)?, cluster_id)?;
    let mut mints: Vec<Mint> = load_each(&txn.open_table(MINTS)?, &ids)?;
    mints.retain(|m| m.is_default);
    mints.sort_by_key(|m| m.order);
    Ok(mints)
}
