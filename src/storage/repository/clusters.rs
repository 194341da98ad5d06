// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cluster repository.
//!
//! Clusters are seeded at startup and only read afterwards.

use redb::WriteTransaction;

use crate::models::{Cluster, ClusterStatus};
use crate::storage::database::{all_json, get_json, put_json, require_json, CLUSTERS};
use crate::storage::{GraphStore, StoreError, StoreResult};

pub struct ClusterRepository<'a> {
    store: &'a GraphStore,
}

impl<'a> ClusterRepository<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    pub fn get(&self, cluster_id: &str) -> StoreResult<Cluster> {
        self.store
            .read(|txn| require_json(&txn.open_table(CLUSTERS)?, "Cluster", cluster_id))
    }

    /// Every cluster, ordered by id.
    pub fn list(&self) -> StoreResult<Vec<Cluster>> {
        // Keys are the ids, so table order is id order.
        self.store
            .read(|txn| all_json(&txn.open_table(CLUSTERS)?))
    }

    pub fn list_active(&self) -> StoreResult<Vec<Cluster>> {
        let mut clusters = self.list()?;
        clusters.retain(|c| c.status == ClusterStatus::Active);
        Ok(clusters)
    }

    /// Insert the cluster unless one with the same id exists.
    ///
    /// Returns `true` when a new record was written.
    pub fn insert_if_absent(&self, cluster: &Cluster) -> StoreResult<bool> {
        self.store.write(|txn| {
            let mut table = txn.open_table(CLUSTERS)?;
            if get_json::<Cluster, _>(&table, &cluster.id)?.is_some() {
                return Ok(false);
            }
            put_json(&mut table, &cluster.id, cluster)?;
            Ok(true)
        })
    }
}

/// Load a cluster inside a write flow.
pub(crate) fn cluster_in(txn: &WriteTransaction, cluster_id: &str) -> StoreResult<Cluster> {
    require_json(&txn.open_table(CLUSTERS)?, "Cluster", cluster_id)
}

/// Load a cluster that new environments may bind to.
pub(crate) fn active_cluster_in(txn: &WriteTransaction, cluster_id: &str) -> StoreResult<Cluster> {
    let cluster = cluster_in(txn, cluster_id)?;
    if cluster.status != ClusterStatus::Active {
        return Err(StoreError::Invalid(format!(
            "Cluster {cluster_id} is not active"
        )));
    }
    Ok(cluster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClusterType;
    use chrono::Utc;

    fn cluster(id: &str, status: ClusterStatus) -> Cluster {
        Cluster {
            id: id.to_string(),
            name: format!("Cluster {id}"),
            cluster_type: ClusterType::Custom,
            status,
            endpoint_public: "http://localhost:8899".to_string(),
            explorer: "https://explorer.solana.com".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_if_absent_is_idempotent() {
        let store = GraphStore::in_memory().unwrap();
        let repo = ClusterRepository::new(&store);

        assert!(repo.insert_if_absent(&cluster("c1", ClusterStatus::Active)).unwrap());
        assert!(!repo.insert_if_absent(&cluster("c1", ClusterStatus::Inactive)).unwrap());

        let loaded = repo.get("c1").unwrap();
        assert_eq!(loaded.status, ClusterStatus::Active);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let store = GraphStore::in_memory().unwrap();
        let repo = ClusterRepository::new(&store);
        assert!(matches!(
            repo.get("missing"),
            Err(StoreError::NotFound { entity: "Cluster", .. })
        ));
    }

    #[test]
    fn list_active_filters_inactive() {
        let store = GraphStore::in_memory().unwrap();
        let repo = ClusterRepository::new(&store);
        repo.insert_if_absent(&cluster("b", ClusterStatus::Active)).unwrap();
        repo.insert_if_absent(&cluster("a", ClusterStatus::Inactive)).unwrap();
        repo.insert_if_absent(&cluster("c", ClusterStatus::Active)).unwrap();

        let all: Vec<String> = repo.list().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(all, vec!["a", "b", "c"]);

        let active: Vec<String> = repo
            .list_active()
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(active, vec!["b", "c"]);
    }

    #[test]
    fn inactive_cluster_rejected_for_new_envs() {
        let store = GraphStore::in_memory().unwrap();
        let repo = ClusterRepository::new(&store);
        repo.insert_if_absent(&cluster("off", ClusterStatus::Inactive)).unwrap();

        let result = store.write(|txn| active_cluster_in(txn, "off"));
        assert!(matches!(result, Err(StoreError::Invalid(_))));
    }
}
