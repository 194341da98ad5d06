// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup seeding of clusters, the default mint and the admin account.
//!
//! Seeding is idempotent: existing records are left alone, except the admin
//! password and role, which follow the configuration on every start.

use chrono::Utc;

use super::repository::{ClusterRepository, MintRepository, UserRepository};
use super::{GraphStore, StoreResult};
use crate::auth::Role;
use crate::config::{Config, SolanaEndpoint};
use crate::models::{Cluster, ClusterStatus, ClusterType, MintCreateInput};

pub const DEFAULT_MINT_NAME: &str = "Mogami";
pub const DEFAULT_MINT_SYMBOL: &str = "MOG";
pub const DEFAULT_MINT_DECIMALS: i64 = 5;

/// What a seeding run wrote.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub clusters_created: usize,
    pub mint_created: bool,
    pub admin_created: bool,
}

fn cluster(id: &str, name: &str, cluster_type: ClusterType, endpoint: &str, explorer: &str) -> Cluster {
    Cluster {
        id: id.to_string(),
        name: name.to_string(),
        cluster_type,
        status: ClusterStatus::Active,
        endpoint_public: endpoint.to_string(),
        explorer: explorer.to_string(),
        created_at: Utc::now(),
    }
}

/// Clusters known to the service. The custom cluster exists only when the
/// configured RPC endpoint is a custom URL.
pub fn default_clusters(endpoint: &SolanaEndpoint) -> Vec<Cluster> {
    let mut clusters = vec![
        cluster(
            "solana-devnet",
            "Solana Devnet",
            ClusterType::SolanaDevnet,
            &SolanaEndpoint::Devnet.rpc_url(),
            "https://explorer.solana.com?cluster=devnet",
        ),
        cluster(
            "solana-mainnet",
            "Solana Mainnet",
            ClusterType::SolanaMainnet,
            &SolanaEndpoint::MainnetBeta.rpc_url(),
            "https://explorer.solana.com",
        ),
        cluster(
            "solana-testnet",
            "Solana Testnet",
            ClusterType::SolanaTestnet,
            &SolanaEndpoint::Testnet.rpc_url(),
            "https://explorer.solana.com?cluster=testnet",
        ),
    ];
    if let SolanaEndpoint::Custom(url) = endpoint {
        let explorer = format!(
            "https://explorer.solana.com?cluster=custom&customUrl={}",
            url.as_str()
        );
        clusters.push(cluster(
            "solana-custom",
            "Solana Custom",
            ClusterType::Custom,
            url.as_str(),
            &explorer,
        ));
    }
    clusters
}

pub fn seed(store: &GraphStore, config: &Config) -> StoreResult<SeedReport> {
    let mut report = SeedReport::default();

    let clusters = ClusterRepository::new(store);
    for cluster in default_clusters(&config.solana_endpoint) {
        if clusters.insert_if_absent(&cluster)? {
            report.clusters_created += 1;
        }
    }

    let default_cluster_id = config.solana_endpoint.cluster_id();
    let mints = MintRepository::new(store);
    if mints
        .find_by_address(default_cluster_id, &config.mint_public_key)?
        .is_none()
    {
        mints.create(
            &MintCreateInput {
                address: config.mint_public_key.clone(),
                cluster_id: default_cluster_id.to_string(),
                decimals: DEFAULT_MINT_DECIMALS,
                name: DEFAULT_MINT_NAME.to_string(),
                symbol: DEFAULT_MINT_SYMBOL.to_string(),
                logo_url: None,
                coin_gecko_id: None,
            },
            true,
        )?;
        report.mint_created = true;
    }

    let users = UserRepository::new(store);
    match users.find_by_username(&config.admin_username)? {
        Some(existing) => {
            users.reset_credentials(&existing.id, &config.admin_password, Role::Admin)?;
        }
        None => {
            users.create(&config.admin_username, &config.admin_password, None, Role::Admin)?;
            report.admin_created = true;
        }
    }

    tracing::info!(
        clusters_created = report.clusters_created,
        mint_created = report.mint_created,
        admin_created = report.admin_created,
        default_cluster = default_cluster_id,
        "Graph store seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn seed_is_idempotent() {
        let store = GraphStore::in_memory().unwrap();
        let config = Config::ephemeral();

        let first = seed(&store, &config).unwrap();
        assert_eq!(first.clusters_created, 3);
        assert!(first.mint_created);
        assert!(first.admin_created);

        let second = seed(&store, &config).unwrap();
        assert_eq!(second, SeedReport::default());

        let clusters = ClusterRepository::new(&store).list().unwrap();
        assert_eq!(clusters.len(), 3);
        let mints = MintRepository::new(&store)
            .list_by_cluster("solana-devnet")
            .unwrap();
        assert_eq!(mints.len(), 1);
        assert!(mints[0].is_default);
        assert_eq!(mints[0].symbol, "MOG");
        assert_eq!(mints[0].decimals, 5);
    }

    #[test]
    fn admin_password_follows_configuration() {
        let store = GraphStore::in_memory().unwrap();
        let mut config = Config::ephemeral();
        seed(&store, &config).unwrap();

        config.admin_password = "rotated-password".to_string();
        seed(&store, &config).unwrap();

        let users = UserRepository::new(&store);
        assert!(users.verify_credentials("admin", "admin").unwrap().is_none());
        let admin = users
            .verify_credentials("admin", "rotated-password")
            .unwrap()
            .unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn custom_endpoint_adds_custom_cluster() {
        let url = Url::parse("http://localhost:8899").unwrap();
        let clusters = default_clusters(&SolanaEndpoint::Custom(url));
        assert_eq!(clusters.len(), 4);
        let custom = clusters.iter().find(|c| c.id == "solana-custom").unwrap();
        assert_eq!(custom.cluster_type, ClusterType::Custom);
        assert_eq!(custom.endpoint_public, "http://localhost:8899/");
    }
}
