// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AppEnv and AppMint repository.
//!
//! ## Ordering
//!
//! `app_env_index` keys carry a big-endian creation sequence, so an App's
//! environments come back in creation order and the environment provisioned
//! with the App is always first. AppMints are listed by their `order` field.

use chrono::Utc;
use redb::{ReadableTable, WriteTransaction};
use uuid::Uuid;

use super::apps::app_in;
use super::clusters::active_cluster_in;
use super::mints::default_mints_in;
use crate::models::{AppEnv, AppMint, AppMintUpdateInput, Cluster, Mint};
use crate::storage::database::{
    index_key, load_each, put_json, require_json, scan_ids, APP_ENVS, APP_ENV_INDEX, APP_MINTS,
    APP_MINT_INDEX, MINTS,
};
use crate::storage::{GraphStore, StoreError, StoreResult};

pub struct AppEnvRepository<'a> {
    store: &'a GraphStore,
}

impl<'a> AppEnvRepository<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    pub fn get(&self, app_env_id: &str) -> StoreResult<AppEnv> {
        self.store
            .read(|txn| require_json(&txn.open_table(APP_ENVS)?, "AppEnv", app_env_id))
    }

    /// Environments of an App in creation order.
    pub fn list_for_app(&self, app_id: &str) -> StoreResult<Vec<AppEnv>> {
        self.store.read(|txn| {
            let ids = scan_ids(&txn.open_table(APP_ENV_INDEX)?, app_id)?;
            load_each(&txn.open_table(APP_ENVS)?, &ids)
        })
    }

    /// Bind an existing App to an active Cluster.
    ///
    /// `name` defaults to the cluster's display name. The cluster's default
    /// mints are attached in the same transaction.
    pub fn create(&self, app_id: &str, cluster_id: &str, name: Option<&str>) -> StoreResult<AppEnv> {
        let env = self.store.write(|txn| {
            app_in(txn, app_id)?;
            let cluster = active_cluster_in(txn, cluster_id)?;
            create_env_in(txn, app_id, &cluster, name)
        })?;
        tracing::info!(
            app_env_id = %env.id,
            app_id = %env.app_id,
            cluster_id = %env.cluster_id,
            "AppEnv created"
        );
        Ok(env)
    }

    /// Attach a mint to an environment. The mint must live on the
    /// environment's cluster and may only be attached once.
    pub fn add_mint(&self, app_env_id: &str, mint_id: &str) -> StoreResult<AppMint> {
        let app_mint = self.store.write(|txn| {
            let env: AppEnv = require_json(&txn.open_table(APP_ENVS)?, "AppEnv", app_env_id)?;
            let mint: Mint = require_json(&txn.open_table(MINTS)?, "Mint", mint_id)?;
            if mint.cluster_id != env.cluster_id {
                return Err(StoreError::Invalid(format!(
                    "Mint {mint_id} is not on cluster {}",
                    env.cluster_id
                )));
            }
            attach_mint_in(txn, &env, &mint)
        })?;
        tracing::info!(
            app_mint_id = %app_mint.id,
            app_env_id = %app_env_id,
            mint_id = %mint_id,
            "Mint added to AppEnv"
        );
        Ok(app_mint)
    }

    /// AppMints of an environment ordered by `order`.
    pub fn mints(&self, app_env_id: &str) -> StoreResult<Vec<AppMint>> {
        self.store.read(|txn| {
            let ids = scan_ids(&txn.open_table(APP_MINT_INDEX)?, app_env_id)?;
            let mut app_mints: Vec<AppMint> = load_each(&txn.open_table(APP_MINTS)?, &ids)?;
            app_mints.sort_by_key(|m| m.order);
            Ok(app_mints)
        })
    }

    pub fn get_app_mint(&self, app_mint_id: &str) -> StoreResult<AppMint> {
        self.store
            .read(|txn| require_json(&txn.open_table(APP_MINTS)?, "AppMint", app_mint_id))
    }

    /// Apply a partial patch; absent fields are left untouched.
    pub fn update_app_mint(
        &self,
        app_mint_id: &str,
        input: &AppMintUpdateInput,
    ) -> StoreResult<AppMint> {
        self.store.write(|txn| {
            let mut table = txn.open_table(APP_MINTS)?;
            let mut app_mint: AppMint = require_json(&table, "AppMint", app_mint_id)?;
            if let Some(add_memo) = input.add_memo {
                app_mint.add_memo = add_memo;
            }
            if let Some(order) = input.order {
                app_mint.order = order;
            }
            app_mint.updated_at = Utc::now();
            put_json(&mut table, app_mint_id, &app_mint)?;
            Ok(app_mint)
        })
    }
}

pub(crate) fn create_env_in(
    txn: &WriteTransaction,
    app_id: &str,
    cluster: &Cluster,
    name: Option<&str>,
) -> StoreResult<AppEnv> {
    let now = Utc::now();
    let env = AppEnv {
        id: Uuid::new_v4().to_string(),
        app_id: app_id.to_string(),
        cluster_id: cluster.id.clone(),
        name: name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(cluster.name.as_str())
            .to_string(),
        created_at: now,
        updated_at: now,
    };

    {
        let mut index = txn.open_table(APP_ENV_INDEX)?;
        let sequence = u32::try_from(scan_ids(&index, app_id)?.len()).unwrap_or(u32::MAX);
        let key = index_key(&[
            app_id.as_bytes(),
            &sequence.to_be_bytes(),
            env.id.as_bytes(),
        ]);
        index.insert(key.as_slice(), env.id.as_str())?;
        put_json(&mut txn.open_table(APP_ENVS)?, &env.id, &env)?;
    }

    for mint in default_mints_in(txn, &cluster.id)? {
        attach_mint_in(txn, &env, &mint)?;
    }
    Ok(env)
}

pub(crate) fn attach_mint_in(
    txn: &WriteTransaction,
    env: &AppEnv,
    mint: &Mint,
) -> StoreResult<AppMint> {
    let mut index = txn.open_table(APP_MINT_INDEX)?;
    let key = index_key(&[env.id.as_bytes(), mint.id.as_bytes()]);
    if index.get(key.as_slice())?.is_some() {
        return Err(StoreError::Conflict(format!(
            "Mint {} is already added to AppEnv {}",
            mint.id, env.id
        )));
    }
    let order = u32::try_from(scan_ids(&index, &env.id)?.len()).unwrap_or(u32::MAX);

    let now = Utc::now();
    let app_mint = AppMint {
        id: Uuid::new_v4().to_string(),
        app_env_id: env.id.clone(),
        mint_id: mint.id.clone(),
        add_memo: false,
        order,
        created_at: now,
        updated_at: now,
    };
    index.insert(key.as_slice(), app_mint.id.as_str())?;
    put_json(&mut txn.open_table(APP_MINTS)?, &app_mint.id, &app_mint)?;
    Ok(app_mint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::{AppCreateInput, ClusterStatus, ClusterType, MintCreateInput};
    use crate::storage::repository::{
        AppRepository, ClusterRepository, MintRepository, UserRepository,
    };

    const DEVNET_MINT: &str = "3SaUThdYFoUX2FYUi9ZPf2TKTu3UYKhNHhXb2Y6najRg";

    fn cluster(id: &str, name: &str, status: ClusterStatus) -> Cluster {
        Cluster {
            id: id.into(),
            name: name.into(),
            cluster_type: ClusterType::Custom,
            status,
            endpoint_public: "http://localhost:8899".into(),
            explorer: "https://explorer.solana.com".into(),
            created_at: Utc::now(),
        }
    }

    struct Fixture {
        store: GraphStore,
        app_id: String,
    }

    fn fixture() -> Fixture {
        let store = GraphStore::in_memory().unwrap();
        let clusters = ClusterRepository::new(&store);
        clusters
            .insert_if_absent(&cluster("solana-devnet", "Solana Devnet", ClusterStatus::Active))
            .unwrap();
        clusters
            .insert_if_absent(&cluster("solana-testnet", "Solana Testnet", ClusterStatus::Active))
            .unwrap();
        clusters
            .insert_if_absent(&cluster("retired", "Retired", ClusterStatus::Inactive))
            .unwrap();
        let owner = UserRepository::new(&store)
            .create("owner", "password", None, Role::Admin)
            .unwrap();
        let app = AppRepository::new(&store)
            .create(
                &AppCreateInput {
                    index: 1,
                    name: "fixture".into(),
                    owner_id: None,
                },
                &owner.id,
                "solana-devnet",
            )
            .unwrap();
        Fixture {
            store,
            app_id: app.id,
        }
    }

    fn mint_on(store: &GraphStore, cluster_id: &str, address: &str) -> Mint {
        MintRepository::new(store)
            .create(
                &MintCreateInput {
                    address: address.into(),
                    cluster_id: cluster_id.into(),
                    decimals: 6,
                    name: "Token".into(),
                    symbol: "TOK".into(),
                    logo_url: None,
                    coin_gecko_id: None,
                },
                false,
            )
            .unwrap()
    }

    #[test]
    fn create_binds_app_and_cluster_with_given_name() {
        let f = fixture();
        let repo = AppEnvRepository::new(&f.store);

        let env = repo
            .create(&f.app_id, "solana-testnet", Some("Staging"))
            .unwrap();
        assert_eq!(env.app_id, f.app_id);
        assert_eq!(env.cluster_id, "solana-testnet");
        assert_eq!(env.name, "Staging");

        let envs = repo.list_for_app(&f.app_id).unwrap();
        assert_eq!(envs.len(), 2);
        assert_eq!(envs[0].cluster_id, "solana-devnet");
        assert_eq!(envs[1].id, env.id);
    }

    #[test]
    fn name_defaults_to_cluster_name_and_may_repeat() {
        let f = fixture();
        let repo = AppEnvRepository::new(&f.store);

        let env = repo.create(&f.app_id, "solana-devnet", None).unwrap();
        assert_eq!(env.name, "Solana Devnet");
        let again = repo
            .create(&f.app_id, "solana-devnet", Some("Solana Devnet"))
            .unwrap();
        assert_ne!(env.id, again.id);
    }

    #[test]
    fn create_rejects_unknown_references() {
        let f = fixture();
        let repo = AppEnvRepository::new(&f.store);

        assert!(matches!(
            repo.create("missing-app", "solana-devnet", None),
            Err(StoreError::NotFound { entity: "App", .. })
        ));
        assert!(matches!(
            repo.create(&f.app_id, "missing-cluster", None),
            Err(StoreError::NotFound { entity: "Cluster", .. })
        ));
        assert!(matches!(
            repo.create(&f.app_id, "retired", None),
            Err(StoreError::Invalid(_))
        ));
        assert_eq!(repo.list_for_app(&f.app_id).unwrap().len(), 1);
    }

    #[test]
    fn add_mint_checks_cluster_and_duplicates() {
        let f = fixture();
        let repo = AppEnvRepository::new(&f.store);
        let env = repo.list_for_app(&f.app_id).unwrap().remove(0);

        let mint = mint_on(&f.store, "solana-devnet", DEVNET_MINT);
        let app_mint = repo.add_mint(&env.id, &mint.id).unwrap();
        assert_eq!(app_mint.mint_id, mint.id);
        assert!(!app_mint.add_memo);

        assert!(matches!(
            repo.add_mint(&env.id, &mint.id),
            Err(StoreError::Conflict(_))
        ));

        let other = mint_on(&f.store, "solana-testnet", DEVNET_MINT);
        assert!(matches!(
            repo.add_mint(&env.id, &other.id),
            Err(StoreError::Invalid(_))
        ));
        assert_eq!(repo.mints(&env.id).unwrap().len(), 1);
    }

    #[test]
    fn update_app_mint_patches_present_fields() {
        let f = fixture();
        let repo = AppEnvRepository::new(&f.store);
        let env = repo.list_for_app(&f.app_id).unwrap().remove(0);
        let mint = mint_on(&f.store, "solana-devnet", DEVNET_MINT);
        let app_mint = repo.add_mint(&env.id, &mint.id).unwrap();

        let updated = repo
            .update_app_mint(
                &app_mint.id,
                &AppMintUpdateInput {
                    add_memo: Some(true),
                    order: None,
                },
            )
            .unwrap();
        assert!(updated.add_memo);
        assert_eq!(updated.order, app_mint.order);
        assert_eq!(repo.get_app_mint(&app_mint.id).unwrap(), updated);

        assert!(matches!(
            repo.update_app_mint("missing", &AppMintUpdateInput::default()),
            Err(StoreError::NotFound { entity: "AppMint", .. })
        ));
    }
}
