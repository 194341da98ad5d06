// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! App repository and the App creation flow.
//!
//! ## Creation
//!
//! [`AppRepository::create`] runs as one write transaction:
//!
//! 1. the owner account must exist
//! 2. the default cluster must exist and be active
//! 3. `(index, name)` must be unused
//! 4. App, default AppEnv (with the cluster's default mints) and the owner
//!    membership are written together
//!
//! Any failure aborts the transaction, so an App is never visible without
//! its default environment.

use chrono::Utc;
use redb::{ReadableTable, WriteTransaction};
use uuid::Uuid;

use super::app_envs::create_env_in;
use super::clusters::active_cluster_in;
use super::users::StoredUser;
use crate::models::{App, AppCreateInput, AppUpdateInput, AppUser, AppUserRole};
use crate::storage::database::{
    all_json, get_json, index_key, load_each, put_json, require_json, scan_ids, scan_json, APPS,
    APP_KEYS, APP_USERS, USERS, USER_APPS,
};
use crate::storage::{GraphStore, StoreError, StoreResult};

/// Uniqueness key of an App.
fn app_key(index: i32, name: &str) -> String {
    format!("{index}|{name}")
}

pub struct AppRepository<'a> {
    store: &'a GraphStore,
}

impl<'a> AppRepository<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    pub fn get(&self, app_id: &str) -> StoreResult<App> {
        self.store
            .read(|txn| require_json(&txn.open_table(APPS)?, "App", app_id))
    }

    /// Every App, oldest first.
    pub fn list(&self) -> StoreResult<Vec<App>> {
        let mut apps: Vec<App> = self.store.read(|txn| all_json(&txn.open_table(APPS)?))?;
        apps.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(apps)
    }

    /// Apps the user is a member of, oldest first.
    pub fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<App>> {
        let mut apps: Vec<App> = self.store.read(|txn| {
            let ids = scan_ids(&txn.open_table(USER_APPS)?, user_id)?;
            load_each(&txn.open_table(APPS)?, &ids)
        })?;
        apps.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(apps)
    }

    /// Create an App with its default environment on `default_cluster_id`
    /// and `owner_id` as its Owner.
    pub fn create(
        &self,
        input: &AppCreateInput,
        owner_id: &str,
        default_cluster_id: &str,
    ) -> StoreResult<App> {
        let name = input.name.trim().to_string();
        let (app, env_id) = self.store.write(|txn| {
            require_json::<StoredUser, _>(&txn.open_table(USERS)?, "User", owner_id)?;
            let cluster = active_cluster_in(txn, default_cluster_id)?;

            let now = Utc::now();
            let app = App {
                id: Uuid::new_v4().to_string(),
                index: input.index,
                name: name.clone(),
                webhook_accept_incoming: false,
                webhook_event_enabled: false,
                webhook_event_url: None,
                webhook_secret: None,
                webhook_verify_enabled: false,
                webhook_verify_url: None,
                created_at: now,
                updated_at: now,
            };

            {
                let key = app_key(app.index, &app.name);
                let mut keys = txn.open_table(APP_KEYS)?;
                if keys.get(key.as_str())?.is_some() {
                    return Err(StoreError::Conflict(format!(
                        "App with index {} and name {} already exists",
                        app.index, app.name
                    )));
                }
                keys.insert(key.as_str(), app.id.as_str())?;
                put_json(&mut txn.open_table(APPS)?, &app.id, &app)?;
            }

            let env = create_env_in(txn, &app.id, &cluster, None)?;
            add_member_in(txn, &app.id, owner_id, AppUserRole::Owner)?;
            Ok((app, env.id))
        })?;

        tracing::info!(
            app_id = %app.id,
            index = app.index,
            owner_id = %owner_id,
            default_env_id = %env_id,
            "App created"
        );
        Ok(app)
    }

    /// Apply a partial update. Renaming keeps `(index, name)` unique.
    pub fn update(&self, app_id: &str, input: &AppUpdateInput) -> StoreResult<App> {
        self.store.write(|txn| {
            let mut apps = txn.open_table(APPS)?;
            let mut app: App = require_json(&apps, "App", app_id)?;

            if let Some(name) = input.name.as_deref().map(str::trim) {
                if name != app.name {
                    let mut keys = txn.open_table(APP_KEYS)?;
                    let new_key = app_key(app.index, name);
                    if keys.get(new_key.as_str())?.is_some() {
                        return Err(StoreError::Conflict(format!(
                            "App with index {} and name {name} already exists",
                            app.index
                        )));
                    }
                    keys.remove(app_key(app.index, &app.name).as_str())?;
                    keys.insert(new_key.as_str(), app.id.as_str())?;
                    app.name = name.to_string();
                }
            }
            if let Some(value) = input.webhook_accept_incoming {
                app.webhook_accept_incoming = value;
            }
            if let Some(value) = input.webhook_event_enabled {
                app.webhook_event_enabled = value;
            }
            if let Some(value) = &input.webhook_event_url {
                app.webhook_event_url = Some(value.trim().to_string());
            }
            if let Some(value) = &input.webhook_secret {
                app.webhook_secret = Some(value.clone());
            }
            if let Some(value) = input.webhook_verify_enabled {
                app.webhook_verify_enabled = value;
            }
            if let Some(value) = &input.webhook_verify_url {
                app.webhook_verify_url = Some(value.trim().to_string());
            }
            app.updated_at = Utc::now();

            put_json(&mut apps, app_id, &app)?;
            Ok(app)
        })
    }

    /// Members of an App, in user id order.
    pub fn members(&self, app_id: &str) -> StoreResult<Vec<AppUser>> {
        self.store
            .read(|txn| scan_json(&txn.open_table(APP_USERS)?, app_id))
    }

    pub fn membership(&self, app_id: &str, user_id: &str) -> StoreResult<Option<AppUser>> {
        let key = index_key(&[app_id.as_bytes(), user_id.as_bytes()]);
        self.store.read(|txn| {
            match txn.open_table(APP_USERS)?.get(key.as_slice())? {
                Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
                None => Ok(None),
            }
        })
    }

    /// Add an existing user to an existing App.
    pub fn add_member(&self, app_id: &str, user_id: &str, role: AppUserRole) -> StoreResult<AppUser> {
        let member = self.store.write(|txn| {
            app_in(txn, app_id)?;
            if get_json::<StoredUser, _>(&txn.open_table(USERS)?, user_id)?.is_none() {
                return Err(StoreError::not_found("User", user_id));
            }
            add_member_in(txn, app_id, user_id, role)
        })?;
        tracing::info!(app_id = %app_id, user_id = %user_id, role = ?role, "App member added");
        Ok(member)
    }
}

/// Load an App inside a write flow.
pub(crate) fn app_in(txn: &WriteTransaction, app_id: &str) -> StoreResult<App> {
    require_json(&txn.open_table(APPS)?, "App", app_id)
}

fn add_member_in(
    txn: &WriteTransaction,
    app_id: &str,
    user_id: &str,
    role: AppUserRole,
) -> StoreResult<AppUser> {
    let key = index_key(&[app_id.as_bytes(), user_id.as_bytes()]);
    let mut app_users = txn.open_table(APP_USERS)?;
    if app_users.get(key.as_slice())?.is_some() {
        return Err(StoreError::Conflict(format!(
            "User {user_id} is already a member of App {app_id}"
        )));
    }
    let member = AppUser {
        app_id: app_id.to_string(),
        user_id: user_id.to_string(),
        role,
        created_at: Utc::now(),
    };
    let json = serde_json::to_vec(&member)?;
    app_users.insert(key.as_slice(), json.as_slice())?;

    let reverse = index_key(&[user_id.as_bytes(), app_id.as_bytes()]);
    txn.open_table(USER_APPS)?
        .insert(reverse.as_slice(), app_id)?;
    Ok(member)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::models::{Cluster, ClusterStatus, ClusterType, MintCreateInput};
    use crate::storage::repository::{
        AppEnvRepository, ClusterRepository, MintRepository, UserRepository,
    };

    struct Fixture {
        store: GraphStore,
        owner_id: String,
    }

    fn fixture() -> Fixture {
        let store = GraphStore::in_memory().unwrap();
        ClusterRepository::new(&store)
            .insert_if_absent(&Cluster {
                id: "solana-devnet".into(),
                name: "Solana Devnet".into(),
                cluster_type: ClusterType::SolanaDevnet,
                status: ClusterStatus::Active,
                endpoint_public: "https://api.devnet.solana.com".into(),
                explorer: "https://explorer.solana.com?cluster=devnet".into(),
                created_at: Utc::now(),
            })
            .unwrap();
        MintRepository::new(&store)
            .create(
                &MintCreateInput {
                    address: "MoGaMuJnB3k8zXjBYBnHxHG47vWcW3nyb7bFYvdVzek".into(),
                    cluster_id: "solana-devnet".into(),
                    decimals: 5,
                    name: "Mogami".into(),
                    symbol: "MOG".into(),
                    logo_url: None,
                    coin_gecko_id: None,
                },
                true,
            )
            .unwrap();
        let owner = UserRepository::new(&store)
            .create("owner", "password", None, Role::Admin)
            .unwrap();
        Fixture {
            store,
            owner_id: owner.id,
        }
    }

    fn input(index: i32, name: &str) -> AppCreateInput {
        AppCreateInput {
            index,
            name: name.to_string(),
            owner_id: None,
        }
    }

    #[test]
    fn create_provisions_default_env_owner_and_default_mints() {
        let f = fixture();
        let repo = AppRepository::new(&f.store);

        let app = repo
            .create(&input(1, "My App"), &f.owner_id, "solana-devnet")
            .unwrap();

        let envs = AppEnvRepository::new(&f.store).list_for_app(&app.id).unwrap();
        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].name, "Solana Devnet");
        assert_eq!(envs[0].cluster_id, "solana-devnet");

        let app_mints = AppEnvRepository::new(&f.store).mints(&envs[0].id).unwrap();
        assert_eq!(app_mints.len(), 1);

        let members = repo.members(&app.id).unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].role, AppUserRole::Owner);
        assert_eq!(repo.list_for_user(&f.owner_id).unwrap()[0].id, app.id);
    }

    #[test]
    fn duplicate_index_and_name_conflicts_without_partial_writes() {
        let f = fixture();
        let repo = AppRepository::new(&f.store);

        repo.create(&input(1, "dup"), &f.owner_id, "solana-devnet")
            .unwrap();
        let result = repo.create(&input(1, "dup"), &f.owner_id, "solana-devnet");
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(repo.list().unwrap().len(), 1);

        // Same name under another index is a different App.
        repo.create(&input(2, "dup"), &f.owner_id, "solana-devnet")
            .unwrap();
        assert_eq!(repo.list().unwrap().len(), 2);
    }

    #[test]
    fn create_with_unknown_owner_or_cluster_writes_nothing() {
        let f = fixture();
        let repo = AppRepository::new(&f.store);

        assert!(matches!(
            repo.create(&input(1, "a"), "ghost", "solana-devnet"),
            Err(StoreError::NotFound { entity: "User", .. })
        ));
        assert!(matches!(
            repo.create(&input(1, "a"), &f.owner_id, "solana-nowhere"),
            Err(StoreError::NotFound { entity: "Cluster", .. })
        ));
        assert!(repo.list().unwrap().is_empty());

        // The key was never claimed.
        repo.create(&input(1, "a"), &f.owner_id, "solana-devnet")
            .unwrap();
    }

    #[test]
    fn update_patches_and_renames() {
        let f = fixture();
        let repo = AppRepository::new(&f.store);
        let app = repo
            .create(&input(3, "before"), &f.owner_id, "solana-devnet")
            .unwrap();
        repo.create(&input(3, "taken"), &f.owner_id, "solana-devnet")
            .unwrap();

        let updated = repo
            .update(
                &app.id,
                &AppUpdateInput {
                    name: Some("after".into()),
                    webhook_event_enabled: Some(true),
                    webhook_event_url: Some("https://example.com/hook".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "after");
        assert!(updated.webhook_event_enabled);
        assert_eq!(updated.webhook_event_url.as_deref(), Some("https://example.com/hook"));
        assert!(!updated.webhook_verify_enabled);

        let clash = repo.update(
            &app.id,
            &AppUpdateInput {
                name: Some("taken".into()),
                ..Default::default()
            },
        );
        assert!(matches!(clash, Err(StoreError::Conflict(_))));

        // The old name is free again.
        repo.create(&input(3, "before"), &f.owner_id, "solana-devnet")
            .unwrap();
    }

    #[test]
    fn add_member_and_membership() {
        let f = fixture();
        let repo = AppRepository::new(&f.store);
        let app = repo
            .create(&input(1, "team"), &f.owner_id, "solana-devnet")
            .unwrap();
        let member = UserRepository::new(&f.store)
            .create("member", "password", None, Role::User)
            .unwrap();

        assert!(repo.membership(&app.id, &member.id).unwrap().is_none());
        repo.add_member(&app.id, &member.id, AppUserRole::Member)
            .unwrap();
        let found = repo.membership(&app.id, &member.id).unwrap().unwrap();
        assert_eq!(found.role, AppUserRole::Member);

        assert!(matches!(
            repo.add_member(&app.id, &member.id, AppUserRole::Owner),
            Err(StoreError::Conflict(_))
        ));
        assert!(matches!(
            repo.add_member(&app.id, "ghost", AppUserRole::Member),
            Err(StoreError::NotFound { entity: "User", .. })
        ));
        assert_eq!(repo.members(&app.id).unwrap().len(), 2);
    }
}
