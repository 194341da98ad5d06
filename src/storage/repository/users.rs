// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User account repository.
//!
//! Usernames are stored in normalized form and are unique through the
//! `usernames` table. The password tag never leaves this module's record
//! type; callers receive [`User`].

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::Role;
use crate::models::User;
use crate::storage::database::{get_json, put_json, require_json, USERNAMES, USERS};
use crate::storage::{GraphStore, StoreError, StoreResult};
use crate::validation::normalize_username;

/// Persisted account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        Self {
            id: stored.id,
            username: stored.username,
            name: stored.name,
            role: stored.role,
            created_at: stored.created_at,
        }
    }
}

fn hash(password: &str) -> StoreResult<String> {
    hash_password(password).map_err(|e| StoreError::PasswordHash(e.to_string()))
}

pub struct UserRepository<'a> {
    store: &'a GraphStore,
}

impl<'a> UserRepository<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    pub fn get(&self, user_id: &str) -> StoreResult<User> {
        let stored: StoredUser = self
            .store
            .read(|txn| require_json(&txn.open_table(USERS)?, "User", user_id))?;
        Ok(stored.into())
    }

    pub fn find_by_username(&self, username: &str) -> StoreResult<Option<StoredUser>> {
        let username = normalize_username(username);
        self.store.read(|txn| {
            let user_id = match txn.open_table(USERNAMES)?.get(username.as_str())? {
                Some(id) => id.value().to_string(),
                None => return Ok(None),
            };
            get_json(&txn.open_table(USERS)?, &user_id)
        })
    }


    /// Create an account. Duplicate usernames are a `Conflict`.
    pub fn create(
        &self,
        username: &str,
        password: &str,
        name: Option<String>,
        role: Role,
    ) -> StoreResult<User> {
        let username = normalize_username(username);
        if username.is_empty() {
            return Err(StoreError::Invalid("username must not be empty".into()));
        }
        let stored = StoredUser {
            id: Uuid::new_v4().to_string(),
            username,
            name,
            role,
            password_hash: hash(password)?,
            created_at: Utc::now(),
        };

        self.store.write(|txn| {
            let mut usernames = txn.open_table(USERNAMES)?;
            if usernames.get(stored.username.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!(
                    "User {} already exists",
                    stored.username
                )));
            }
            usernames.insert(stored.username.as_str(), stored.id.as_str())?;
            put_json(&mut txn.open_table(USERS)?, &stored.id, &stored)
        })?;

        tracing::info!(user_id = %stored.id, role = %stored.role, "User created");
        Ok(stored.into())
    }

    /// Replace the password hash and role of an existing account.
    pub fn reset_credentials(&self, user_id: &str, password: &str, role: Role) -> StoreResult<()> {
        self.store.write(|txn| {
            let mut users = txn.open_table(USERS)?;
            let mut stored: StoredUser = require_json(&users, "User", user_id)?;
            stored.password_hash = hash(password)?;
            stored.role = role;
            put_json(&mut users, user_id, &stored)
        })
    }

    /// The account matching both username and password, if any.
    pub fn verify_credentials(&self, username: &str, password: &str) -> StoreResult<Option<User>> {
        Ok(self
            .find_by_username(username)?
            .filter(|stored| verify_password(password, &stored.password_hash))
            .map(User::from))
    }
}
