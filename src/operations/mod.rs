// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Operation Registry
//!
//! Every named operation the endpoint accepts is declared once in
//! [`OPERATIONS`]: its kind, the access level the gate enforces, the root
//! field its result is returned under, and the resolver.
//!
//! ## Dispatch
//!
//! 1. Look up the operation by name (unknown → `BAD_REQUEST`)
//! 2. [`authorize`] against the declared [`Access`] (before any variable is read)
//! 3. Run the resolver with an explicit [`OperationCtx`]
//! 4. Wrap the result as `{ <rootField>: result }`

use serde::Serialize;
use serde_json::{Map, Value};

use crate::auth::{authorize, Access, AuthenticatedUser, RequestContext};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::GraphStore;

pub mod mutations;
pub mod queries;
mod scope;
mod variables;
mod views;

pub use variables::Variables;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// Everything a resolver may use. There is no ambient request state.
pub struct OperationCtx<'a> {
    pub state: &'a AppState,
    pub caller: Option<&'a AuthenticatedUser>,
}

impl OperationCtx<'_> {
    pub fn store(&self) -> &GraphStore {
        &self.state.store
    }

    /// The authenticated caller; gated operations always have one.
    pub fn caller(&self) -> Result<&AuthenticatedUser, ApiError> {
        self.caller.ok_or_else(ApiError::unauthorized)
    }
}

pub type Resolver = fn(&OperationCtx<'_>, &Variables) -> Result<Value, ApiError>;

pub struct OperationDef {
    pub name: &'static str,
    pub kind: OperationKind,
    pub access: Access,
    pub root_field: &'static str,
    pub resolver: Resolver,
}

macro_rules! operation {
    ($name:literal, $kind:ident, $access:ident, $root:literal, $resolver:path) => {
        OperationDef {
            name: $name,
            kind: OperationKind::$kind,
            access: Access::$access,
            root_field: $root,
            resolver: $resolver,
        }
    };
}

pub static OPERATIONS: &[OperationDef] = &[
    operation!("Login", Mutation, Public, "login", mutations::login),
    operation!("Me", Query, Session, "me", queries::me),
    // Clusters
    operation!("UserCluster", Query, Session, "item", queries::user_cluster),
    operation!("UserClusters", Query, Session, "items", queries::user_clusters),
    operation!("AdminClusters", Query, Admin, "items", queries::admin_clusters),
    // Apps
    operation!("UserApps", Query, Session, "items", queries::user_apps),
    operation!("UserApp", Query, Session, "item", queries::user_app),
    operation!("AdminApps", Query, Admin, "items", queries::admin_apps),
    operation!("AdminApp", Query, Admin, "item", queries::admin_app),
    operation!("AdminCreateApp", Mutation, Admin, "created", mutations::admin_create_app),
    operation!("UserUpdateApp", Mutation, Session, "updated", mutations::user_update_app),
    operation!("UserAppUserAdd", Mutation, Session, "item", mutations::user_app_user_add),
    // Environments
    operation!("UserAppEnv", Query, Session, "item", queries::user_app_env),
    operation!("UserAppEnvStats", Query, Session, "stats", queries::user_app_env_stats),
    operation!("UserCreateAppEnv", Mutation, Session, "created", mutations::user_create_app_env),
    // Mints
    operation!("AdminMintCreate", Mutation, Admin, "adminMintCreate", mutations::admin_mint_create),
    operation!("UserAppEnvMintAdd", Mutation, Session, "item", mutations::user_app_env_mint_add),
    operation!("UserUpdateAppMint", Mutation, Session, "updated", mutations::user_update_app_mint),
    // Transactions
    operation!("UserAppTransactions", Query, Session, "items", queries::user_app_transactions),
    operation!("UserAppTransaction", Query, Session, "item", queries::user_app_transaction),
    // Users
    operation!("AdminCreateUser", Mutation, Admin, "created", mutations::admin_create_user),
];

pub fn find(name: &str) -> Option<&'static OperationDef> {
    OPERATIONS.iter().find(|op| op.name == name)
}

/// Run a named operation for the caller in `ctx`, returning the `data`
/// object.
pub fn execute(
    state: &AppState,
    ctx: &RequestContext,
    operation_name: &str,
    variables: &Variables,
) -> Result<Value, ApiError> {
    let op = find(operation_name)
        .ok_or_else(|| ApiError::bad_request(format!("Unknown operation {operation_name}")))?;
    let caller = authorize(ctx, op.access)?;

    tracing::debug!(
        operation = op.name,
        kind = ?op.kind,
        user_id = caller.map(|u| u.user_id.as_str()).unwrap_or("-"),
        "Dispatching operation"
    );

    let op_ctx = OperationCtx { state, caller };
    let result = (op.resolver)(&op_ctx, variables)?;

    let mut data = Map::new();
    data.insert(op.root_field.to_string(), result);
    Ok(Value::Object(data))
}

/// Serialize a resolver result.
pub(crate) fn respond<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!(error = %e, "Failed to serialize operation result");
        ApiError::internal()
    })
}
