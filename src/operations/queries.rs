// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only operations.

use serde_json::Value;

use super::scope::{env_of, member_app, member_env};
use super::views::{app_env_view, app_view, cluster_view};
use super::{respond, OperationCtx, Variables};
use crate::error::ApiError;
use crate::models::User;
use crate::storage::{AppRepository, ClusterRepository, TransactionRepository, UserRepository};

/// `Me` → the caller's account.
pub fn me(ctx: &OperationCtx<'_>, _vars: &Variables) -> Result<Value, ApiError> {
    let caller = ctx.caller()?;
    // A token can outlive its account.
    let user: User = UserRepository::new(ctx.store())
        .get(&caller.user_id)
        .map_err(|_| ApiError::unauthorized())?;
    respond(user)
}

/// `UserCluster(clusterId)` → the cluster with its mints.
pub fn user_cluster(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let cluster_id = vars.id("clusterId")?;
    let cluster = ClusterRepository::new(ctx.store()).get(&cluster_id)?;
    respond(cluster_view(ctx.store(), cluster)?)
}

/// `UserClusters` → active clusters.
pub fn user_clusters(ctx: &OperationCtx<'_>, _vars: &Variables) -> Result<Value, ApiError> {
    let views = ClusterRepository::new(ctx.store())
        .list_active()?
        .into_iter()
        .map(|cluster| cluster_view(ctx.store(), cluster))
        .collect::<Result<Vec<_>, _>>()?;
    respond(views)
}

/// `AdminClusters` → every cluster regardless of status.
pub fn admin_clusters(ctx: &OperationCtx<'_>, _vars: &Variables) -> Result<Value, ApiError> {
    let views = ClusterRepository::new(ctx.store())
        .list()?
        .into_iter()
        .map(|cluster| cluster_view(ctx.store(), cluster))
        .collect::<Result<Vec<_>, _>>()?;
    respond(views)
}

/// `UserApps` → Apps the caller is a member of.
pub fn user_apps(ctx: &OperationCtx<'_>, _vars: &Variables) -> Result<Value, ApiError> {
    let caller = ctx.caller()?;
    let views = AppRepository::new(ctx.store())
        .list_for_user(&caller.user_id)?
        .into_iter()
        .map(|app| app_view(ctx.store(), app))
        .collect::<Result<Vec<_>, _>>()?;
    respond(views)
}

/// `UserApp(appId)`
pub fn user_app(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = member_app(ctx, &vars.id("appId")?)?;
    respond(app_view(ctx.store(), app)?)
}

/// `UserAppEnv(appId, appEnvId)`
pub fn user_app_env(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = member_app(ctx, &vars.id("appId")?)?;
    let env = env_of(ctx, &app, &vars.id("appEnvId")?)?;
    respond(app_env_view(ctx.store(), &app, env)?)
}

/// `UserAppEnvStats(appEnvId)` → counters, zero-filled for an empty env.
pub fn user_app_env_stats(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let env = member_env(ctx, &vars.id("appEnvId")?)?;
    respond(TransactionRepository::new(ctx.store()).stats(&env.id)?)
}

/// `UserAppTransactions(appId, appEnvId)` → newest first.
pub fn user_app_transactions(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = member_app(ctx, &vars.id("appId")?)?;
    let env = env_of(ctx, &app, &vars.id("appEnvId")?)?;
    respond(TransactionRepository::new(ctx.store()).list_for_env(&env.id)?)
}

/// `UserAppTransaction(appId, appEnvId, appTransactionId)`
pub fn user_app_transaction(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = member_app(ctx, &vars.id("appId")?)?;
    let env = env_of(ctx, &app, &vars.id("appEnvId")?)?;
    let tx_id = vars.id("appTransactionId")?;
    let tx = TransactionRepository::new(ctx.store()).get(&tx_id)?;
    if tx.app_env_id != env.id {
        return Err(ApiError::not_found(format!("AppTransaction {tx_id} not found")));
    }
    respond(tx)
}

/// `AdminApps` → every App.
pub fn admin_apps(ctx: &OperationCtx<'_>, _vars: &Variables) -> Result<Value, ApiError> {
    let views = AppRepository::new(ctx.store())
        .list()?
        .into_iter()
        .map(|app| app_view(ctx.store(), app))
        .collect::<Result<Vec<_>, _>>()?;
    respond(views)
}

/// `AdminApp(appId)`
pub fn admin_app(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = AppRepository::new(ctx.store()).get(&vars.id("appId")?)?;
    respond(app_view(ctx.store(), app)?)
}
