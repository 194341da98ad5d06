// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Write operations.
//!
//! Each mutation validates its input, checks App scope, then runs exactly one
//! repository write flow (one database transaction) before assembling the
//! response view.

use serde_json::Value;

use super::scope::{env_of, owner_app};
use super::views::{app_env_view, app_mint_view, app_view, cluster_view};
use super::{respond, OperationCtx, Variables};
use crate::auth::Role;
use crate::error::ApiError;
use crate::models::{
    AppCreateInput, AppEnvCreateInput, AppMintUpdateInput, AppUpdateInput, AppUserAddInput,
    AppUserRole, LoginInput, LoginResult, MintCreateInput, UserCreateInput,
};
use crate::storage::{
    AppEnvRepository, AppRepository, ClusterRepository, MintRepository, UserRepository,
};
use crate::validation::{
    validate_app_create, validate_app_env_name, validate_app_update, validate_mint_create,
    validate_user_create,
};

/// `Login(input { username, password })` → `{ token, user }`.
pub fn login(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let input: LoginInput = vars.required("input")?;
    let user = UserRepository::new(ctx.store())
        .verify_credentials(&input.username, &input.password)?
        .ok_or_else(|| {
            tracing::warn!("Login rejected");
            ApiError::unauthorized()
        })?;
    let token = ctx.state.tokens.issue(&user.id, &user.username, user.role)?;
    tracing::info!(user_id = %user.id, "Login succeeded");
    respond(LoginResult { token, user })
}

/// `AdminCreateApp(input { index, name, ownerId? })` → the App with its
/// default environment. The owner defaults to the calling admin.
pub fn admin_create_app(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let caller = ctx.caller()?;
    let input: AppCreateInput = vars.required("input")?;
    validate_app_create(&input)?;

    let owner_id = input
        .owner_id
        .clone()
        .unwrap_or_else(|| caller.user_id.clone());
    let app = AppRepository::new(ctx.store()).create(
        &input,
        &owner_id,
        ctx.state.default_cluster_id(),
    )?;
    respond(app_view(ctx.store(), app)?)
}

/// `UserCreateAppEnv(appId, clusterId, input { name? })`
pub fn user_create_app_env(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = owner_app(ctx, &vars.id("appId")?)?;
    let cluster_id = vars.id("clusterId")?;
    let input: AppEnvCreateInput = vars.optional("input")?.unwrap_or_default();
    if let Some(name) = &input.name {
        validate_app_env_name(name)?;
    }

    let env = AppEnvRepository::new(ctx.store()).create(&app.id, &cluster_id, input.name.as_deref())?;
    respond(app_env_view(ctx.store(), &app, env)?)
}

/// `AdminMintCreate(input)` → the mint's cluster with all its mints.
pub fn admin_mint_create(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let input: MintCreateInput = vars.required("input")?;
    validate_mint_create(&input)?;

    let mint = MintRepository::new(ctx.store()).create(&input, false)?;
    let cluster = ClusterRepository::new(ctx.store()).get(&mint.cluster_id)?;
    respond(cluster_view(ctx.store(), cluster)?)
}

/// `UserUpdateAppMint(appId, appMintId, input { addMemo?, order? })`
pub fn user_update_app_mint(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = owner_app(ctx, &vars.id("appId")?)?;
    let app_mint_id = vars.id("appMintId")?;
    let input: AppMintUpdateInput = vars.required("input")?;

    let envs = AppEnvRepository::new(ctx.store());
    let app_mint = envs.get_app_mint(&app_mint_id)?;
    let env = envs.get(&app_mint.app_env_id)?;
    if env.app_id != app.id {
        return Err(ApiError::not_found(format!("AppMint {app_mint_id} not found")));
    }

    let updated = envs.update_app_mint(&app_mint_id, &input)?;
    tracing::info!(app_id = %app.id, app_mint_id = %app_mint_id, "AppMint updated");
    respond(app_mint_view(ctx.store(), updated)?)
}

/// `UserUpdateApp(appId, input)` → partial update with webhook URL checks.
pub fn user_update_app(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = owner_app(ctx, &vars.id("appId")?)?;
    let input: AppUpdateInput = vars.required("input")?;
    validate_app_update(&input)?;

    let updated = AppRepository::new(ctx.store()).update(&app.id, &input)?;
    tracing::info!(app_id = %updated.id, "App updated");
    respond(app_view(ctx.store(), updated)?)
}

/// `UserAppEnvMintAdd(appId, appEnvId, mintId)` → the environment.
pub fn user_app_env_mint_add(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = owner_app(ctx, &vars.id("appId")?)?;
    let env = env_of(ctx, &app, &vars.id("appEnvId")?)?;
    let mint_id = vars.id("mintId")?;

    AppEnvRepository::new(ctx.store()).add_mint(&env.id, &mint_id)?;
    respond(app_env_view(ctx.store(), &app, env)?)
}

/// `UserAppUserAdd(appId, input { userId, role? })` → the App.
pub fn user_app_user_add(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let app = owner_app(ctx, &vars.id("appId")?)?;
    let input: AppUserAddInput = vars.required("input")?;

    let apps = AppRepository::new(ctx.store());
    apps.add_member(
        &app.id,
        input.user_id.trim(),
        input.role.unwrap_or(AppUserRole::Member),
    )?;
    respond(app_view(ctx.store(), app)?)
}

/// `AdminCreateUser(input { username, password, name?, role? })`
pub fn admin_create_user(ctx: &OperationCtx<'_>, vars: &Variables) -> Result<Value, ApiError> {
    let input: UserCreateInput = vars.required("input")?;
    validate_user_create(&input)?;

    let user = UserRepository::new(ctx.store()).create(
        &input.username,
        &input.password,
        input.name.map(|n| n.trim().to_string()),
        input.role.unwrap_or(Role::User),
    )?;
    respond(user)
}
