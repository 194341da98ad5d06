// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! App-scoped authorization.
//!
//! After the gate has established a session, operations on a specific App
//! check the caller's membership. Admins bypass membership. Non-members get
//! the same `NotFound` as for a missing App, so existence does not leak; a
//! member lacking the Owner role gets `Forbidden`.

use super::OperationCtx;
use crate::error::ApiError;
use crate::models::{App, AppEnv, AppUserRole};
use crate::storage::{AppEnvRepository, AppRepository};

fn app_not_found(app_id: &str) -> ApiError {
    ApiError::not_found(format!("App {app_id} not found"))
}

fn app_env_not_found(app_env_id: &str) -> ApiError {
    ApiError::not_found(format!("AppEnv {app_env_id} not found"))
}

fn scoped_app(ctx: &OperationCtx<'_>, app_id: &str, owner: bool) -> Result<App, ApiError> {
    let caller = ctx.caller()?;
    let apps = AppRepository::new(ctx.store());
    let app = apps.get(app_id)?;
    if caller.is_admin() {
        return Ok(app);
    }
    match apps.membership(app_id, &caller.user_id)? {
        None => Err(app_not_found(app_id)),
        Some(member) if owner && member.role != AppUserRole::Owner => {
            tracing::warn!(app_id = %app_id, user_id = %caller.user_id, "Owner role required");
            Err(ApiError::forbidden())
        }
        Some(_) => Ok(app),
    }
}

/// The App, if the caller may read it.
pub(crate) fn member_app(ctx: &OperationCtx<'_>, app_id: &str) -> Result<App, ApiError> {
    scoped_app(ctx, app_id, false)
}

/// The App, if the caller may change it.
pub(crate) fn owner_app(ctx: &OperationCtx<'_>, app_id: &str) -> Result<App, ApiError> {
    scoped_app(ctx, app_id, true)
}

/// An environment that must belong to `app`.
pub(crate) fn env_of(ctx: &OperationCtx<'_>, app: &App, app_env_id: &str) -> Result<AppEnv, ApiError> {
    let env = AppEnvRepository::new(ctx.store()).get(app_env_id)?;
    if env.app_id != app.id {
        return Err(app_env_not_found(app_env_id));
    }
    Ok(env)
}

/// An environment looked up by id alone, readable by members of its App.
pub(crate) fn member_env(ctx: &OperationCtx<'_>, app_env_id: &str) -> Result<AppEnv, ApiError> {
    let env = AppEnvRepository::new(ctx.store()).get(app_env_id)?;
    member_app(ctx, &env.app_id).map_err(|err| match err.kind {
        crate::error::ErrorKind::NotFound => app_env_not_found(app_env_id),
        _ => err,
    })?;
    Ok(env)
}
