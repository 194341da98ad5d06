// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access control gate.
//!
//! Every operation declares an [`Access`] level. The gate runs before any
//! variable is parsed or any record is read: a caller without a valid session
//! gets the uniform `Unauthorized` error regardless of which operation was
//! requested.

use super::{AuthenticatedUser, RequestContext, Role};
use crate::error::ApiError;

/// Access level required by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No session required
    Public,
    /// Any authenticated session
    Session,
    /// Authenticated session with the Admin role
    Admin,
}

/// Decide whether the caller may invoke an operation with `access`.
///
/// Returns the caller for gated operations (`None` only for `Public`).
pub fn authorize(ctx: &RequestContext, access: Access) -> Result<Option<&AuthenticatedUser>, ApiError> {
    match access {
        Access::Public => Ok(ctx.user.as_ref()),
        Access::Session => match &ctx.user {
            Some(user) => Ok(Some(user)),
            None => Err(ApiError::unauthorized()),
        },
        Access::Admin => match &ctx.user {
            Some(user) if user.has_role(Role::Admin) => Ok(Some(user)),
            Some(user) => {
                tracing::warn!(user_id = %user.user_id, "Admin operation denied");
                Err(ApiError::forbidden())
            }
            None => Err(ApiError::unauthorized()),
        },
    }
}
