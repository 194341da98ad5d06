// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the per-request caller context.
//!
//! The extractor never rejects: a missing or invalid credential yields a
//! context without a caller, and the access gate decides what that means for
//! the requested operation.
//!
//! ```rust,ignore
//! async fn handler(ctx: RequestContext) -> impl IntoResponse {
//!     // ctx.user is Some(AuthenticatedUser) for a valid bearer token
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Explicit context passed to every operation.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Verified caller, if any
    pub user: Option<AuthenticatedUser>,
    /// Request id set by the request-id layer
    pub request_id: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn for_user(user: AuthenticatedUser) -> Self {
        Self {
            user: Some(user),
            request_id: None,
        }
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let user = match bearer_token(parts) {
            Ok(None) => None,
            Ok(Some(token)) => match state.tokens.verify(token) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!(
                        error_code = e.error_code(),
                        request_id = request_id.as_deref().unwrap_or("-"),
                        "Rejected session token"
                    );
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    error_code = e.error_code(),
                    request_id = request_id.as_deref().unwrap_or("-"),
                    "Rejected authorization header"
                );
                None
            }
        };

        Ok(RequestContext { user, request_id })
    }
}

/// Extract the bearer token, `Ok(None)` when no header is present.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, AuthError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)?;
    Ok(Some(token))
}
