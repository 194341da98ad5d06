// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Operation errors and their wire shape.
//!
//! Every failure is returned inside the response body as a GraphQL-style
//! error entry, with HTTP status 200:
//!
//! ```json
//! { "data": null, "errors": [{ "message": "Unauthorized", "extensions": { "code": "UNAUTHENTICATED" } }] }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::storage::StoreError;
use crate::validation::ValidationError;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized";
pub const FORBIDDEN_MESSAGE: &str = "Forbidden";
const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    Validation,
    Conflict,
    BadRequest,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "UNAUTHENTICATED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Validation => "BAD_USER_INPUT",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct GraphQLError {
    pub message: String,
    pub extensions: ErrorExtensions,
}

#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
pub struct ErrorExtensions {
    pub code: String,
}

#[derive(Serialize)]
struct ErrorBody {
    data: Option<()>,
    errors: Vec<GraphQLError>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized, UNAUTHORIZED_MESSAGE)
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorKind::Forbidden, FORBIDDEN_MESSAGE)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal, INTERNAL_MESSAGE)
    }

    pub fn to_graphql(&self) -> GraphQLError {
        GraphQLError {
            message: self.message.clone(),
            extensions: ErrorExtensions {
                code: self.kind.code().to_string(),
            },
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(msg) => {
                tracing::error!(error = %msg, "Authentication failure");
                ApiError::internal()
            }
            other => {
                tracing::warn!(error_code = other.error_code(), "Authentication rejected");
                ApiError::unauthorized()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                ApiError::not_found(format!("{entity} {id} not found"))
            }
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Invalid(msg) => ApiError::validation(msg),
            other => {
                tracing::error!(error = %other, "Storage failure");
                ApiError::internal()
            }
        }
    }
}

/// Errors are returned with status 200 in the GraphQL envelope.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            data: None,
            errors: vec![self.to_graphql()],
        });
        (StatusCode::OK, body).into_response()
    }
}
