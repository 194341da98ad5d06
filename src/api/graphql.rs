// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The single operation endpoint.
//!
//! Requests name an operation and pass a `variables` object. The document in
//! `query` is only consulted for the operation name when `operationName` is
//! absent; selection sets are not interpreted and every operation returns its
//! full result under its root field.
//!
//! Every response is HTTP 200:
//!
//! ```json
//! { "data": { "item": { ... } } }
//! { "data": null, "errors": [{ "message": "Unauthorized", "extensions": { "code": "UNAUTHENTICATED" } }] }
//! ```

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::RequestContext;
use crate::error::{ApiError, GraphQLError};
use crate::operations::{self, Variables};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest {
    /// Name of a registered operation, e.g. `UserApp`
    #[serde(default)]
    pub operation_name: Option<String>,
    /// Operation document; used for the name when `operationName` is absent
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Object>)]
    pub variables: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GraphQLResponse {
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

/// Name of the first `query <Name>` or `mutation <Name>` definition.
///
/// Anonymous operations (`query { ... }`) have no name.
pub fn operation_name_from_query(query: &str) -> Option<String> {
    let bytes = query.as_bytes();
    let is_name = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    let mut i = 0;
    while i < bytes.len() {
        if !is_name(bytes[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && is_name(bytes[i]) {
            i += 1;
        }
        let word = &query[start..i];
        if word != "query" && word != "mutation" {
            continue;
        }

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        let name_start = j;
        while j < bytes.len() && is_name(bytes[j]) {
            j += 1;
        }
        let name = &query[name_start..j];
        return match name.as_bytes().first() {
            Some(first) if !first.is_ascii_digit() => Some(name.to_string()),
            _ => None,
        };
    }
    None
}

fn resolve_request(body: &[u8]) -> Result<(String, Variables), ApiError> {
    let request: GraphQLRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid request body: {e}")))?;

    let name = request
        .operation_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| request.query.as_deref().and_then(operation_name_from_query))
        .ok_or_else(|| ApiError::bad_request("operationName is required"))?;
    let variables = Variables::from_value(request.variables)?;
    Ok((name, variables))
}

/// Execute a named operation.
#[utoipa::path(
    post,
    path = "/graphql",
    tag = "Operations",
    security(("bearer_auth" = [])),
    request_body = GraphQLRequest,
    responses(
        (status = 200, description = "Operation result or error entries", body = GraphQLResponse)
    )
)]
pub async fn graphql(State(state): State<AppState>, ctx: RequestContext, body: Bytes) -> Response {
    let (name, variables) = match resolve_request(&body) {
        Ok(resolved) => resolved,
        Err(err) => {
            tracing::warn!(error = %err.message, "Malformed operation request");
            return err.into_response();
        }
    };

    match operations::execute(&state, &ctx, &name, &variables) {
        Ok(data) => Json(GraphQLResponse {
            data: Some(data),
            errors: Vec::new(),
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(
                operation = %name,
                code = err.kind.code(),
                error = %err.message,
                request_id = ctx.request_id.as_deref().unwrap_or("-"),
                "Operation failed"
            );
            err.into_response()
        }
    }
}
