// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    error::{ErrorExtensions, GraphQLError},
    models::{
        App, AppCreateInput, AppEnv, AppEnvCreateInput, AppEnvStats, AppEnvView, AppMint,
        AppMintUpdateInput, AppMintView, AppRef, AppTransaction, AppTransactionError,
        AppTransactionErrorType, AppTransactionStatus, AppUpdateInput, AppUser, AppUserAddInput,
        AppUserRole, AppView, Cluster, ClusterStatus, ClusterType, ClusterView, LoginInput,
        LoginResult, Mint, MintCreateInput, User, UserCreateInput,
    },
    state::AppState,
};

pub mod graphql;
pub mod health;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/graphql", post(graphql::graphql))
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        graphql::graphql,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            graphql::GraphQLRequest,
            graphql::GraphQLResponse,
            GraphQLError,
            ErrorExtensions,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            Role,
            Cluster,
            ClusterStatus,
            ClusterType,
            ClusterView,
            Mint,
            MintCreateInput,
            App,
            AppRef,
            AppView,
            AppCreateInput,
            AppUpdateInput,
            AppUser,
            AppUserRole,
            AppUserAddInput,
            AppEnv,
            AppEnvView,
            AppEnvCreateInput,
            AppEnvStats,
            AppMint,
            AppMintView,
            AppMintUpdateInput,
            AppTransaction,
            AppTransactionStatus,
            AppTransactionError,
            AppTransactionErrorType,
            User,
            UserCreateInput,
            LoginInput,
            LoginResult
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Operations", description = "Named graph operations behind one endpoint"),
        (name = "Health", description = "Liveness and readiness checks")
    )
)]
struct ApiDoc;
