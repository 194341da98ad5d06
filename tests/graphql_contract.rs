// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end checks of the operation endpoint through the full router.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use mogami_api::{api::router, config::Config, state::AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::bootstrap(Config::ephemeral()).unwrap())
}

async fn post_raw(app: &Router, token: Option<&str>, body: String) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let response = app
        .clone()
        .oneshot(request.body(Body::from(body)).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn call(app: &Router, token: Option<&str>, operation: &str, variables: Value) -> Value {
    let body = json!({ "operationName": operation, "variables": variables }).to_string();
    let (status, body) = post_raw(app, token, body).await;
    assert_eq!(status, StatusCode::OK);
    body
}

/// Data of a successful call; panics with the error entries otherwise.
async fn data(app: &Router, token: &str, operation: &str, variables: Value) -> Value {
    let body = call(app, Some(token), operation, variables).await;
    assert!(body.get("errors").is_none(), "{operation} failed: {body}");
    body["data"].clone()
}

async fn login(app: &Router) -> String {
    let body = call(
        app,
        None,
        "Login",
        json!({ "input": { "username": "admin", "password": "admin" } }),
    )
    .await;
    body["data"]["login"]["token"].as_str().unwrap().to_string()
}

async fn create_app(app: &Router, token: &str, index: i32, name: &str) -> Value {
    data(
        app,
        token,
        "AdminCreateApp",
        json!({ "input": { "index": index, "name": name } }),
    )
    .await["created"]
        .clone()
}

fn assert_unauthorized(body: &Value) {
    assert!(body["data"].is_null());
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["message"], "Unauthorized");
    assert_eq!(errors[0]["extensions"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn gated_operations_without_session_are_unauthorized() {
    let app = app();
    let cases = [
        ("UserCluster", json!({ "clusterId": "solana-devnet" })),
        ("UserClusters", json!({})),
        ("AdminClusters", json!({})),
        ("UserApps", json!({})),
        ("UserApp", json!({ "appId": "x" })),
        ("UserAppEnv", json!({ "appId": "x", "appEnvId": "y" })),
        ("UserAppEnvStats", json!({ "appEnvId": "y" })),
        ("AdminCreateApp", json!({ "input": { "index": 1, "name": "a" } })),
        (
            "UserCreateAppEnv",
            json!({ "appId": "x", "clusterId": "solana-devnet", "input": { "name": "n" } }),
        ),
        (
            "AdminMintCreate",
            json!({ "input": { "address": "a", "clusterId": "c", "decimals": 2, "name": "n", "symbol": "s" } }),
        ),
        (
            "UserUpdateAppMint",
            json!({ "appId": "x", "appMintId": "m", "input": { "addMemo": true } }),
        ),
    ];

    for (operation, variables) in cases {
        let body = call(&app, None, operation, variables.clone()).await;
        assert_unauthorized(&body);

        let body = call(&app, Some("not.a.token"), operation, variables).await;
        assert_unauthorized(&body);
    }
}

#[tokio::test]
async fn login_rejects_bad_password() {
    let app = app();
    let body = call(
        &app,
        None,
        "Login",
        json!({ "input": { "username": "admin", "password": "nope" } }),
    )
    .await;
    assert_unauthorized(&body);
}

#[tokio::test]
async fn cluster_lookup_and_listings() {
    let app = app();
    let token = login(&app).await;

    let cluster = data(&app, &token, "UserCluster", json!({ "clusterId": "solana-devnet" })).await;
    assert_eq!(cluster["item"]["id"], "solana-devnet");
    assert_eq!(cluster["item"]["status"], "Active");
    assert_eq!(cluster["item"]["type"], "SolanaDevnet");

    let again = data(&app, &token, "UserCluster", json!({ "clusterId": "solana-devnet" })).await;
    assert_eq!(again["item"]["id"], cluster["item"]["id"]);
    assert_eq!(again["item"]["name"], cluster["item"]["name"]);

    let clusters = data(&app, &token, "UserClusters", json!({})).await;
    assert!(clusters["items"].as_array().unwrap().len() >= 2);
    let admin_clusters = data(&app, &token, "AdminClusters", json!({})).await;
    assert!(admin_clusters["items"].as_array().unwrap().len() >= 2);

    create_app(&app, &token, 1, "listed-one").await;
    create_app(&app, &token, 1, "listed-two").await;
    let apps = data(&app, &token, "UserApps", json!({})).await;
    assert!(apps["items"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn app_and_environment_flow() {
    let app = app();
    let token = login(&app).await;

    let created = create_app(&app, &token, 7, "flow").await;
    let app_id = created["id"].as_str().unwrap();
    let default_env_id = created["envs"][0]["id"].as_str().unwrap();
    assert!(!default_env_id.is_empty());

    let first = data(&app, &token, "UserApp", json!({ "appId": app_id })).await;
    let second = data(&app, &token, "UserApp", json!({ "appId": app_id })).await;
    assert_eq!(first["item"]["id"], app_id);
    assert_eq!(first["item"]["id"], second["item"]["id"]);
    assert_eq!(first["item"]["name"], second["item"]["name"]);

    let env = data(
        &app,
        &token,
        "UserAppEnv",
        json!({ "appId": app_id, "appEnvId": default_env_id }),
    )
    .await;
    assert_eq!(env["item"]["app"]["id"], app_id);

    let stats = data(&app, &token, "UserAppEnvStats", json!({ "appEnvId": default_env_id })).await;
    assert_eq!(stats["stats"]["transactionCount"], 0);

    let created_env = data(
        &app,
        &token,
        "UserCreateAppEnv",
        json!({ "appId": app_id, "clusterId": "solana-testnet", "input": { "name": "Staging" } }),
    )
    .await;
    let env_id = created_env["created"]["id"].as_str().unwrap();
    assert_eq!(created_env["created"]["app"]["id"], app_id);
    assert_eq!(created_env["created"]["cluster"]["id"], "solana-testnet");
    assert_eq!(created_env["created"]["name"], "Staging");

    let read_back = data(
        &app,
        &token,
        "UserAppEnv",
        json!({ "appId": app_id, "appEnvId": env_id }),
    )
    .await;
    assert_eq!(read_back["item"]["cluster"]["id"], "solana-testnet");
    assert_eq!(read_back["item"]["name"], "Staging");
    assert!(read_back["item"]["cluster"]["name"].is_string());
}

#[tokio::test]
async fn devnet_environment_carries_its_cluster() {
    let app = app();
    let token = login(&app).await;

    let created = create_app(&app, &token, 10, "devnet-env").await;
    let app_id = created["id"].as_str().unwrap();
    let input = json!({ "name": "Solana Devnet" });
    let env = data(
        &app,
        &token,
        "UserCreateAppEnv",
        json!({ "appId": app_id, "clusterId": "solana-devnet", "input": input }),
    )
    .await;

    assert_eq!(env["created"]["app"]["id"], app_id);
    assert_eq!(env["created"]["cluster"]["id"], "solana-devnet");
    assert_eq!(env["created"]["cluster"]["name"], input["name"]);
    assert_eq!(env["created"]["name"], input["name"]);
}

#[tokio::test]
async fn mint_create_and_app_mint_update() {
    let app = app();
    let token = login(&app).await;

    let address = "So11111111111111111111111111111111111111112";
    let cluster = data(
        &app,
        &token,
        "AdminMintCreate",
        json!({ "input": {
            "address": address,
            "clusterId": "solana-devnet",
            "decimals": 9,
            "name": "Wrapped SOL",
            "symbol": "SOL"
        } }),
    )
    .await;
    let matching: Vec<&Value> = cluster["adminMintCreate"]["mints"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|mint| mint["address"] == address)
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0]["decimals"], 9);
    assert_eq!(matching[0]["name"], "Wrapped SOL");
    assert_eq!(matching[0]["symbol"], "SOL");

    let created = create_app(&app, &token, 8, "mints").await;
    let app_mint_id = created["envs"][0]["mints"][0]["id"].as_str().unwrap();
    let updated = data(
        &app,
        &token,
        "UserUpdateAppMint",
        json!({ "appId": created["id"], "appMintId": app_mint_id, "input": { "addMemo": true } }),
    )
    .await;
    assert!(!updated["updated"].is_null());
    assert_eq!(updated["updated"]["addMemo"], true);
}

#[tokio::test]
async fn failures_use_distinct_codes_in_the_same_envelope() {
    let app = app();
    let token = login(&app).await;

    let missing = call(&app, Some(&token), "UserApp", json!({ "appId": "missing" })).await;
    assert!(missing["data"].is_null());
    assert_eq!(missing["errors"][0]["extensions"]["code"], "NOT_FOUND");

    let created = create_app(&app, &token, 9, "hooks").await;
    let invalid = call(
        &app,
        Some(&token),
        "UserUpdateApp",
        json!({ "appId": created["id"], "input": { "webhookEventUrl": "not a url" } }),
    )
    .await;
    assert_eq!(invalid["errors"][0]["message"], "webhookEventUrl must be a url");
    assert_eq!(invalid["errors"][0]["extensions"]["code"], "BAD_USER_INPUT");

    let duplicate = call(
        &app,
        Some(&token),
        "AdminCreateApp",
        json!({ "input": { "index": 9, "name": "hooks" } }),
    )
    .await;
    assert_eq!(duplicate["errors"][0]["extensions"]["code"], "CONFLICT");

    let (status, malformed) = post_raw(&app, Some(&token), "{ nope".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(malformed["errors"][0]["extensions"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn operation_name_can_come_from_the_document() {
    let app = app();
    let token = login(&app).await;

    let body = json!({
        "query": "query UserCluster($clusterId: String!) { item: userCluster(clusterId: $clusterId) { id } }",
        "variables": { "clusterId": "solana-devnet" }
    })
    .to_string();
    let (_, body) = post_raw(&app, Some(&token), body).await;
    assert_eq!(body["data"]["item"]["id"], "solana-devnet");
}

#[tokio::test]
async fn health_endpoint_reports_storage() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["checks"]["storage"], "ok");
}
