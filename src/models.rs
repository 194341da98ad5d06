// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Graph Data Models
//!
//! Entities of the application graph and the input objects accepted by the
//! operation endpoint. Entities are persisted as JSON records and returned to
//! callers in the same camelCase shape.
//!
//! ## Model Categories
//!
//! - **Clusters**: blockchain networks an environment can bind to
//! - **Apps**: tenants, owning environments and members
//! - **AppEnvs**: an App bound to a Cluster
//! - **Mints / AppMints**: token definitions and their per-environment use
//! - **AppTransactions**: recorded transfers with lifecycle timestamps
//! - **Users**: accounts that can log in

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// =============================================================================
// Cluster Models
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum ClusterStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum ClusterType {
    Custom,
    SolanaDevnet,
    SolanaMainnet,
    SolanaTestnet,
}

/// A blockchain network endpoint. Clusters are seeded, never created through
/// the operation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub cluster_type: ClusterType,
    pub status: ClusterStatus,
    pub endpoint_public: String,
    pub explorer: String,
    pub created_at: DateTime<Utc>,
}

/// A cluster together with the mints defined on it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterView {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub cluster_type: ClusterType,
    pub status: ClusterStatus,
    pub endpoint_public: String,
    pub explorer: String,
    pub mints: Vec<Mint>,
}

impl ClusterView {
    pub fn new(cluster: Cluster, mints: Vec<Mint>) -> Self {
        Self {
            id: cluster.id,
            name: cluster.name,
            cluster_type: cluster.cluster_type,
            status: cluster.status,
            endpoint_public: cluster.endpoint_public,
            explorer: cluster.explorer,
            mints,
        }
    }
}

// =============================================================================
// Mint Models
// =============================================================================

/// A token definition scoped to a cluster. `address` is unique per cluster.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Mint {
    pub id: String,
    pub address: String,
    pub cluster_id: String,
    pub decimals: u8,
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coin_gecko_id: Option<String>,
    /// Default mints are attached to every new environment on the cluster.
    #[serde(rename = "default")]
    pub is_default: bool,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MintCreateInput {
    pub address: String,
    pub cluster_id: String,
    pub decimals: i64,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub coin_gecko_id: Option<String>,
}

/// Use of a mint inside one environment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppMint {
    pub id: String,
    pub app_env_id: String,
    pub mint_id: String,
    pub add_memo: bool,
    pub order: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppMintView {
    pub id: String,
    pub add_memo: bool,
    pub order: u32,
    pub mint: Mint,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppMintUpdateInput {
    #[serde(default)]
    pub add_memo: Option<bool>,
    #[serde(default)]
    pub order: Option<u32>,
}

// =============================================================================
// App Models
// =============================================================================

/// A tenant. Unique per `(index, name)`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct App {
    pub id: String,
    pub index: i32,
    pub name: String,
    pub webhook_accept_incoming: bool,
    pub webhook_event_enabled: bool,
    #[serde(default)]
    pub webhook_event_url: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    pub webhook_verify_enabled: bool,
    #[serde(default)]
    pub webhook_verify_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppCreateInput {
    pub index: i32,
    pub name: String,
    /// User that becomes the App owner. Defaults to the caller.
    #[serde(default)]
    pub owner_id: Option<String>,
}

/// Partial App update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppUpdateInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub webhook_accept_incoming: Option<bool>,
    #[serde(default)]
    pub webhook_event_enabled: Option<bool>,
    #[serde(default)]
    pub webhook_event_url: Option<String>,
    #[serde(default)]
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub webhook_verify_enabled: Option<bool>,
    #[serde(default)]
    pub webhook_verify_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum AppUserRole {
    Owner,
    Member,
}

/// Membership of a user in an App.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    pub app_id: String,
    pub user_id: String,
    pub role: AppUserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppUserAddInput {
    pub user_id: String,
    /// Defaults to `Member`.
    #[serde(default)]
    pub role: Option<AppUserRole>,
}

/// Reference to the owning App, embedded in environment views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppRef {
    pub id: String,
    pub index: i32,
    pub name: String,
}

impl From<&App> for AppRef {
    fn from(app: &App) -> Self {
        Self {
            id: app.id.clone(),
            index: app.index,
            name: app.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppView {
    pub id: String,
    pub index: i32,
    pub name: String,
    pub webhook_accept_incoming: bool,
    pub webhook_event_enabled: bool,
    pub webhook_event_url: Option<String>,
    pub webhook_secret: Option<String>,
    pub webhook_verify_enabled: bool,
    pub webhook_verify_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Environments in creation order; `envs[0]` is the default environment.
    pub envs: Vec<AppEnvView>,
    pub users: Vec<AppUser>,
}

impl AppView {
    pub fn new(app: App, envs: Vec<AppEnvView>, users: Vec<AppUser>) -> Self {
        Self {
            id: app.id,
            index: app.index,
            name: app.name,
            webhook_accept_incoming: app.webhook_accept_incoming,
            webhook_event_enabled: app.webhook_event_enabled,
            webhook_event_url: app.webhook_event_url,
            webhook_secret: app.webhook_secret,
            webhook_verify_enabled: app.webhook_verify_enabled,
            webhook_verify_url: app.webhook_verify_url,
            created_at: app.created_at,
            updated_at: app.updated_at,
            envs,
            users,
        }
    }
}

// =============================================================================
// AppEnv Models
// =============================================================================

/// Binding of an App to a Cluster. `app_id` and `cluster_id` never change.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppEnv {
    pub id: String,
    pub app_id: String,
    pub cluster_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppEnvCreateInput {
    /// Display name; defaults to the cluster name.
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppEnvView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub app: AppRef,
    pub cluster: Cluster,
    pub mints: Vec<AppMintView>,
}

/// Aggregate counters over an environment's transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppEnvStats {
    pub transaction_count: u64,
    /// One entry per transaction status, zero-filled.
    pub transaction_count_by_status: BTreeMap<String, u64>,
}

// =============================================================================
// AppTransaction Models
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum AppTransactionStatus {
    Committed,
    Confirmed,
    Failed,
    Finalized,
    Processing,
}

impl AppTransactionStatus {
    pub const ALL: [AppTransactionStatus; 5] = [
        AppTransactionStatus::Committed,
        AppTransactionStatus::Confirmed,
        AppTransactionStatus::Failed,
        AppTransactionStatus::Finalized,
        AppTransactionStatus::Processing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppTransactionStatus::Committed => "Committed",
            AppTransactionStatus::Confirmed => "Confirmed",
            AppTransactionStatus::Failed => "Failed",
            AppTransactionStatus::Finalized => "Finalized",
            AppTransactionStatus::Processing => "Processing",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum AppTransactionErrorType {
    BadNonce,
    InvalidAccount,
    SomeError,
    Timeout,
    Unknown,
    WebhookFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppTransactionError {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(rename = "type")]
    pub error_type: AppTransactionErrorType,
}

/// A recorded transfer within one environment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppTransaction {
    pub id: String,
    pub app_env_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub amount: Option<i64>,
    pub destination: Option<String>,
    #[serde(default)]
    pub errors: Vec<AppTransactionError>,
    pub fee_payer: Option<String>,
    pub mint: Option<String>,
    pub signature: Option<String>,
    pub solana_start: Option<DateTime<Utc>>,
    pub solana_end: Option<DateTime<Utc>>,
    pub solana_finalized: Option<DateTime<Utc>>,
    #[schema(value_type = Option<Object>)]
    pub solana_transaction: Option<serde_json::Value>,
    pub source: Option<String>,
    pub status: AppTransactionStatus,
    pub webhook_event_start: Option<DateTime<Utc>>,
    pub webhook_event_end: Option<DateTime<Utc>>,
    pub webhook_verify_start: Option<DateTime<Utc>>,
    pub webhook_verify_end: Option<DateTime<Utc>>,
}

impl AppTransaction {
    /// A new transaction in `Processing` state with every lifecycle field unset.
    pub fn new_processing(app_env_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            app_env_id: app_env_id.into(),
            created_at: now,
            updated_at: now,
            amount: None,
            destination: None,
            errors: Vec::new(),
            fee_payer: None,
            mint: None,
            signature: None,
            solana_start: None,
            solana_end: None,
            solana_finalized: None,
            solana_transaction: None,
            source: None,
            status: AppTransactionStatus::Processing,
            webhook_event_start: None,
            webhook_event_end: None,
            webhook_verify_start: None,
            webhook_verify_end: None,
        }
    }
}

// =============================================================================
// User Models
// =============================================================================

/// Public view of an account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResult {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreateInput {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}
