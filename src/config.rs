// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and validated
//! before any component is initialised. Validation collects every problem so
//! an operator sees all missing or malformed variables in one pass.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATABASE_URL` | `memory:` or a path / `redb://` / `file://` URL to the database file | Required |
//! | `MOGAMI_SUBSIDIZER_SECRET_KEY` | Fee payer secret key | Required |
//! | `MOGAMI_MINT_PUBLIC_KEY` | Default mint public key (base58) | Required |
//! | `SOLANA_RPC_ENDPOINT` | `mainnet-beta`, `devnet`, `testnet` or an RPC URL | Required |
//! | `NODE_ENV` | `development`, `production` or `test` | `development` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `3000` |
//! | `JWT_SECRET` | HS256 signing secret for session tokens | Required in production |
//! | `JWT_TTL_SECS` | Session token lifetime | `86400` |
//! | `ADMIN_USERNAME` | Seeded administrator username | `admin` |
//! | `ADMIN_PASSWORD` | Seeded administrator password | Required in production |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::validation::is_public_key;

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const SUBSIDIZER_SECRET_KEY_ENV: &str = "MOGAMI_SUBSIDIZER_SECRET_KEY";
pub const MINT_PUBLIC_KEY_ENV: &str = "MOGAMI_MINT_PUBLIC_KEY";
pub const SOLANA_RPC_ENDPOINT_ENV: &str = "SOLANA_RPC_ENDPOINT";
pub const NODE_ENV_ENV: &str = "NODE_ENV";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_TTL_SECS_ENV: &str = "JWT_TTL_SECS";
pub const ADMIN_USERNAME_ENV: &str = "ADMIN_USERNAME";
pub const ADMIN_PASSWORD_ENV: &str = "ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_JWT_TTL_SECS: u64 = 86_400;
/// Upper bound for `JWT_TTL_SECS` (one year).
pub const MAX_JWT_TTL_SECS: u64 = 31_536_000;
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Minimum length of an operator-supplied JWT secret.
const MIN_JWT_SECRET_LEN: usize = 32;

const SOLANA_RPC_ENDPOINT_MESSAGE: &str = "SOLANA_RPC_ENDPOINT is required. Provide 'mainnet-beta' | 'devnet' | 'testnet' or a Solana RPC URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

impl ConfigError {
    pub fn messages(&self) -> &[String] {
        match self {
            ConfigError::Invalid(messages) => messages,
        }
    }
}

// =============================================================================
// Typed values
// =============================================================================

/// Runtime mode (`NODE_ENV`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
    Test,
}

impl RuntimeMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "development" => Some(RuntimeMode::Development),
            "production" => Some(RuntimeMode::Production),
            "test" => Some(RuntimeMode::Test),
            _ => None,
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeMode::Development => write!(f, "development"),
            RuntimeMode::Production => write!(f, "production"),
            RuntimeMode::Test => write!(f, "test"),
        }
    }
}

/// Solana RPC endpoint, either a well-known network moniker or a full URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolanaEndpoint {
    MainnetBeta,
    Devnet,
    Testnet,
    Custom(Url),
}

impl SolanaEndpoint {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "mainnet-beta" => Some(SolanaEndpoint::MainnetBeta),
            "devnet" => Some(SolanaEndpoint::Devnet),
            "testnet" => Some(SolanaEndpoint::Testnet),
            other => Url::parse(other)
                .ok()
                .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
                .map(SolanaEndpoint::Custom),
        }
    }

    pub fn rpc_url(&self) -> String {
        match self {
            SolanaEndpoint::MainnetBeta => "https://api.mainnet-beta.solana.com".to_string(),
            SolanaEndpoint::Devnet => "https://api.devnet.solana.com".to_string(),
            SolanaEndpoint::Testnet => "https://api.testnet.solana.com".to_string(),
            SolanaEndpoint::Custom(url) => url.to_string(),
        }
    }

    /// Identifier of the cluster this endpoint serves.
    pub fn cluster_id(&self) -> &'static str {
        match self {
            SolanaEndpoint::MainnetBeta => "solana-mainnet",
            SolanaEndpoint::Devnet => "solana-devnet",
            SolanaEndpoint::Testnet => "solana-testnet",
            SolanaEndpoint::Custom(_) => "solana-custom",
        }
    }
}

/// Where the graph database lives (`DATABASE_URL`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    InMemory,
    File(PathBuf),
}

impl StorageLocation {
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value == "memory:" || value == "memory://" {
            return Some(StorageLocation::InMemory);
        }
        let path = value
            .strip_prefix("redb://")
            .or_else(|| value.strip_prefix("file://"))
            .unwrap_or(value);
        if path.is_empty() || path.contains("://") {
            return None;
        }
        Some(StorageLocation::File(PathBuf::from(path)))
    }
}

/// Logging output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV).as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

// =============================================================================
// Config
// =============================================================================

/// Validated service configuration.
#[derive(Clone)]
pub struct Config {
    pub storage: StorageLocation,
    pub subsidizer_secret_key: String,
    pub mint_public_key: String,
    pub solana_endpoint: SolanaEndpoint,
    pub mode: RuntimeMode,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_secs: u64,
    pub admin_username: String,
    pub admin_password: String,
}

// Secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("storage", &self.storage)
            .field("mint_public_key", &self.mint_public_key)
            .field("solana_endpoint", &self.solana_endpoint)
            .field("mode", &self.mode)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_ttl_secs", &self.jwt_ttl_secs)
            .field("admin_username", &self.admin_username)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Read and validate configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read and validate configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut problems = Vec::new();

        let mode = match get(NODE_ENV_ENV) {
            None => Some(RuntimeMode::Development),
            Some(value) => {
                let mode = RuntimeMode::parse(&value);
                if mode.is_none() {
                    problems.push(format!(
                        "{NODE_ENV_ENV} must be one of 'development' | 'production' | 'test' (got '{value}')"
                    ));
                }
                mode
            }
        };

        let storage = match get(DATABASE_URL_ENV) {
            None => {
                problems.push(format!("{DATABASE_URL_ENV} is required"));
                None
            }
            Some(value) => {
                let location = StorageLocation::parse(&value);
                if location.is_none() {
                    problems.push(format!(
                        "{DATABASE_URL_ENV} must be 'memory:' or a database file path"
                    ));
                }
                location
            }
        };

        let subsidizer_secret_key = get(SUBSIDIZER_SECRET_KEY_ENV);
        if subsidizer_secret_key.is_none() {
            problems.push(format!("{SUBSIDIZER_SECRET_KEY_ENV} is required"));
        }

        let mint_public_key = get(MINT_PUBLIC_KEY_ENV);
        match &mint_public_key {
            None => problems.push(format!("{MINT_PUBLIC_KEY_ENV} is required")),
            Some(key) if !is_public_key(key) => {
                problems.push(format!("{MINT_PUBLIC_KEY_ENV} must be a base58 public key"))
            }
            Some(_) => {}
        }

        let solana_endpoint = get(SOLANA_RPC_ENDPOINT_ENV).and_then(|v| SolanaEndpoint::parse(&v));
        if solana_endpoint.is_none() {
            problems.push(SOLANA_RPC_ENDPOINT_MESSAGE.to_string());
        }

        let port = match get(PORT_ENV) {
            None => Some(DEFAULT_PORT),
            Some(value) => {
                let port = value.trim().parse::<u16>().ok();
                if port.is_none() {
                    problems.push(format!("{PORT_ENV} must be a number between 0 and 65535"));
                }
                port
            }
        };

        let jwt_ttl_secs = match get(JWT_TTL_SECS_ENV) {
            None => Some(DEFAULT_JWT_TTL_SECS),
            Some(value) => {
                let ttl = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|ttl| (1..=MAX_JWT_TTL_SECS).contains(ttl));
                if ttl.is_none() {
                    problems.push(format!(
                        "{JWT_TTL_SECS_ENV} must be a number of seconds between 1 and {MAX_JWT_TTL_SECS}"
                    ));
                }
                ttl
            }
        };

        let production = mode == Some(RuntimeMode::Production);

        let jwt_secret = match get(JWT_SECRET_ENV) {
            Some(secret) if secret.len() < MIN_JWT_SECRET_LEN => {
                problems.push(format!(
                    "{JWT_SECRET_ENV} must be at least {MIN_JWT_SECRET_LEN} characters"
                ));
                None
            }
            Some(secret) => Some(secret),
            None if production => {
                problems.push(format!("{JWT_SECRET_ENV} is required in production"));
                None
            }
            None => Some(random_secret()),
        };

        let admin_username =
            get(ADMIN_USERNAME_ENV).unwrap_or_else(|| DEFAULT_ADMIN_USERNAME.to_string());
        let admin_password = match get(ADMIN_PASSWORD_ENV) {
            Some(password) => Some(password),
            None if production => {
                problems.push(format!("{ADMIN_PASSWORD_ENV} is required in production"));
                None
            }
            None => Some(admin_username.clone()),
        };

        if !problems.is_empty() {
            return Err(ConfigError::Invalid(problems));
        }

        match (
            storage,
            subsidizer_secret_key,
            mint_public_key,
            solana_endpoint,
            mode,
            port,
            jwt_secret,
            jwt_ttl_secs,
            admin_password,
        ) {
            (
                Some(storage),
                Some(subsidizer_secret_key),
                Some(mint_public_key),
                Some(solana_endpoint),
                Some(mode),
                Some(port),
                Some(jwt_secret),
                Some(jwt_ttl_secs),
                Some(admin_password),
            ) => Ok(Config {
                storage,
                subsidizer_secret_key,
                mint_public_key,
                solana_endpoint,
                mode,
                host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
                jwt_secret,
                jwt_ttl_secs,
                admin_username,
                admin_password,
            }),
            _ => Err(ConfigError::Invalid(vec![
                "configuration could not be assembled".to_string(),
            ])),
        }
    }

    /// In-memory configuration for local runs and tests.
    ///
    /// Uses the devnet cluster and the default admin credentials
    /// (`admin` / `admin`).
    pub fn ephemeral() -> Self {
        let values: HashMap<&str, &str> = HashMap::from([
            (DATABASE_URL_ENV, "memory:"),
            (SUBSIDIZER_SECRET_KEY_ENV, "ephemeral-subsidizer"),
            (MINT_PUBLIC_KEY_ENV, "MoGaMuJnB3k8zXjBYBnHxHG47vWcW3nyb7bFYvdVzek"),
            (SOLANA_RPC_ENDPOINT_ENV, "devnet"),
            (NODE_ENV_ENV, "test"),
        ]);
        match Self::from_lookup(|key| values.get(key).map(|v| v.to_string())) {
            Ok(config) => config,
            Err(err) => unreachable!("ephemeral configuration is valid: {err}"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.mode == RuntimeMode::Production
    }
}

fn random_secret() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (DATABASE_URL_ENV, "memory:"),
            (SUBSIDIZER_SECRET_KEY_ENV, "secret"),
            (MINT_PUBLIC_KEY_ENV, "3SaUThdYFoUX2FYUi9ZPf2TKTu3UYKhNHhXb2Y6najRg"),
            (SOLANA_RPC_ENDPOINT_ENV, "devnet"),
        ]
    }

    #[test]
    fn defaults_are_applied() {
        let config = Config::from_lookup(lookup(&required())).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.mode, RuntimeMode::Development);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.storage, StorageLocation::InMemory);
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.admin_password, "admin");
        assert!(config.jwt_secret.len() >= 32);
    }

    #[test]
    fn missing_values_are_all_reported() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        let messages = err.messages();
        assert!(messages.iter().any(|m| m == "DATABASE_URL is required"));
        assert!(messages
            .iter()
            .any(|m| m == "MOGAMI_SUBSIDIZER_SECRET_KEY is required"));
        assert!(messages.iter().any(|m| m == "MOGAMI_MINT_PUBLIC_KEY is required"));
        assert!(messages.iter().any(|m| m == SOLANA_RPC_ENDPOINT_MESSAGE));
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn solana_endpoint_accepts_monikers_and_urls() {
        assert_eq!(SolanaEndpoint::parse("devnet"), Some(SolanaEndpoint::Devnet));
        assert_eq!(
            SolanaEndpoint::parse("mainnet-beta"),
            Some(SolanaEndpoint::MainnetBeta)
        );
        assert_eq!(SolanaEndpoint::parse("testnet"), Some(SolanaEndpoint::Testnet));
        let custom = SolanaEndpoint::parse("http://localhost:8899").unwrap();
        assert_eq!(custom.cluster_id(), "solana-custom");
        assert!(SolanaEndpoint::parse("localnet").is_none());
        assert!(SolanaEndpoint::parse("ftp://example.com").is_none());
    }

    #[test]
    fn invalid_port_and_mode_are_rejected() {
        let mut pairs = required();
        pairs.push((PORT_ENV, "not-a-port"));
        pairs.push((NODE_ENV_ENV, "staging"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn jwt_ttl_is_bounded() {
        let mut pairs = required();
        pairs.push((JWT_TTL_SECS_ENV, "18446744073709551615"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert_eq!(err.messages().len(), 1);
        assert!(err.messages()[0].starts_with("JWT_TTL_SECS must be"));

        let mut pairs = required();
        pairs.push((JWT_TTL_SECS_ENV, "3600"));
        assert_eq!(Config::from_lookup(lookup(&pairs)).unwrap().jwt_ttl_secs, 3600);
    }

    #[test]
    fn production_requires_secrets() {
        let mut pairs = required();
        pairs.push((NODE_ENV_ENV, "production"));
        let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(err
            .messages()
            .iter()
            .any(|m| m == "JWT_SECRET is required in production"));
        assert!(err
            .messages()
            .iter()
            .any(|m| m == "ADMIN_PASSWORD is required in production"));
    }

    #[test]
    fn storage_location_parses_paths() {
        assert_eq!(
            StorageLocation::parse("redb:///var/lib/mogami/graph.redb"),
            Some(StorageLocation::File(PathBuf::from("/var/lib/mogami/graph.redb")))
        );
        assert_eq!(
            StorageLocation::parse("./graph.redb"),
            Some(StorageLocation::File(PathBuf::from("./graph.redb")))
        );
        assert_eq!(StorageLocation::parse("postgres://db/mogami"), None);
        assert_eq!(StorageLocation::parse("memory:"), Some(StorageLocation::InMemory));
    }

    #[test]
    fn ephemeral_config_is_valid() {
        let config = Config::ephemeral();
        assert_eq!(config.mode, RuntimeMode::Test);
        assert_eq!(config.solana_endpoint, SolanaEndpoint::Devnet);
    }
}
