// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::config::Config;
use crate::storage::{seed, GraphStore, StoreResult};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<GraphStore>,
    pub tokens: Arc<TokenIssuer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: GraphStore, config: Config) -> Self {
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.jwt_ttl_secs);
        Self {
            store: Arc::new(store),
            tokens: Arc::new(tokens),
            config: Arc::new(config),
        }
    }

    /// Open the configured store and seed it.
    pub fn bootstrap(config: Config) -> StoreResult<Self> {
        let store = GraphStore::from_location(&config.storage)?;
        seed(&store, &config)?;
        Ok(Self::new(store, config))
    }

    /// Cluster that the default environment of new Apps binds to.
    pub fn default_cluster_id(&self) -> &'static str {
        self.config.solana_endpoint.cluster_id()
    }
}
