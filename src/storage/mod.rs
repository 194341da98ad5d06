// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Graph Storage Module
//!
//! Persistent storage for the application graph in an embedded **redb**
//! database, on disk or in memory depending on `DATABASE_URL`.
//!
//! ## Entity Graph
//!
//! ```text
//! Cluster ─┬─ Mint
//!          └─ AppEnv ─┬─ AppMint ── Mint (same cluster)
//!                     └─ AppTransaction
//! App ─┬─ AppEnv (envs[0] is the default environment)
//!      └─ AppUser ── User
//! ```
//!
//! ## Guarantees
//!
//! - Every write flow is one redb write transaction (all-or-nothing)
//! - Uniqueness is checked inside that transaction: App `(index, name)`,
//!   Mint address per cluster, AppMint per environment, username
//! - References are checked at write time and reported as `NotFound`

mod database;
pub mod error;
pub mod repository;
pub mod seed;
mod stats_cache;

pub use database::GraphStore;
pub use error::{StoreError, StoreResult};
pub use repository::{
    AppEnvRepository, AppRepository, ClusterRepository, MintRepository, StoredUser,
    TransactionRepository, UserRepository,
};
pub use seed::{seed, SeedReport};
pub use stats_cache::StatsCache;
