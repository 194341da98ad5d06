// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the graph database.
//!
//! Each repository borrows the [`GraphStore`](super::GraphStore) and provides
//! the reads and writes for one entity type. Flows that touch several
//! entities share the `*_in` helpers so they run in one write transaction.

pub mod app_envs;
pub mod apps;
pub mod clusters;
pub mod mints;
pub mod transactions;
pub mod users;

pub use app_envs::AppEnvRepository;
pub use apps::AppRepository;
pub use clusters::ClusterRepository;
pub use mints::MintRepository;
pub use transactions::TransactionRepository;
pub use users::{StoredUser, UserRepository};
