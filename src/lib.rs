// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mogami API - Application Graph Service
//!
//! Serves the cluster / app / environment / mint graph through named
//! operations on a single `POST /graphql` endpoint. Every operation is gated by
//! an access level and, for App-scoped data, by the caller's membership.
//!
//! ## Modules
//!
//! - `api` - HTTP surface (Axum router, operation endpoint, health checks)
//! - `auth` - Session tokens, password hashing and the access gate
//! - `operations` - Operation registry, queries and mutations
//! - `storage` - Embedded graph store (redb) and repositories
//! - `config` - Environment-driven configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod operations;
pub mod state;
pub mod storage;
pub mod validation;
