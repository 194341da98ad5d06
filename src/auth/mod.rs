// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Session authentication and the access gate for the operation endpoint.
//!
//! ## Auth Flow
//!
//! 1. Client calls the public `Login` operation with username and password
//! 2. Server verifies the password tag and issues an HS256 session token
//!    (`sub`, `username`, `role`, `iat`, `exp`)
//! 3. Client sends `Authorization: Bearer <token>` on every request
//! 4. [`RequestContext`] verifies the token; the [`gate`] decides per operation
//!
//! ## Security
//!
//! - Every operation except `Login` requires a session
//! - Any credential problem surfaces as the single `Unauthorized` error
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{AuthenticatedUser, SessionClaims};
pub use error::AuthError;
pub use extractor::RequestContext;
pub use gate::{authorize, Access};
pub use roles::Role;
pub use token::TokenIssuer;
