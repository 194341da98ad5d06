// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Input validation rules.
//!
//! Pure functions over the input models, independent of the transport. Each
//! rule reports the first violation with a message fit for the caller.

use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::models::{AppCreateInput, AppUpdateInput, MintCreateInput, UserCreateInput};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";
const MAX_MINT_DECIMALS: i64 = 18;
const MAX_NAME_LEN: usize = 128;
const MAX_USERNAME_LEN: usize = 64;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a url")]
    NotUrl { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be a base58 public key")]
    NotPublicKey { field: &'static str },

    #[error("{0}")]
    Invalid(String),
}

pub type ValidationResult = Result<(), ValidationError>;

/// Absolute `http`/`https` URL with a host.
pub fn is_url(value: &str) -> bool {
    Url::parse(value.trim())
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// Solana-style public key: 32 to 44 characters of the base58 alphabet.
pub fn is_public_key(value: &str) -> bool {
    (32..=44).contains(&value.len()) && value.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// Canonical form of a username: NFKC, trimmed, lower-cased.
pub fn normalize_username(value: &str) -> String {
    value.nfkc().collect::<String>().trim().to_lowercase()
}

fn require_name(field: &'static str, value: &str) -> ValidationResult {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::Invalid(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn optional_url(field: &'static str, value: Option<&str>) -> ValidationResult {
    match value {
        Some(url) if !is_url(url) => Err(ValidationError::NotUrl { field }),
        _ => Ok(()),
    }
}

pub fn validate_app_create(input: &AppCreateInput) -> ValidationResult {
    require_name("name", &input.name)?;
    if input.index < 0 {
        return Err(ValidationError::Invalid(
            "index must be a non-negative integer".to_string(),
        ));
    }
    Ok(())
}

/// Only fields that are present are checked.
pub fn validate_app_update(input: &AppUpdateInput) -> ValidationResult {
    if let Some(name) = &input.name {
        require_name("name", name)?;
    }
    optional_url("webhookEventUrl", input.webhook_event_url.as_deref())?;
    optional_url("webhookVerifyUrl", input.webhook_verify_url.as_deref())?;
    Ok(())
}

pub fn validate_app_env_name(name: &str) -> ValidationResult {
    require_name("name", name)
}

pub fn validate_mint_create(input: &MintCreateInput) -> ValidationResult {
    if !is_public_key(&input.address) {
        return Err(ValidationError::NotPublicKey { field: "address" });
    }
    if input.cluster_id.trim().is_empty() {
        return Err(ValidationError::Empty { field: "clusterId" });
    }
    if !(0..=MAX_MINT_DECIMALS).contains(&input.decimals) {
        return Err(ValidationError::Invalid(format!(
            "decimals must be between 0 and {MAX_MINT_DECIMALS}"
        )));
    }
    require_name("name", &input.name)?;
    require_name("symbol", &input.symbol)?;
    optional_url("logoUrl", input.logo_url.as_deref())?;
    Ok(())
}

pub fn validate_user_create(input: &UserCreateInput) -> ValidationResult {
    let username = normalize_username(&input.username);
    if username.is_empty() {
        return Err(ValidationError::Empty { field: "username" });
    }
    if username.chars().count() > MAX_USERNAME_LEN
        || username.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(ValidationError::Invalid(format!(
            "username must be at most {MAX_USERNAME_LEN} characters without whitespace"
        )));
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::Invalid(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if let Some(name) = &input.name {
        require_name("name", name)?;
    }
    Ok(())
}
