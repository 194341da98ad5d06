// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuing and verification (HS256 JWT).

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::{AuthError, AuthenticatedUser, Role, SessionClaims};

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Issues and verifies session tokens with a shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_secs,
        }
    }

    /// Issue a token for a user.
    pub fn issue(&self, user_id: &str, username: &str, role: Role) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let exp = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| AuthError::Internal(format!("token ttl {} out of range", self.ttl_secs)))?;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            iat: now,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// Verify a token and extract the caller.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.validate_aud = false;

        let token_data = decode::<SessionClaims>(token, &self.decoding, &validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            },
        )?;

        Ok(AuthenticatedUser::from_claims(token_data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn issued_token_verifies() {
        let issuer = TokenIssuer::new(SECRET, 3600);
        let token = issuer.issue("user-1", "alice", Role::Admin).unwrap();
        let user = issuer.verify(&token).unwrap();
        assert_eq!(user.user_id, "user-1");
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = TokenIssuer::new(SECRET, 3600);
        let other = TokenIssuer::new(b"another-secret-another-secret-xx", 3600);
        let token = other.issue("user-1", "alice", Role::User).unwrap();
        assert!(matches!(
            issuer.verify(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_role_is_rejected() {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

        let issuer = TokenIssuer::new(SECRET, 3600);
        let token = issuer.issue("user-1", "alice", Role::User).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims["role"] = serde_json::to_value(Role::Admin).unwrap();
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], payload, parts[2]);

        assert!(matches!(
            issuer.verify(&forged),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn out_of_range_ttl_fails_instead_of_wrapping() {
        let issuer = TokenIssuer::new(SECRET, u64::MAX);
        assert!(matches!(
            issuer.issue("user-1", "alice", Role::User),
            Err(AuthError::Internal(_))
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let issuer = TokenIssuer::new(SECRET, 3600);
        assert!(matches!(
            issuer.verify("not.a.token"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let issuer = TokenIssuer::new(SECRET, 3600);
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: "user-1".into(),
            username: "alice".into(),
            role: Role::User,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();
        assert!(matches!(issuer.verify(&token), Err(AuthError::TokenExpired)));
    }
}
