// SPDX-License-Identifier: AGPL-3.0-or-later

//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret. The claims
//! carry who the caller is, their role, and for engineers which team they
//! belong to.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{AuthError, Role};
use crate::config::RuntimeConfig;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// JWT claims carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject: "admin" or the developer's name
    pub sub: String,
    /// Caller's role
    pub role: Role,
    /// Engineer's team; absent for admin tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller may read or write the named team's data.
    pub fn can_access_team(&self, team_name: &str) -> bool {
        self.is_admin() || self.team.as_deref() == Some(team_name)
    }
}

/// Issue a signed token for the given subject.
pub fn issue_token(
    config: &RuntimeConfig,
    subject: &str,
    role: Role,
    team: Option<String>,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: subject.to_string(),
        role,
        team,
        iat: now,
        exp: now + config.token_ttl_minutes * 60,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.signing_secret.as_bytes()),
    )
    .map_err(|e| AuthError::InternalError(e.to_string()))
}

/// Verify a token's signature and expiry and return its claims.
pub fn verify_token(config: &RuntimeConfig, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.signing_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::MalformedToken,
    })?;

    Ok(data.claims)
}

/// Lowercase hex SHA-256 digest of a password.
pub fn sha256_hex(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Check a submitted password against the configured admin password.
///
/// Both sides are hashed before comparison so the configured value never
/// meets the submitted one in plaintext.
pub fn verify_admin_password(config: &RuntimeConfig, submitted: &str) -> bool {
    sha256_hex(submitted) == sha256_hex(&config.admin_password)
}
