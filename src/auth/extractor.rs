// SPDX-License-Identifier: AGPL-3.0-or-later

//! Axum extractors for authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(claims): Auth) -> impl IntoResponse {
//!     // claims carries the caller's identity and role
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{token, AuthError, Claims, Role};
use crate::state::AppState;

/// Extractor for any authenticated caller.
pub struct Auth(pub Claims);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let claims = token::verify_token(&state.config, token)?;
        Ok(Auth(claims))
    }
}

/// Extractor that requires the admin role.
pub struct AdminOnly(pub Claims);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(claims) = Auth::from_request_parts(parts, state).await?;

        if !claims.role.has_privilege(Role::Admin) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(claims))
    }
}

/// Extractor for engineer endpoints. Admins pass as well.
pub struct EngineerOrAdmin(pub Claims);

impl FromRequestParts<AppState> for EngineerOrAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(claims) = Auth::from_request_parts(parts, state).await?;

        if !claims.role.has_privilege(Role::Engineer) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(EngineerOrAdmin(claims))
    }
}
