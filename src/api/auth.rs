// SPDX-License-Identifier: AGPL-3.0-or-later

//! Login and token verification endpoints.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::{issue_token, verify_admin_password, Auth, Role},
    error::ApiError,
    models::{EngineerLoginRequest, LoginRequest, TokenResponse},
    state::AppState,
};

/// Decoded token summary returned by the verify endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub valid: bool,
    pub user_type: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, description = "Invalid password")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if !verify_admin_password(&state.config, &request.password) {
        tracing::warn!("admin login rejected");
        return Err(ApiError::unauthorized("Invalid password"));
    }

    let token = issue_token(&state.config, "admin", Role::Admin, None)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!("admin login succeeded");
    Ok(Json(TokenResponse::bearer(token, "admin")))
}

#[utoipa::path(
    post,
    path = "/api/auth/engineer/login",
    request_body = EngineerLoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = TokenResponse),
        (status = 401, description = "Unknown developer or wrong password")
    )
)]
pub async fn engineer_login(
    State(state): State<AppState>,
    Json(request): Json<EngineerLoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let repo = state.repo.read().await;
    let directory = repo.load_directory().await?;

    let record = directory
        .find_developer(&request.team_name, &request.developer_name)
        .ok_or_else(|| ApiError::unauthorized("Invalid team or developer"))?;

    // A stored password must match; a developer without one accepts any.
    if let Some(stored) = &record.password {
        let submitted = request.password.as_deref().unwrap_or("");
        if submitted != stored {
            tracing::warn!(
                team = %request.team_name,
                developer = %request.developer_name,
                "engineer login rejected"
            );
            return Err(ApiError::unauthorized("Invalid team or developer"));
        }
    }

    let token = issue_token(
        &state.config,
        &record.name,
        Role::Engineer,
        Some(request.team_name.clone()),
    )
    .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::info!(team = %request.team_name, developer = %record.name, "engineer login succeeded");
    Ok(Json(TokenResponse::bearer(token, "engineer")))
}

#[utoipa::path(
    get,
    path = "/api/auth/verify",
    tag = "Auth",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = VerifyResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn verify(Auth(claims): Auth) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        user_type: claims.role.to_string(),
        subject: claims.sub,
        team: claims.team,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_token;
    use crate::storage::DeveloperRecord;

    async fn seed_team(state: &AppState, team: &str, devs: Vec<DeveloperRecord>) {
        let repo = state.repo.read().await;
        let mut directory = repo.load_directory().await.unwrap();
        directory.insert_team(team, None);
        *directory.roster_mut(team).unwrap() = devs;
        repo.save_directory(&directory).await.unwrap();
    }

    #[tokio::test]
    async fn admin_login_issues_admin_token() {
        let (state, _dir) = AppState::for_tests();

        let Json(token) = admin_login(
            State(state.clone()),
            Json(LoginRequest {
                password: state.config.admin_password.clone(),
            }),
        )
        .await
        .expect("admin login succeeds");

        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.user_type, "admin");

        let claims = verify_token(&state.config, &token.access_token).unwrap();
        assert!(claims.is_admin());
        assert_eq!(claims.sub, "admin");
    }

    #[tokio::test]
    async fn admin_login_rejects_wrong_password() {
        let (state, _dir) = AppState::for_tests();

        let result = admin_login(
            State(state),
            Json(LoginRequest {
                password: "wrong".into(),
            }),
        )
        .await;

        let err = result.expect_err("wrong password rejected");
        assert_eq!(err.status, axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn engineer_login_checks_roster() {
        let (state, _dir) = AppState::for_tests();
        seed_team(
            &state,
            "alpha",
            vec![DeveloperRecord {
                name: "ada".into(),
                email: None,
                link: None,
                password: None,
            }],
        )
        .await;

        let Json(token) = engineer_login(
            State(state.clone()),
            Json(EngineerLoginRequest {
                developer_name: "ada".into(),
                team_name: "alpha".into(),
                password: None,
            }),
        )
        .await
        .expect("engineer login succeeds");

        assert_eq!(token.user_type, "engineer");
        let claims = verify_token(&state.config, &token.access_token).unwrap();
        assert_eq!(claims.team.as_deref(), Some("alpha"));

        // Unknown developer is rejected.
        let result = engineer_login(
            State(state),
            Json(EngineerLoginRequest {
                developer_name: "grace".into(),
                team_name: "alpha".into(),
                password: None,
            }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn engineer_login_enforces_stored_password() {
        let (state, _dir) = AppState::for_tests();
        seed_team(
            &state,
            "alpha",
            vec![DeveloperRecord {
                name: "ada".into(),
                email: None,
                link: None,
                password: Some("hunter2".into()),
            }],
        )
        .await;

        let wrong = engineer_login(
            State(state.clone()),
            Json(EngineerLoginRequest {
                developer_name: "ada".into(),
                team_name: "alpha".into(),
                password: Some("nope".into()),
            }),
        )
        .await;
        assert!(wrong.is_err());

        let right = engineer_login(
            State(state),
            Json(EngineerLoginRequest {
                developer_name: "ada".into(),
                team_name: "alpha".into(),
                password: Some("hunter2".into()),
            }),
        )
        .await;
        assert!(right.is_ok());
    }

    #[tokio::test]
    async fn verify_echoes_claims() {
        let (state, _dir) = AppState::for_tests();
        let token = issue_token(&state.config, "ada", Role::Engineer, Some("alpha".into()))
            .unwrap();
        let claims = verify_token(&state.config, &token).unwrap();

        let Json(info) = verify(Auth(claims)).await;
        assert!(info.valid);
        assert_eq!(info.user_type, "engineer");
        assert_eq!(info.subject, "ada");
        assert_eq!(info.team.as_deref(), Some("alpha"));
    }
}
