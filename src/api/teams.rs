// SPDX-License-Identifier: AGPL-3.0-or-later

//! Team and roster management.
//!
//! Mutations are admin-only. Reads are scoped: an engineer sees their own
//! team, an admin sees every team.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::{AdminOnly, Auth},
    config::RuntimeConfig,
    error::ApiError,
    models::{AddDeveloperRequest, ApiResponse, CreateTeamRequest, RemoveDeveloperRequest, Team},
    state::AppState,
    storage::{DeveloperRecord, TeamRecord},
};

#[derive(Deserialize, IntoParams)]
pub struct TeamQuery {
    pub team_name: String,
}

/// Frontend deep link for an engineer's personal dashboard.
fn engineer_link(config: &RuntimeConfig, team_name: &str, dev_name: &str) -> String {
    format!("{}/engineer?team={team_name}&dev={dev_name}", config.frontend_url)
}

fn to_team(name: &str, record: &TeamRecord) -> Team {
    Team {
        name: name.to_string(),
        description: record.description.clone(),
        developers: record
            .developers
            .iter()
            .cloned()
            .map(DeveloperRecord::into_public)
            .collect(),
    }
}

/// Team names come straight from clients and end up in object keys.
fn validate_team_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::unprocessable("Team name must not be empty"));
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ApiError::unprocessable("Team name contains invalid characters"));
    }
    Ok(())
}

#[utoipa::path(
    get,
    path = "/api/teams/list",
    tag = "Teams",
    security(("bearer_token" = [])),
    responses((status = 200, body = [Team]))
)]
pub async fn list_teams(
    Auth(claims): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Team>>, ApiError> {
    let repo = state.repo.read().await;
    let directory = repo.load_directory().await?;

    let teams = directory
        .0
        .iter()
        .filter(|(name, _)| claims.can_access_team(name))
        .map(|(name, record)| to_team(name, record))
        .collect();

    Ok(Json(teams))
}

#[utoipa::path(
    get,
    path = "/api/teams/{team_name}",
    params(("team_name" = String, Path, description = "Team to fetch")),
    tag = "Teams",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = Team),
        (status = 403, description = "Not your team"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn get_team(
    Path(team_name): Path<String>,
    Auth(claims): Auth,
    State(state): State<AppState>,
) -> Result<Json<Team>, ApiError> {
    if !claims.can_access_team(&team_name) {
        return Err(ApiError::forbidden("Not a member of this team"));
    }

    let repo = state.repo.read().await;
    let directory = repo.load_directory().await?;
    let record = directory
        .team(&team_name)
        .ok_or_else(|| ApiError::not_found(format!("Team '{team_name}' not found")))?;

    Ok(Json(to_team(&team_name, record)))
}

#[utoipa::path(
    post,
    path = "/api/teams/create",
    request_body = CreateTeamRequest,
    tag = "Teams",
    security(("bearer_token" = [])),
    responses(
        (status = 201, body = ApiResponse),
        (status = 409, description = "Team already exists")
    )
)]
pub async fn create_team(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    validate_team_name(&request.team_name)?;

    let repo = state.repo.write().await;
    let mut directory = repo.load_directory().await?;

    if !directory.insert_team(request.team_name.clone(), request.description) {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            format!("Team '{}' already exists", request.team_name),
        ));
    }
    repo.save_directory(&directory).await?;

    tracing::info!(team = %request.team_name, "team created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(format!("Team '{}' created", request.team_name))),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/teams/delete-team",
    params(TeamQuery),
    tag = "Teams",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = ApiResponse),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn delete_team(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(params): Query<TeamQuery>,
) -> Result<Json<ApiResponse>, ApiError> {
    let repo = state.repo.write().await;
    let mut directory = repo.load_directory().await?;

    if !directory.remove_team(&params.team_name) {
        return Err(ApiError::not_found(format!(
            "Team '{}' not found",
            params.team_name
        )));
    }
    repo.save_directory(&directory).await?;

    tracing::info!(team = %params.team_name, "team deleted");
    Ok(Json(ApiResponse::ok(format!(
        "Team '{}' deleted",
        params.team_name
    ))))
}

#[utoipa::path(
    post,
    path = "/api/teams/add-developer",
    request_body = AddDeveloperRequest,
    tag = "Teams",
    security(("bearer_token" = [])),
    responses(
        (status = 201, body = ApiResponse),
        (status = 404, description = "Unknown team"),
        (status = 409, description = "Developer already on the roster")
    )
)]
pub async fn add_developer(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<AddDeveloperRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    if request.dev_name.trim().is_empty() {
        return Err(ApiError::unprocessable("Developer name must not be empty"));
    }

    let repo = state.repo.write().await;
    let mut directory = repo.load_directory().await?;

    if directory
        .find_developer(&request.team_name, &request.dev_name)
        .is_some()
    {
        return Err(ApiError::new(
            StatusCode::CONFLICT,
            format!("Developer '{}' already on the roster", request.dev_name),
        ));
    }

    let link = engineer_link(&state.config, &request.team_name, &request.dev_name);
    let roster = directory
        .roster_mut(&request.team_name)
        .ok_or_else(|| ApiError::not_found(format!("Team '{}' not found", request.team_name)))?;

    roster.push(DeveloperRecord {
        name: request.dev_name.clone(),
        email: request.dev_email,
        link: Some(link.clone()),
        password: request.dev_password,
    });
    repo.save_directory(&directory).await?;

    tracing::info!(team = %request.team_name, developer = %request.dev_name, "developer added");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_data(
            format!("Developer '{}' added", request.dev_name),
            serde_json::json!({ "access_link": link }),
        )),
    ))
}

#[utoipa::path(
    post,
    path = "/api/teams/remove-developer",
    request_body = RemoveDeveloperRequest,
    tag = "Teams",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = ApiResponse),
        (status = 404, description = "Unknown team or developer")
    )
)]
pub async fn remove_developer(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<RemoveDeveloperRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let repo = state.repo.write().await;
    let mut directory = repo.load_directory().await?;

    let roster = directory
        .roster_mut(&request.team_name)
        .ok_or_else(|| ApiError::not_found(format!("Team '{}' not found", request.team_name)))?;

    let before = roster.len();
    roster.retain(|dev| dev.name != request.dev_name);
    if roster.len() == before {
        return Err(ApiError::not_found(format!(
            "Developer '{}' not found on team '{}'",
            request.dev_name, request.team_name
        )));
    }
    repo.save_directory(&directory).await?;

    tracing::info!(team = %request.team_name, developer = %request.dev_name, "developer removed");
    Ok(Json(ApiResponse::ok(format!(
        "Developer '{}' removed",
        request.dev_name
    ))))
}

// Exposed for other handler tests that need a seeded roster.
#[cfg(test)]
pub(crate) async fn seed_team_with_devs(state: &AppState, team: &str, devs: &[&str]) {
    let repo = state.repo.read().await;
    let mut directory = repo.load_directory().await.unwrap();
    directory.insert_team(team, None);
    for dev in devs {
        directory.roster_mut(team).unwrap().push(DeveloperRecord {
            name: dev.to_string(),
            email: None,
            link: None,
            password: None,
        });
    }
    repo.save_directory(&directory).await.unwrap();
}
