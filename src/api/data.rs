// SPDX-License-Identifier: AGPL-3.0-or-later

//! Raw data access: per-team entry logs and exports.

use std::io::Write;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{ApiResponse, EfficiencyEntry, ExportRequest, ExportType},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/data/teams/{team_name}/entries",
    params(("team_name" = String, Path, description = "Team whose entries to list")),
    tag = "Data",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = [EfficiencyEntry]),
        (status = 403, description = "Not your team"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn list_entries(
    Path(team_name): Path<String>,
    Auth(claims): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<EfficiencyEntry>>, ApiError> {
    if !claims.can_access_team(&team_name) {
        return Err(ApiError::forbidden("Not a member of this team"));
    }

    let repo = state.repo.read().await;
    let directory = repo.load_directory().await?;
    if !directory.contains(&team_name) {
        return Err(ApiError::not_found(format!("Team '{team_name}' not found")));
    }

    Ok(Json(repo.load_entries(&team_name).await?))
}

#[utoipa::path(
    delete,
    path = "/api/data/teams/{team_name}/entries/{index}",
    params(
        ("team_name" = String, Path, description = "Team whose entry to delete"),
        ("index" = usize, Path, description = "Zero-based index into the entry log")
    ),
    tag = "Data",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = ApiResponse),
        (status = 403, description = "Not your team"),
        (status = 404, description = "Unknown team or index out of range")
    )
)]
pub async fn delete_entry(
    Path((team_name, index)): Path<(String, usize)>,
    Auth(claims): Auth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse>, ApiError> {
    if !claims.can_access_team(&team_name) {
        return Err(ApiError::forbidden("Not a member of this team"));
    }

    let repo = state.repo.write().await;
    let directory = repo.load_directory().await?;
    if !directory.contains(&team_name) {
        return Err(ApiError::not_found(format!("Team '{team_name}' not found")));
    }
    let mut entries = repo.load_entries(&team_name).await?;

    if index >= entries.len() {
        return Err(ApiError::not_found(format!(
            "No entry at index {index} for team '{team_name}'"
        )));
    }
    let removed = entries.remove(index);
    repo.save_entries(&team_name, &entries).await?;

    tracing::info!(team = %team_name, index, story = %removed.story_id, "entry deleted");
    Ok(Json(ApiResponse::ok(format!("Entry {index} deleted"))))
}

#[utoipa::path(
    post,
    path = "/api/data/export",
    request_body = ExportRequest,
    tag = "Data",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "JSON document or zip archive, as an attachment"),
        (status = 404, description = "A requested team does not exist")
    )
)]
pub async fn export(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    if request.teams.is_empty() {
        return Err(ApiError::bad_request("No teams selected"));
    }

    let repo = state.repo.read().await;
    let directory = repo.load_directory().await?;
    for team_name in &request.teams {
        if !directory.contains(team_name) {
            return Err(ApiError::not_found(format!("Team '{team_name}' not found")));
        }
    }

    let mut exports: Vec<(String, Vec<EfficiencyEntry>)> = Vec::new();
    for team_name in &request.teams {
        exports.push((team_name.clone(), repo.load_entries(team_name).await?));
    }

    let stamp = Utc::now().format("%Y%m%d");
    match request.export_type {
        ExportType::Combined => {
            let teams: serde_json::Map<String, serde_json::Value> = exports
                .into_iter()
                .map(|(name, entries)| {
                    Ok((name, serde_json::to_value(entries)?))
                })
                .collect::<Result<_, serde_json::Error>>()
                .map_err(|e| ApiError::internal(e.to_string()))?;
            let document = serde_json::json!({
                "exported_at": Utc::now(),
                "teams": teams,
            });
            let body = serde_json::to_vec_pretty(&document)
                .map_err(|e| ApiError::internal(e.to_string()))?;

            Ok(attachment(
                body,
                "application/json",
                &format!("efficiency_export_{stamp}.json"),
            ))
        }
        ExportType::Individual => {
            let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            for (name, entries) in exports {
                writer
                    .start_file(format!("{name}_entries.json"), options)
                    .map_err(|e| ApiError::internal(e.to_string()))?;
                let bytes = serde_json::to_vec_pretty(&entries)
                    .map_err(|e| ApiError::internal(e.to_string()))?;
                writer
                    .write_all(&bytes)
                    .map_err(|e| ApiError::internal(e.to_string()))?;
            }
            let body = writer
                .finish()
                .map_err(|e| ApiError::internal(e.to_string()))?
                .into_inner();

            Ok(attachment(
                body,
                "application/zip",
                &format!("efficiency_export_{stamp}.zip"),
            ))
        }
    }
}

fn attachment(body: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}
