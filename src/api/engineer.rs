// SPDX-License-Identifier: AGPL-3.0-or-later

//! Engineer-facing endpoints: recording entries and the personal dashboard.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::EngineerOrAdmin,
    error::ApiError,
    models::{CreateEntryRequest, EfficiencyEntry, EngineerStats, TeamSettings},
    state::AppState,
    stats,
};

/// How many entries the dashboard lists verbatim.
const RECENT_ENTRIES: usize = 10;

#[derive(Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Team to report on; defaults to the caller's team.
    #[serde(default)]
    pub team: Option<String>,
    /// Developer to report on; defaults to the caller.
    #[serde(default)]
    pub developer: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/engineer/entry",
    request_body = CreateEntryRequest,
    tag = "Engineer",
    security(("bearer_token" = [])),
    responses(
        (status = 201, body = EfficiencyEntry),
        (status = 422, description = "Entry fails validation")
    )
)]
pub async fn create_entry(
    EngineerOrAdmin(claims): EngineerOrAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<EfficiencyEntry>), ApiError> {
    let team_name = claims
        .team
        .clone()
        .ok_or_else(|| ApiError::bad_request("Token carries no team"))?;

    if request.story_id.trim().is_empty() {
        return Err(ApiError::unprocessable("Story id must not be empty"));
    }
    if request.category.trim().is_empty() {
        return Err(ApiError::unprocessable("Category must not be empty"));
    }
    if request.original_estimate <= 0.0 {
        return Err(ApiError::unprocessable("Original estimate must be positive"));
    }
    if request.efficiency_gained < 0.0 {
        return Err(ApiError::unprocessable("Efficiency gained must not be negative"));
    }
    if request.efficiency_gained > request.original_estimate {
        return Err(ApiError::unprocessable(
            "Efficiency gained cannot exceed the original estimate",
        ));
    }

    let (week, week_end) = stats::week_bounds(request.week_date);
    let copilot_used = request.copilot_used.clone();
    let completion_type = if copilot_used == "Yes" {
        "Inline Suggestion"
    } else {
        "Manual"
    };

    let entry = EfficiencyEntry {
        week,
        week_end,
        story_id: request.story_id.trim().to_string(),
        developer_name: claims.sub.clone(),
        team_name: team_name.clone(),
        technology: "General".to_string(),
        original_estimate_hours: request.original_estimate,
        efficiency_gained_hours: request.efficiency_gained,
        efficiency_percentage: stats::efficiency_percentage(
            request.original_estimate,
            request.efficiency_gained,
        ),
        category: request.category,
        area_of_efficiency: request.efficiency_areas.join(", "),
        copilot_used,
        task_type: "General".to_string(),
        completion_type: completion_type.to_string(),
        lines_of_code_saved: None,
        subjective_ease_rating: None,
        review_time_saved_hours: None,
        bugs_prevented: None,
        pr_merged_status: None,
        notes: request.notes.unwrap_or_default(),
        timestamp: Utc::now(),
    };

    let repo = state.repo.write().await;
    let mut entries = repo.load_entries(&team_name).await?;
    entries.push(entry.clone());
    repo.save_entries(&team_name, &entries).await?;

    tracing::info!(
        team = %team_name,
        developer = %entry.developer_name,
        story = %entry.story_id,
        "entry recorded"
    );
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/engineer/dashboard",
    params(DashboardQuery),
    tag = "Engineer",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = EngineerStats),
        (status = 403, description = "Not your team"),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn dashboard(
    EngineerOrAdmin(claims): EngineerOrAdmin,
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<EngineerStats>, ApiError> {
    let team_name = query
        .team
        .or_else(|| claims.team.clone())
        .ok_or_else(|| ApiError::bad_request("No team given"))?;
    if !claims.can_access_team(&team_name) {
        return Err(ApiError::forbidden("Not a member of this team"));
    }
    let developer_name = query.developer.unwrap_or_else(|| claims.sub.clone());

    let repo = state.repo.read().await;
    let directory = repo.load_directory().await?;
    if !directory.contains(&team_name) {
        return Err(ApiError::not_found(format!("Team '{team_name}' not found")));
    }
    let mut entries: Vec<EfficiencyEntry> = repo
        .load_entries(&team_name)
        .await?
        .into_iter()
        .filter(|entry| entry.developer_name == developer_name)
        .collect();
    entries.sort_by_key(|entry| entry.timestamp);

    let usage = stats::usage_stats(&entries);
    let recent_entries = entries
        .iter()
        .rev()
        .take(RECENT_ENTRIES)
        .rev()
        .cloned()
        .collect();

    Ok(Json(EngineerStats {
        developer_name,
        team_name,
        total_time_saved: usage.total_time_saved,
        total_entries: usage.total_entries,
        average_efficiency: usage.average_efficiency,
        recent_entries,
    }))
}

#[utoipa::path(
    get,
    path = "/api/engineer/settings",
    tag = "Engineer",
    security(("bearer_token" = [])),
    responses((status = 200, body = TeamSettings))
)]
pub async fn settings(
    EngineerOrAdmin(_caller): EngineerOrAdmin,
    State(state): State<AppState>,
) -> Result<Json<TeamSettings>, ApiError> {
    let repo = state.repo.read().await;
    Ok(Json(repo.load_settings().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::teams::seed_team_with_devs;
    use crate::auth::{issue_token, verify_token, Claims, Role};
    use chrono::NaiveDate;

    fn engineer(state: &AppState, team: &str, dev: &str) -> Claims {
        let token = issue_token(&state.config, dev, Role::Engineer, Some(team.into())).unwrap();
        verify_token(&state.config, &token).unwrap()
    }

    fn request(week: NaiveDate, estimate: f64, gained: f64) -> CreateEntryRequest {
        CreateEntryRequest {
            week_date: week,
            story_id: "STORY-7".into(),
            original_estimate: estimate,
            efficiency_gained: gained,
            copilot_used: "Yes".into(),
            category: "Bug Fixes".into(),
            efficiency_areas: vec!["Debugging".into(), "Code Analysis".into()],
            notes: Some("fixed the flaky retry".into()),
        }
    }

    #[tokio::test]
    async fn create_entry_normalizes_week_and_persists() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &["ada"]).await;
        let claims = engineer(&state, "alpha", "ada");

        // 2025-06-04 is a Wednesday.
        let week_date = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        let (status, Json(entry)) = create_entry(
            EngineerOrAdmin(claims),
            State(state.clone()),
            Json(request(week_date, 8.0, 2.0)),
        )
        .await
        .expect("entry recorded");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry.week, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(entry.week_end, NaiveDate::from_ymd_opt(2025, 6, 8).unwrap());
        assert_eq!(entry.developer_name, "ada");
        assert_eq!(entry.team_name, "alpha");
        assert!((entry.efficiency_percentage - 25.0).abs() < 1e-9);
        assert_eq!(entry.area_of_efficiency, "Debugging, Code Analysis");
        assert_eq!(entry.completion_type, "Inline Suggestion");

        let stored = state.repo.read().await.load_entries("alpha").await.unwrap();
        assert_eq!(stored, vec![entry]);
    }

    #[tokio::test]
    async fn create_entry_validates_hours() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &["ada"]).await;
        let claims = engineer(&state, "alpha", "ada");
        let week = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        let zero_estimate = create_entry(
            EngineerOrAdmin(claims.clone()),
            State(state.clone()),
            Json(request(week, 0.0, 0.0)),
        )
        .await;
        assert_eq!(
            zero_estimate.expect_err("zero estimate").status,
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let gained_exceeds = create_entry(
            EngineerOrAdmin(claims.clone()),
            State(state.clone()),
            Json(request(week, 4.0, 5.0)),
        )
        .await;
        assert_eq!(
            gained_exceeds.expect_err("gained > estimate").status,
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let mut blank_story = request(week, 4.0, 1.0);
        blank_story.story_id = "  ".into();
        let result = create_entry(
            EngineerOrAdmin(claims),
            State(state),
            Json(blank_story),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn manual_completion_when_no_copilot() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &["ada"]).await;
        let claims = engineer(&state, "alpha", "ada");

        let mut req = request(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(), 8.0, 1.0);
        req.copilot_used = "No".into();
        let (_, Json(entry)) = create_entry(EngineerOrAdmin(claims), State(state), Json(req))
            .await
            .unwrap();
        assert_eq!(entry.completion_type, "Manual");
    }

    #[tokio::test]
    async fn dashboard_filters_by_developer() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &["ada", "grace"]).await;
        let week = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        create_entry(
            EngineerOrAdmin(engineer(&state, "alpha", "ada")),
            State(state.clone()),
            Json(request(week, 8.0, 2.0)),
        )
        .await
        .unwrap();
        create_entry(
            EngineerOrAdmin(engineer(&state, "alpha", "grace")),
            State(state.clone()),
            Json(request(week, 8.0, 4.0)),
        )
        .await
        .unwrap();

        let Json(report) = dashboard(
            EngineerOrAdmin(engineer(&state, "alpha", "ada")),
            State(state.clone()),
            Query(DashboardQuery {
                team: None,
                developer: None,
            }),
        )
        .await
        .expect("dashboard for ada");

        assert_eq!(report.developer_name, "ada");
        assert_eq!(report.total_entries, 1);
        assert_eq!(report.total_time_saved, 2.0);
        assert_eq!(report.recent_entries.len(), 1);

        // An engineer cannot report on another team.
        let foreign = dashboard(
            EngineerOrAdmin(engineer(&state, "alpha", "ada")),
            State(state),
            Query(DashboardQuery {
                team: Some("beta".into()),
                developer: None,
            }),
        )
        .await;
        assert_eq!(foreign.expect_err("foreign team").status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn dashboard_rejects_teams_outside_directory() {
        let (state, _dir) = AppState::for_tests();

        for team in ["ghost", "../../escape"] {
            let result = dashboard(
                EngineerOrAdmin(engineer(&state, team, "ada")),
                State(state.clone()),
                Query(DashboardQuery {
                    team: None,
                    developer: None,
                }),
            )
            .await;
            assert_eq!(
                result.expect_err("unknown team").status,
                StatusCode::NOT_FOUND,
                "{team:?}"
            );
        }
    }

    #[tokio::test]
    async fn settings_default_when_unset() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &["ada"]).await;

        let Json(settings) = settings(
            EngineerOrAdmin(engineer(&state, "alpha", "ada")),
            State(state),
        )
        .await
        .unwrap();
        assert_eq!(settings, TeamSettings::default());
    }
}
