// SPDX-License-Identifier: AGPL-3.0-or-later

//! Admin endpoints: the global dashboard, settings, raw team data, and
//! storage diagnostics.

use axum::{extract::Path, extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    auth::AdminOnly,
    error::ApiError,
    models::{DashboardStats, EfficiencyEntry, TeamSettings, TeamStats, UpdateSettingsRequest},
    state::AppState,
    stats,
};

/// Window for the daily trend line.
const DAILY_TREND_DAYS: u64 = 30;

/// Raw per-team payload for admin inspection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamData {
    pub team_name: String,
    pub developers: Vec<String>,
    pub entries: Vec<EfficiencyEntry>,
}

/// Storage backend diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StorageDebug {
    /// Backend description, e.g. `local:/var/data` or `s3:my-bucket`.
    pub backend: String,
    /// Whether the backend answered a probe.
    pub reachable: bool,
    /// Whether the team directory document exists.
    pub teams_config_present: bool,
    /// Whether the settings document exists.
    pub team_settings_present: bool,
}

#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    security(("bearer_token" = [])),
    responses((status = 200, body = DashboardStats))
)]
pub async fn dashboard(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, ApiError> {
    let repo = state.repo.read().await;
    let directory = repo.load_directory().await?;

    let mut all_entries: Vec<EfficiencyEntry> = Vec::new();
    let mut team_stats: Vec<TeamStats> = Vec::new();
    let mut developers_count = 0;

    for (team_name, record) in &directory.0 {
        let entries = repo.load_entries(team_name).await?;
        team_stats.push(stats::team_stats(team_name, &entries));
        developers_count += record.developers.len();
        all_entries.extend(entries);
    }

    let usage = stats::usage_stats(&all_entries);
    let today = Utc::now().date_naive();

    Ok(Json(DashboardStats {
        total_time_saved: usage.total_time_saved,
        total_entries: usage.total_entries,
        average_efficiency: usage.average_efficiency,
        copilot_usage_rate: usage.copilot_usage_rate,
        teams_count: directory.len(),
        developers_count,
        team_stats,
        monthly_trends: stats::monthly_trends(&all_entries),
        daily_trends: stats::daily_trends(&all_entries, today, DAILY_TREND_DAYS),
        category_breakdown: stats::category_breakdown(&all_entries),
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/settings",
    tag = "Admin",
    security(("bearer_token" = [])),
    responses((status = 200, body = TeamSettings))
)]
pub async fn get_settings(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<TeamSettings>, ApiError> {
    let repo = state.repo.read().await;
    Ok(Json(repo.load_settings().await?))
}

#[utoipa::path(
    put,
    path = "/api/admin/settings",
    request_body = UpdateSettingsRequest,
    tag = "Admin",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = TeamSettings),
        (status = 422, description = "Settings fail validation")
    )
)]
pub async fn update_settings(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<TeamSettings>, ApiError> {
    let repo = state.repo.write().await;
    let mut settings = repo.load_settings().await?;

    if let Some(categories) = request.categories {
        if categories.is_empty() {
            return Err(ApiError::unprocessable("Categories must not be empty"));
        }
        settings.categories = categories;
    }
    if let Some(areas) = request.efficiency_areas {
        if areas.is_empty() {
            return Err(ApiError::unprocessable("Efficiency areas must not be empty"));
        }
        settings.efficiency_areas = areas;
    }
    if let Some(mapping) = request.category_efficiency_mapping {
        settings.category_efficiency_mapping = mapping;
    }

    repo.save_settings(&settings).await?;
    tracing::info!("team settings updated");
    Ok(Json(settings))
}

#[utoipa::path(
    get,
    path = "/api/admin/teams/{team_name}/data",
    params(("team_name" = String, Path, description = "Team to inspect")),
    tag = "Admin",
    security(("bearer_token" = [])),
    responses(
        (status = 200, body = TeamData),
        (status = 404, description = "Unknown team")
    )
)]
pub async fn team_data(
    AdminOnly(_admin): AdminOnly,
    Path(team_name): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<TeamData>, ApiError> {
    let repo = state.repo.read().await;
    let directory = repo.load_directory().await?;

    let record = directory
        .team(&team_name)
        .ok_or_else(|| ApiError::not_found(format!("Team '{team_name}' not found")))?;
    let entries = repo.load_entries(&team_name).await?;

    Ok(Json(TeamData {
        team_name,
        developers: record.developers.iter().map(|dev| dev.name.clone()).collect(),
        entries,
    }))
}

#[utoipa::path(
    get,
    path = "/api/admin/debug/storage",
    tag = "Admin",
    security(("bearer_token" = [])),
    responses((status = 200, body = StorageDebug))
)]
pub async fn debug_storage(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<StorageDebug>, ApiError> {
    let repo = state.repo.read().await;
    let store = repo.store();

    let reachable = match store.probe().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "storage probe failed");
            false
        }
    };

    let teams_config_present = store
        .get(crate::storage::repository::TEAMS_CONFIG_KEY)
        .await?
        .is_some();
    let team_settings_present = store
        .get(crate::storage::repository::TEAM_SETTINGS_KEY)
        .await?
        .is_some();

    Ok(Json(StorageDebug {
        backend: store.describe(),
        reachable,
        teams_config_present,
        team_settings_present,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::engineer::{self, DashboardQuery};
    use crate::api::teams::seed_team_with_devs;
    use crate::auth::{issue_token, verify_token, Claims, Role};
    use crate::models::CreateEntryRequest;
    use chrono::NaiveDate;

    fn admin(state: &AppState) -> Claims {
        let token = issue_token(&state.config, "admin", Role::Admin, None).unwrap();
        verify_token(&state.config, &token).unwrap()
    }

    fn engineer_claims(state: &AppState, team: &str, dev: &str) -> Claims {
        let token = issue_token(&state.config, dev, Role::Engineer, Some(team.into())).unwrap();
        verify_token(&state.config, &token).unwrap()
    }

    async fn record_entry(state: &AppState, team: &str, dev: &str, estimate: f64, gained: f64) {
        engineer::create_entry(
            crate::auth::EngineerOrAdmin(engineer_claims(state, team, dev)),
            State(state.clone()),
            Json(CreateEntryRequest {
                week_date: NaiveDate::from_ymd_opt(2025, 6, 4).unwrap(),
                story_id: "STORY-1".into(),
                original_estimate: estimate,
                efficiency_gained: gained,
                copilot_used: "Yes".into(),
                category: "Bug Fixes".into(),
                efficiency_areas: vec!["Debugging".into()],
                notes: None,
            }),
        )
        .await
        .expect("entry recorded");
    }

    #[tokio::test]
    async fn empty_dashboard_is_zeroed() {
        let (state, _dir) = AppState::for_tests();

        let Json(board) = dashboard(AdminOnly(admin(&state)), State(state))
            .await
            .unwrap();
        assert_eq!(board.total_entries, 0);
        assert_eq!(board.teams_count, 0);
        assert!(board.team_stats.is_empty());
        assert!(board.monthly_trends.is_empty());
        assert!(board.daily_trends.is_empty());
        assert!(board.category_breakdown.is_empty());
    }

    #[tokio::test]
    async fn dashboard_aggregates_across_teams() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &["ada"]).await;
        seed_team_with_devs(&state, "beta", &["grace", "lin"]).await;

        record_entry(&state, "alpha", "ada", 8.0, 2.0).await;
        record_entry(&state, "beta", "grace", 4.0, 1.0).await;

        let Json(board) = dashboard(AdminOnly(admin(&state)), State(state))
            .await
            .unwrap();
        assert_eq!(board.teams_count, 2);
        assert_eq!(board.developers_count, 3);
        assert_eq!(board.total_entries, 2);
        assert_eq!(board.total_time_saved, 3.0);
        assert_eq!(board.team_stats.len(), 2);
        assert_eq!(board.monthly_trends.len(), 1);
        assert_eq!(board.category_breakdown.len(), 1);
        assert_eq!(board.category_breakdown[0].category, "Bug Fixes");
    }

    #[tokio::test]
    async fn settings_update_is_partial() {
        let (state, _dir) = AppState::for_tests();

        let Json(updated) = update_settings(
            AdminOnly(admin(&state)),
            State(state.clone()),
            Json(UpdateSettingsRequest {
                categories: Some(vec!["Pairing".into()]),
                efficiency_areas: None,
                category_efficiency_mapping: None,
            }),
        )
        .await
        .expect("settings updated");

        assert_eq!(updated.categories, vec!["Pairing".to_string()]);
        // Untouched fields keep their defaults.
        assert_eq!(updated.efficiency_areas, TeamSettings::default().efficiency_areas);

        let Json(reloaded) = get_settings(AdminOnly(admin(&state)), State(state))
            .await
            .unwrap();
        assert_eq!(reloaded, updated);
    }

    #[tokio::test]
    async fn settings_update_rejects_empty_lists() {
        let (state, _dir) = AppState::for_tests();

        let result = update_settings(
            AdminOnly(admin(&state)),
            State(state),
            Json(UpdateSettingsRequest {
                categories: Some(vec![]),
                efficiency_areas: None,
                category_efficiency_mapping: None,
            }),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn team_data_returns_roster_and_entries() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &["ada"]).await;
        record_entry(&state, "alpha", "ada", 8.0, 2.0).await;

        let Json(data) = team_data(
            AdminOnly(admin(&state)),
            Path("alpha".into()),
            State(state.clone()),
        )
        .await
        .expect("team data");
        assert_eq!(data.developers, vec!["ada".to_string()]);
        assert_eq!(data.entries.len(), 1);

        let missing = team_data(AdminOnly(admin(&state)), Path("nope".into()), State(state)).await;
        assert!(missing.is_err());
    }

    #[tokio::test]
    async fn debug_storage_reports_local_backend() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &[]).await;

        let Json(debug) = debug_storage(AdminOnly(admin(&state)), State(state))
            .await
            .unwrap();
        assert!(debug.backend.starts_with("local:"));
        assert!(debug.reachable);
        assert!(debug.teams_config_present);
        assert!(!debug.team_settings_present);
    }

    #[tokio::test]
    async fn engineer_dashboard_reachable_by_admin_with_query() {
        let (state, _dir) = AppState::for_tests();
        seed_team_with_devs(&state, "alpha", &["ada"]).await;
        record_entry(&state, "alpha", "ada", 8.0, 2.0).await;

        let Json(report) = engineer::dashboard(
            crate::auth::EngineerOrAdmin(admin(&state)),
            State(state),
            axum::extract::Query(DashboardQuery {
                team: Some("alpha".into()),
                developer: Some("ada".into()),
            }),
        )
        .await
        .expect("admin can inspect any engineer");
        assert_eq!(report.total_entries, 1);
    }
}
