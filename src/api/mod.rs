// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP surface: routing, CORS, and the OpenAPI document.

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Role,
    models::{
        AddDeveloperRequest, ApiResponse, CategorySlice, CreateEntryRequest, CreateTeamRequest,
        DashboardStats, Developer, EfficiencyEntry, EngineerLoginRequest, EngineerStats,
        ExportRequest, ExportType, LoginRequest, RemoveDeveloperRequest, Team, TeamSettings,
        TeamStats, TokenResponse, TrendPoint, UpdateSettingsRequest, UsageStats,
    },
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod data;
pub mod engineer;
pub mod health;
pub mod teams;

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/auth/engineer/login", post(auth::engineer_login))
        .route("/auth/verify", get(auth::verify))
        .route("/teams/list", get(teams::list_teams))
        .route("/teams/create", post(teams::create_team))
        .route("/teams/add-developer", post(teams::add_developer))
        .route("/teams/remove-developer", post(teams::remove_developer))
        .route("/teams/delete-team", delete(teams::delete_team))
        .route("/teams/{team_name}", get(teams::get_team))
        .route("/engineer/entry", post(engineer::create_entry))
        .route("/engineer/dashboard", get(engineer::dashboard))
        .route("/engineer/settings", get(engineer::settings))
        .route("/admin/dashboard", get(admin::dashboard))
        .route(
            "/admin/settings",
            get(admin::get_settings).put(admin::update_settings),
        )
        .route("/admin/teams/{team_name}/data", get(admin::team_data))
        .route("/admin/debug/storage", get(admin::debug_storage))
        .route("/data/teams/{team_name}/entries", get(data::list_entries))
        .route(
            "/data/teams/{team_name}/entries/{index}",
            delete(data::delete_entry),
        )
        .route("/data/export", post(data::export))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(cors)
}

/// Build the CORS layer from the configured origin list.
///
/// Origins that do not parse as header values are skipped with a warning
/// rather than taking the server down.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::admin_login,
        auth::engineer_login,
        auth::verify,
        teams::list_teams,
        teams::get_team,
        teams::create_team,
        teams::delete_team,
        teams::add_developer,
        teams::remove_developer,
        engineer::create_entry,
        engineer::dashboard,
        engineer::settings,
        admin::dashboard,
        admin::get_settings,
        admin::update_settings,
        admin::team_data,
        admin::debug_storage,
        data::list_entries,
        data::delete_entry,
        data::export
    ),
    components(
        schemas(
            health::HealthResponse,
            auth::VerifyResponse,
            admin::TeamData,
            admin::StorageDebug,
            LoginRequest,
            EngineerLoginRequest,
            TokenResponse,
            Role,
            Developer,
            Team,
            CreateTeamRequest,
            AddDeveloperRequest,
            RemoveDeveloperRequest,
            EfficiencyEntry,
            CreateEntryRequest,
            TeamSettings,
            UpdateSettingsRequest,
            UsageStats,
            TeamStats,
            TrendPoint,
            CategorySlice,
            DashboardStats,
            EngineerStats,
            ExportType,
            ExportRequest,
            ApiResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Auth", description = "Logins and token verification"),
        (name = "Teams", description = "Team and roster management"),
        (name = "Engineer", description = "Entry recording and personal dashboards"),
        (name = "Admin", description = "Global dashboards, settings, diagnostics"),
        (name = "Data", description = "Raw entry access and exports")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_route_responds() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_rejects_anonymous() {
        let (state, _dir) = AppState::for_tests();
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/admin/dashboard")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn cors_layer_skips_bad_origins() {
        // Building the layer must not panic even with garbage in the list.
        let _ = cors_layer(&["http://localhost:3000".to_string(), "\u{0}bad".to_string()]);
    }

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/health"));
        assert!(doc.paths.paths.contains_key("/api/data/export"));
    }
}
