// SPDX-License-Identifier: AGPL-3.0-or-later

//! # API Data Models
//!
//! Request and response data structures for the REST API. All types derive
//! `Serialize`/`Deserialize` plus `ToSchema` for OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Auth**: login requests and token responses
//! - **Teams**: team rosters and developer management
//! - **Entries**: recorded efficiency entries and entry creation
//! - **Settings**: team-wide form options (categories, efficiency areas)
//! - **Stats**: dashboard aggregates
//!
//! Stored representations (which may carry credentials) live in the storage
//! layer; these types are what goes over the wire.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Auth Models
// =============================================================================

/// Admin login request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// The admin password.
    pub password: String,
}

/// Engineer login request.
///
/// A developer with no stored password accepts any (or no) password.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EngineerLoginRequest {
    /// Developer name as registered on the team roster.
    pub developer_name: String,
    /// Team the developer belongs to.
    pub team_name: String,
    /// Optional password, checked only when one is stored for the developer.
    #[serde(default)]
    pub password: Option<String>,
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// The signed JWT.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    /// Role encoded in the token (`admin` or `engineer`).
    pub user_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String, user_type: impl Into<String>) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user_type: user_type.into(),
        }
    }
}

// =============================================================================
// Team Models
// =============================================================================

/// A developer on a team roster, as exposed by the API.
///
/// Login passwords are stored server-side only and never serialized here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Developer {
    /// Developer name (unique within a team).
    pub name: String,
    /// Contact email, if recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Pre-built engineer access link for the frontend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A team and its roster.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Team {
    /// Team name (unique).
    pub name: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Developers on the roster.
    pub developers: Vec<Developer>,
}

/// Request to create a new team.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    /// Name of the team to create.
    pub team_name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Request to remove a developer from a team.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemoveDeveloperRequest {
    /// Team to remove the developer from.
    pub team_name: String,
    /// Developer name.
    pub dev_name: String,
}

/// Request to add a developer to a team.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddDeveloperRequest {
    /// Team to add the developer to.
    pub team_name: String,
    /// Developer name.
    pub dev_name: String,
    /// Optional contact email.
    #[serde(default)]
    pub dev_email: Option<String>,
    /// Optional login password for the developer.
    #[serde(default)]
    pub dev_password: Option<String>,
}

// =============================================================================
// Entry Models
// =============================================================================

/// A recorded efficiency entry.
///
/// One entry describes a single story/task where an AI assistant saved time,
/// normalized to the Monday-Sunday week containing the reported date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EfficiencyEntry {
    /// Monday of the week the work falls in.
    pub week: NaiveDate,
    /// Sunday of the same week.
    pub week_end: NaiveDate,
    /// Story or ticket identifier.
    pub story_id: String,
    /// Developer who recorded the entry.
    pub developer_name: String,
    /// Team the entry belongs to.
    pub team_name: String,
    /// Technology involved.
    pub technology: String,
    /// Original estimate for the work, in hours.
    pub original_estimate_hours: f64,
    /// Hours saved by using the assistant.
    pub efficiency_gained_hours: f64,
    /// Saved hours as a percentage of the original estimate.
    pub efficiency_percentage: f64,
    /// Work category (e.g. "Bug Fixes").
    pub category: String,
    /// Comma-joined efficiency areas the assistant helped with.
    pub area_of_efficiency: String,
    /// Whether an AI assistant was used ("Yes"/"No").
    pub copilot_used: String,
    /// Task type.
    pub task_type: String,
    /// How the assistance was delivered.
    pub completion_type: String,
    /// Lines of code the assistant saved, if measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_of_code_saved: Option<i64>,
    /// Subjective 1-5 ease rating, if given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjective_ease_rating: Option<i32>,
    /// Review time saved in hours, if measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_time_saved_hours: Option<f64>,
    /// Bugs prevented, if noted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bugs_prevented: Option<String>,
    /// PR merge status, if noted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_merged_status: Option<String>,
    /// Free-form notes.
    pub notes: String,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Request to record a new efficiency entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateEntryRequest {
    /// Any date within the week the work falls in.
    pub week_date: NaiveDate,
    /// Story or ticket identifier.
    pub story_id: String,
    /// Original estimate in hours; must be positive.
    pub original_estimate: f64,
    /// Hours saved; must not exceed the original estimate.
    pub efficiency_gained: f64,
    /// Whether an AI assistant was used ("Yes"/"No").
    pub copilot_used: String,
    /// Work category.
    pub category: String,
    /// Efficiency areas the assistant helped with.
    pub efficiency_areas: Vec<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Settings Models
// =============================================================================

/// Team-wide settings driving the entry form options.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TeamSettings {
    /// Available work categories.
    pub categories: Vec<String>,
    /// Available efficiency areas.
    pub efficiency_areas: Vec<String>,
    /// Suggested efficiency areas per category.
    pub category_efficiency_mapping: BTreeMap<String, Vec<String>>,
}

impl Default for TeamSettings {
    fn default() -> Self {
        let categories: Vec<String> = [
            "Feature Development",
            "Bug Fixes",
            "Code Review",
            "Testing",
            "Documentation",
            "Refactoring",
            "API Development",
            "Database Work",
        ]
        .map(String::from)
        .into();

        let efficiency_areas: Vec<String> = [
            "Code Generation",
            "Code Completion",
            "API Design",
            "Documentation",
            "Debugging",
            "Code Analysis",
            "Test Writing",
            "Refactoring",
            "Test Data Creation",
            "Query Optimization",
        ]
        .map(String::from)
        .into();

        let mapping: BTreeMap<String, Vec<String>> = [
            ("Feature Development", vec!["Code Generation", "Code Completion", "API Design"]),
            ("Bug Fixes", vec!["Debugging", "Code Analysis"]),
            ("Code Review", vec!["Code Analysis", "Documentation"]),
            ("Testing", vec!["Test Writing", "Test Data Creation"]),
            ("Documentation", vec!["Documentation", "Code Generation"]),
            ("Refactoring", vec!["Refactoring", "Code Analysis"]),
            ("API Development", vec!["API Design", "Code Generation"]),
            ("Database Work", vec!["Query Optimization", "Code Generation"]),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.into_iter().map(String::from).collect()))
        .collect();

        Self {
            categories,
            efficiency_areas,
            category_efficiency_mapping: mapping,
        }
    }
}

/// Partial settings update; absent fields are left unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateSettingsRequest {
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub efficiency_areas: Option<Vec<String>>,
    #[serde(default)]
    pub category_efficiency_mapping: Option<BTreeMap<String, Vec<String>>>,
}

// =============================================================================
// Stats Models
// =============================================================================

/// Aggregate usage statistics for a set of entries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UsageStats {
    /// Total hours saved.
    pub total_time_saved: f64,
    /// Number of entries.
    pub total_entries: usize,
    /// Saved hours over estimated hours, as a percentage.
    pub average_efficiency: f64,
    /// Share of entries where an assistant was used, as a percentage.
    pub copilot_usage_rate: f64,
}

/// Per-team statistics line on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TeamStats {
    pub team_name: String,
    pub total_time_saved: f64,
    pub total_entries: usize,
    pub average_efficiency: f64,
    pub copilot_usage_rate: f64,
    pub developers_count: usize,
}

/// One point on a time-bucketed trend line.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TrendPoint {
    /// Bucket label: `YYYY-MM` for monthly, `YYYY-MM-DD` for daily.
    pub period: String,
    pub time_saved: f64,
    pub entries: usize,
    pub efficiency_rate: f64,
    pub copilot_usage: f64,
}

/// Time saved per category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CategorySlice {
    pub category: String,
    pub time_saved: f64,
    pub entries: usize,
    /// Share of the overall time saved, as a percentage.
    pub percentage: f64,
}

/// Full admin dashboard payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct DashboardStats {
    pub total_time_saved: f64,
    pub total_entries: usize,
    pub average_efficiency: f64,
    pub copilot_usage_rate: f64,
    pub teams_count: usize,
    pub developers_count: usize,
    pub team_stats: Vec<TeamStats>,
    pub monthly_trends: Vec<TrendPoint>,
    pub daily_trends: Vec<TrendPoint>,
    pub category_breakdown: Vec<CategorySlice>,
}

/// Engineer dashboard payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EngineerStats {
    pub developer_name: String,
    pub team_name: String,
    pub total_time_saved: f64,
    pub total_entries: usize,
    pub average_efficiency: f64,
    /// Up to the last 10 entries, newest last.
    pub recent_entries: Vec<EfficiencyEntry>,
}

// =============================================================================
// Data Management Models
// =============================================================================

/// Export format selector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    /// Single JSON document with all selected teams' entries.
    Combined,
    /// Zip archive with one JSON file per team.
    Individual,
}

/// Request to export team data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportRequest {
    /// Teams to include; every name must exist.
    pub teams: Vec<String>,
    /// Export format.
    #[serde(default = "default_export_type")]
    pub export_type: ExportType,
}

fn default_export_type() -> ExportType {
    ExportType::Combined
}

/// Generic success envelope used by mutation endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_consistent() {
        let settings = TeamSettings::default();
        assert_eq!(settings.categories.len(), 8);
        assert_eq!(settings.efficiency_areas.len(), 10);
        // Every category has a suggestion list, and every suggested area is
        // a known efficiency area.
        for category in &settings.categories {
            let areas = settings
                .category_efficiency_mapping
                .get(category)
                .unwrap_or_else(|| panic!("no mapping for {category}"));
            for area in areas {
                assert!(
                    settings.efficiency_areas.contains(area),
                    "{area} missing from efficiency_areas"
                );
            }
        }
    }

    #[test]
    fn token_response_is_bearer() {
        let token = TokenResponse::bearer("jwt".into(), "admin");
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.user_type, "admin");
    }

    #[test]
    fn export_type_defaults_to_combined() {
        let request: ExportRequest = serde_json::from_str(r#"{"teams":["a"]}"#).unwrap();
        assert_eq!(request.export_type, ExportType::Combined);

        let request: ExportRequest =
            serde_json::from_str(r#"{"teams":["a"],"export_type":"individual"}"#).unwrap();
        assert_eq!(request.export_type, ExportType::Individual);
    }

    #[test]
    fn developer_password_never_serialized() {
        // Developer has no password field at all; this guards the invariant
        // at the type level.
        let dev = Developer {
            name: "ada".into(),
            email: None,
            link: None,
        };
        let json = serde_json::to_string(&dev).unwrap();
        assert!(!json.contains("password"));
    }
}
