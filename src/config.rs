// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Runtime Configuration
//!
//! This module resolves all runtime configuration from environment variables
//! once at startup. The resulting [`RuntimeConfig`] is immutable and shared
//! across every request task; nothing else in the codebase reads the
//! environment for configuration.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `USE_S3` | Store data in S3 instead of the local filesystem | `false` |
//! | `S3_BUCKET_NAME` | Bucket for the S3 backend | Required when `USE_S3` |
//! | `AWS_REGION` | Region for the S3 backend | `us-east-1` |
//! | `DATA_DIRECTORY` | Root directory for the local backend | `data` |
//! | `CORS_ORIGINS` | Comma-separated list of allowed origins | empty |
//! | `FRONTEND_URL` | Base URL used to build engineer access links | `http://localhost:5173` |
//! | `JWT_SECRET` | HS256 signing secret for access tokens | dev placeholder |
//! | `ADMIN_PASSWORD` | Admin login password | `admin123` |
//! | `ACCESS_TOKEN_EXPIRE_MINUTES` | Access token lifetime | `1440` |
//! | `DEVELOPMENT_MODE` | Relax production-only checks | `false` |
//! | `DEBUG` | Enable debug behavior | `false` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//!
//! Resolution failures are fatal: the process must not start serving
//! requests with a broken or insecure configuration.

use std::collections::HashMap;

use thiserror::Error;

/// The development placeholder signing secret.
///
/// Accepted only when `DEVELOPMENT_MODE` is enabled; running production
/// with this value is a startup error.
pub const DEV_SECRET_PLACEHOLDER: &str = "dev-secret-key-change-in-production";

/// Default bind port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 8080;

/// Default frontend base URL (local Vite dev server).
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";

/// Configuration resolution error. Always fatal at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A boolean variable held something other than true/1/false/0.
    #[error("{name} must be \"true\"/\"1\" or \"false\"/\"0\", got {value:?}")]
    InvalidBool { name: &'static str, value: String },

    /// `PORT` was non-numeric or outside [1, 65535].
    #[error("PORT must be an integer in [1, 65535], got {0:?}")]
    InvalidPort(String),

    /// `USE_S3` is enabled but no bucket was provided.
    #[error("S3_BUCKET_NAME must be set and non-empty when USE_S3 is enabled")]
    MissingBucketName,

    /// A required variable resolved to an empty string.
    #[error("{0} must not be empty")]
    EmptyValue(&'static str),

    /// `ACCESS_TOKEN_EXPIRE_MINUTES` was not a positive integer.
    #[error("ACCESS_TOKEN_EXPIRE_MINUTES must be a positive integer, got {0:?}")]
    InvalidTokenTtl(String),

    /// The signing secret is still the development placeholder outside
    /// development mode.
    #[error(
        "JWT_SECRET is the development placeholder; set a real secret or enable DEVELOPMENT_MODE"
    )]
    InsecureSigningSecret,
}

/// Resolved, immutable startup configuration for the service process.
///
/// Constructed once via [`RuntimeConfig::resolve`] (or
/// [`RuntimeConfig::from_env`]) and never mutated afterwards, so it is safe
/// to share behind an `Arc` without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Whether to use the S3 object-store backend instead of local files.
    pub use_remote_storage: bool,
    /// Target bucket; always `Some` when `use_remote_storage` is true.
    pub bucket_name: Option<String>,
    /// AWS region for the S3 backend.
    pub aws_region: String,
    /// Root directory for the local storage backend.
    pub data_directory: String,
    /// Origins permitted to make cross-origin requests, in input order.
    pub allowed_origins: Vec<String>,
    /// Server bind address.
    pub bind_host: String,
    /// Server bind port.
    pub bind_port: u16,
    /// Externally reachable frontend URL, used verbatim to build links.
    pub frontend_url: String,
    /// HS256 signing secret for access tokens.
    pub signing_secret: String,
    /// Admin login password (compared by SHA-256 digest).
    pub admin_password: String,
    /// Access token lifetime in minutes.
    pub token_ttl_minutes: i64,
    /// Development mode: relaxes the insecure-secret check.
    pub development_mode: bool,
    /// Debug toggle.
    pub debug: bool,
}

impl RuntimeConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(&std::env::vars().collect())
    }

    /// Resolve configuration from an explicit environment mapping.
    ///
    /// Deterministic and side-effect free apart from a warning when the
    /// resolved CORS origin list is empty.
    pub fn resolve(env: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let development_mode = parse_bool(env, "DEVELOPMENT_MODE")?;
        let debug = parse_bool(env, "DEBUG")?;

        let use_remote_storage = parse_bool(env, "USE_S3")?;
        let bucket_name = match env.get("S3_BUCKET_NAME").map(|s| s.trim()) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => None,
        };
        if use_remote_storage && bucket_name.is_none() {
            return Err(ConfigError::MissingBucketName);
        }

        let allowed_origins = parse_origins(env.get("CORS_ORIGINS").map(String::as_str));
        if allowed_origins.is_empty() {
            tracing::warn!("CORS_ORIGINS is empty; no cross-origin requests will be permitted");
        }

        let bind_host = env
            .get("HOST")
            .cloned()
            .unwrap_or_else(|| "0.0.0.0".to_string());
        if bind_host.is_empty() {
            return Err(ConfigError::EmptyValue("HOST"));
        }

        let bind_port = match env.get("PORT") {
            Some(raw) => parse_port(raw)?,
            None => DEFAULT_PORT,
        };

        let frontend_url = env
            .get("FRONTEND_URL")
            .cloned()
            .unwrap_or_else(|| DEFAULT_FRONTEND_URL.to_string());
        if frontend_url.is_empty() {
            return Err(ConfigError::EmptyValue("FRONTEND_URL"));
        }

        let signing_secret = env
            .get("JWT_SECRET")
            .cloned()
            .unwrap_or_else(|| DEV_SECRET_PLACEHOLDER.to_string());
        if !development_mode && signing_secret == DEV_SECRET_PLACEHOLDER {
            return Err(ConfigError::InsecureSigningSecret);
        }

        let admin_password = env
            .get("ADMIN_PASSWORD")
            .cloned()
            .unwrap_or_else(|| "admin123".to_string());

        let token_ttl_minutes = match env.get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            None => 1440,
            Some(raw) => {
                let ttl: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidTokenTtl(raw.clone()))?;
                if ttl <= 0 {
                    return Err(ConfigError::InvalidTokenTtl(raw.clone()));
                }
                ttl
            }
        };

        Ok(Self {
            use_remote_storage,
            bucket_name,
            aws_region: env
                .get("AWS_REGION")
                .cloned()
                .unwrap_or_else(|| "us-east-1".to_string()),
            data_directory: env
                .get("DATA_DIRECTORY")
                .cloned()
                .unwrap_or_else(|| "data".to_string()),
            allowed_origins,
            bind_host,
            bind_port,
            frontend_url,
            signing_secret,
            admin_password,
            token_ttl_minutes,
            development_mode,
            debug,
        })
    }
}

/// Parse a boolean variable: `true`/`1` and `false`/`0`, case-insensitive.
/// Absent means false. Anything else is an error.
fn parse_bool(env: &HashMap<String, String>, name: &'static str) -> Result<bool, ConfigError> {
    match env.get(name) {
        None => Ok(false),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(ConfigError::InvalidBool {
                name,
                value: raw.clone(),
            }),
        },
    }
}

/// Parse `PORT` into the valid port range.
fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let port: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidPort(raw.to_string()))?;
    if (1..=65535).contains(&port) {
        Ok(port as u16)
    } else {
        Err(ConfigError::InvalidPort(raw.to_string()))
    }
}

/// Split a comma-separated origin list, trimming whitespace and discarding
/// empty entries. Order is preserved.
fn parse_origins(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
