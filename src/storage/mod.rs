// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Storage Module
//!
//! Persistence is a pass-through to an object store. The backend is chosen
//! once at startup from [`RuntimeConfig`](crate::config::RuntimeConfig):
//! local files under the data directory for development, or an S3 bucket
//! for deployed environments. Everything above the backend speaks in object
//! keys and JSON documents.
//!
//! ## Storage Layout
//!
//! ```text
//! config/teams_config.json    # team directory (rosters, credentials)
//! config/team_settings.json   # entry form options
//! teams/{team}_entries.json   # recorded efficiency entries, per team
//! ```
//!
//! Missing keys read as absent data (empty directory, default settings,
//! no entries), never as errors; only I/O and decoding failures surface.

pub mod object_store;
pub mod repository;

use thiserror::Error;

pub use object_store::{LocalStore, ObjectStore, S3Store};
pub use repository::{DataRepository, DeveloperRecord, TeamDirectory, TeamRecord};

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error from the local backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// S3 request failure (anything but a missing key).
    #[error("S3 error: {0}")]
    S3(String),

    /// A stored document could not be interpreted.
    #[error("corrupt stored document: {0}")]
    Corrupt(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
