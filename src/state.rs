// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shared application state.
//!
//! The repository sits behind an async `RwLock` so that read-modify-write
//! sequences against the backing documents cannot interleave. The resolved
//! configuration is immutable and needs no lock.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::RuntimeConfig;
use crate::storage::DataRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<RwLock<DataRepository>>,
    pub config: Arc<RuntimeConfig>,
}

impl AppState {
    pub fn new(repo: DataRepository, config: RuntimeConfig) -> Self {
        Self {
            repo: Arc::new(RwLock::new(repo)),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State over a temp-dir local store with a development config.
    /// The `TempDir` must outlive the state.
    pub fn for_tests() -> (Self, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let mut env = std::collections::HashMap::new();
        env.insert("DEVELOPMENT_MODE".to_string(), "true".to_string());
        env.insert(
            "DATA_DIRECTORY".to_string(),
            dir.path().to_string_lossy().to_string(),
        );
        let config = RuntimeConfig::resolve(&env).expect("test config resolves");

        let store = crate::storage::ObjectStore::Local(
            crate::storage::LocalStore::new(dir.path()).expect("local store"),
        );
        (Self::new(DataRepository::new(store), config), dir)
    }
}
