// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typed repositories over the object store.
//!
//! Three documents back the whole service: the team directory, the team
//! settings, and one entry log per team. Each is read and written whole;
//! callers serialize their read-modify-write sequences through the state
//! lock.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ObjectStore, StorageResult};
use crate::models::{Developer, EfficiencyEntry, TeamSettings};

/// Object key for the team directory.
pub const TEAMS_CONFIG_KEY: &str = "config/teams_config.json";

/// Object key for the team settings.
pub const TEAM_SETTINGS_KEY: &str = "config/team_settings.json";

/// Object key for a team's entry log.
pub fn entries_key(team_name: &str) -> String {
    format!("teams/{team_name}_entries.json")
}

/// A developer as stored in the team directory.
///
/// Unlike the API-facing [`Developer`], this record may carry a login
/// password. It stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeveloperRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl DeveloperRecord {
    /// Strip credentials for API responses.
    pub fn into_public(self) -> Developer {
        Developer {
            name: self.name,
            email: self.email,
            link: self.link,
        }
    }
}

/// A team as stored in the directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub developers: Vec<DeveloperRecord>,
}

/// The team directory: every team and its roster.
///
/// A `BTreeMap` keeps listings in stable name order regardless of which
/// backend served the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct TeamDirectory(pub BTreeMap<String, TeamRecord>);

impl TeamDirectory {
    pub fn contains(&self, team_name: &str) -> bool {
        self.0.contains_key(team_name)
    }

    pub fn team_names(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn team(&self, team_name: &str) -> Option<&TeamRecord> {
        self.0.get(team_name)
    }

    pub fn roster(&self, team_name: &str) -> Option<&Vec<DeveloperRecord>> {
        self.0.get(team_name).map(|team| &team.developers)
    }

    pub fn roster_mut(&mut self, team_name: &str) -> Option<&mut Vec<DeveloperRecord>> {
        self.0.get_mut(team_name).map(|team| &mut team.developers)
    }

    /// Insert an empty team. Returns false if the name is taken.
    pub fn insert_team(&mut self, team_name: impl Into<String>, description: Option<String>) -> bool {
        let name = team_name.into();
        if self.0.contains_key(&name) {
            return false;
        }
        self.0.insert(
            name,
            TeamRecord {
                description,
                developers: Vec::new(),
            },
        );
        true
    }

    pub fn remove_team(&mut self, team_name: &str) -> bool {
        self.0.remove(team_name).is_some()
    }

    pub fn find_developer(&self, team_name: &str, developer_name: &str) -> Option<&DeveloperRecord> {
        self.0
            .get(team_name)?
            .developers
            .iter()
            .find(|dev| dev.name == developer_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Repository facade over the selected object store.
#[derive(Debug, Clone)]
pub struct DataRepository {
    store: ObjectStore,
}

impl DataRepository {
    pub fn new(store: ObjectStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &ObjectStore {
        &self.store
    }

    /// Load the team directory; absent document means no teams yet.
    pub async fn load_directory(&self) -> StorageResult<TeamDirectory> {
        match self.store.get(TEAMS_CONFIG_KEY).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(TeamDirectory::default()),
        }
    }

    pub async fn save_directory(&self, directory: &TeamDirectory) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(directory)?;
        self.store.put(TEAMS_CONFIG_KEY, &bytes).await
    }

    /// Load team settings; absent document means compiled-in defaults.
    pub async fn load_settings(&self) -> StorageResult<TeamSettings> {
        match self.store.get(TEAM_SETTINGS_KEY).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(TeamSettings::default()),
        }
    }

    pub async fn save_settings(&self, settings: &TeamSettings) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(settings)?;
        self.store.put(TEAM_SETTINGS_KEY, &bytes).await
    }

    /// Load a team's entry log; absent document means no entries yet.
    pub async fn load_entries(&self, team_name: &str) -> StorageResult<Vec<EfficiencyEntry>> {
        match self.store.get(&entries_key(team_name)).await? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn save_entries(
        &self,
        team_name: &str,
        entries: &[EfficiencyEntry],
    ) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        self.store.put(&entries_key(team_name), &bytes).await
    }
}
