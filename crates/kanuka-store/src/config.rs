//! Project and user configuration files.
//!
//! The project config carries the identity table (UUID to human
//! identifier). The user config names the local actor. Both are JSON.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kanuka_core::IdentityId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::atomic::atomic_write;
use crate::error::{Result, StoreError};

/// Project identity, minted at initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub uuid: Uuid,
    pub name: String,
}

impl ProjectInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Mapping from opaque identity to human identifier (usually an email).
///
/// UUIDs are unique by construction. Identifiers are not forced unique
/// across UUIDs; [`IdentityTable::find`] returns the first match in UUID
/// order so lookups stay deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityTable(BTreeMap<IdentityId, String>);

impl IdentityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier recorded for `id`.
    pub fn get(&self, id: &IdentityId) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    /// Identity registered under `identifier`.
    pub fn find(&self, identifier: &str) -> Option<IdentityId> {
        self.0
            .iter()
            .find(|(_, value)| value.as_str() == identifier)
            .map(|(id, _)| *id)
    }

    pub fn contains(&self, id: &IdentityId) -> bool {
        self.0.contains_key(id)
    }

    /// Record `identifier` for `id`, returning the previous value.
    pub fn insert(&mut self, id: IdentityId, identifier: impl Into<String>) -> Option<String> {
        self.0.insert(id, identifier.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IdentityId, &str)> {
        self.0.iter().map(|(id, value)| (id, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Contents of `.kanuka/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectInfo,
    #[serde(default)]
    pub users: IdentityTable,
}

impl ProjectConfig {
    pub fn new(project: ProjectInfo) -> Self {
        Self {
            project,
            users: IdentityTable::new(),
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// The local actor, as recorded in the user's config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub uuid: IdentityId,
    pub email: String,
}

/// Contents of `<config dir>/kanuka/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub user: UserIdentity,
}

impl UserConfig {
    pub fn new(uuid: IdentityId, email: impl Into<String>) -> Self {
        Self {
            user: UserIdentity {
                uuid,
                email: email.into(),
            },
        }
    }

    /// `<config dir>/kanuka/config.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kanuka").join("config.json"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Serialization(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        atomic_write(path, &bytes).map_err(|e| StoreError::io(path, e))
    }
}
