//! Local private key storage.
//!
//! Private keys stay on the machine that generated them, outside any
//! project checkout: `<root>/<project uuid>/privkey`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::atomic::atomic_write_with_mode;
use crate::error::{Result, StoreError};

const PRIVATE_KEY_FILE: &str = "privkey";

/// Owner read/write only.
const PRIVATE_KEY_MODE: u32 = 0o600;

/// Directory of per-project private keys for the local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalKeyring {
    root: PathBuf,
}

impl LocalKeyring {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<data dir>/kanuka/keys`, if the platform has a data dir.
    pub fn default_location() -> Option<Self> {
        dirs::data_dir().map(|dir| Self::new(dir.join("kanuka").join("keys")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn private_key_path(&self, project: &Uuid) -> PathBuf {
        self.root
            .join(project.hyphenated().to_string())
            .join(PRIVATE_KEY_FILE)
    }

    /// PEM bytes of the private key for `project`, if present.
    pub fn load_private_key(&self, project: &Uuid) -> Result<Option<Zeroizing<Vec<u8>>>> {
        let path = self.private_key_path(project);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(Zeroizing::new(bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    /// Store PEM bytes for `project`, readable only by the owner on Unix.
    pub fn store_private_key(&self, project: &Uuid, pem: &[u8]) -> Result<PathBuf> {
        let path = self.private_key_path(project);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        atomic_write_with_mode(&path, pem, PRIVATE_KEY_MODE).map_err(|e| StoreError::io(&path, e))?;
        debug!(path = %path.display(), "stored private key");
        Ok(path)
    }
}
