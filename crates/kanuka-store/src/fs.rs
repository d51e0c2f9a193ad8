//! Filesystem implementation of the AccessStore trait.
//!
//! This is the primary backend. Every write goes through
//! [`atomic_write`](crate::atomic::atomic_write) so that a refused or
//! interrupted write never leaves a partial record or grant.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kanuka_core::IdentityId;
use tracing::debug;

use crate::atomic::atomic_write;
use crate::config::{ProjectConfig, ProjectInfo};
use crate::error::{Result, StoreError};
use crate::layout::{identity_from_file_name, ProjectLayout, GRANT_EXT, PUBLIC_KEY_EXT};
use crate::traits::AccessStore;

/// Access state stored under `<root>/.kanuka`.
#[derive(Debug, Clone)]
pub struct FsStore {
    layout: ProjectLayout,
}

impl FsStore {
    /// Use the project rooted at `root`. Does not check initialization.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            layout: ProjectLayout::new(root),
        }
    }

    /// Find the project containing `start`.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let start = start.as_ref();
        ProjectLayout::discover(start)
            .map(|layout| Self { layout })
            .ok_or_else(|| StoreError::NotInitialized(start.to_path_buf()))
    }

    /// Create the directory layout and an empty project config.
    ///
    /// Scaffolding is owned by the caller; this is the minimal state the
    /// grant engine needs to find.
    pub fn init(root: impl Into<PathBuf>, project: ProjectInfo) -> Result<Self> {
        let store = Self::open(root);
        for dir in [store.layout.public_keys_dir(), store.layout.secrets_dir()] {
            fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        }
        store.save_config(&ProjectConfig::new(project))?;
        Ok(store)
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(path: &Path, bytes: &[u8]) -> Result<()> {
        atomic_write(path, bytes).map_err(|e| StoreError::io(path, e))?;
        debug!(path = %path.display(), len = bytes.len(), "wrote file");
        Ok(())
    }

    fn list_dir(dir: &Path, ext: &str) -> Result<Vec<IdentityId>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut ids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(dir, e))?;
            if let Some(id) = identity_from_file_name(&entry.path(), ext) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl AccessStore for FsStore {
    fn is_initialized(&self) -> bool {
        self.layout.is_initialized()
    }

    fn load_config(&self) -> Result<ProjectConfig> {
        let path = self.layout.config_path();
        let bytes = Self::read_optional(&path)?
            .ok_or_else(|| StoreError::NotInitialized(self.layout.root().to_path_buf()))?;
        ProjectConfig::from_json(&bytes)
    }

    fn save_config(&self, config: &ProjectConfig) -> Result<()> {
        Self::write(&self.layout.config_path(), &config.to_json()?)
    }

    fn public_key_path(&self, id: &IdentityId) -> PathBuf {
        ProjectLayout::relative_public_key_path(id)
    }

    fn grant_path(&self, id: &IdentityId) -> PathBuf {
        ProjectLayout::relative_grant_path(id)
    }

    fn read_public_key(&self, id: &IdentityId) -> Result<Option<Vec<u8>>> {
        Self::read_optional(&self.layout.public_key_path(id))
    }

    fn write_public_key(&self, id: &IdentityId, pem: &[u8]) -> Result<()> {
        Self::write(&self.layout.public_key_path(id), pem)
    }

    fn read_grant(&self, id: &IdentityId) -> Result<Option<Vec<u8>>> {
        Self::read_optional(&self.layout.grant_path(id))
    }

    fn write_grant(&self, id: &IdentityId, ciphertext: &[u8]) -> Result<()> {
        Self::write(&self.layout.grant_path(id), ciphertext)
    }

    fn has_grant(&self, id: &IdentityId) -> Result<bool> {
        let path = self.layout.grant_path(id);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn list_grants(&self) -> Result<Vec<IdentityId>> {
        Self::list_dir(&self.layout.secrets_dir(), GRANT_EXT)
    }

    fn list_public_keys(&self) -> Result<Vec<IdentityId>> {
        Self::list_dir(&self.layout.public_keys_dir(), PUBLIC_KEY_EXT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_store() -> (tempfile::TempDir, FsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::init(dir.path(), ProjectInfo::new("demo")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_init_creates_layout() {
        let (_dir, store) = init_store();
        assert!(store.is_initialized());
        assert_eq!(store.load_config().unwrap().project.name, "demo");
    }

    #[test]
    fn test_open_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::open(dir.path());

        assert!(!store.is_initialized());
        assert!(matches!(
            store.load_config(),
            Err(StoreError::NotInitialized(_))
        ));
        assert!(FsStore::discover(dir.path()).is_err());
    }

    #[test]
    fn test_grant_read_write() {
        let (_dir, store) = init_store();
        let id = IdentityId::new();

        assert!(!store.has_grant(&id).unwrap());
        assert_eq!(store.read_grant(&id).unwrap(), None);

        store.write_grant(&id, &[1, 2, 3]).unwrap();
        assert!(store.has_grant(&id).unwrap());
        assert_eq!(store.read_grant(&id).unwrap(), Some(vec![1, 2, 3]));
        assert!(store.layout().grant_path(&id).ends_with(store.grant_path(&id)));
    }

    #[test]
    fn test_identity_table_persists() {
        let (_dir, store) = init_store();
        let id = IdentityId::new();

        let mut table = store.load_identity_table().unwrap();
        table.insert(id, "bob@example.com");
        store.save_identity_table(&table).unwrap();

        let config = store.load_config().unwrap();
        assert_eq!(config.project.name, "demo");
        assert_eq!(config.users.find("bob@example.com"), Some(id));
    }

    #[test]
    fn test_listing_ignores_foreign_files() {
        let (_dir, store) = init_store();
        let a = IdentityId::new();
        let b = IdentityId::new();
        store.write_grant(&a, b"a").unwrap();
        store.write_grant(&b, b"b").unwrap();
        store.write_public_key(&a, b"pem").unwrap();
        fs::write(store.layout().secrets_dir().join("legacy.kanuka"), b"x").unwrap();
        fs::write(store.layout().secrets_dir().join("notes.txt"), b"x").unwrap();

        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(store.list_grants().unwrap(), expected);
        assert_eq!(store.list_public_keys().unwrap(), vec![a]);
    }
}
