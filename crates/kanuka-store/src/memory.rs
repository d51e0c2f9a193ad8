//! In-memory implementation of the AccessStore trait.
//!
//! This is primarily for testing. It has the same semantics as the
//! filesystem store but keeps everything in memory, and it can be told to
//! refuse writes to one kind of file to exercise failure paths.

use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use kanuka_core::IdentityId;

use crate::config::{ProjectConfig, ProjectInfo};
use crate::error::{Result, StoreError};
use crate::layout::ProjectLayout;
use crate::traits::AccessStore;

/// Kind of file a [`MemoryStore`] can be told to refuse writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WriteFault {
    PublicKeys,
    Grants,
    Config,
}

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    config: Option<ProjectConfig>,
    public_keys: BTreeMap<IdentityId, Vec<u8>>,
    grants: BTreeMap<IdentityId, Vec<u8>>,
    faults: BTreeSet<WriteFault>,
    /// Successful writes, in order, as relative paths.
    writes: Vec<PathBuf>,
}

impl MemoryStore {
    /// An initialized, empty project.
    pub fn new(project: ProjectInfo) -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                config: Some(ProjectConfig::new(project)),
                ..Default::default()
            }),
        }
    }

    /// A store with no project at all.
    pub fn uninitialized() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Make every later write of `fault`'s kind fail with permission denied.
    pub fn fail_writes(&self, fault: WriteFault) -> Result<()> {
        self.write_inner()?.faults.insert(fault);
        Ok(())
    }

    /// Undo [`fail_writes`](Self::fail_writes).
    pub fn clear_faults(&self) -> Result<()> {
        self.write_inner()?.faults.clear();
        Ok(())
    }

    /// Relative paths of every successful write so far.
    pub fn writes(&self) -> Result<Vec<PathBuf>> {
        Ok(self.read_inner()?.writes.clone())
    }

    fn read_inner(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write_inner(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

impl MemoryStoreInner {
    fn check_fault(&self, fault: WriteFault, path: &Path) -> Result<()> {
        if self.faults.contains(&fault) {
            return Err(StoreError::io(
                path,
                io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        Ok(())
    }
}

impl AccessStore for MemoryStore {
    fn is_initialized(&self) -> bool {
        self.read_inner()
            .map(|inner| inner.config.is_some())
            .unwrap_or(false)
    }

    fn load_config(&self) -> Result<ProjectConfig> {
        self.read_inner()?
            .config
            .clone()
            .ok_or_else(|| StoreError::NotInitialized(PathBuf::from("<memory>")))
    }

    fn save_config(&self, config: &ProjectConfig) -> Result<()> {
        let path = self.config_path();
        let mut inner = self.write_inner()?;
        inner.check_fault(WriteFault::Config, &path)?;
        inner.config = Some(config.clone());
        inner.writes.push(path);
        Ok(())
    }

    fn public_key_path(&self, id: &IdentityId) -> PathBuf {
        ProjectLayout::relative_public_key_path(id)
    }

    fn grant_path(&self, id: &IdentityId) -> PathBuf {
        ProjectLayout::relative_grant_path(id)
    }

    fn read_public_key(&self, id: &IdentityId) -> Result<Option<Vec<u8>>> {
        Ok(self.read_inner()?.public_keys.get(id).cloned())
    }

    fn write_public_key(&self, id: &IdentityId, pem: &[u8]) -> Result<()> {
        let path = self.public_key_path(id);
        let mut inner = self.write_inner()?;
        inner.check_fault(WriteFault::PublicKeys, &path)?;
        inner.public_keys.insert(*id, pem.to_vec());
        inner.writes.push(path);
        Ok(())
    }

    fn read_grant(&self, id: &IdentityId) -> Result<Option<Vec<u8>>> {
        Ok(self.read_inner()?.grants.get(id).cloned())
    }

    fn write_grant(&self, id: &IdentityId, ciphertext: &[u8]) -> Result<()> {
        let path = self.grant_path(id);
        let mut inner = self.write_inner()?;
        inner.check_fault(WriteFault::Grants, &path)?;
        inner.grants.insert(*id, ciphertext.to_vec());
        inner.writes.push(path);
        Ok(())
    }

    fn list_grants(&self) -> Result<Vec<IdentityId>> {
        Ok(self.read_inner()?.grants.keys().copied().collect())
    }

    fn list_public_keys(&self) -> Result<Vec<IdentityId>> {
        Ok(self.read_inner()?.public_keys.keys().copied().collect())
    }
}
