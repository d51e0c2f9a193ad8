//! The Project: a discovered project wired to the local actor.

use std::path::Path;

use kanuka_perms::{AccessEntry, Actor, Confirm, GrantEngine, RegisterReport, RegisterRequest};
use kanuka_store::{FsStore, LocalKeyring, StoreError, UserConfig};
use tracing::debug;

use crate::error::{KanukaError, Result};

/// An on-disk project, seen through the local user's identity.
pub struct Project {
    engine: GrantEngine<FsStore>,
    user: UserConfig,
}

impl Project {
    /// Open the project containing `start` as `user`.
    pub fn open(start: impl AsRef<Path>, user: UserConfig, keyring: LocalKeyring) -> Result<Self> {
        let store = FsStore::discover(start)?;
        debug!(root = %store.layout().root().display(), user = %user.user.email, "opened project");
        let actor = Actor::from_user_config(&user, keyring);
        Ok(Self {
            engine: GrantEngine::new(store, actor),
            user,
        })
    }

    /// Open the project containing the working directory, with the user
    /// config and keyring from their platform default locations.
    pub fn discover() -> Result<Self> {
        let user_path = UserConfig::default_path().ok_or(KanukaError::MissingUserConfig)?;
        let user = UserConfig::load(&user_path).map_err(|e| match e {
            StoreError::Io { ref source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                KanukaError::MissingUserConfig
            }
            other => KanukaError::Store(other),
        })?;
        let keyring = LocalKeyring::default_location().ok_or(KanukaError::NoDataDir)?;
        Self::open(std::env::current_dir()?, user, keyring)
    }

    pub fn root(&self) -> &Path {
        self.engine.store().layout().root()
    }

    pub fn user(&self) -> &UserConfig {
        &self.user
    }

    pub fn engine(&self) -> &GrantEngine<FsStore> {
        &self.engine
    }

    /// Grant the requested target access. See [`GrantEngine::register`].
    pub fn register(&self, request: &RegisterRequest, confirm: &mut dyn Confirm) -> RegisterReport {
        self.engine.register(request, confirm)
    }

    /// Every identity the project knows about, and its access status.
    pub fn access(&self) -> Result<Vec<AccessEntry>> {
        Ok(self.engine.access()?)
    }
}
