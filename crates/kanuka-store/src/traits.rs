//! AccessStore trait: the abstract interface for project access state.
//!
//! The grant engine only talks to this trait. Implementations include the
//! filesystem layout (primary) and an in-memory store (for tests).

use std::path::PathBuf;

use kanuka_core::IdentityId;

use crate::config::{IdentityTable, ProjectConfig};
use crate::error::Result;
use crate::layout::{CONFIG_FILE, KANUKA_DIR};

/// Durable access state for one project.
///
/// # Design Notes
///
/// - **Grant is authoritative**: a grant for an identity means it holds
///   the project key; no grant means no access.
/// - **Whole-file writes**: `write_public_key` and `write_grant` either
///   replace the file completely or leave the previous bytes in place.
/// - **Paths are relative** to the project root, suitable for reports.
pub trait AccessStore {
    /// Layout exists and the project config is present.
    fn is_initialized(&self) -> bool;

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration
    // ─────────────────────────────────────────────────────────────────────────

    fn load_config(&self) -> Result<ProjectConfig>;

    fn save_config(&self, config: &ProjectConfig) -> Result<()>;

    /// Where the project config (and its identity table) lives.
    fn config_path(&self) -> PathBuf {
        PathBuf::from(KANUKA_DIR).join(CONFIG_FILE)
    }

    fn load_identity_table(&self) -> Result<IdentityTable> {
        Ok(self.load_config()?.users)
    }

    /// Replace the identity table, keeping the rest of the config.
    fn save_identity_table(&self, table: &IdentityTable) -> Result<()> {
        let mut config = self.load_config()?;
        config.users = table.clone();
        self.save_config(&config)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Public key records and grants
    // ─────────────────────────────────────────────────────────────────────────

    /// Where the public key record for `id` lives.
    fn public_key_path(&self, id: &IdentityId) -> PathBuf;

    /// Where the grant for `id` lives.
    fn grant_path(&self, id: &IdentityId) -> PathBuf;

    fn read_public_key(&self, id: &IdentityId) -> Result<Option<Vec<u8>>>;

    fn write_public_key(&self, id: &IdentityId, pem: &[u8]) -> Result<()>;

    fn read_grant(&self, id: &IdentityId) -> Result<Option<Vec<u8>>>;

    fn write_grant(&self, id: &IdentityId, ciphertext: &[u8]) -> Result<()>;

    fn has_public_key(&self, id: &IdentityId) -> Result<bool> {
        Ok(self.read_public_key(id)?.is_some())
    }

    fn has_grant(&self, id: &IdentityId) -> Result<bool> {
        Ok(self.read_grant(id)?.is_some())
    }

    /// Identities that currently hold a grant, in UUID order.
    fn list_grants(&self) -> Result<Vec<IdentityId>>;

    /// Identities with a public key record, in UUID order.
    fn list_public_keys(&self) -> Result<Vec<IdentityId>>;
}

impl<T: AccessStore + ?Sized> AccessStore for &T {
    fn is_initialized(&self) -> bool {
        (**self).is_initialized()
    }

    fn load_config(&self) -> Result<ProjectConfig> {
        (**self).load_config()
    }

    fn save_config(&self, config: &ProjectConfig) -> Result<()> {
        (**self).save_config(config)
    }

    fn config_path(&self) -> PathBuf {
        (**self).config_path()
    }

    fn load_identity_table(&self) -> Result<IdentityTable> {
        (**self).load_identity_table()
    }

    fn save_identity_table(&self, table: &IdentityTable) -> Result<()> {
        (**self).save_identity_table(table)
    }

    fn public_key_path(&self, id: &IdentityId) -> PathBuf {
        (**self).public_key_path(id)
    }

    fn grant_path(&self, id: &IdentityId) -> PathBuf {
        (**self).grant_path(id)
    }

    fn read_public_key(&self, id: &IdentityId) -> Result<Option<Vec<u8>>> {
        (**self).read_public_key(id)
    }

    fn write_public_key(&self, id: &IdentityId, pem: &[u8]) -> Result<()> {
        (**self).write_public_key(id, pem)
    }

    fn read_grant(&self, id: &IdentityId) -> Result<Option<Vec<u8>>> {
        (**self).read_grant(id)
    }

    fn write_grant(&self, id: &IdentityId, ciphertext: &[u8]) -> Result<()> {
        (**self).write_grant(id, ciphertext)
    }

    fn has_public_key(&self, id: &IdentityId) -> Result<bool> {
        (**self).has_public_key(id)
    }

    fn has_grant(&self, id: &IdentityId) -> Result<bool> {
        (**self).has_grant(id)
    }

    fn list_grants(&self) -> Result<Vec<IdentityId>> {
        (**self).list_grants()
    }

    fn list_public_keys(&self) -> Result<Vec<IdentityId>> {
        (**self).list_public_keys()
    }
}
