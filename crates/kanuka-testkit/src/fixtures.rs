//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: an on-disk project in a temp
//! directory whose actor already holds a working grant.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use kanuka_core::{open, seal, IdentityId, PrivateKey, PublicKey, SymmetricKey};
use kanuka_perms::{Actor, GrantEngine};
use kanuka_store::{AccessStore, FsStore, LocalKeyring, ProjectInfo, UserConfig};
use tempfile::TempDir;

use crate::keys;

/// Pool index of the actor's keypair. Other indices are free for targets.
pub const ACTOR_KEY: usize = 0;

pub const ACTOR_EMAIL: &str = "alice@example.com";

/// An initialized project on disk with one member, the actor.
pub struct TestProject {
    root: TempDir,
    keyring_dir: TempDir,
    pub store: FsStore,
    pub user: UserConfig,
    pub project_key: SymmetricKey,
}

impl TestProject {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create project dir");
        let keyring_dir = tempfile::tempdir().expect("create keyring dir");

        let project = ProjectInfo::new("test-project");
        let project_uuid = project.uuid;
        let store = FsStore::init(root.path(), project).expect("init project");

        let actor_id = IdentityId::new();
        let actor_key = keys::keypair(ACTOR_KEY);
        let project_key = SymmetricKey::generate();

        let mut table = store.load_identity_table().expect("load table");
        table.insert(actor_id, ACTOR_EMAIL);
        store.save_identity_table(&table).expect("save table");
        store
            .write_public_key(
                &actor_id,
                actor_key.public_key().to_pem().expect("encode pem").as_bytes(),
            )
            .expect("write actor key");
        store
            .write_grant(
                &actor_id,
                &seal(&project_key, &actor_key.public_key()).expect("seal"),
            )
            .expect("write actor grant");

        LocalKeyring::new(keyring_dir.path())
            .store_private_key(
                &project_uuid,
                actor_key.to_pem().expect("encode private key").as_bytes(),
            )
            .expect("store private key");

        Self {
            root,
            keyring_dir,
            store,
            user: UserConfig::new(actor_id, ACTOR_EMAIL),
            project_key,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn keyring(&self) -> LocalKeyring {
        LocalKeyring::new(self.keyring_dir.path())
    }

    pub fn actor(&self) -> Actor {
        Actor::from_user_config(&self.user, self.keyring())
    }

    pub fn actor_id(&self) -> IdentityId {
        self.user.user.uuid
    }

    /// An engine acting as the project's actor.
    pub fn engine(&self) -> GrantEngine<&FsStore> {
        GrantEngine::new(&self.store, self.actor())
    }

    /// Add a table entry and public key record without a grant, as if the
    /// user had created their keys and is waiting to be registered.
    pub fn add_pending(&self, email: &str, key: &PublicKey) -> IdentityId {
        let id = IdentityId::new();
        let mut table = self.store.load_identity_table().expect("load table");
        table.insert(id, email);
        self.store.save_identity_table(&table).expect("save table");
        self.store
            .write_public_key(&id, key.to_pem().expect("encode pem").as_bytes())
            .expect("write public key");
        id
    }

    /// Identity registered under `email`, if any.
    pub fn identity(&self, email: &str) -> Option<IdentityId> {
        self.store.load_identity_table().expect("load table").find(email)
    }

    pub fn grant(&self, id: &IdentityId) -> Option<Vec<u8>> {
        self.store.read_grant(id).expect("read grant")
    }

    /// Open the grant for `id` with `key`.
    pub fn open_grant(&self, id: &IdentityId, key: &PrivateKey) -> SymmetricKey {
        let grant = self.grant(id).expect("grant exists");
        open(&grant, key).expect("grant opens")
    }

    /// Overwrite the actor's grant with bytes that will not decrypt.
    pub fn corrupt_actor_grant(&self) {
        self.store
            .write_grant(&self.actor_id(), b"not an rsa ciphertext")
            .expect("write corrupt grant");
    }

    /// Every file under `public_keys/` and `secrets/`, by relative path.
    pub fn access_files(&self) -> BTreeMap<PathBuf, Vec<u8>> {
        let layout = self.store.layout();
        let mut files = BTreeMap::new();
        for dir in [layout.public_keys_dir(), layout.secrets_dir()] {
            for entry in fs::read_dir(&dir).expect("read dir") {
                let path = entry.expect("dir entry").path();
                let bytes = fs::read(&path).expect("read file");
                let relative = path
                    .strip_prefix(self.root())
                    .expect("path under root")
                    .to_path_buf();
                files.insert(relative, bytes);
            }
        }
        files
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// A temp directory with no `.kanuka` layout in it.
pub fn uninitialized_dir() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actor_grant_opens() {
        let project = TestProject::new();
        let recovered = project.open_grant(&project.actor_id(), keys::keypair(ACTOR_KEY));
        assert_eq!(recovered, project.project_key);
    }

    #[test]
    fn test_access_files_lists_actor() {
        let project = TestProject::new();
        let files = project.access_files();
        let actor = project.actor_id().to_string();

        assert_eq!(files.len(), 2);
        for path in files.keys() {
            assert!(path.starts_with(".kanuka"));
            assert!(path.to_string_lossy().contains(&actor));
        }
    }

    #[test]
    fn test_add_pending() {
        let project = TestProject::new();
        let id = project.add_pending("bob@example.com", &keys::public_key(1));
        assert_eq!(project.identity("bob@example.com"), Some(id));
        assert!(project.grant(&id).is_none());
    }
}
