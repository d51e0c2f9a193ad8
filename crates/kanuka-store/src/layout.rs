//! Paths inside a Kanuka project.

use std::path::{Path, PathBuf};

use kanuka_core::IdentityId;

/// Directory holding all Kanuka state, at the project root.
pub const KANUKA_DIR: &str = ".kanuka";
pub const PUBLIC_KEYS_DIR: &str = "public_keys";
pub const SECRETS_DIR: &str = "secrets";
pub const CONFIG_FILE: &str = "config.json";

/// Extension of public key records.
pub const PUBLIC_KEY_EXT: &str = "pub";
/// Extension of grant files.
pub const GRANT_EXT: &str = "kanuka";

/// Resolves every Kanuka path for one project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walk up from `start` to the first directory containing `.kanuka`.
    pub fn discover(start: impl AsRef<Path>) -> Option<Self> {
        start
            .as_ref()
            .ancestors()
            .find(|dir| dir.join(KANUKA_DIR).is_dir())
            .map(Self::new)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn kanuka_dir(&self) -> PathBuf {
        self.root.join(KANUKA_DIR)
    }

    pub fn public_keys_dir(&self) -> PathBuf {
        self.kanuka_dir().join(PUBLIC_KEYS_DIR)
    }

    pub fn secrets_dir(&self) -> PathBuf {
        self.kanuka_dir().join(SECRETS_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.kanuka_dir().join(CONFIG_FILE)
    }

    pub fn public_key_path(&self, id: &IdentityId) -> PathBuf {
        self.root.join(Self::relative_public_key_path(id))
    }

    pub fn grant_path(&self, id: &IdentityId) -> PathBuf {
        self.root.join(Self::relative_grant_path(id))
    }

    /// `.kanuka/public_keys/<uuid>.pub`
    pub fn relative_public_key_path(id: &IdentityId) -> PathBuf {
        Path::new(KANUKA_DIR)
            .join(PUBLIC_KEYS_DIR)
            .join(format!("{id}.{PUBLIC_KEY_EXT}"))
    }

    /// `.kanuka/secrets/<uuid>.kanuka`
    pub fn relative_grant_path(id: &IdentityId) -> PathBuf {
        Path::new(KANUKA_DIR)
            .join(SECRETS_DIR)
            .join(format!("{id}.{GRANT_EXT}"))
    }

    /// Every directory and the config file exist.
    pub fn is_initialized(&self) -> bool {
        self.public_keys_dir().is_dir() && self.secrets_dir().is_dir() && self.config_path().is_file()
    }
}

/// Identity encoded in a file name like `<uuid>.<ext>`, if any.
pub fn identity_from_file_name(path: &Path, ext: &str) -> Option<IdentityId> {
    if path.extension()?.to_str()? != ext {
        return None;
    }
    IdentityId::parse(path.file_stem()?.to_str()?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_keyed_by_identity() {
        let id = IdentityId::parse("5f8a2c4e-1b3d-4e6f-8a9b-0c1d2e3f4a5b").unwrap();
        let layout = ProjectLayout::new("/work/app");

        assert_eq!(
            layout.public_key_path(&id),
            PathBuf::from("/work/app/.kanuka/public_keys/5f8a2c4e-1b3d-4e6f-8a9b-0c1d2e3f4a5b.pub")
        );
        assert_eq!(
            layout.grant_path(&id),
            PathBuf::from("/work/app/.kanuka/secrets/5f8a2c4e-1b3d-4e6f-8a9b-0c1d2e3f4a5b.kanuka")
        );
    }

    #[test]
    fn test_identity_from_file_name() {
        let id = IdentityId::new();
        let grant = ProjectLayout::relative_grant_path(&id);

        assert_eq!(identity_from_file_name(&grant, GRANT_EXT), Some(id));
        assert_eq!(identity_from_file_name(&grant, PUBLIC_KEY_EXT), None);
        assert_eq!(
            identity_from_file_name(Path::new("alice.kanuka"), GRANT_EXT),
            None
        );
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(KANUKA_DIR)).unwrap();
        let nested = dir.path().join("src").join("deep");
        std::fs::create_dir_all(&nested).unwrap();

        let layout = ProjectLayout::discover(&nested).unwrap();
        assert_eq!(layout.root(), dir.path());
    }

    #[test]
    fn test_uninitialized_without_config() {
        let dir = tempfile::tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        std::fs::create_dir_all(layout.public_keys_dir()).unwrap();
        std::fs::create_dir_all(layout.secrets_dir()).unwrap();

        assert!(!layout.is_initialized());
    }
}
