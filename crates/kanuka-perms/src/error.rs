//! Error types for the grant engine.

use std::io;
use std::path::PathBuf;

use kanuka_core::{CoreError, IdentityId};
use kanuka_store::StoreError;
use thiserror::Error;

/// Every way a registration can fail.
///
/// The engine never propagates these out of [`GrantEngine::register`];
/// they end up inside a [`RegisterReport`].
///
/// [`GrantEngine::register`]: crate::GrantEngine::register
/// [`RegisterReport`]: crate::RegisterReport
#[derive(Debug, Error)]
pub enum RegisterError {
    /// No `.kanuka` layout or project config.
    #[error("project is not initialized")]
    NotInitialized,

    /// The actor holds no grant for this project.
    #[error("you do not have access to this project (no grant for {identity})")]
    NoLocalAccess { identity: IdentityId },

    /// The actor's grant exists but no private key was found locally.
    #[error("no private key for this project at {}", path.display())]
    PrivateKeyMissing { path: PathBuf },

    /// The actor's grant could not be opened.
    #[error("failed to decrypt your grant: {0}")]
    DecryptFailed(String),

    #[error("invalid public key: {0}")]
    InvalidKeyFormat(String),

    #[error("invalid email format: '{identifier}'")]
    InvalidEmailFormat { identifier: String },

    #[error("target not found: {0}")]
    TargetNotFound(String),

    /// An overwrite was declined or could not be confirmed.
    #[error("registration cancelled: {0}")]
    RegistrationCancelled(String),

    #[error("permission denied writing {}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other storage failure.
    #[error("storage error: {0}")]
    Store(StoreError),

    /// Encryption or key encoding failed.
    #[error("cryptographic error: {0}")]
    Crypto(CoreError),
}

impl RegisterError {
    /// Stable, machine-readable name of the failure.
    pub fn code(&self) -> &'static str {
        match self {
            RegisterError::NotInitialized => "not_initialized",
            RegisterError::NoLocalAccess { .. } => "no_local_access",
            RegisterError::PrivateKeyMissing { .. } => "private_key_missing",
            RegisterError::DecryptFailed(_) => "decrypt_failed",
            RegisterError::InvalidKeyFormat(_) => "invalid_key_format",
            RegisterError::InvalidEmailFormat { .. } => "invalid_email_format",
            RegisterError::TargetNotFound(_) => "target_not_found",
            RegisterError::RegistrationCancelled(_) => "registration_cancelled",
            RegisterError::PermissionDenied { .. } => "permission_denied",
            RegisterError::Store(_) => "store",
            RegisterError::Crypto(_) => "crypto",
        }
    }

    /// What the user can do about it, when there is something to say.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            RegisterError::NotInitialized => {
                Some("initialize the project first so that .kanuka/ exists")
            }
            RegisterError::NoLocalAccess { .. } => {
                Some("ask someone with access to register you before granting others")
            }
            RegisterError::PrivateKeyMissing { .. } => {
                Some("restore the private key you used when joining this project")
            }
            RegisterError::DecryptFailed(_) => {
                Some("your grant may be corrupted; ask someone with access to register you again")
            }
            RegisterError::InvalidKeyFormat(_) => Some(
                "supply an RSA public key as PEM (-----BEGIN PUBLIC KEY-----) or OpenSSH (ssh-rsa AAAA...)",
            ),
            RegisterError::InvalidEmailFormat { .. } => {
                Some("use a full email address such as name@example.com")
            }
            RegisterError::TargetNotFound(_) => {
                Some("the user must create their keys first, or supply their public key directly")
            }
            RegisterError::RegistrationCancelled(_) => None,
            RegisterError::PermissionDenied { .. } => {
                Some("check write permissions on the .kanuka directory")
            }
            RegisterError::Store(_) | RegisterError::Crypto(_) => None,
        }
    }
}

impl From<StoreError> for RegisterError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotInitialized(_) => RegisterError::NotInitialized,
            StoreError::Io { path, source } if source.kind() == io::ErrorKind::PermissionDenied => {
                RegisterError::PermissionDenied { path, source }
            }
            other => RegisterError::Store(other),
        }
    }
}

impl From<CoreError> for RegisterError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidKeyFormat(msg) => RegisterError::InvalidKeyFormat(msg),
            CoreError::DecryptFailed => RegisterError::DecryptFailed(e.to_string()),
            other => RegisterError::Crypto(other),
        }
    }
}

/// Result type for grant engine operations.
pub type Result<T> = std::result::Result<T, RegisterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_is_lifted() {
        let store_err = StoreError::io(
            "/p/.kanuka/secrets/x.kanuka",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let err = RegisterError::from(store_err);

        assert_eq!(err.code(), "permission_denied");
        assert!(err.to_string().contains("/p/.kanuka/secrets/x.kanuka"));
    }

    #[test]
    fn test_other_io_stays_store_error() {
        let store_err = StoreError::io("/p", io::Error::new(io::ErrorKind::Other, "disk full"));
        assert_eq!(RegisterError::from(store_err).code(), "store");
    }

    #[test]
    fn test_core_errors_map_to_taxonomy() {
        assert_eq!(
            RegisterError::from(CoreError::InvalidKeyFormat("bad".into())).code(),
            "invalid_key_format"
        );
        assert_eq!(
            RegisterError::from(CoreError::DecryptFailed).code(),
            "decrypt_failed"
        );
        assert_eq!(
            RegisterError::from(StoreError::NotInitialized("/p".into())).code(),
            "not_initialized"
        );
    }
}
