//! Error types for Kanuka Core.

use thiserror::Error;

/// Errors raised while decoding keys or transforming envelope bytes.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input matched neither key framing, or failed structural decode.
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// Ciphertext could not be opened with the given private key.
    ///
    /// Deliberately carries no detail about where decoding failed.
    #[error("failed to decrypt grant")]
    DecryptFailed,

    #[error("encryption failed: {0}")]
    EncryptFailed(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("key encoding failed: {0}")]
    Encoding(String),

    #[error("symmetric key must be 32 bytes, got {0}")]
    InvalidSymmetricKey(usize),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
