//! Error types for the facade.

use std::io;

use kanuka_store::StoreError;
use thiserror::Error;

/// Errors that can occur while opening a project.
///
/// Registration itself reports through
/// [`RegisterReport`](kanuka_perms::RegisterReport) and never returns
/// these.
#[derive(Debug, Error)]
pub enum KanukaError {
    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// No user config file to name the local actor.
    #[error("no user config found; create your keys first")]
    MissingUserConfig,

    /// The platform has no data directory for private keys.
    #[error("no data directory available for private keys")]
    NoDataDir,

    /// Could not determine the working directory.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, KanukaError>;
