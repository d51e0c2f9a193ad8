//! Identity resolution.
//!
//! Turns what the caller typed (an email, a key file, or pasted key text)
//! into the identity that will receive a grant and the public key it will
//! be sealed under. The identity table is the only source of UUIDs.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;

use kanuka_core::{parse_public_key, IdentityId, PublicKey};
use kanuka_store::{AccessStore, IdentityTable, StoreError};
use tracing::debug;

use crate::error::{RegisterError, Result};
use crate::identifier::validate_email;

/// Where a supplied public key comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    File(PathBuf),
    Inline(String),
}

/// Who should be granted access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// An identity already in the table, with a recorded public key.
    Identifier(String),

    /// A public key supplied now, optionally naming its owner.
    ///
    /// Without an identifier, a key file named `<uuid>.pub` for a known
    /// identity is accepted; inline text always needs one.
    PublicKey {
        key: KeyInput,
        identifier: Option<String>,
    },
}

impl TargetSpec {
    pub fn identifier(identifier: impl Into<String>) -> Self {
        TargetSpec::Identifier(identifier.into())
    }

    pub fn key_file(path: impl Into<PathBuf>, identifier: Option<&str>) -> Self {
        TargetSpec::PublicKey {
            key: KeyInput::File(path.into()),
            identifier: identifier.map(String::from),
        }
    }

    pub fn inline_key(text: impl Into<String>, identifier: impl Into<String>) -> Self {
        TargetSpec::PublicKey {
            key: KeyInput::Inline(text.into()),
            identifier: Some(identifier.into()),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::Identifier(id) => write!(f, "{id}"),
            TargetSpec::PublicKey { key, identifier } => {
                let source = match key {
                    KeyInput::File(path) => path.display().to_string(),
                    KeyInput::Inline(_) => "<inline key>".to_string(),
                };
                match identifier {
                    Some(id) => write!(f, "{id} ({source})"),
                    None => write!(f, "{source}"),
                }
            }
        }
    }
}

/// How the target's public key was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Read from the project's existing public key record.
    Recorded,
    /// Supplied by the caller for this run.
    Supplied,
}

/// A fully resolved grant recipient.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub id: IdentityId,
    pub identifier: String,
    pub public_key: PublicKey,
    pub origin: KeyOrigin,
    /// `true` when `id` was minted here and is not yet in the table.
    pub minted: bool,
}

/// Resolves target specifiers against one identity table.
pub struct IdentityResolver<'a, S: AccessStore> {
    store: &'a S,
    table: &'a IdentityTable,
}

impl<'a, S: AccessStore> IdentityResolver<'a, S> {
    pub fn new(store: &'a S, table: &'a IdentityTable) -> Self {
        Self { store, table }
    }

    pub fn resolve(&self, spec: &TargetSpec) -> Result<ResolvedTarget> {
        match spec {
            TargetSpec::Identifier(identifier) => self.resolve_recorded(identifier),
            TargetSpec::PublicKey { key, identifier } => {
                self.resolve_supplied(key, identifier.as_deref())
            }
        }
    }

    /// Look up an identity and its already-recorded public key.
    fn resolve_recorded(&self, identifier: &str) -> Result<ResolvedTarget> {
        validate_email(identifier)?;

        let id = self.table.find(identifier).ok_or_else(|| {
            RegisterError::TargetNotFound(format!("no identity registered as '{identifier}'"))
        })?;

        let raw = self.store.read_public_key(&id)?.ok_or_else(|| {
            RegisterError::TargetNotFound(format!(
                "'{identifier}' has no public key record at {}",
                self.store.public_key_path(&id).display()
            ))
        })?;
        let public_key = parse_public_key(&raw).map_err(|e| {
            RegisterError::InvalidKeyFormat(format!("recorded key for '{identifier}': {e}"))
        })?;

        debug!(%id, identifier, "resolved recorded identity");
        Ok(ResolvedTarget {
            id,
            identifier: identifier.to_string(),
            public_key,
            origin: KeyOrigin::Recorded,
            minted: false,
        })
    }

    fn resolve_supplied(&self, key: &KeyInput, identifier: Option<&str>) -> Result<ResolvedTarget> {
        if let Some(identifier) = identifier {
            validate_email(identifier)?;
        }

        let raw = read_key_input(key)?;
        let public_key = parse_public_key(&raw)?;

        let (id, identifier, minted) = match (identifier, key) {
            (Some(identifier), _) => match self.table.find(identifier) {
                Some(id) => (id, identifier.to_string(), false),
                None => (IdentityId::new(), identifier.to_string(), true),
            },
            (None, KeyInput::File(path)) => {
                let id = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| IdentityId::parse(stem).ok())
                    .filter(|id| self.table.contains(id))
                    .ok_or_else(|| {
                        RegisterError::TargetNotFound(format!(
                            "cannot tell whose key {} is; name the identity explicitly",
                            path.display()
                        ))
                    })?;
                let identifier = self.table.get(&id).unwrap_or_default().to_string();
                (id, identifier, false)
            }
            (None, KeyInput::Inline(_)) => {
                return Err(RegisterError::TargetNotFound(
                    "an inline public key needs an identifier".to_string(),
                ))
            }
        };

        debug!(%id, identifier, minted, "resolved supplied key");
        Ok(ResolvedTarget {
            id,
            identifier,
            public_key,
            origin: KeyOrigin::Supplied,
            minted,
        })
    }
}

fn read_key_input(key: &KeyInput) -> Result<Vec<u8>> {
    match key {
        KeyInput::Inline(text) => Ok(text.as_bytes().to_vec()),
        KeyInput::File(path) => fs::read(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                RegisterError::TargetNotFound(format!(
                    "public key file {} does not exist",
                    path.display()
                ))
            } else {
                RegisterError::from(StoreError::io(path, e))
            }
        }),
    }
}
