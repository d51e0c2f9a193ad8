//! # Kanuka Core
//!
//! Pure primitives for Kanuka: RSA key parsing, envelope encryption of the
//! project's symmetric key, and strongly typed identities.
//!
//! This crate contains no filesystem I/O. It turns bytes into keys and keys
//! into ciphertext, nothing more.
//!
//! ## Key Types
//!
//! - [`PublicKey`] / [`PrivateKey`] - RSA key halves with PEM and OpenSSH codecs
//! - [`SymmetricKey`] - The 32-byte project key shared through grants
//! - [`IdentityId`] - Opaque, immutable identity (UUID) used as a storage key
//! - [`KeyFingerprint`] - Short BLAKE3 digest of a public key for display
//!
//! ## Envelope Encryption
//!
//! ```rust,no_run
//! use kanuka_core::{cipher, PrivateKey, SymmetricKey};
//!
//! let recipient = PrivateKey::generate(2048).unwrap();
//! let project_key = SymmetricKey::generate();
//!
//! let grant = cipher::seal(&project_key, &recipient.public_key()).unwrap();
//! let recovered = cipher::open(&grant, &recipient).unwrap();
//! assert_eq!(recovered.as_bytes(), project_key.as_bytes());
//! ```

pub mod cipher;
pub mod codec;
pub mod error;
pub mod types;

pub use cipher::{open, seal};
pub use codec::{
    parse_private_key, parse_public_key, KeyFingerprint, PrivateKey, PublicKey,
    DEFAULT_KEY_BITS, MIN_KEY_BITS,
};
pub use error::{CoreError, Result};
pub use types::{IdentityId, SymmetricKey, SYMMETRIC_KEY_LEN};
