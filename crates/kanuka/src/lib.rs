//! # Kanuka
//!
//! Share one project secret key with a team without ever sending it in
//! the clear.
//!
//! ## Overview
//!
//! Every member holds a personal RSA keypair. The project's 32-byte
//! symmetric key is sealed separately under each member's public key; each
//! sealed copy is a **grant**, and holding a grant is what having access
//! means. Members with access extend it to others by opening their own
//! grant and sealing the key again for the newcomer.
//!
//! ## Key Concepts
//!
//! - **Identity**: an opaque UUID with a human identifier (an email) in the
//!   project's identity table
//! - **Public key record**: `.kanuka/public_keys/<uuid>.pub`, PEM
//! - **Grant**: `.kanuka/secrets/<uuid>.kanuka`, raw RSA-OAEP ciphertext
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kanuka::perms::{RegisterRequest, TargetSpec, TerminalConfirm};
//! use kanuka::Project;
//!
//! let project = Project::discover().unwrap();
//! let request = RegisterRequest::new(TargetSpec::key_file(
//!     "bob.pub",
//!     Some("bob@example.com"),
//! ));
//! let report = project.register(&request, &mut TerminalConfirm::stdio());
//! print!("{report}");
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `kanuka::core` - Keys, envelope cipher, identities
//! - `kanuka::store` - Access state storage and configuration
//! - `kanuka::perms` - Identity resolution and the grant engine

pub mod error;
pub mod project;

// Re-export component crates
pub use kanuka_core as core;
pub use kanuka_perms as perms;
pub use kanuka_store as store;

// Re-export main types for convenience
pub use error::{KanukaError, Result};
pub use project::Project;

pub use kanuka_core::{IdentityId, PrivateKey, PublicKey, SymmetricKey};
pub use kanuka_perms::{
    AccessEntry, AccessStatus, GrantKind, RegisterError, RegisterOptions, RegisterOutcome,
    RegisterReport, RegisterRequest, TargetSpec,
};
