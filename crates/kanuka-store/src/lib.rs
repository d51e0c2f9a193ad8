//! # Kanuka Store
//!
//! Durable project access state: who is in the project, which public key
//! each identity registered, and which identities hold a grant.
//!
//! ## Overview
//!
//! Storage sits behind the [`AccessStore`] trait so the grant engine never
//! touches paths directly. [`FsStore`] is the on-disk layout; [`MemoryStore`]
//! keeps everything in memory and can inject write failures for tests.
//!
//! ## On-disk Layout
//!
//! ```text
//! <project root>/
//!   .kanuka/
//!     config.json              project info + identity table
//!     public_keys/<uuid>.pub   PEM SubjectPublicKeyInfo
//!     secrets/<uuid>.kanuka    RSA ciphertext of the 32-byte project key
//! ```
//!
//! Private keys never live in the project. [`LocalKeyring`] keeps them in
//! the user's data directory, one per project.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kanuka_store::{AccessStore, FsStore};
//!
//! let store = FsStore::discover(".").unwrap();
//! let table = store.load_identity_table().unwrap();
//! for (id, email) in table.iter() {
//!     println!("{id} {email} granted={}", store.has_grant(id).unwrap());
//! }
//! ```

pub mod atomic;
pub mod config;
pub mod error;
pub mod fs;
pub mod keyring;
pub mod layout;
pub mod memory;
pub mod traits;

pub use config::{IdentityTable, ProjectConfig, ProjectInfo, UserConfig, UserIdentity};
pub use error::{Result, StoreError};
pub use fs::FsStore;
pub use keyring::LocalKeyring;
pub use layout::ProjectLayout;
pub use memory::{MemoryStore, WriteFault};
pub use traits::AccessStore;
