//! # Kanuka Testkit
//!
//! Testing utilities for Kanuka.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Key pool**: Lazily generated RSA keypairs shared across a test process
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: An on-disk project whose actor already holds a grant
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use kanuka_perms::{RegisterRequest, ScriptedConfirm, TargetSpec};
//! use kanuka_testkit::{keys, TestProject};
//!
//! let project = TestProject::new();
//! let request = RegisterRequest::new(TargetSpec::inline_key(
//!     keys::public_key(1).to_openssh(None),
//!     "bob@example.com",
//! ));
//! let report = project.engine().register(&request, &mut ScriptedConfirm::never());
//! assert!(report.is_success());
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use kanuka_testkit::generators::{pooled_keypair, symmetric_key};
//!
//! proptest! {
//!     #[test]
//!     fn grants_open(key in symmetric_key(), pair in pooled_keypair()) {
//!         let ct = kanuka_core::seal(&key, &pair.public_key()).unwrap();
//!         prop_assert_eq!(kanuka_core::open(&ct, pair).unwrap(), key);
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod keys;

pub use fixtures::{uninitialized_dir, TestProject, ACTOR_EMAIL, ACTOR_KEY};
pub use generators::{email, line_ending, pooled_keypair, symmetric_key, with_line_endings, LineEnding};
