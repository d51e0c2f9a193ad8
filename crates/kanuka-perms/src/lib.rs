//! # Kanuka Permissions
//!
//! The access grant engine: who may receive the project key, and how.
//!
//! ## Overview
//!
//! Access to a project is a set of grants. A grant is the project's 32-byte
//! symmetric key sealed under one identity's RSA public key. Granting access
//! to someone new means opening your own grant and sealing the recovered
//! key again for them.
//!
//! ## Key Concepts
//!
//! - **Actor**: the identity running the engine; it must already hold a grant
//! - **Target**: the identity being granted, resolved by [`IdentityResolver`]
//! - **Report**: every run ends in a [`RegisterReport`], success or not
//!
//! ## Guarantees
//!
//! - Nothing is written until the actor's own grant has been opened
//! - A dry run never writes
//! - An existing grant is replaced only with force or an explicit yes
//! - The target's public key is recorded before its grant is written
//!
//! ## Usage
//!
//! ```rust,no_run
//! use kanuka_perms::{
//!     Actor, GrantEngine, RegisterOptions, RegisterRequest, TargetSpec, TerminalConfirm,
//! };
//! use kanuka_store::{FsStore, LocalKeyring, UserConfig};
//!
//! let store = FsStore::discover(".").unwrap();
//! let user = UserConfig::load(UserConfig::default_path().unwrap()).unwrap();
//! let keyring = LocalKeyring::default_location().unwrap();
//! let engine = GrantEngine::new(store, Actor::from_user_config(&user, keyring));
//!
//! let request = RegisterRequest::new(TargetSpec::key_file("bob.pub", Some("bob@example.com")))
//!     .with_options(RegisterOptions::default().dry_run(true));
//! let report = engine.register(&request, &mut TerminalConfirm::stdio());
//! print!("{report}");
//! ```

pub mod access;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod prompt;
pub mod report;
pub mod resolver;

pub use access::{list_access, AccessEntry, AccessStatus};
pub use engine::{Actor, GrantEngine, RegisterOptions, RegisterRequest};
pub use error::{RegisterError, Result};
pub use identifier::{is_ci_identifier, is_valid_email, validate_email, CI_IDENTIFIER};
pub use prompt::{is_affirmative, Confirm, ScriptedConfirm, TerminalConfirm};
pub use report::{
    DryRunPlan, FileAction, GrantKind, PlannedWrite, RegisterOutcome, RegisterReport,
    Registration, FAILURE_MARKER, SUCCESS_MARKER,
};
pub use resolver::{IdentityResolver, KeyInput, KeyOrigin, ResolvedTarget, TargetSpec};
