//! The grant engine: unified registration API over an [`AccessStore`].
//!
//! One call to [`GrantEngine::register`] runs the whole state machine:
//!
//! 1. the project must be initialized
//! 2. the actor proves access by opening its own grant
//! 3. the target is resolved to an identity and a public key
//! 4. an existing grant is only replaced with force or confirmation
//! 5. a dry run stops here and reports its plan
//! 6. the project key is sealed for the target and written out
//!
//! Nothing is written before step 6, and the grant is always the last
//! file written.

use kanuka_core::{open, parse_private_key, seal, IdentityId, KeyFingerprint, SymmetricKey};
use kanuka_store::{AccessStore, LocalKeyring, UserConfig};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::access::{list_access, AccessEntry};
use crate::error::{RegisterError, Result};
use crate::identifier::is_ci_identifier;
use crate::prompt::Confirm;
use crate::report::{
    DryRunPlan, FileAction, GrantKind, PlannedWrite, RegisterOutcome, RegisterReport,
    Registration,
};
use crate::resolver::{IdentityResolver, KeyOrigin, ResolvedTarget, TargetSpec};

/// Mode flags for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOptions {
    /// Replace an existing grant without asking.
    pub force: bool,
    /// Validate everything, write nothing.
    pub dry_run: bool,
    /// Whether a confirmation prompt may be shown.
    pub interactive: bool,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            force: false,
            dry_run: false,
            interactive: true,
        }
    }
}

impl RegisterOptions {
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

/// What to register and how.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub target: TargetSpec,
    pub options: RegisterOptions,
}

impl RegisterRequest {
    pub fn new(target: TargetSpec) -> Self {
        Self {
            target,
            options: RegisterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RegisterOptions) -> Self {
        self.options = options;
        self
    }
}

/// The identity running the engine, and where its private keys live.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: IdentityId,
    pub keyring: LocalKeyring,
}

impl Actor {
    pub fn new(id: IdentityId, keyring: LocalKeyring) -> Self {
        Self { id, keyring }
    }

    pub fn from_user_config(user: &UserConfig, keyring: LocalKeyring) -> Self {
        Self::new(user.user.uuid, keyring)
    }
}

/// Registers identities against one project's access state.
pub struct GrantEngine<S: AccessStore> {
    store: S,
    actor: Actor,
}

impl<S: AccessStore> GrantEngine<S> {
    pub fn new(store: S, actor: Actor) -> Self {
        Self { store, actor }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Everyone the project knows about, and whether they hold a grant.
    pub fn access(&self) -> kanuka_store::Result<Vec<AccessEntry>> {
        list_access(&self.store)
    }

    /// Grant (or re-grant) the target access to the project key.
    ///
    /// Never fails outright: every error is captured in the report. The
    /// `confirm` prompt is only consulted for an interactive, unforced,
    /// real run against an identity that already holds a grant.
    pub fn register(&self, request: &RegisterRequest, confirm: &mut dyn Confirm) -> RegisterReport {
        let target = request.target.to_string();
        let options = request.options;
        let span = info_span!(
            "register",
            target = %target,
            force = options.force,
            dry_run = options.dry_run,
            interactive = options.interactive,
        );
        let _enter = span.enter();

        match self.run(request, confirm) {
            Ok(outcome) => {
                info!(
                    id = %outcome.id(),
                    kind = ?outcome.kind(),
                    dry_run = options.dry_run,
                    "registration complete"
                );
                RegisterReport::success(target, outcome)
            }
            Err(e) => {
                warn!(code = e.code(), error = %e, "registration failed");
                RegisterReport::failure(target, e)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // State machine
    // ─────────────────────────────────────────────────────────────────────────

    fn run(&self, request: &RegisterRequest, confirm: &mut dyn Confirm) -> Result<RegisterOutcome> {
        let options = request.options;

        if !self.store.is_initialized() {
            return Err(RegisterError::NotInitialized);
        }
        let config = self.store.load_config()?;
        debug!(project = %config.project.uuid, "project initialized");

        let project_key = self.unlock(&config.project.uuid)?;
        debug!(actor = %self.actor.id, "actor access verified");

        let mut table = config.users;
        let target = IdentityResolver::new(&self.store, &table).resolve(&request.target)?;
        let fingerprint = target.public_key.fingerprint()?;
        debug!(
            id = %target.id,
            %fingerprint,
            minted = target.minted,
            ci = is_ci_identifier(&target.identifier),
            "target resolved"
        );

        let kind = if self.store.has_grant(&target.id)? {
            GrantKind::Updated
        } else {
            GrantKind::Granted
        };

        if kind == GrantKind::Updated && !options.dry_run && !options.force {
            if !options.interactive {
                return Err(RegisterError::RegistrationCancelled(format!(
                    "{} already has access; confirmation required (use force to overwrite)",
                    target.identifier
                )));
            }
            let question = self.overwrite_question(&target, &fingerprint)?;
            let accepted = confirm.confirm(&question).map_err(|e| {
                RegisterError::RegistrationCancelled(format!("no confirmation received: {e}"))
            })?;
            if !accepted {
                return Err(RegisterError::RegistrationCancelled(format!(
                    "existing access for {} left unchanged",
                    target.identifier
                )));
            }
            debug!("overwrite confirmed");
        }

        if options.dry_run {
            return self
                .plan(&target, kind, fingerprint)
                .map(RegisterOutcome::DryRun);
        }

        let ciphertext = seal(&project_key, &target.public_key)?;
        let pem = target.public_key.to_pem()?;
        let mut files_written = Vec::with_capacity(3);

        self.store.write_public_key(&target.id, pem.as_bytes())?;
        files_written.push(self.store.public_key_path(&target.id));

        if target.minted {
            table.insert(target.id, target.identifier.clone());
            self.store.save_identity_table(&table)?;
            files_written.push(self.store.config_path());
        }

        self.store.write_grant(&target.id, &ciphertext)?;
        files_written.push(self.store.grant_path(&target.id));

        Ok(RegisterOutcome::Registered(Registration {
            id: target.id,
            identifier: target.identifier,
            kind,
            fingerprint,
            files_written,
        }))
    }

    /// Recover the project key by opening the actor's own grant.
    fn unlock(&self, project: &Uuid) -> Result<SymmetricKey> {
        let grant = self
            .store
            .read_grant(&self.actor.id)?
            .ok_or(RegisterError::NoLocalAccess {
                identity: self.actor.id,
            })?;

        let pem = self
            .actor
            .keyring
            .load_private_key(project)?
            .ok_or_else(|| RegisterError::PrivateKeyMissing {
                path: self.actor.keyring.private_key_path(project),
            })?;

        let private_key = parse_private_key(&pem).map_err(|e| {
            RegisterError::DecryptFailed(format!("local private key is unusable: {e}"))
        })?;

        open(&grant, &private_key).map_err(|_| {
            RegisterError::DecryptFailed(
                "your grant does not open with your local private key".to_string(),
            )
        })
    }

    fn overwrite_question(&self, target: &ResolvedTarget, fingerprint: &KeyFingerprint) -> Result<String> {
        let key_note = match target.origin {
            KeyOrigin::Recorded => format!("their recorded key {fingerprint} will be kept"),
            KeyOrigin::Supplied => match self.recorded_fingerprint(&target.id)? {
                Some(recorded) if recorded == *fingerprint => {
                    format!("the supplied key {fingerprint} matches their recorded key")
                }
                Some(recorded) => {
                    format!("the supplied key {fingerprint} replaces their recorded key {recorded}")
                }
                None => format!("the supplied key {fingerprint} will be recorded"),
            },
        };
        Ok(format!(
            "{} already has access to this project ({}); {key_note}. Replace their grant?",
            target.identifier,
            self.store.grant_path(&target.id).display()
        ))
    }

    /// Fingerprint of the public key on record, if it still parses.
    fn recorded_fingerprint(&self, id: &IdentityId) -> Result<Option<KeyFingerprint>> {
        let Some(raw) = self.store.read_public_key(id)? else {
            return Ok(None);
        };
        Ok(kanuka_core::parse_public_key(&raw)
            .and_then(|key| key.fingerprint())
            .ok())
    }

    fn plan(&self, target: &ResolvedTarget, kind: GrantKind, fingerprint: KeyFingerprint) -> Result<DryRunPlan> {
        let action = |exists: bool| {
            if exists {
                FileAction::Update
            } else {
                FileAction::Create
            }
        };

        let mut writes = vec![PlannedWrite {
            path: self.store.public_key_path(&target.id),
            action: action(self.store.has_public_key(&target.id)?),
        }];
        if target.minted {
            writes.push(PlannedWrite {
                path: self.store.config_path(),
                action: FileAction::Update,
            });
        }
        writes.push(PlannedWrite {
            path: self.store.grant_path(&target.id),
            action: action(kind == GrantKind::Updated),
        });

        let verified = vec![
            "project is initialized".to_string(),
            "your grant opens with your local private key".to_string(),
            format!("{} resolves to identity {}", target.identifier, target.id),
            format!(
                "public key is a valid {}-bit RSA key ({fingerprint})",
                target.public_key.bits()
            ),
        ];

        debug!(writes = writes.len(), "dry run planned");
        Ok(DryRunPlan {
            id: target.id,
            identifier: target.identifier.clone(),
            kind,
            fingerprint,
            writes,
            verified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedConfirm;
    use kanuka_core::{PrivateKey, PublicKey};
    use kanuka_store::{MemoryStore, ProjectInfo, WriteFault};
    use std::path::PathBuf;
    use std::sync::OnceLock;
    use tempfile::TempDir;

    fn keys() -> &'static [PrivateKey; 2] {
        static KEYS: OnceLock<[PrivateKey; 2]> = OnceLock::new();
        KEYS.get_or_init(|| {
            [
                PrivateKey::generate(2048).unwrap(),
                PrivateKey::generate(2048).unwrap(),
            ]
        })
    }

    fn actor_key() -> &'static PrivateKey {
        &keys()[0]
    }

    fn bob_key() -> PublicKey {
        keys()[1].public_key()
    }

    struct Fixture {
        engine: GrantEngine<MemoryStore>,
        project_key: SymmetricKey,
        _keyring_dir: TempDir,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new(ProjectInfo::new("demo"));
        let project = store.load_config().unwrap().project.uuid;
        let project_key = SymmetricKey::generate();

        let actor_id = IdentityId::new();
        let mut table = store.load_identity_table().unwrap();
        table.insert(actor_id, "alice@example.com");
        store.save_identity_table(&table).unwrap();
        store
            .write_public_key(&actor_id, actor_key().public_key().to_pem().unwrap().as_bytes())
            .unwrap();
        store
            .write_grant(&actor_id, &seal(&project_key, &actor_key().public_key()).unwrap())
            .unwrap();

        let keyring_dir = tempfile::tempdir().unwrap();
        let keyring = LocalKeyring::new(keyring_dir.path());
        keyring
            .store_private_key(&project, actor_key().to_pem().unwrap().as_bytes())
            .unwrap();

        Fixture {
            engine: GrantEngine::new(store, Actor::new(actor_id, keyring)),
            project_key,
            _keyring_dir: keyring_dir,
        }
    }

    fn bob_request() -> RegisterRequest {
        RegisterRequest::new(TargetSpec::inline_key(
            bob_key().to_openssh(None),
            "bob@example.com",
        ))
    }

    fn store_snapshot(store: &MemoryStore) -> (Vec<PathBuf>, Vec<IdentityId>, Vec<IdentityId>) {
        (
            store.writes().unwrap(),
            store.list_public_keys().unwrap(),
            store.list_grants().unwrap(),
        )
    }

    #[test]
    fn test_register_new_identity() {
        let fx = fixture();
        let report = fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        assert!(report.is_success(), "{report}");

        let RegisterOutcome::Registered(reg) = report.outcome().unwrap() else {
            panic!("expected a registration");
        };
        assert_eq!(reg.kind, GrantKind::Granted);

        let store = fx.engine.store();
        let grant = store.read_grant(&reg.id).unwrap().unwrap();
        let recovered = open(&grant, &keys()[1]).unwrap();
        assert_eq!(recovered.as_bytes(), fx.project_key.as_bytes());

        let table = store.load_identity_table().unwrap();
        assert_eq!(table.find("bob@example.com"), Some(reg.id));
    }

    #[test]
    fn test_write_order_ends_with_grant() {
        let fx = fixture();
        let before = fx.engine.store().writes().unwrap().len();

        let report = fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        let id = report.outcome().unwrap().id();

        let store = fx.engine.store();
        let writes = store.writes().unwrap()[before..].to_vec();
        assert_eq!(
            writes,
            vec![store.public_key_path(&id), store.config_path(), store.grant_path(&id)]
        );
    }

    #[test]
    fn test_uninitialized_project() {
        let dir = tempfile::tempdir().unwrap();
        let engine = GrantEngine::new(
            MemoryStore::uninitialized(),
            Actor::new(IdentityId::new(), LocalKeyring::new(dir.path())),
        );

        let report = engine.register(&bob_request(), &mut ScriptedConfirm::never());
        assert_eq!(report.error().unwrap().code(), "not_initialized");
        assert!(engine.store().writes().unwrap().is_empty());
    }

    #[test]
    fn test_actor_without_grant() {
        let fx = fixture();
        let engine = GrantEngine::new(
            fx.engine.store(),
            Actor::new(IdentityId::new(), fx.engine.actor().keyring.clone()),
        );

        let report = engine.register(&bob_request(), &mut ScriptedConfirm::never());
        assert_eq!(report.error().unwrap().code(), "no_local_access");
    }

    #[test]
    fn test_actor_without_private_key() {
        let fx = fixture();
        let empty = tempfile::tempdir().unwrap();
        let engine = GrantEngine::new(
            fx.engine.store(),
            Actor::new(fx.engine.actor().id, LocalKeyring::new(empty.path())),
        );

        let report = engine.register(&bob_request(), &mut ScriptedConfirm::never());
        assert_eq!(report.error().unwrap().code(), "private_key_missing");
    }

    #[test]
    fn test_corrupt_actor_grant_blocks_all_writes() {
        let fx = fixture();
        let store = fx.engine.store();
        let actor = fx.engine.actor().id;
        store.write_grant(&actor, b"garbage").unwrap();
        let before = store_snapshot(store);

        let report = fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        assert_eq!(report.error().unwrap().code(), "decrypt_failed");
        assert_eq!(store_snapshot(store), before);
    }

    #[test]
    fn test_malformed_key_writes_nothing() {
        let fx = fixture();
        let before = store_snapshot(fx.engine.store());
        let request = RegisterRequest::new(TargetSpec::inline_key(
            "this-is-not-a-valid-public-key",
            "bob@example.com",
        ));

        let report = fx.engine.register(&request, &mut ScriptedConfirm::never());
        assert_eq!(report.error().unwrap().code(), "invalid_key_format");
        assert_eq!(store_snapshot(fx.engine.store()), before);
    }

    #[test]
    fn test_declined_overwrite_keeps_grant() {
        let fx = fixture();
        let first = fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        let id = first.outcome().unwrap().id();
        let original = fx.engine.store().read_grant(&id).unwrap();

        let mut confirm = ScriptedConfirm::new(["n"]);
        let report = fx.engine.register(&bob_request(), &mut confirm);

        assert_eq!(report.error().unwrap().code(), "registration_cancelled");
        assert_eq!(confirm.asked().len(), 1);
        assert!(confirm.asked()[0].contains("matches their recorded key"));
        assert_eq!(fx.engine.store().read_grant(&id).unwrap(), original);
    }

    #[test]
    fn test_accepted_overwrite_updates() {
        let fx = fixture();
        let first = fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        let id = first.outcome().unwrap().id();

        let mut confirm = ScriptedConfirm::new(["y"]);
        let report = fx.engine.register(&bob_request(), &mut confirm);

        assert!(report.is_success(), "{report}");
        assert_eq!(report.outcome().unwrap().kind(), GrantKind::Updated);
        assert_eq!(report.outcome().unwrap().id(), id);
    }

    #[test]
    fn test_force_skips_prompt() {
        let fx = fixture();
        let first = fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        let id = first.outcome().unwrap().id();
        let original = fx.engine.store().read_grant(&id).unwrap().unwrap();

        let request = bob_request().with_options(RegisterOptions::default().force(true));
        let mut confirm = ScriptedConfirm::never();
        let report = fx.engine.register(&request, &mut confirm);

        assert!(report.is_success(), "{report}");
        assert!(confirm.asked().is_empty());
        let updated = fx.engine.store().read_grant(&id).unwrap().unwrap();
        assert_ne!(updated, original);
        assert_eq!(
            open(&updated, &keys()[1]).unwrap().as_bytes(),
            fx.project_key.as_bytes()
        );
    }

    #[test]
    fn test_non_interactive_overwrite_requires_force() {
        let fx = fixture();
        fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());

        let request = bob_request().with_options(RegisterOptions::default().interactive(false));
        let mut confirm = ScriptedConfirm::never();
        let report = fx.engine.register(&request, &mut confirm);

        assert_eq!(report.error().unwrap().code(), "registration_cancelled");
        assert!(report.to_string().contains("confirmation required"));
        assert!(confirm.asked().is_empty());
    }

    #[test]
    fn test_dry_run_plans_without_writing() {
        let fx = fixture();
        let before = store_snapshot(fx.engine.store());
        let request = bob_request().with_options(RegisterOptions::default().dry_run(true));

        let report = fx.engine.register(&request, &mut ScriptedConfirm::never());
        let Some(RegisterOutcome::DryRun(plan)) = report.outcome() else {
            panic!("expected a dry-run plan: {report}");
        };

        assert_eq!(plan.writes.len(), 3);
        assert!(plan.writes.iter().all(|w| w.path.is_relative()));
        assert_eq!(plan.writes[0].action, FileAction::Create);
        assert_eq!(plan.writes[2].action, FileAction::Create);
        assert_eq!(plan.writes[2].path, fx.engine.store().grant_path(&plan.id));
        assert_eq!(store_snapshot(fx.engine.store()), before);
    }

    #[test]
    fn test_dry_run_over_existing_grant_does_not_prompt() {
        let fx = fixture();
        fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        let request = bob_request().with_options(RegisterOptions::default().dry_run(true));

        let mut confirm = ScriptedConfirm::never();
        let report = fx.engine.register(&request, &mut confirm);

        assert!(report.is_success(), "{report}");
        assert_eq!(report.outcome().unwrap().kind(), GrantKind::Updated);
        assert!(confirm.asked().is_empty());
    }

    #[test]
    fn test_grant_write_refused_leaves_no_grant() {
        let fx = fixture();
        let store = fx.engine.store();
        store.fail_writes(WriteFault::Grants).unwrap();

        let report = fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        let err = report.error().unwrap();
        assert_eq!(err.code(), "permission_denied");
        assert!(err.to_string().contains(".kanuka/secrets"));

        let table = store.load_identity_table().unwrap();
        let bob = table.find("bob@example.com").unwrap();
        assert!(!store.has_grant(&bob).unwrap());
    }

    #[test]
    fn test_public_key_write_refused_stops_before_table() {
        let fx = fixture();
        let store = fx.engine.store();
        store.fail_writes(WriteFault::PublicKeys).unwrap();

        let report = fx.engine.register(&bob_request(), &mut ScriptedConfirm::never());
        assert_eq!(report.error().unwrap().code(), "permission_denied");
        assert!(store.load_identity_table().unwrap().find("bob@example.com").is_none());
        assert_eq!(store.list_grants().unwrap(), vec![fx.engine.actor().id]);
    }
}
