//! Structured registration outcome.
//!
//! A run always produces a [`RegisterReport`]. Callers branch on
//! [`RegisterReport::is_success`] or the wrapped result; the `Display`
//! impl renders the text a terminal user sees.

use std::fmt;
use std::path::PathBuf;

use kanuka_core::{IdentityId, KeyFingerprint};

use crate::error::RegisterError;

/// Prefix of every successful report.
pub const SUCCESS_MARKER: &str = "✓";

/// Prefix of every failed report.
pub const FAILURE_MARKER: &str = "✗";

/// Whether the target held a grant before this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantKind {
    /// No grant existed; access is new.
    Granted,
    /// An existing grant was replaced.
    Updated,
}

/// A completed write phase.
#[derive(Debug, Clone)]
pub struct Registration {
    pub id: IdentityId,
    pub identifier: String,
    pub kind: GrantKind,
    pub fingerprint: KeyFingerprint,
    /// Relative paths, in the order they were written.
    pub files_written: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    Create,
    Update,
}

/// One file a dry run would have touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedWrite {
    pub path: PathBuf,
    pub action: FileAction,
}

/// What a real run would have done.
#[derive(Debug, Clone)]
pub struct DryRunPlan {
    pub id: IdentityId,
    pub identifier: String,
    pub kind: GrantKind,
    pub fingerprint: KeyFingerprint,
    pub writes: Vec<PlannedWrite>,
    /// Prerequisites that were checked and held.
    pub verified: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum RegisterOutcome {
    Registered(Registration),
    DryRun(DryRunPlan),
}

impl RegisterOutcome {
    pub fn id(&self) -> IdentityId {
        match self {
            RegisterOutcome::Registered(r) => r.id,
            RegisterOutcome::DryRun(p) => p.id,
        }
    }

    pub fn kind(&self) -> GrantKind {
        match self {
            RegisterOutcome::Registered(r) => r.kind,
            RegisterOutcome::DryRun(p) => p.kind,
        }
    }
}

/// Result of one [`GrantEngine::register`](crate::GrantEngine::register) run.
#[derive(Debug)]
pub struct RegisterReport {
    target: String,
    result: Result<RegisterOutcome, RegisterError>,
}

impl RegisterReport {
    pub fn success(target: impl Into<String>, outcome: RegisterOutcome) -> Self {
        Self {
            target: target.into(),
            result: Ok(outcome),
        }
    }

    pub fn failure(target: impl Into<String>, error: RegisterError) -> Self {
        Self {
            target: target.into(),
            result: Err(error),
        }
    }

    /// The target as the caller specified it.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn outcome(&self) -> Option<&RegisterOutcome> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&RegisterError> {
        self.result.as_ref().err()
    }

    pub fn result(&self) -> &Result<RegisterOutcome, RegisterError> {
        &self.result
    }

    pub fn into_result(self) -> Result<RegisterOutcome, RegisterError> {
        self.result
    }
}

impl fmt::Display for RegisterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(RegisterOutcome::Registered(r)) => {
                match r.kind {
                    GrantKind::Granted => {
                        writeln!(f, "{SUCCESS_MARKER} {} has been granted access", r.identifier)?
                    }
                    GrantKind::Updated => {
                        writeln!(f, "{SUCCESS_MARKER} {}'s access has been updated", r.identifier)?
                    }
                }
                writeln!(f, "  identity:    {}", r.id)?;
                writeln!(f, "  public key:  {}", r.fingerprint)?;
                writeln!(f, "  files written:")?;
                for path in &r.files_written {
                    writeln!(f, "    {}", path.display())?;
                }
                Ok(())
            }
            Ok(RegisterOutcome::DryRun(p)) => {
                let verb = match p.kind {
                    GrantKind::Granted => "grant",
                    GrantKind::Updated => "update",
                };
                writeln!(
                    f,
                    "{SUCCESS_MARKER} [dry-run] would {verb} access for {}",
                    p.identifier
                )?;
                writeln!(f, "  identity:    {}", p.id)?;
                writeln!(f, "  public key:  {}", p.fingerprint)?;
                writeln!(f, "  files that would be written:")?;
                for write in &p.writes {
                    let action = match write.action {
                        FileAction::Create => "create",
                        FileAction::Update => "update",
                    };
                    writeln!(f, "    {action:<6} {}", write.path.display())?;
                }
                writeln!(f, "  verified:")?;
                for check in &p.verified {
                    writeln!(f, "    {SUCCESS_MARKER} {check}")?;
                }
                writeln!(f, "  no changes made")
            }
            Err(e) => {
                writeln!(f, "{FAILURE_MARKER} failed to register {}: {e}", self.target)?;
                if let Some(hint) = e.hint() {
                    writeln!(f, "  hint: {hint}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprint() -> KeyFingerprint {
        KeyFingerprint([0xab; 32])
    }

    #[test]
    fn test_granted_report_text() {
        let id = IdentityId::new();
        let report = RegisterReport::success(
            "bob@example.com",
            RegisterOutcome::Registered(Registration {
                id,
                identifier: "bob@example.com".into(),
                kind: GrantKind::Granted,
                fingerprint: fingerprint(),
                files_written: vec![PathBuf::from(format!(".kanuka/secrets/{id}.kanuka"))],
            }),
        );

        let text = report.to_string();
        assert!(report.is_success());
        assert!(text.starts_with(SUCCESS_MARKER));
        assert!(text.contains("granted"));
        assert!(text.contains(&format!("{id}.kanuka")));
        assert!(text.contains("blake3:abababab"));
    }

    #[test]
    fn test_updated_report_text() {
        let report = RegisterReport::success(
            "bob@example.com",
            RegisterOutcome::Registered(Registration {
                id: IdentityId::new(),
                identifier: "bob@example.com".into(),
                kind: GrantKind::Updated,
                fingerprint: fingerprint(),
                files_written: Vec::new(),
            }),
        );
        assert!(report.to_string().contains("updated"));
        assert_eq!(report.outcome().unwrap().kind(), GrantKind::Updated);
    }

    #[test]
    fn test_dry_run_lists_planned_files() {
        let report = RegisterReport::success(
            "carol@example.com",
            RegisterOutcome::DryRun(DryRunPlan {
                id: IdentityId::new(),
                identifier: "carol@example.com".into(),
                kind: GrantKind::Granted,
                fingerprint: fingerprint(),
                writes: vec![PlannedWrite {
                    path: PathBuf::from(".kanuka/public_keys/x.pub"),
                    action: FileAction::Create,
                }],
                verified: vec!["project is initialized".into()],
            }),
        );

        let text = report.to_string();
        assert!(text.contains("[dry-run]"));
        assert!(text.contains("create"));
        assert!(text.contains(".kanuka/public_keys/x.pub"));
        assert!(text.contains("no changes made"));
    }

    #[test]
    fn test_failure_report_has_marker_and_hint() {
        let report = RegisterReport::failure("bob@example.com", RegisterError::NotInitialized);

        let text = report.to_string();
        assert!(!report.is_success());
        assert!(text.starts_with(FAILURE_MARKER));
        assert!(text.contains("not initialized"));
        assert!(text.contains("hint:"));
        assert_eq!(report.error().unwrap().code(), "not_initialized");
    }
}
