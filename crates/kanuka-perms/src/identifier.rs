//! Human-facing identifiers.
//!
//! Identities are addressed by email. One fixed address is reserved for
//! automated pipelines and is otherwise an ordinary identifier.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{RegisterError, Result};

/// Identifier used by CI pipelines that bootstrap their own access.
pub const CI_IDENTIFIER: &str = "ci@kanuka.local";

const EMAIL_PATTERN: &str =
    r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$";

/// Compiled [`EMAIL_PATTERN`]; `None` only if the pattern itself is broken,
/// in which case nothing validates.
fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

pub fn is_valid_email(identifier: &str) -> bool {
    let Some((local, _)) = identifier.split_once('@') else {
        return false;
    };
    let Some(pattern) = email_pattern() else {
        return false;
    };
    pattern.is_match(identifier)
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
}

/// Reject anything that is not a plausible email address.
pub fn validate_email(identifier: &str) -> Result<()> {
    if is_valid_email(identifier) {
        Ok(())
    } else {
        Err(RegisterError::InvalidEmailFormat {
            identifier: identifier.to_string(),
        })
    }
}

pub fn is_ci_identifier(identifier: &str) -> bool {
    identifier == CI_IDENTIFIER
}
