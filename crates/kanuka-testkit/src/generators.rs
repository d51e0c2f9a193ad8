//! Proptest generators for property-based testing.

use proptest::prelude::*;

use kanuka_core::{PrivateKey, SymmetricKey};

use crate::keys::{self, POOL_SIZE};

/// Generate a random project key.
pub fn symmetric_key() -> impl Strategy<Value = SymmetricKey> {
    any::<[u8; 32]>().prop_map(SymmetricKey::from_bytes)
}

/// Pick a keypair from the shared pool.
pub fn pooled_keypair() -> impl Strategy<Value = &'static PrivateKey> {
    (0..POOL_SIZE).prop_map(keys::keypair)
}

/// Generate a plausible email address.
pub fn email() -> impl Strategy<Value = String> {
    (
        "[a-z0-9]{1,12}([._+-][a-z0-9]{1,8})?",
        "[a-z0-9]{1,12}",
        "[a-z]{2,6}",
    )
        .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
}

/// A line ending style for re-framing PEM text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
    /// Alternate CRLF and LF, line by line.
    Mixed,
}

pub fn line_ending() -> impl Strategy<Value = LineEnding> {
    prop_oneof![
        Just(LineEnding::Lf),
        Just(LineEnding::CrLf),
        Just(LineEnding::Mixed),
    ]
}

/// Rewrite `text` so every line ends with the chosen style.
pub fn with_line_endings(text: &str, ending: LineEnding) -> String {
    text.lines()
        .enumerate()
        .map(|(i, line)| {
            let eol = match ending {
                LineEnding::Lf => "\n",
                LineEnding::CrLf => "\r\n",
                LineEnding::Mixed if i % 2 == 0 => "\r\n",
                LineEnding::Mixed => "\n",
            };
            format!("{line}{eol}")
        })
        .collect()
}
