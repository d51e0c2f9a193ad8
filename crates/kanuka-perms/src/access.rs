//! Who currently has access.
//!
//! Derived entirely from the store: grant presence is authoritative, the
//! identity table supplies names, public key records show pending users.

use kanuka_core::IdentityId;
use kanuka_store::{AccessStore, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    /// In the table and holds a grant.
    Active,
    /// In the table with a public key, but no grant yet.
    Pending,
    /// In the table only.
    Unregistered,
    /// Holds a grant but is missing from the table.
    Orphaned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessEntry {
    pub id: IdentityId,
    /// `None` for orphaned grants.
    pub identifier: Option<String>,
    pub status: AccessStatus,
}

/// Every known identity and its access status, table entries first in
/// UUID order, then orphaned grants.
pub fn list_access<S: AccessStore>(store: &S) -> Result<Vec<AccessEntry>> {
    let table = store.load_identity_table()?;
    let grants = store.list_grants()?;
    let public_keys = store.list_public_keys()?;

    let mut entries: Vec<AccessEntry> = table
        .iter()
        .map(|(id, identifier)| {
            let status = if grants.contains(id) {
                AccessStatus::Active
            } else if public_keys.contains(id) {
                AccessStatus::Pending
            } else {
                AccessStatus::Unregistered
            };
            AccessEntry {
                id: *id,
                identifier: Some(identifier.to_string()),
                status,
            }
        })
        .collect();

    entries.extend(
        grants
            .iter()
            .filter(|id| !table.contains(id))
            .map(|id| AccessEntry {
                id: *id,
                identifier: None,
                status: AccessStatus::Orphaned,
            }),
    );

    Ok(entries)
}
