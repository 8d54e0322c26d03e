//! Contact domain model.
//!
//! # Responsibility
//! - Define the persisted record (`ContactEntity`) and the wire record
//!   (`Contact`) as two distinct types with the same field list.
//! - Expose max-length limits shared by validation and storage schema.
//!
//! # Invariants
//! - `id == 0` means "not yet persisted"; ids are assigned by storage only.
//! - String fields are stored verbatim, never truncated or normalized.
//!
//! # See also
//! - crate::mapper

use serde::{Deserialize, Serialize};

/// Numeric identity assigned by the repository on insert.
pub type ContactId = i64;

/// Identity value carried by records that were never persisted.
pub const UNSAVED_CONTACT_ID: ContactId = 0;

pub const FIRST_NAME_MAX_LEN: usize = 64;
pub const LAST_NAME_MAX_LEN: usize = 64;
pub const COMPANY_MAX_LEN: usize = 128;
pub const EMAIL_MAX_LEN: usize = 128;
pub const PHONE_NUMBER_MAX_LEN: usize = 32;
pub const ADDRESS_MAX_LEN: usize = 256;
pub const NOTE_MAX_LEN: usize = 1024;

/// Canonical persisted contact record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactEntity {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
}

impl ContactEntity {
    /// Returns whether this record already has a storage-assigned identity.
    pub fn is_persisted(&self) -> bool {
        self.id != UNSAVED_CONTACT_ID
    }
}

impl std::fmt::Display for ContactEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "contact: {}{} {}",
            self.company, self.last_name, self.first_name
        )
    }
}

/// Wire-facing contact record.
///
/// Serialized with camelCase keys. Missing keys deserialize to empty values
/// so partial client payloads still map onto a full record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub id: ContactId,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub note: String,
}
