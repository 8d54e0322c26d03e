//! Partial change-sets for merge updates.
//!
//! # Responsibility
//! - Represent "only these fields change" updates (`ContactPatch`).
//! - Convert JSON-patch style operation lists into a `ContactPatch`.
//!
//! # Invariants
//! - A patch never carries an identity; `id` cannot be patched.
//! - Fields absent from a patch are left untouched by `apply_to`.

use crate::model::contact::Contact;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Field-level change-set for one contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One JSON-patch operation (`{"op": "replace", "path": "/note", "value": "..."}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op: "replace".to_string(),
            path: path.into(),
            value: Some(Value::String(value.into())),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: "remove".to_string(),
            path: path.into(),
            value: None,
        }
    }
}

/// Rejected change-set input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    UnsupportedOperation(String),
    InvalidPath(String),
    ImmutableField(String),
    MissingValue(String),
    NonStringValue(String),
}

impl Display for PatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedOperation(op) => write!(f, "unsupported patch operation `{op}`"),
            Self::InvalidPath(path) => write!(f, "invalid patch path `{path}`"),
            Self::ImmutableField(path) => write!(f, "patch path `{path}` is read-only"),
            Self::MissingValue(path) => write!(f, "patch operation on `{path}` requires a value"),
            Self::NonStringValue(path) => {
                write!(f, "patch value for `{path}` must be a string")
            }
        }
    }
}

impl Error for PatchError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatchField {
    FirstName,
    LastName,
    Company,
    Email,
    PhoneNumber,
    Address,
    Note,
}

impl ContactPatch {
    /// Returns whether this patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Overwrites only the fields present in this patch.
    pub fn apply_to(&self, contact: &mut Contact) {
        let targets = [
            (&self.first_name, &mut contact.first_name),
            (&self.last_name, &mut contact.last_name),
            (&self.company, &mut contact.company),
            (&self.email, &mut contact.email),
            (&self.phone_number, &mut contact.phone_number),
            (&self.address, &mut contact.address),
            (&self.note, &mut contact.note),
        ];
        for (source, target) in targets {
            if let Some(value) = source {
                target.clone_from(value);
            }
        }
    }

    /// Builds a change-set from JSON-patch operations.
    ///
    /// Supports `add`/`replace` (set) and `remove` (reset to empty) on
    /// top-level content fields. Later operations on the same field win.
    pub fn from_operations(operations: &[PatchOperation]) -> Result<Self, PatchError> {
        let mut patch = Self::default();
        for operation in operations {
            let field = parse_patch_path(&operation.path)?;
            let value = match operation.op.trim().to_ascii_lowercase().as_str() {
                "add" | "replace" => match &operation.value {
                    Some(Value::String(text)) => text.clone(),
                    Some(_) => return Err(PatchError::NonStringValue(operation.path.clone())),
                    None => return Err(PatchError::MissingValue(operation.path.clone())),
                },
                "remove" => String::new(),
                other => return Err(PatchError::UnsupportedOperation(other.to_string())),
            };
            *patch.slot_mut(field) = Some(value);
        }
        Ok(patch)
    }

    fn slot_mut(&mut self, field: PatchField) -> &mut Option<String> {
        match field {
            PatchField::FirstName => &mut self.first_name,
            PatchField::LastName => &mut self.last_name,
            PatchField::Company => &mut self.company,
            PatchField::Email => &mut self.email,
            PatchField::PhoneNumber => &mut self.phone_number,
            PatchField::Address => &mut self.address,
            PatchField::Note => &mut self.note,
        }
    }
}

fn parse_patch_path(path: &str) -> Result<PatchField, PatchError> {
    let Some(name) = path.strip_prefix('/') else {
        return Err(PatchError::InvalidPath(path.to_string()));
    };
    if name.contains('/') {
        return Err(PatchError::InvalidPath(path.to_string()));
    }

    match name.to_ascii_lowercase().as_str() {
        "id" => Err(PatchError::ImmutableField(path.to_string())),
        "firstname" => Ok(PatchField::FirstName),
        "lastname" => Ok(PatchField::LastName),
        "company" => Ok(PatchField::Company),
        "email" => Ok(PatchField::Email),
        "phonenumber" => Ok(PatchField::PhoneNumber),
        "address" => Ok(PatchField::Address),
        "note" => Ok(PatchField::Note),
        _ => Err(PatchError::InvalidPath(path.to_string())),
    }
}
