//! Contact validation rules.
//!
//! # Responsibility
//! - Check identity, email, phone and length invariants before writes.
//!
//! # Invariants
//! - Checks run in a fixed order and stop at the first failure.
//! - Pure: no I/O, no shared mutable state.
//! - (email, phone) uniqueness is a storage concern and is not checked here.

use crate::model::contact::{
    ContactEntity, ADDRESS_MAX_LEN, COMPANY_MAX_LEN, EMAIL_MAX_LEN, FIRST_NAME_MAX_LEN,
    LAST_NAME_MAX_LEN, NOTE_MAX_LEN, PHONE_NUMBER_MAX_LEN,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MIN_IDENTITY_LEN: usize = 2;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ]{7,15}$").expect("valid phone regex"));

/// First invariant violated by a contact record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    /// Neither a first/last name pair nor a company name is present.
    MissingIdentity,
    InvalidEmail(String),
    InvalidPhoneNumber(String),
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity => write!(
                f,
                "contact requires firstName and lastName (min {MIN_IDENTITY_LEN} chars each) or company (min {MIN_IDENTITY_LEN} chars)"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email address: `{value}`"),
            Self::InvalidPhoneNumber(value) => write!(f, "invalid phone number: `{value}`"),
            Self::FieldTooLong { field, max, actual } => {
                write!(f, "{field} exceeds max length {max} (got {actual})")
            }
        }
    }
}

impl Error for ContactValidationError {}

impl ContactEntity {
    /// Validates this record; see [`validate_contact`].
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        validate_contact(self)
    }
}

/// Validates one contact record before persistence.
///
/// Order: identity, email shape, phone shape, field lengths.
pub fn validate_contact(contact: &ContactEntity) -> Result<(), ContactValidationError> {
    if !has_identity(contact) {
        return Err(ContactValidationError::MissingIdentity);
    }
    if !contact.email.is_empty() && !is_valid_email(&contact.email) {
        return Err(ContactValidationError::InvalidEmail(contact.email.clone()));
    }
    if !contact.phone_number.is_empty() && !is_valid_phone_number(&contact.phone_number) {
        return Err(ContactValidationError::InvalidPhoneNumber(
            contact.phone_number.clone(),
        ));
    }

    check_len("firstName", &contact.first_name, FIRST_NAME_MAX_LEN)?;
    check_len("lastName", &contact.last_name, LAST_NAME_MAX_LEN)?;
    check_len("company", &contact.company, COMPANY_MAX_LEN)?;
    check_len("email", &contact.email, EMAIL_MAX_LEN)?;
    check_len("phoneNumber", &contact.phone_number, PHONE_NUMBER_MAX_LEN)?;
    check_len("address", &contact.address, ADDRESS_MAX_LEN)?;
    check_len("note", &contact.note, NOTE_MAX_LEN)?;

    Ok(())
}

/// Returns whether `value` has the `local@domain.tld` shape.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Returns whether `value` is 7-15 digits/spaces with an optional leading `+`.
pub fn is_valid_phone_number(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

fn has_identity(contact: &ContactEntity) -> bool {
    let person = char_len(&contact.first_name) >= MIN_IDENTITY_LEN
        && char_len(&contact.last_name) >= MIN_IDENTITY_LEN;
    person || char_len(&contact.company) >= MIN_IDENTITY_LEN
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ContactValidationError> {
    let actual = char_len(value);
    if actual > max {
        return Err(ContactValidationError::FieldTooLong { field, max, actual });
    }
    Ok(())
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}
