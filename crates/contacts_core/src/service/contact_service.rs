//! Contact use-case service.
//!
//! # Responsibility
//! - Orchestrate mapper, validator, predicate compiler and repository for
//!   list/query/get/create/update/patch/delete.
//! - Translate repository failures into the client/fault error contract.
//!
//! # Invariants
//! - Every write is validated before it reaches the repository.
//! - Update and patch keep the stored identity; payload ids are ignored.
//! - Storage failure details are logged, never returned to callers.
//! - Result sets never exceed `MAX_RESULT_LIMIT` rows.

use crate::mapper::{to_external, to_external_all, to_internal};
use crate::model::contact::{Contact, ContactEntity, ContactId};
use crate::model::patch::{ContactPatch, PatchError, PatchOperation};
use crate::model::validation::ContactValidationError;
use crate::query::{compile, CompileError};
use crate::repo::contact_repo::{ContactRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Hard ceiling for list/query result sizes.
pub const MAX_RESULT_LIMIT: u32 = 500;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Outcome contract returned to transport adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Malformed request input (e.g. an unusable change-set).
    InvalidArgument(String),
    Validation(ContactValidationError),
    Compile(CompileError),
    NotFound(ContactId),
    /// Write rejected by storage uniqueness rules.
    Conflict(String),
    /// Unexpected storage or internal failure; safe to retry.
    Fault(String),
}

impl ServiceError {
    /// Whether the caller must change its input before retrying.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Fault(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Validation(_) => "validation_failed",
            Self::Compile(_) => "invalid_query",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Fault(_) => "internal_fault",
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Validation(err) => write!(f, "validation failed: {err}"),
            Self::Compile(err) => write!(f, "invalid query: {err}"),
            Self::NotFound(id) => write!(f, "contact not found: {id}"),
            Self::Conflict(message) => write!(f, "conflict: {message}"),
            Self::Fault(message) => write!(f, "internal fault: {message}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Compile(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ContactValidationError> for ServiceError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CompileError> for ServiceError {
    fn from(value: CompileError) -> Self {
        Self::Compile(value)
    }
}

impl From<PatchError> for ServiceError {
    fn from(value: PatchError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

/// Contact service facade over a repository implementation.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists contacts in store order, at most `limit` (clamped to 1..=500).
    pub fn list(&self, limit: Option<u32>) -> ServiceResult<Vec<Contact>> {
        let applied_limit = normalize_limit(limit);
        let contacts = self
            .repo
            .get_all(applied_limit)
            .map_err(|err| repo_failure("contact_list", err))?;
        info!(
            "event=contact_list module=service status=ok limit={} count={}",
            applied_limit,
            contacts.len()
        );
        Ok(to_external_all(&contacts))
    }

    /// Lists contacts matching a filter expression.
    pub fn query(&self, expression: &str, limit: Option<u32>) -> ServiceResult<Vec<Contact>> {
        let applied_limit = normalize_limit(limit);
        let predicate = compile(expression).map_err(|err| {
            warn!(
                "event=contact_query module=service status=rejected error_code=invalid_query error={}",
                err
            );
            ServiceError::from(err)
        })?;
        let contacts = self
            .repo
            .scan(&predicate, applied_limit)
            .map_err(|err| repo_failure("contact_query", err))?;
        info!(
            "event=contact_query module=service status=ok limit={} count={}",
            applied_limit,
            contacts.len()
        );
        Ok(to_external_all(&contacts))
    }

    pub fn get(&self, id: ContactId) -> ServiceResult<Contact> {
        let entity = self
            .repo
            .get_by_id(id)
            .map_err(|err| repo_failure("contact_get", err))?
            .ok_or(ServiceError::NotFound(id))?;
        Ok(to_external(&entity))
    }

    /// Validates and stores a new contact; any payload id is ignored.
    pub fn create(&self, contact: &Contact) -> ServiceResult<Contact> {
        let entity = to_internal(contact, None);
        entity.validate()?;

        let stored = self
            .repo
            .insert(&entity)
            .map_err(|err| repo_failure("contact_create", err))?;
        info!(
            "event=contact_create module=service status=ok id={}",
            stored.id
        );
        Ok(to_external(&stored))
    }

    /// Replaces all content fields of an existing contact.
    pub fn update(&self, id: ContactId, contact: &Contact) -> ServiceResult<Contact> {
        let existing = self.load_existing(id, "contact_update")?;
        let entity = to_internal(contact, Some(&existing));
        entity.validate()?;

        self.repo
            .update(&entity)
            .map_err(|err| repo_failure("contact_update", err))?;
        info!("event=contact_update module=service status=ok id={id}");
        Ok(to_external(&entity))
    }

    /// Merges only the fields present in `patch` into an existing contact.
    pub fn patch(&self, id: ContactId, patch: &ContactPatch) -> ServiceResult<Contact> {
        let existing = self.load_existing(id, "contact_patch")?;
        let mut merged = to_external(&existing);
        patch.apply_to(&mut merged);
        let entity = to_internal(&merged, Some(&existing));
        entity.validate()?;

        self.repo
            .update(&entity)
            .map_err(|err| repo_failure("contact_patch", err))?;
        info!("event=contact_patch module=service status=ok id={id}");
        Ok(to_external(&entity))
    }

    /// Applies JSON-patch operations; malformed operations are `InvalidArgument`.
    pub fn patch_operations(
        &self,
        id: ContactId,
        operations: &[PatchOperation],
    ) -> ServiceResult<Contact> {
        let patch = ContactPatch::from_operations(operations)?;
        self.patch(id, &patch)
    }

    pub fn delete(&self, id: ContactId) -> ServiceResult<()> {
        self.load_existing(id, "contact_delete")?;
        self.repo
            .delete(id)
            .map_err(|err| repo_failure("contact_delete", err))?;
        info!("event=contact_delete module=service status=ok id={id}");
        Ok(())
    }

    fn load_existing(
        &self,
        id: ContactId,
        event: &'static str,
    ) -> ServiceResult<ContactEntity> {
        self.repo
            .get_by_id(id)
            .map_err(|err| repo_failure(event, err))?
            .ok_or(ServiceError::NotFound(id))
    }
}

/// Clamps a requested result size to `1..=MAX_RESULT_LIMIT`.
pub fn normalize_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(MAX_RESULT_LIMIT).clamp(1, MAX_RESULT_LIMIT)
}

fn repo_failure(event: &'static str, err: RepoError) -> ServiceError {
    match err {
        RepoError::NotFound(id) => ServiceError::NotFound(id),
        RepoError::Conflict(message) => {
            warn!("event={event} module=service status=rejected error_code=conflict");
            ServiceError::Conflict(message)
        }
        other => {
            error!(
                "event={event} module=service status=error error_code=repo_failure error={}",
                other
            );
            ServiceError::Fault("storage operation failed".to_string())
        }
    }
}
