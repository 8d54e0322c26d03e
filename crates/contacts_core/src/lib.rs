//! Core domain logic for the contact record service.
//! This crate is the single source of truth for contact invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod mapper;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use config::{DatabaseConfig, DatabaseLocation};
pub use logging::{
    default_log_level, init_logging, logging_status, LogLevel, LogSettings, LoggingError,
};
pub use mapper::{to_external, to_internal};
pub use model::contact::{Contact, ContactEntity, ContactId};
pub use model::patch::{ContactPatch, PatchError, PatchOperation};
pub use model::validation::{validate_contact, ContactValidationError};
pub use query::{compile, CompileError, Predicate};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use repo::memory_repo::InMemoryContactRepository;
pub use service::contact_service::{
    normalize_limit, ContactService, ServiceError, ServiceResult, MAX_RESULT_LIMIT,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
