//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the contact storage contract used by the service layer.
//! - Isolate SQLite query details from orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`) in
//!   addition to DB transport errors.

pub mod contact_repo;
pub mod memory_repo;
