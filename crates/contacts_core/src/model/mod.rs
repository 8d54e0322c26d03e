//! Contact domain model.
//!
//! # Responsibility
//! - Define the persisted and wire-facing contact shapes.
//! - Own validation rules and partial change-sets for those shapes.
//!
//! # Invariants
//! - Every persisted contact is identified by a storage-assigned `ContactId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod contact;
pub mod patch;
pub mod validation;
