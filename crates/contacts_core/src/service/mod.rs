//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, mapping and repository calls into use-case APIs.
//! - Keep transport adapters decoupled from storage details.

pub mod contact_service;
