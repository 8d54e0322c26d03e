//! Explicit mapping between wire and persisted contact shapes.
//!
//! # Invariants
//! - Every content field is copied verbatim in both directions.
//! - `to_internal` never takes identity from the wire record: new records get
//!   `UNSAVED_CONTACT_ID`, existing records keep their stored id.

use crate::model::contact::{Contact, ContactEntity, UNSAVED_CONTACT_ID};

/// Maps a persisted record to its wire shape.
pub fn to_external(entity: &ContactEntity) -> Contact {
    Contact {
        id: entity.id,
        first_name: entity.first_name.clone(),
        last_name: entity.last_name.clone(),
        company: entity.company.clone(),
        email: entity.email.clone(),
        phone_number: entity.phone_number.clone(),
        address: entity.address.clone(),
        note: entity.note.clone(),
    }
}

/// Maps a wire record to the persisted shape.
///
/// With `existing`, the stored identity is preserved and only content fields
/// are overwritten.
pub fn to_internal(contact: &Contact, existing: Option<&ContactEntity>) -> ContactEntity {
    ContactEntity {
        id: existing.map_or(UNSAVED_CONTACT_ID, |entity| entity.id),
        first_name: contact.first_name.clone(),
        last_name: contact.last_name.clone(),
        company: contact.company.clone(),
        email: contact.email.clone(),
        phone_number: contact.phone_number.clone(),
        address: contact.address.clone(),
        note: contact.note.clone(),
    }
}

/// Maps a batch of persisted records, preserving order.
pub fn to_external_all(entities: &[ContactEntity]) -> Vec<Contact> {
    entities.iter().map(to_external).collect()
}
