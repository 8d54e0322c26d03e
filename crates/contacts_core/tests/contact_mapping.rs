use contacts_core::{to_external, to_internal, Contact, ContactEntity, ContactPatch};
use serde_json::json;

fn stored_contact() -> ContactEntity {
    ContactEntity {
        id: 42,
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        company: "Navy".to_string(),
        email: "grace@navy.mil".to_string(),
        phone_number: "+1 555 0100".to_string(),
        address: "Arlington".to_string(),
        note: "COBOL".to_string(),
    }
}

#[test]
fn round_trip_is_lossless() {
    let entity = stored_contact();
    let external = to_external(&entity);
    assert_eq!(external.id, 42);
    assert_eq!(to_internal(&external, Some(&entity)), entity);
}

#[test]
fn new_records_never_take_client_identity() {
    let external = Contact {
        id: 7,
        company: "Acme".to_string(),
        ..Contact::default()
    };
    let entity = to_internal(&external, None);
    assert_eq!(entity.id, 0);
    assert!(!entity.is_persisted());
    assert_eq!(entity.company, "Acme");
}

#[test]
fn existing_identity_cannot_be_hijacked() {
    let existing = stored_contact();
    let payload = Contact {
        id: 999,
        company: "Other".to_string(),
        ..Contact::default()
    };
    let entity = to_internal(&payload, Some(&existing));
    assert_eq!(entity.id, existing.id);
    assert_eq!(entity.company, "Other");
    assert_eq!(entity.first_name, "");
}

#[test]
fn values_are_copied_verbatim() {
    let mut entity = stored_contact();
    entity.note = "  padded\nmulti-line  ".to_string();
    let external = to_external(&entity);
    assert_eq!(external.note, entity.note);
}

#[test]
fn wire_shape_uses_camel_case_and_defaults_missing_fields() {
    let json = serde_json::to_value(to_external(&stored_contact())).unwrap();
    assert_eq!(json["firstName"], "Grace");
    assert_eq!(json["phoneNumber"], "+1 555 0100");
    assert!(json.get("first_name").is_none());

    let partial: Contact = serde_json::from_value(json!({"company": "Acme"})).unwrap();
    assert_eq!(partial.id, 0);
    assert_eq!(partial.company, "Acme");
    assert_eq!(partial.email, "");
}

#[test]
fn patch_only_overwrites_present_fields() {
    let existing = stored_contact();
    let mut external = to_external(&existing);
    let patch = ContactPatch {
        note: Some("updated".to_string()),
        ..ContactPatch::default()
    };
    patch.apply_to(&mut external);

    let merged = to_internal(&external, Some(&existing));
    assert_eq!(
        merged,
        ContactEntity {
            note: "updated".to_string(),
            ..existing
        }
    );
}

#[test]
fn patch_deserializes_from_merge_object() {
    let patch: ContactPatch =
        serde_json::from_value(json!({"phoneNumber": "1234567", "note": ""})).unwrap();
    assert_eq!(patch.phone_number.as_deref(), Some("1234567"));
    assert_eq!(patch.note.as_deref(), Some(""));
    assert_eq!(patch.first_name, None);
    assert!(!patch.is_empty());
    assert!(ContactPatch::default().is_empty());
}
