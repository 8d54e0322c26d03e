use contacts_core::db::open_db_in_memory;
use contacts_core::{
    compile, ContactEntity, ContactRepository, InMemoryContactRepository, RepoError,
    SqliteContactRepository,
};
use rusqlite::Connection;

fn contact(first: &str, last: &str, company: &str, email: &str, phone: &str) -> ContactEntity {
    ContactEntity {
        first_name: first.to_string(),
        last_name: last.to_string(),
        company: company.to_string(),
        email: email.to_string(),
        phone_number: phone.to_string(),
        ..ContactEntity::default()
    }
}

fn seed(repo: &impl ContactRepository) {
    let rows = [
        contact("Al", "Smith", "Acme", "al@acme.com", "1111111"),
        contact("Bo", "Al", "Globex", "bo@globex.com", "2222222"),
        contact("Cy", "Jones", "Acme Industries", "cy@acme.com", ""),
        contact("Äda", "Ñúñez", "", "", "+34 600 000 000"),
        contact("", "", "Initech", "info@initech.com", "3333333"),
        contact("Dee", "Smith-Al", "acme", "", "4444444"),
        ContactEntity {
            note: "a\0bc".to_string(),
            ..contact("Nu", "Lin", "", "nul@example.com", "5555555")
        },
    ];
    for row in rows {
        repo.insert(&row).unwrap();
    }
}

#[test]
fn insert_assigns_increasing_ids_and_get_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();

    let mut input = contact("Al", "Smith", "Acme", "al@acme.com", "1111111");
    input.id = 77;
    let first = repo.insert(&input).unwrap();
    let second = repo
        .insert(&contact("Bo", "Al", "", "bo@x.io", ""))
        .unwrap();

    assert!(first.id > 0);
    assert!(second.id > first.id);
    assert_ne!(first.id, 77);
    assert_eq!(repo.get_by_id(first.id).unwrap(), Some(first));
    assert_eq!(repo.get_by_id(9_999).unwrap(), None);
}

#[test]
fn duplicate_email_phone_pair_is_a_conflict_and_leaves_store_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    repo.insert(&contact("Al", "Smith", "", "al@acme.com", "1111111"))
        .unwrap();

    let err = repo
        .insert(&contact("Other", "Person", "", "al@acme.com", "1111111"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
    assert_eq!(count_rows(&conn), 1);

    // Same email with a different phone is a different pair.
    repo.insert(&contact("Al", "Smith", "", "al@acme.com", "2222222"))
        .unwrap();
    assert_eq!(count_rows(&conn), 2);
}

#[test]
fn update_conflict_and_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    repo.insert(&contact("Al", "Smith", "", "al@acme.com", "1111111"))
        .unwrap();
    let mut second = repo
        .insert(&contact("Bo", "Al", "", "bo@acme.com", "2222222"))
        .unwrap();

    second.email = "al@acme.com".to_string();
    second.phone_number = "1111111".to_string();
    assert!(matches!(
        repo.update(&second).unwrap_err(),
        RepoError::Conflict(_)
    ));
    let unchanged = repo.get_by_id(second.id).unwrap().unwrap();
    assert_eq!(unchanged.email, "bo@acme.com");

    let missing = ContactEntity {
        id: 404,
        ..second.clone()
    };
    assert!(matches!(
        repo.update(&missing).unwrap_err(),
        RepoError::NotFound(404)
    ));
}

#[test]
fn delete_is_hard_and_reports_missing_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let stored = repo
        .insert(&contact("Al", "Smith", "", "", ""))
        .unwrap();

    repo.delete(stored.id).unwrap();
    assert_eq!(repo.get_by_id(stored.id).unwrap(), None);
    assert_eq!(count_rows(&conn), 0);
    assert!(matches!(
        repo.delete(stored.id).unwrap_err(),
        RepoError::NotFound(id) if id == stored.id
    ));
}

#[test]
fn get_all_respects_limit_and_id_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    seed(&repo);

    let all = repo.get_all(100).unwrap();
    assert_eq!(all.len(), 7);
    assert!(all.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert_eq!(repo.get_all(2).unwrap().len(), 2);
}

#[test]
fn pushdown_scan_matches_in_memory_evaluation() {
    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteContactRepository::try_new(&conn).unwrap();
    let memory = InMemoryContactRepository::new();
    seed(&sqlite);
    seed(&memory);

    let expressions = [
        "company == \"Acme\"",
        "company != \"Acme\"",
        "(firstName == \"Al\") OR (lastName == \"Al\")",
        "company.Contains(\"cme\")",
        "company.StartsWith(\"Acme\")",
        "lastName.EndsWith(\"Al\")",
        "lastName.EndsWith(\"\")",
        "firstName.StartsWith(\"Ä\") and lastName.Contains(\"úñ\")",
        "email.EndsWith(\".com\") && !(phoneNumber == \"\")",
        "id > 2 AND id <= 5",
        "NOT (id == 1 || id == 2) and company.Contains(\"\")",
        "phoneNumber.StartsWith(\"+34\")",
        "lastName.EndsWith(\"a very long suffix that exceeds every value\")",
        "note.StartsWith(\"a\0b\")",
        "note.EndsWith(\"\0bc\")",
        "note.Contains(\"\0\")",
        "note.StartsWith(\"a\") && !note.EndsWith(\"a\")",
        "note == \"a\0bc\"",
        "note != \"a\"",
    ];

    for expression in expressions {
        let predicate = compile(expression).unwrap();
        let expected: Vec<ContactEntity> = memory
            .get_all(100)
            .unwrap()
            .into_iter()
            .filter(|row| predicate.matches(row))
            .collect();
        assert_eq!(
            sqlite.scan(&predicate, 100).unwrap(),
            expected,
            "sqlite mismatch for {expression}"
        );
        assert_eq!(
            memory.scan(&predicate, 100).unwrap(),
            expected,
            "memory mismatch for {expression}"
        );
    }
}

#[test]
fn embedded_nul_is_significant_in_both_scan_paths() {
    let conn = open_db_in_memory().unwrap();
    let sqlite = SqliteContactRepository::try_new(&conn).unwrap();
    let memory = InMemoryContactRepository::new();
    seed(&sqlite);
    seed(&memory);

    for expression in [
        "note.StartsWith(\"a\0b\")",
        "note.EndsWith(\"\0bc\")",
        "note.Contains(\"\0b\")",
    ] {
        let predicate = compile(expression).unwrap();
        for rows in [
            sqlite.scan(&predicate, 100).unwrap(),
            memory.scan(&predicate, 100).unwrap(),
        ] {
            assert_eq!(rows.len(), 1, "{expression:?}");
            assert_eq!(rows[0].note, "a\0bc");
        }
    }

    let predicate = compile("note.StartsWith(\"a\0c\")").unwrap();
    assert!(sqlite.scan(&predicate, 100).unwrap().is_empty());
    assert!(memory.scan(&predicate, 100).unwrap().is_empty());
}

#[test]
fn scan_respects_limit() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    seed(&repo);

    let predicate = compile("id > 0").unwrap();
    let limited = repo.scan(&predicate, 3).unwrap();
    assert_eq!(limited.len(), 3);
    assert_eq!(limited[0].id, 1);
}

#[test]
fn memory_repository_follows_the_same_contract() {
    let repo = InMemoryContactRepository::new();
    let first = repo
        .insert(&contact("Al", "Smith", "", "al@acme.com", "1111111"))
        .unwrap();
    assert_eq!(first.id, 1);
    assert!(matches!(
        repo.insert(&contact("X", "Y", "", "al@acme.com", "1111111"))
            .unwrap_err(),
        RepoError::Conflict(_)
    ));
    assert_eq!(repo.len().unwrap(), 1);

    repo.delete(first.id).unwrap();
    assert!(repo.is_empty().unwrap());
    let next = repo
        .insert(&contact("Al", "Smith", "", "al@acme.com", "1111111"))
        .unwrap();
    assert_eq!(next.id, 2, "ids are never reused");
}

#[test]
fn try_new_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    assert!(matches!(
        SqliteContactRepository::try_new(&conn),
        Err(RepoError::Db(_))
    ));
}

fn count_rows(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM contacts;", [], |row| row.get(0))
        .unwrap()
}
