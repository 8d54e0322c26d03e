use contacts_core::query::{MAX_EXPRESSION_LEN, MAX_TERMS};
use contacts_core::{compile, CompileError, ContactEntity};

fn contact(id: i64, first: &str, last: &str, company: &str) -> ContactEntity {
    ContactEntity {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        company: company.to_string(),
        ..ContactEntity::default()
    }
}

#[test]
fn company_equality_matches_exactly() {
    let predicate = compile("company==\"Acme\"").unwrap();
    assert!(predicate.matches(&contact(1, "", "", "Acme")));
    assert!(!predicate.matches(&contact(2, "", "", "acme")));
    assert!(!predicate.matches(&contact(3, "", "", "Acme Corp")));
    assert_eq!(predicate.source(), "company==\"Acme\"");
}

#[test]
fn unknown_field_is_rejected() {
    assert_eq!(
        compile("unknownField==1").unwrap_err(),
        CompileError::UnknownField {
            name: "unknownField".to_string(),
            offset: 0,
        }
    );
}

#[test]
fn parenthesised_or_matches_either_side() {
    let predicate = compile("(firstName==\"Al\") OR (lastName==\"Al\")").unwrap();
    assert!(predicate.matches(&contact(1, "Al", "Smith", "")));
    assert!(predicate.matches(&contact(2, "Bo", "Al", "")));
    assert!(!predicate.matches(&contact(3, "Bo", "Smith", "")));
}

#[test]
fn not_and_inequality() {
    let predicate = compile("NOT (company == \"Acme\") && company != \"\"").unwrap();
    assert!(predicate.matches(&contact(1, "", "", "Globex")));
    assert!(!predicate.matches(&contact(2, "", "", "Acme")));
    assert!(!predicate.matches(&contact(3, "", "", "")));
}

#[test]
fn id_supports_relational_comparisons() {
    let predicate = compile("id >= 2 and id < 4").unwrap();
    let matched: Vec<i64> = (1..=5)
        .map(|id| contact(id, "", "", "X"))
        .filter(|record| predicate.matches(record))
        .map(|record| record.id)
        .collect();
    assert_eq!(matched, vec![2, 3]);

    assert!(compile("id <> 3").unwrap().matches(&contact(1, "", "", "")));
    assert!(compile("id = 1").unwrap().matches(&contact(1, "", "", "")));
}

#[test]
fn string_methods() {
    let record = contact(1, "Alice", "Smith", "Acme Industries");
    assert!(compile("company.Contains(\"Indus\")").unwrap().matches(&record));
    assert!(compile("company.startswith(\"Acme\")").unwrap().matches(&record));
    assert!(compile("lastName.EndsWith(\"ith\")").unwrap().matches(&record));
    assert!(!compile("lastName.EndsWith(\"Smi\")").unwrap().matches(&record));
    assert!(compile("note.Contains(\"\")").unwrap().matches(&record));
}

#[test]
fn type_mismatches_are_rejected() {
    for expression in [
        "company > \"A\"",
        "lastName <= \"Z\"",
        "company == 5",
        "id == \"5\"",
        "id.Contains(\"1\")",
        "note.Contains(5)",
    ] {
        let err = compile(expression).unwrap_err();
        assert!(
            matches!(err, CompileError::TypeMismatch { .. }),
            "{expression}: {err:?}"
        );
    }
}

#[test]
fn malformed_input_is_rejected() {
    for expression in [
        "",
        "   ",
        "company ==",
        "company \"Acme\"",
        "(company == \"Acme\"",
        "company == \"Acme\")",
        "company == \"Acme\" AND",
        "OR company == \"Acme\"",
        "company == 'Acme'",
        "company.Matches(\"x\")",
        "company.Contains \"x\"",
        "id == 1; DROP TABLE contacts",
        "System.IO.File.Delete(\"x\")",
    ] {
        assert!(compile(expression).is_err(), "accepted: {expression}");
    }
}

#[test]
fn oversized_input_is_rejected() {
    let clause = "company == \"Acme\" OR ".repeat(300);
    let expression = format!("{clause}id == 1");
    assert_eq!(
        compile(&expression).unwrap_err(),
        CompileError::TooLong {
            len: expression.len(),
            max: MAX_EXPRESSION_LEN,
        }
    );
}

#[test]
fn term_count_is_bounded() {
    let at_limit = format!("{}id==1", "id==1||".repeat(MAX_TERMS - 1));
    assert!(at_limit.len() < MAX_EXPRESSION_LEN);
    assert!(compile(&at_limit).is_ok());

    let over_limit = format!("{}id==1", "id==1||".repeat(MAX_TERMS));
    assert!(over_limit.len() < MAX_EXPRESSION_LEN);
    assert_eq!(
        compile(&over_limit).unwrap_err(),
        CompileError::TooManyTerms { max: MAX_TERMS }
    );
}

#[test]
fn compile_errors_render_readable_messages() {
    let err = compile("nickname == \"x\"").unwrap_err();
    assert_eq!(err.to_string(), "unknown field `nickname` at 0");
}
