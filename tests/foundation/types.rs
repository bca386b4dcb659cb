//! Integration tests for type string parsing

use flowmeta_foundation::types::{normalize_type, strip_nullable};
use flowmeta_foundation::{ErrorKind, parse_type};

// =============================================================================
// Parsing
// =============================================================================

#[test]
fn scalar_aliases_are_normalized() {
    assert_eq!(parse_type("int").unwrap().type_name, "integer");
    assert_eq!(parse_type("bool").unwrap().type_name, "boolean");
    assert_eq!(parse_type("double").unwrap().type_name, "float");
    assert_eq!(normalize_type("string"), "string");
}

#[test]
fn collections_carry_element_types() {
    let parsed = parse_type("array<\\Acme\\Shop\\Product>").unwrap();
    assert_eq!(parsed.type_name, "array");
    assert_eq!(parsed.element_type.as_deref(), Some("Acme\\Shop\\Product"));
    assert!(parsed.is_collection());
    assert_eq!(parsed.to_string(), "array<Acme\\Shop\\Product>");

    let parsed =
        parse_type("Doctrine\\Common\\Collections\\Collection<Acme\\Shop\\Product>").unwrap();
    assert!(parsed.is_collection());
}

#[test]
fn class_types_lose_the_leading_backslash() {
    let parsed = parse_type("\\Acme\\Shop\\Product").unwrap();
    assert_eq!(parsed.type_name, "Acme\\Shop\\Product");
    assert_eq!(parsed.element_type, None);
}

#[test]
fn element_type_on_scalar_is_rejected() {
    let err = parse_type("string<int>").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidType { .. }));
}

#[test]
fn unknown_lowercase_type_is_rejected() {
    assert!(parse_type("whatever").is_err());
}

#[test]
fn nullable_markers_are_stripped() {
    assert_eq!(strip_nullable("?string"), "string");
    assert_eq!(strip_nullable("string|null"), "string");
    assert_eq!(strip_nullable("null|string"), "string");
}
