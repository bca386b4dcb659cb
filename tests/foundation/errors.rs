//! Integration tests for Error types
//!
//! Tests error construction, display, context, and error kinds.

use flowmeta_foundation::{Error, ErrorContext, ErrorKind, MappingError, TargetKind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_class_loading_failed() {
    let err = Error::class_loading_failed("Acme\\Missing", "the class source does not know it");
    assert!(err.is_class_loading_failure());
    let msg = format!("{err}");
    assert!(msg.contains("Acme\\Missing"));
}

#[test]
fn error_invalid_target() {
    let err = Error::invalid_target("Acme\\Foo", TargetKind::Interface);
    assert!(matches!(err.kind, ErrorKind::InvalidTarget { .. }));
    assert!(format!("{err}").contains("interface"));
    assert!(!err.is_class_loading_failure());
}

#[test]
fn error_schema_violation() {
    let err = Error::schema_violation("no identity");
    assert!(matches!(err.kind, ErrorKind::SchemaConstraintViolation(_)));
    assert!(format!("{err}").contains("no identity"));
}

#[test]
fn error_mapping() {
    let err = Error::mapping(MappingError::NotAnEntity {
        class_name: "Acme\\Service".to_string(),
    });
    assert!(matches!(
        err.kind,
        ErrorKind::Mapping(MappingError::NotAnEntity { .. })
    ));
    assert!(format!("{err}").contains("Acme\\Service"));
}

// =============================================================================
// Error Context
// =============================================================================

#[test]
fn while_doing_stacks_frames() {
    let err = Error::internal("boom")
        .while_doing("mapping fields")
        .while_doing("loading metadata");
    let context = err.context.unwrap();
    assert_eq!(context.stack, ["mapping fields", "loading metadata"]);
}

#[test]
fn context_names_class_and_member() {
    let err = Error::schema_violation("bad").with_context(
        ErrorContext::new()
            .with_class("Acme\\Product")
            .with_member("sku"),
    );
    assert_eq!(err.context.unwrap().to_string(), "Acme\\Product::sku");
}
