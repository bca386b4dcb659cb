//! Integration tests for settings loading

use flowmeta_foundation::{ApplicationContext, ErrorKind, Settings};

#[test]
fn defaults_apply_to_missing_keys() {
    let settings = Settings::from_toml_str("").unwrap();
    assert_eq!(settings.context, ApplicationContext::Development);
    assert_eq!(settings.persistence.max_identifier_length, 64);
    assert!(settings.reflection.is_tag_ignored("todo"));
}

#[test]
fn toml_overrides_defaults() {
    let settings = Settings::from_toml_str(
        r#"
context = "Production"

[reflection]
log_incorrect_doc_comment_hints = true

[reflection.ignored_tags]
todo = false
custom = true

[persistence]
max_identifier_length = 30
"#,
    )
    .unwrap();
    assert!(settings.context.is_production());
    assert!(settings.reflection.log_incorrect_doc_comment_hints);
    assert!(!settings.reflection.is_tag_ignored("todo"));
    assert!(settings.reflection.is_tag_ignored("Custom"));
    assert_eq!(settings.persistence.max_identifier_length, 30);
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = Settings::from_toml_str("context = [").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Config(_)));
}
