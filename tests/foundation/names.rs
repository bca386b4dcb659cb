//! Integration tests for class name helpers

use flowmeta_foundation::names::{
    is_in_namespace, namespace_of, short_name, unproxied_class_name,
};
use flowmeta_foundation::{cache_identifier, clean_class_name};

// =============================================================================
// Class Names
// =============================================================================

#[test]
fn leading_backslash_is_stripped() {
    assert_eq!(clean_class_name("\\Acme\\Foo"), "Acme\\Foo");
    assert_eq!(clean_class_name("Acme\\Foo"), "Acme\\Foo");
}

#[test]
fn cache_identifiers_use_underscores() {
    assert_eq!(cache_identifier("\\Acme\\Shop\\Product"), "Acme_Shop_Product");
}

#[test]
fn namespace_and_short_name() {
    assert_eq!(namespace_of("Acme\\Shop\\Product"), "Acme\\Shop");
    assert_eq!(short_name("Acme\\Shop\\Product"), "Product");
    assert_eq!(namespace_of("Product"), "");
    assert_eq!(short_name("Product"), "Product");
}

#[test]
fn original_suffix_is_removed() {
    assert_eq!(unproxied_class_name("Acme\\Product_Original"), "Acme\\Product");
    assert_eq!(unproxied_class_name("Acme\\Product"), "Acme\\Product");
}

#[test]
fn namespace_membership() {
    assert!(is_in_namespace("Acme\\Shop\\Product", "Acme\\Shop"));
    assert!(is_in_namespace("Acme\\Shop", "Acme\\Shop\\"));
    assert!(!is_in_namespace("Acme\\Shopping\\Cart", "Acme\\Shop"));
}
