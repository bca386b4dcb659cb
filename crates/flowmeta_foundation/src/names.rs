//! Class name helpers and well-known names.
//!
//! Class names are namespace-qualified with backslash separators
//! (`Acme\Shop\Domain\Model\Product`). A single leading backslash is
//! accepted everywhere and stripped before any lookup.

/// Marker interface implemented by framework-compiled proxy classes.
pub const PROXY_INTERFACE: &str = "Neos\\Flow\\ObjectManagement\\Proxy\\ProxyInterface";

/// Interface implemented by generated ORM proxies.
pub const ORM_PROXY_INTERFACE: &str = "Doctrine\\Persistence\\Proxy";

/// Namespace holding generated ORM proxies.
pub const ORM_PROXY_NAMESPACE: &str = "Neos\\Flow\\Persistence\\Doctrine\\Proxies";

/// Suffix of the original class behind a compiled proxy.
pub const ORIGINAL_CLASSNAME_SUFFIX: &str = "_Original";

/// Interface every domain repository implements.
pub const REPOSITORY_INTERFACE: &str = "Neos\\Flow\\Persistence\\RepositoryInterface";

/// Base class of ORM entity repositories.
pub const ENTITY_REPOSITORY_CLASS: &str = "Doctrine\\ORM\\EntityRepository";

/// Class constant naming the entity a repository manages.
pub const ENTITY_CLASSNAME_CONSTANT: &str = "ENTITY_CLASSNAME";

/// Name of the synthesized identity property.
pub const ARTIFICIAL_IDENTITY_PROPERTY: &str = "Persistence_Object_Identifier";

/// Name of the constructor method.
pub const CONSTRUCTOR_METHOD: &str = "__construct";

/// Strips one leading backslash from a class name.
#[must_use]
pub fn clean_class_name(name: &str) -> &str {
    name.strip_prefix('\\').unwrap_or(name)
}

/// Cache key for a class: backslashes become underscores.
#[must_use]
pub fn cache_identifier(class_name: &str) -> String {
    clean_class_name(class_name).replace('\\', "_")
}

/// Namespace part of a class name (empty for global classes).
#[must_use]
pub fn namespace_of(class_name: &str) -> &str {
    let name = clean_class_name(class_name);
    name.rfind('\\').map_or("", |pos| &name[..pos])
}

/// Short name of a class (after the last backslash).
#[must_use]
pub fn short_name(class_name: &str) -> &str {
    let name = clean_class_name(class_name);
    name.rfind('\\').map_or(name, |pos| &name[pos + 1..])
}

/// Removes the proxy original-class suffix, if any.
#[must_use]
pub fn unproxied_class_name(class_name: &str) -> &str {
    let name = clean_class_name(class_name);
    name.strip_suffix(ORIGINAL_CLASSNAME_SUFFIX).unwrap_or(name)
}

/// True when the class name lives in the namespace (or is the namespace itself).
#[must_use]
pub fn is_in_namespace(class_name: &str, namespace: &str) -> bool {
    let name = clean_class_name(class_name);
    let namespace = clean_class_name(namespace).trim_end_matches('\\');
    if namespace.is_empty() {
        return true;
    }
    name == namespace
        || (name.starts_with(namespace) && name[namespace.len()..].starts_with('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_single_leading_backslash() {
        assert_eq!(clean_class_name("\\Foo\\Bar"), "Foo\\Bar");
        assert_eq!(clean_class_name("Foo\\Bar"), "Foo\\Bar");
        assert_eq!(clean_class_name("\\\\Foo"), "\\Foo");
    }

    #[test]
    fn cache_identifier_replaces_separators() {
        assert_eq!(cache_identifier("\\Acme\\Foo"), "Acme_Foo");
    }

    #[test]
    fn namespace_and_short_name() {
        assert_eq!(namespace_of("Acme\\Domain\\Model\\Car"), "Acme\\Domain\\Model");
        assert_eq!(short_name("Acme\\Domain\\Model\\Car"), "Car");
        assert_eq!(namespace_of("DateTime"), "");
        assert_eq!(short_name("DateTime"), "DateTime");
    }

    #[test]
    fn namespace_membership() {
        assert!(is_in_namespace("Acme\\Shop\\Foo", "Acme\\Shop"));
        assert!(is_in_namespace("Acme\\Shop\\Foo", "Acme\\Shop\\"));
        assert!(!is_in_namespace("Acme\\Shopping\\Foo", "Acme\\Shop"));
    }

    #[test]
    fn unproxied_name() {
        assert_eq!(unproxied_class_name("Acme\\Foo_Original"), "Acme\\Foo");
        assert_eq!(unproxied_class_name("Acme\\Foo"), "Acme\\Foo");
    }
}
