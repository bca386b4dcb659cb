//! Integration tests for class schemata built during a reflection pass
//!
//! Tests model types, property types, identities and the rules entities and
//! value objects must follow.

use std::collections::BTreeMap;

use flowmeta_foundation::names::{
    ARTIFICIAL_IDENTITY_PROPERTY, ENTITY_CLASSNAME_CONSTANT, REPOSITORY_INTERFACE,
};
use flowmeta_foundation::{Annotation, EntityAnnotation, ErrorKind, Literal, Result};
use flowmeta_reflection::{
    ClassDefinition, ClassRegistry, ClassSource, MethodDefinition, ModelType, PropertyDefinition,
    ReflectionService,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn entity(name: &str) -> ClassDefinition {
    ClassDefinition::class(name).annotate(Annotation::Entity(EntityAnnotation::default()))
}

fn value_object(name: &str) -> ClassDefinition {
    ClassDefinition::class(name)
        .annotate(Annotation::ValueObject { embedded: false })
        .method(MethodDefinition::new("__construct"))
}

fn reflect(registry: ClassRegistry) -> Result<ReflectionService> {
    let names = registry.class_names();
    let mut reflection = ReflectionService::new(registry);
    reflection.build_reflection_data(BTreeMap::from([("Acme.Shop".to_string(), names)]))?;
    Ok(reflection)
}

// =============================================================================
// Schemata
// =============================================================================

#[test]
fn entity_schema_records_property_types() {
    let registry = ClassRegistry::new()
        .with(value_object("Acme\\Shop\\Domain\\Model\\Price"))
        .with(
            entity("Acme\\Shop\\Domain\\Model\\Product")
                .property(PropertyDefinition::new("name").typed("string"))
                .property(PropertyDefinition::new("stock").typed("int"))
                .property(PropertyDefinition::new("price").typed("\\Acme\\Shop\\Domain\\Model\\Price"))
                .property(
                    PropertyDefinition::new("related")
                        .typed("array<\\Acme\\Shop\\Domain\\Model\\Product>")
                        .annotate(Annotation::Lazy),
                ),
        );
    let reflection = reflect(registry).unwrap();
    let schema = reflection
        .get_class_schema("\\Acme\\Shop\\Domain\\Model\\Product")
        .unwrap();

    assert_eq!(schema.model_type(), Some(ModelType::Entity));
    assert_eq!(schema.property("stock").unwrap().type_name, "integer");
    assert_eq!(
        schema.property("price").unwrap().type_name,
        "Acme\\Shop\\Domain\\Model\\Price"
    );
    let related = schema.property("related").unwrap();
    assert_eq!(related.type_name, "array");
    assert_eq!(
        related.element_type.as_deref(),
        Some("Acme\\Shop\\Domain\\Model\\Product")
    );
    assert!(schema.is_property_lazy("related"));
    assert!(schema.has_property(ARTIFICIAL_IDENTITY_PROPERTY));

    let price = reflection
        .get_class_schema("Acme\\Shop\\Domain\\Model\\Price")
        .unwrap();
    assert_eq!(price.model_type(), Some(ModelType::ValueObject));
}

#[test]
fn classes_without_persistence_annotations_get_no_schema() {
    let registry = ClassRegistry::new().with(ClassDefinition::class("Acme\\Shop\\Service\\Cart"));
    let reflection = reflect(registry).unwrap();
    assert!(reflection.get_class_schema("Acme\\Shop\\Service\\Cart").is_none());
    assert!(reflection.get_class_schemata().is_empty());
}

#[test]
fn identity_properties_are_collected() {
    let registry = ClassRegistry::new().with(
        entity("Acme\\Shop\\Domain\\Model\\Customer")
            .property(
                PropertyDefinition::new("email")
                    .typed("string")
                    .annotate(Annotation::Identity),
            )
            .property(PropertyDefinition::new("name").typed("string")),
    );
    let reflection = reflect(registry).unwrap();
    let schema = reflection
        .get_class_schema("Acme\\Shop\\Domain\\Model\\Customer")
        .unwrap();
    assert_eq!(
        schema.identity_properties().get("email").map(String::as_str),
        Some("string")
    );
    assert_eq!(schema.identity_properties().len(), 1);
}

#[test]
fn repository_claims_its_entity() {
    let registry = ClassRegistry::new()
        .with(ClassDefinition::interface(REPOSITORY_INTERFACE))
        .with(entity("Acme\\Shop\\Domain\\Model\\Order"))
        .with(
            ClassDefinition::class("Acme\\Shop\\Storage\\Orders")
                .implements(REPOSITORY_INTERFACE)
                .annotate(Annotation::Scope("singleton".to_string()))
                .constant(
                    ENTITY_CLASSNAME_CONSTANT,
                    Literal::from("Acme\\Shop\\Domain\\Model\\Order"),
                ),
        );
    let reflection = reflect(registry).unwrap();
    let schema = reflection
        .get_class_schema("Acme\\Shop\\Domain\\Model\\Order")
        .unwrap();
    assert!(schema.is_aggregate_root());
    assert_eq!(schema.repository_class_name(), Some("Acme\\Shop\\Storage\\Orders"));
}

// =============================================================================
// Rules
// =============================================================================

#[test]
fn entities_must_be_prototypes() {
    let registry = ClassRegistry::new().with(
        entity("Acme\\Shop\\Domain\\Model\\Order")
            .annotate(Annotation::Scope("singleton".to_string())),
    );
    let err = reflect(registry).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidScope { .. }));
}

#[test]
fn value_objects_need_a_constructor_and_no_setters() {
    let registry = ClassRegistry::new().with(
        ClassDefinition::class("Acme\\Shop\\Domain\\Model\\Price")
            .annotate(Annotation::ValueObject { embedded: false }),
    );
    let err = reflect(registry).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidValueObject { .. }));

    let registry = ClassRegistry::new().with(
        value_object("Acme\\Shop\\Domain\\Model\\Price")
            .method(MethodDefinition::new("setAmount")),
    );
    let err = reflect(registry).unwrap_err();
    assert!(err.to_string().contains("setAmount"));
}

#[test]
fn lazy_identity_is_rejected() {
    let registry = ClassRegistry::new().with(
        entity("Acme\\Shop\\Domain\\Model\\Customer").property(
            PropertyDefinition::new("email")
                .typed("string")
                .annotate(Annotation::Identity)
                .annotate(Annotation::Lazy),
        ),
    );
    let err = reflect(registry).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SchemaConstraintViolation(_)));
}

#[test]
fn malformed_var_type_is_rejected() {
    let registry = ClassRegistry::new().with(
        entity("Acme\\Shop\\Domain\\Model\\Customer")
            .property(PropertyDefinition::new("email").typed("string with spaces")),
    );
    let err = reflect(registry).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidPropertyType { .. }));
}
