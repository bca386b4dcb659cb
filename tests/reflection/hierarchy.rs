//! Integration tests for class hierarchy and member queries
//!
//! Tests subclass and implementation lookups, annotation indexes and
//! inherited members.

use std::collections::BTreeMap;

use flowmeta_foundation::names::PROXY_INTERFACE;
use flowmeta_foundation::{Annotation, AnnotationKind, EntityAnnotation, ErrorKind};
use flowmeta_reflection::{
    ClassDefinition, ClassRegistry, ClassSource, MethodDefinition, ParameterDefinition,
    PropertyDefinition, ReflectionService, Visibility,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn shop() -> ClassRegistry {
    ClassRegistry::new()
        .with(ClassDefinition::interface("Acme\\Shop\\Priced"))
        .with(ClassDefinition::interface("Acme\\Shop\\Mailer"))
        .with(ClassDefinition::interface(PROXY_INTERFACE))
        .with(
            ClassDefinition::class("Acme\\Shop\\Domain\\Model\\AbstractItem")
                .make_abstract()
                .implements("Acme\\Shop\\Priced")
                .property(PropertyDefinition::new("price").typed("float"))
                .property(
                    PropertyDefinition::new("secret")
                        .typed("string")
                        .visibility(Visibility::Private),
                )
                .method(
                    MethodDefinition::new("reprice")
                        .parameter(ParameterDefinition::new("amount").typed("float")),
                ),
        )
        .with(
            ClassDefinition::class("Acme\\Shop\\Domain\\Model\\Product")
                .extends("Acme\\Shop\\Domain\\Model\\AbstractItem")
                .annotate(Annotation::Entity(EntityAnnotation::default()))
                .property(PropertyDefinition::new("name").typed("string"))
                .method(MethodDefinition::new("rename").visibility(Visibility::Protected)),
        )
        .with(
            ClassDefinition::class("Acme\\Shop\\Domain\\Model\\Book")
                .extends("Acme\\Shop\\Domain\\Model\\Product")
                .annotate(Annotation::Entity(EntityAnnotation::default())),
        )
        .with(ClassDefinition::class("Acme\\Shop\\SmtpMailer").implements("Acme\\Shop\\Mailer"))
        .with(
            ClassDefinition::class("Acme\\Shop\\SmtpMailerProxy")
                .implements("Acme\\Shop\\Mailer")
                .implements(PROXY_INTERFACE),
        )
}

fn reflect(registry: ClassRegistry) -> ReflectionService {
    let names = registry.class_names();
    let mut reflection = ReflectionService::new(registry);
    reflection
        .build_reflection_data(BTreeMap::from([("Acme.Shop".to_string(), names)]))
        .unwrap();
    reflection
}

// =============================================================================
// Classes
// =============================================================================

#[test]
fn subclasses_and_parents() {
    let reflection = reflect(shop());
    let subclasses = reflection
        .get_all_sub_class_names_for_class("Acme\\Shop\\Domain\\Model\\AbstractItem")
        .unwrap();
    assert!(subclasses.contains(&"Acme\\Shop\\Domain\\Model\\Product".to_string()));
    assert!(subclasses.contains(&"Acme\\Shop\\Domain\\Model\\Book".to_string()));

    assert_eq!(
        reflection.get_parent_class_names("Acme\\Shop\\Domain\\Model\\Book"),
        [
            "Acme\\Shop\\Domain\\Model\\Product",
            "Acme\\Shop\\Domain\\Model\\AbstractItem"
        ]
    );
    assert!(reflection.is_class_subclass_of(
        "\\Acme\\Shop\\Domain\\Model\\Book",
        "Acme\\Shop\\Domain\\Model\\AbstractItem"
    ));
    assert!(reflection.is_class_abstract("Acme\\Shop\\Domain\\Model\\AbstractItem"));
    assert!(reflection.is_class_interface("Acme\\Shop\\Priced"));
}

#[test]
fn unknown_class_has_no_subclasses_to_ask_for() {
    let reflection = reflect(shop());
    let err = reflection
        .get_all_sub_class_names_for_class("Acme\\Shop\\Nowhere")
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidTarget { .. }));
}

#[test]
fn interfaces_are_inherited_by_subclasses() {
    let reflection = reflect(shop());
    let implementations = reflection
        .get_all_implementation_class_names_for_interface("Acme\\Shop\\Priced")
        .unwrap();
    assert!(implementations.contains(&"Acme\\Shop\\Domain\\Model\\Book".to_string()));
    assert!(!implementations.contains(&"Acme\\Shop\\Domain\\Model\\AbstractItem".to_string()));
}

#[test]
fn default_implementation_skips_the_proxy() {
    let reflection = reflect(shop());
    assert_eq!(
        reflection
            .get_default_implementation_class_name_for_interface("Acme\\Shop\\Mailer")
            .unwrap()
            .as_deref(),
        Some("Acme\\Shop\\SmtpMailer")
    );
    assert!(
        reflection
            .get_default_implementation_class_name_for_interface("Acme\\Shop\\SmtpMailer")
            .is_err()
    );
}

#[test]
fn classes_are_indexed_by_annotation() {
    let reflection = reflect(shop());
    let entities = reflection.get_class_names_by_annotation(&AnnotationKind::Entity);
    assert_eq!(entities.len(), 2);
    assert!(reflection.is_class_annotated_with("Acme\\Shop\\Domain\\Model\\Book", &AnnotationKind::Entity));
    assert!(
        reflection
            .get_class_annotation("Acme\\Shop\\SmtpMailer", &AnnotationKind::Entity)
            .is_none()
    );
}

// =============================================================================
// Members
// =============================================================================

#[test]
fn inherited_properties_exclude_private_ones() {
    let reflection = reflect(shop());
    let properties = reflection.get_class_property_names("Acme\\Shop\\Domain\\Model\\Product");
    assert!(properties.contains(&"name".to_string()));
    assert!(properties.contains(&"price".to_string()));
    assert!(!properties.contains(&"secret".to_string()));
    assert_eq!(
        reflection.get_property_declaring_class("Acme\\Shop\\Domain\\Model\\Product", "price"),
        Some("Acme\\Shop\\Domain\\Model\\AbstractItem")
    );
}

#[test]
fn methods_and_visibility() {
    let reflection = reflect(shop());
    let class_name = "Acme\\Shop\\Domain\\Model\\Product";
    assert!(reflection.has_method(class_name, "rename"));
    assert!(reflection.is_method_protected(class_name, "rename"));
    assert!(!reflection.is_method_public(class_name, "rename"));

    let parameters =
        reflection.get_method_parameters("Acme\\Shop\\Domain\\Model\\AbstractItem", "reprice");
    assert_eq!(parameters.len(), 1);
    assert_eq!(parameters[0].name, "amount");
    assert_eq!(parameters[0].position, 0);
    assert!(!parameters[0].optional);
}

// =============================================================================
// Properties
// =============================================================================

mod prop {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn reflected_classes_are_reported(
            names in proptest::collection::btree_set("[A-Z][a-z]{1,8}", 1..8),
        ) {
            let mut registry = ClassRegistry::new();
            let mut parent: Option<String> = None;
            for name in &names {
                let class_name = format!("Acme\\Generated\\{name}");
                let mut definition = ClassDefinition::class(&class_name);
                if let Some(parent) = &parent {
                    definition = definition.extends(parent);
                }
                registry.register(definition);
                parent = Some(class_name);
            }

            let mut reflection = ReflectionService::new(registry);
            for name in &names {
                let class_name = format!("\\Acme\\Generated\\{name}");
                reflection.reflect_class(&class_name).unwrap();
                prop_assert!(reflection.is_class_reflected(&class_name));
            }
            let all = reflection.get_all_class_names();
            for name in &names {
                let class_name = format!("Acme\\Generated\\{name}");
                prop_assert!(all.contains(&class_name));
            }
        }
    }
}
