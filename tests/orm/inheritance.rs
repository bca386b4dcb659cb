//! Integration tests for mapped class hierarchies
//!
//! Tests joined inheritance, synthesized discriminator maps and what
//! subclasses inherit through the metadata factory.

use std::collections::BTreeMap;

use flowmeta_foundation::names::ARTIFICIAL_IDENTITY_PROPERTY;
use flowmeta_foundation::{Annotation, EntityAnnotation, LifecycleEvent, PersistenceSettings};
use flowmeta_orm::{GeneratorType, InheritanceType, MetadataFactory};
use flowmeta_reflection::{
    ClassDefinition, ClassRegistry, ClassSource, MethodDefinition, PropertyDefinition,
    ReflectionService,
};

// =============================================================================
// Helper Functions
// =============================================================================

const VEHICLE: &str = "Acme\\Fleet\\Domain\\Model\\Vehicle";
const CAR: &str = "Acme\\Fleet\\Domain\\Model\\Car";
const TRUCK: &str = "Acme\\Fleet\\Domain\\Model\\Truck";
const DOCUMENT: &str = "Acme\\Fleet\\Domain\\Model\\AbstractDocument";
const INVOICE: &str = "Acme\\Fleet\\Domain\\Model\\Invoice";
const DOCUMENT_REPOSITORY: &str = "Acme\\Fleet\\Domain\\Repository\\DocumentRepository";

fn entity(name: &str) -> ClassDefinition {
    ClassDefinition::class(name).annotate(Annotation::Entity(EntityAnnotation::default()))
}

fn fleet() -> ReflectionService {
    let registry = ClassRegistry::new()
        .with(
            entity(VEHICLE)
                .make_abstract()
                .annotate(Annotation::InheritanceType("JOINED".to_string()))
                .property(
                    PropertyDefinition::new("id")
                        .typed("integer")
                        .annotate(Annotation::Id)
                        .annotate(Annotation::GeneratedValue {
                            strategy: "IDENTITY".to_string(),
                        }),
                )
                .property(PropertyDefinition::new("plate").typed("string"))
                .method(
                    MethodDefinition::new("stamp")
                        .annotate(Annotation::Lifecycle(LifecycleEvent::PrePersist)),
                ),
        )
        .with(
            entity(CAR)
                .extends(VEHICLE)
                .property(PropertyDefinition::new("seats").typed("int")),
        )
        .with(
            entity(TRUCK)
                .extends(VEHICLE)
                .property(PropertyDefinition::new("payload").typed("float")),
        )
        .with(
            ClassDefinition::class(DOCUMENT)
                .make_abstract()
                .annotate(Annotation::MappedSuperclass {
                    repository_class: Some(DOCUMENT_REPOSITORY.to_string()),
                }),
        )
        .with(
            entity(INVOICE)
                .extends(DOCUMENT)
                .property(PropertyDefinition::new("total").typed("float")),
        );
    let names = registry.class_names();
    let mut reflection = ReflectionService::new(registry);
    reflection
        .build_reflection_data(BTreeMap::from([("Acme.Fleet".to_string(), names)]))
        .unwrap();
    reflection
}

// =============================================================================
// Joined Inheritance
// =============================================================================

#[test]
fn abstract_root_discriminates_concrete_subclasses() {
    let reflection = fleet();
    let mut factory = MetadataFactory::new(&reflection, &PersistenceSettings::default());

    let vehicle = factory.get_metadata_for(VEHICLE).unwrap();
    assert_eq!(vehicle.inheritance_type(), InheritanceType::Joined);
    assert_eq!(vehicle.discriminator_column().unwrap().name, "dtype");
    let map: Vec<(&str, &str)> = vehicle
        .discriminator_map()
        .iter()
        .map(|(value, class)| (value.as_str(), class.as_str()))
        .collect();
    assert_eq!(
        map,
        [("acme_fleet_car", CAR), ("acme_fleet_truck", TRUCK)]
    );
    assert_eq!(vehicle.identifier(), ["id"]);
    assert_eq!(vehicle.id_generator_type(), GeneratorType::Identity);
}

#[test]
fn joined_subclasses_keep_their_own_table() {
    let reflection = fleet();
    let mut factory = MetadataFactory::new(&reflection, &PersistenceSettings::default());

    let car = factory.get_metadata_for(CAR).unwrap().clone();
    assert_eq!(car.table_name(), "acme_fleet_domain_model_car");
    assert_eq!(car.inheritance_type(), InheritanceType::Joined);
    assert_eq!(car.discriminator_value(), Some("acme_fleet_car"));
    assert_eq!(car.parent_classes(), [VEHICLE]);
    assert_eq!(car.root_entity_name(), VEHICLE);
}

#[test]
fn subclasses_inherit_fields_identifier_and_callbacks() {
    let reflection = fleet();
    let mut factory = MetadataFactory::new(&reflection, &PersistenceSettings::default());

    let truck = factory.get_metadata_for(TRUCK).unwrap();
    assert!(truck.is_inherited_field("plate"));
    assert!(truck.is_inherited_field("id"));
    assert!(!truck.is_inherited_field("payload"));
    assert_eq!(
        truck.field_mapping("payload").unwrap().field_type.as_deref(),
        Some("float")
    );
    assert_eq!(truck.identifier(), ["id"]);
    assert_eq!(truck.id_generator_type(), GeneratorType::Identity);
    assert!(!truck.has_field(ARTIFICIAL_IDENTITY_PROPERTY));
    assert_eq!(truck.lifecycle_callbacks(LifecycleEvent::PrePersist), ["stamp"]);
}

// =============================================================================
// Mapped Superclasses
// =============================================================================

#[test]
fn repository_of_mapped_superclass_is_inherited() {
    let reflection = fleet();
    let mut factory = MetadataFactory::new(&reflection, &PersistenceSettings::default());

    let invoice = factory.get_metadata_for(INVOICE).unwrap();
    assert_eq!(
        invoice.custom_repository_class_name(),
        Some(DOCUMENT_REPOSITORY)
    );
    assert!(invoice.parent_classes().is_empty());
    assert_eq!(invoice.inheritance_type(), InheritanceType::None);
    assert!(invoice.has_field(ARTIFICIAL_IDENTITY_PROPERTY));
    assert!(factory.has_metadata_for(DOCUMENT));
    assert!(factory.get_metadata_for(DOCUMENT).unwrap().is_mapped_superclass());
}

#[test]
fn every_mapped_class_is_loaded_once() {
    let reflection = fleet();
    let mut factory = MetadataFactory::new(&reflection, &PersistenceSettings::default());

    let all = factory.get_all_metadata().unwrap();
    assert_eq!(all.len(), 5);
    assert!(all.iter().filter(|m| m.is_mapped_superclass()).count() == 1);
}
