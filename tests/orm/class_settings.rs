//! Integration tests for class-level mapping annotations
//!
//! Tests queries, caching, change tracking, overrides and embedded values.

use std::collections::BTreeMap;

use flowmeta_foundation::names::ARTIFICIAL_IDENTITY_PROPERTY;
use flowmeta_foundation::{
    Annotation, AssociationAnnotation, AssociationOverrideAnnotation, CacheAnnotation,
    EntityAnnotation, ErrorKind, JoinColumnAnnotation, MappingError, NamedNativeQueryAnnotation,
    NamedQueryAnnotation, PersistenceSettings,
};
use flowmeta_orm::{
    CacheUsage, ChangeTrackingPolicy, ClassMetadata, FetchMode, GeneratorType, MetadataFactory,
};
use flowmeta_reflection::{
    ClassDefinition, ClassRegistry, ClassSource, MethodDefinition, PropertyDefinition,
    ReflectionService,
};

// =============================================================================
// Helper Functions
// =============================================================================

const ORDER: &str = "Acme\\Shop\\Domain\\Model\\Order";
const CUSTOMER: &str = "Acme\\Shop\\Domain\\Model\\Customer";
const ADDRESS: &str = "Acme\\Shop\\Domain\\Model\\Address";

fn entity(name: &str) -> ClassDefinition {
    ClassDefinition::class(name).annotate(Annotation::Entity(EntityAnnotation::default()))
}

fn reflect(registry: ClassRegistry) -> ReflectionService {
    let names = registry.class_names();
    let mut reflection = ReflectionService::new(registry);
    reflection
        .build_reflection_data(BTreeMap::from([("Acme.Shop".to_string(), names)]))
        .unwrap();
    reflection
}

fn metadata_for(reflection: &ReflectionService, class_name: &str) -> ClassMetadata {
    let mut factory = MetadataFactory::new(reflection, &PersistenceSettings::default());
    factory.get_metadata_for(class_name).unwrap().clone()
}

fn shop() -> ClassRegistry {
    ClassRegistry::new()
        .with(
            ClassDefinition::class(ADDRESS)
                .annotate(Annotation::ValueObject { embedded: true })
                .annotate(Annotation::Embeddable)
                .property(PropertyDefinition::new("city").typed("string"))
                .method(MethodDefinition::new("__construct")),
        )
        .with(entity(CUSTOMER).property(PropertyDefinition::new("name").typed("string")))
        .with(
            entity(ORDER)
                .annotate(Annotation::ChangeTrackingPolicy("deferred_implicit".to_string()))
                .annotate(Annotation::Cache(CacheAnnotation {
                    usage: "NONSTRICT_READ_WRITE".to_string(),
                    region: Some("orders".to_string()),
                }))
                .annotate(Annotation::NamedQueries(vec![NamedQueryAnnotation {
                    name: "open".to_string(),
                    query: "SELECT o FROM __CLASS__ o WHERE o.closed = false".to_string(),
                }]))
                .annotate(Annotation::NamedNativeQueries(vec![
                    NamedNativeQueryAnnotation {
                        name: "count".to_string(),
                        query: "SELECT COUNT(*) FROM acme_shop_domain_model_order".to_string(),
                        ..NamedNativeQueryAnnotation::default()
                    },
                ]))
                .annotate(Annotation::AssociationOverrides(vec![
                    AssociationOverrideAnnotation {
                        name: "customer".to_string(),
                        join_columns: vec![JoinColumnAnnotation {
                            name: Some("buyer".to_string()),
                            referenced_column_name: Some("persistence_object_identifier".to_string()),
                            ..JoinColumnAnnotation::default()
                        }],
                        fetch: Some("EAGER".to_string()),
                        ..AssociationOverrideAnnotation::default()
                    },
                ]))
                .property(
                    PropertyDefinition::new("number")
                        .typed("string")
                        .annotate(Annotation::Id)
                        .annotate(Annotation::GeneratedValue {
                            strategy: "CUSTOM".to_string(),
                        })
                        .annotate(Annotation::CustomIdGenerator {
                            class: Some("Acme\\Shop\\OrderNumberGenerator".to_string()),
                        }),
                )
                .property(
                    PropertyDefinition::new("customer")
                        .typed(CUSTOMER)
                        .annotate(Annotation::ManyToOne(AssociationAnnotation::default()))
                        .annotate(Annotation::Cache(CacheAnnotation::default())),
                )
                .property(
                    PropertyDefinition::new("shippingAddress")
                        .typed(ADDRESS)
                        .annotate(Annotation::Embedded {
                            class: None,
                            column_prefix: Some("ship_".to_string()),
                        }),
                )
                .method(MethodDefinition::new("__construct")),
        )
}

// =============================================================================
// Class Settings
// =============================================================================

#[test]
fn change_tracking_and_cache() {
    let reflection = reflect(shop());
    let order = metadata_for(&reflection, ORDER);

    assert_eq!(
        order.change_tracking_policy(),
        ChangeTrackingPolicy::DeferredImplicit
    );
    let cache = order.cache().unwrap();
    assert_eq!(cache.usage, CacheUsage::NonstrictReadWrite);
    assert_eq!(cache.region.as_deref(), Some("orders"));
    assert_eq!(
        order.association_cache("customer").unwrap().usage,
        CacheUsage::ReadOnly
    );
}

#[test]
fn named_queries_are_registered() {
    let reflection = reflect(shop());
    let order = metadata_for(&reflection, ORDER);

    assert!(order.named_queries()["open"].query.contains("o.closed"));
    assert_eq!(order.named_native_queries().len(), 1);
    assert_eq!(order.named_native_queries()["count"].result_class, None);
}

#[test]
fn custom_identifier_generator() {
    let reflection = reflect(shop());
    let order = metadata_for(&reflection, ORDER);

    assert_eq!(order.identifier(), ["number"]);
    assert_eq!(order.id_generator_type(), GeneratorType::Custom);
    assert_eq!(
        order.custom_generator_class(),
        Some("Acme\\Shop\\OrderNumberGenerator")
    );
}

#[test]
fn association_override_replaces_join_columns_and_fetch() {
    let reflection = reflect(shop());
    let order = metadata_for(&reflection, ORDER);

    let customer = order.association_mapping("customer").unwrap();
    assert_eq!(customer.join_columns.len(), 1);
    assert_eq!(customer.join_columns[0].name.as_deref(), Some("buyer"));
    assert_eq!(customer.fetch, FetchMode::Eager);
}

#[test]
fn orm_embedded_values() {
    let reflection = reflect(shop());
    let order = metadata_for(&reflection, ORDER);

    let address = &order.embedded_classes()["shippingAddress"];
    assert_eq!(address.class, ADDRESS);
    assert_eq!(address.column_prefix.as_deref(), Some("ship_"));
    assert!(!order.has_field("shippingAddress"));

    let embeddable = metadata_for(&reflection, ADDRESS);
    assert!(embeddable.is_embedded_class());
    assert!(embeddable.has_field("city"));
    assert!(!embeddable.has_field(ARTIFICIAL_IDENTITY_PROPERTY));
}

#[test]
fn unknown_change_tracking_policy_is_fatal() {
    let registry = ClassRegistry::new().with(
        entity(CUSTOMER).annotate(Annotation::ChangeTrackingPolicy("EVENTUALLY".to_string())),
    );
    let reflection = reflect(registry);
    let mut factory = MetadataFactory::new(&reflection, &PersistenceSettings::default());
    let err = factory.get_metadata_for(CUSTOMER).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Mapping(MappingError::InvalidChangeTrackingPolicy { .. })
    ));
}

#[test]
fn one_to_many_needs_mapped_by() {
    let registry = ClassRegistry::new()
        .with(entity(CUSTOMER))
        .with(
            entity(ORDER).property(
                PropertyDefinition::new("customers")
                    .typed(&format!("array<\\{CUSTOMER}>"))
                    .annotate(Annotation::OneToMany(AssociationAnnotation::default())),
            ),
        );
    let reflection = reflect(registry);
    let mut factory = MetadataFactory::new(&reflection, &PersistenceSettings::default());
    let err = factory.get_metadata_for(ORDER).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Mapping(MappingError::InvalidMapping { .. })
    ));
}
