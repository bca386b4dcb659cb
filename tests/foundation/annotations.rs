//! Integration tests for annotation kinds and names
//!
//! Tests resolving fully qualified annotation names and back.

use flowmeta_foundation::{Annotation, AnnotationKind, AssociationAnnotation, LifecycleEvent};

// =============================================================================
// Name Resolution
// =============================================================================

#[test]
fn flow_annotations_resolve() {
    assert_eq!(
        AnnotationKind::from_name("Neos\\Flow\\Annotations\\Entity"),
        AnnotationKind::Entity
    );
    assert_eq!(
        AnnotationKind::from_name("\\Neos\\Flow\\Annotations\\ValueObject"),
        AnnotationKind::ValueObject
    );
}

#[test]
fn orm_entity_is_distinct_from_flow_entity() {
    assert_eq!(
        AnnotationKind::from_name("Doctrine\\ORM\\Mapping\\Entity"),
        AnnotationKind::OrmEntity
    );
    assert_ne!(AnnotationKind::OrmEntity.name(), AnnotationKind::Entity.name());
}

#[test]
fn lifecycle_annotations_resolve_to_events() {
    assert_eq!(
        AnnotationKind::from_name("Doctrine\\ORM\\Mapping\\PostLoad"),
        AnnotationKind::Lifecycle(LifecycleEvent::PostLoad)
    );
}

#[test]
fn unknown_annotations_are_kept_by_name() {
    let kind = AnnotationKind::from_name("Acme\\Annotations\\Audited");
    assert_eq!(kind, AnnotationKind::Other("Acme\\Annotations\\Audited".to_string()));
    assert_eq!(kind.name(), "Acme\\Annotations\\Audited");
}

#[test]
fn names_round_trip() {
    for kind in [
        AnnotationKind::Lazy,
        AnnotationKind::Identity,
        AnnotationKind::ManyToMany,
        AnnotationKind::DiscriminatorMap,
        AnnotationKind::Lifecycle(LifecycleEvent::PreFlush),
    ] {
        assert_eq!(AnnotationKind::from_name(&kind.name()), kind);
    }
}

// =============================================================================
// Annotation Values
// =============================================================================

#[test]
fn annotation_reports_its_kind() {
    let annotation = Annotation::ManyToOne(AssociationAnnotation::default());
    assert_eq!(annotation.kind(), AnnotationKind::ManyToOne);
    assert_eq!(
        Annotation::Lifecycle(LifecycleEvent::PrePersist).kind(),
        AnnotationKind::Lifecycle(LifecycleEvent::PrePersist)
    );
}

#[test]
fn association_defaults_to_lazy_fetch() {
    let annotation = AssociationAnnotation::default();
    assert_eq!(annotation.fetch, "LAZY");
    assert!(annotation.cascade.is_empty());
    assert!(!annotation.orphan_removal);
}

#[test]
fn lifecycle_events_have_callback_method_names() {
    assert_eq!(LifecycleEvent::ALL.len(), 8);
    assert_eq!(LifecycleEvent::PrePersist.method_name(), "prePersist");
    assert_eq!(LifecycleEvent::PreFlush.method_name(), "preFlush");
}
