//! Integration tests for the build, freeze and map pipeline

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use flowmeta::foundation::names::ENTITY_REPOSITORY_CLASS;
use flowmeta::foundation::{
    Annotation, AnnotationKind, AssociationAnnotation, EntityAnnotation, ErrorKind, Settings,
};
use flowmeta::orm::{AssociationKind, MetadataFactory};
use flowmeta::reflection::{
    ClassDefinition, ClassRegistry, ClassSource, MethodDefinition, PropertyDefinition,
    ReflectionCaches, ReflectionService,
};

// =============================================================================
// Helper Functions
// =============================================================================

const POST: &str = "Acme\\Blog\\Domain\\Model\\Post";
const COMMENT: &str = "Acme\\Blog\\Domain\\Model\\Comment";
const POST_REPOSITORY: &str = "Acme\\Blog\\Domain\\Repository\\PostRepository";

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn blog() -> ClassRegistry {
    ClassRegistry::new()
        .with(ClassDefinition::class(ENTITY_REPOSITORY_CLASS))
        .with(ClassDefinition::class(POST_REPOSITORY).extends(ENTITY_REPOSITORY_CLASS))
        .with(
            ClassDefinition::class(COMMENT)
                .annotate(Annotation::Entity(EntityAnnotation::default()))
                .property(PropertyDefinition::new("text").typed("string")),
        )
        .with(
            ClassDefinition::class(POST)
                .annotate(Annotation::Entity(EntityAnnotation::default()))
                .property(
                    PropertyDefinition::new("title")
                        .typed("string")
                        .annotate(Annotation::Identity),
                )
                .property(
                    PropertyDefinition::new("comments")
                        .typed("\\Doctrine\\Common\\Collections\\Collection<\\Acme\\Blog\\Domain\\Model\\Comment>")
                        .annotate(Annotation::ManyToMany(AssociationAnnotation::default())),
                )
                .method(MethodDefinition::new("getTitle")),
        )
}

fn available(registry: &ClassRegistry) -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([("Acme.Blog".to_string(), registry.class_names())])
}

fn scratch_directory(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("flowmeta-{name}-{}", std::process::id()))
}

// =============================================================================
// Development
// =============================================================================

#[test]
fn development_build_maps_entities() {
    init_logging();
    let registry = blog();
    let classes = available(&registry);
    let mut reflection = ReflectionService::new(registry)
        .with_settings(&Settings::default())
        .with_caches(ReflectionCaches::in_memory());
    reflection.build_reflection_data(classes).unwrap();
    reflection.save_to_cache().unwrap();
    assert!(!reflection.is_frozen());

    let schema = reflection.get_class_schema(POST).unwrap();
    assert_eq!(schema.repository_class_name(), Some(POST_REPOSITORY));
    assert!(schema.is_aggregate_root());

    let mut factory = MetadataFactory::new(&reflection, &Settings::default().persistence);
    let post = factory.get_metadata_for(POST).unwrap();
    assert_eq!(post.custom_repository_class_name(), Some(POST_REPOSITORY));
    let comments = post.association_mapping("comments").unwrap();
    assert_eq!(comments.kind, AssociationKind::ManyToMany);
    assert_eq!(comments.target_entity, COMMENT);
    assert_eq!(
        post.table().unique_constraints[0].columns,
        ["title".to_string()]
    );
}

// =============================================================================
// Production
// =============================================================================

#[test]
fn production_runtime_cache_feeds_a_frozen_service() {
    init_logging();
    let directory = scratch_directory("production");
    let settings = Settings::from_toml_str(
        "context = \"Production\"\n[persistence]\nmax_identifier_length = 30\n",
    )
    .unwrap();
    let registry = blog();
    let classes = available(&registry);

    let mut build = ReflectionService::new(registry)
        .with_settings(&settings)
        .with_caches(ReflectionCaches::on_disk(&directory).unwrap());
    build.build_reflection_data(classes.clone()).unwrap();
    build.save_to_cache().unwrap();

    let mut runtime = ReflectionService::new(ClassRegistry::new())
        .with_settings(&settings)
        .with_caches(ReflectionCaches::on_disk(&directory).unwrap());
    runtime.build_reflection_data(classes).unwrap();
    assert!(runtime.is_frozen());
    assert!(runtime.is_class_annotated_with(POST, &AnnotationKind::Entity));
    assert_eq!(
        runtime.get_class_schemata().len(),
        build.get_class_schemata().len()
    );

    let err = runtime.reflect_class("Acme\\Blog\\Domain\\Model\\Draft").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ReflectionFrozen(_)));

    let mut factory = MetadataFactory::new(&runtime, &settings.persistence);
    let post = factory.get_metadata_for(POST).unwrap();
    assert!(post.table_name().len() <= 30);
    let join_table = post
        .association_mapping("comments")
        .unwrap()
        .join_table
        .as_ref()
        .unwrap();
    assert!(join_table.name.len() <= 30);
    assert_eq!(factory.get_all_metadata().unwrap().len(), 2);

    let _ = fs::remove_dir_all(directory);
}
