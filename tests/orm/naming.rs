//! Integration tests for identifier naming
//!
//! Tests table and join table names under configured identifier limits.

use std::collections::BTreeMap;

use flowmeta_foundation::{Annotation, AssociationAnnotation, EntityAnnotation, Settings};
use flowmeta_orm::{IdentifierNaming, MetadataFactory, discriminator_value};
use flowmeta_reflection::{ClassDefinition, ClassRegistry, ClassSource, PropertyDefinition, ReflectionService};

const POST: &str = "Acme\\Blog\\Domain\\Model\\Post";
const TAG: &str = "Acme\\Blog\\Domain\\Model\\Tag";

fn blog() -> ReflectionService {
    let registry = ClassRegistry::new()
        .with(
            ClassDefinition::class(TAG)
                .annotate(Annotation::Entity(EntityAnnotation::default()))
                .property(PropertyDefinition::new("label").typed("string")),
        )
        .with(
            ClassDefinition::class(POST)
                .annotate(Annotation::Entity(EntityAnnotation::default()))
                .property(PropertyDefinition::new("title").typed("string"))
                .property(
                    PropertyDefinition::new("tags")
                        .typed(&format!("array<\\{TAG}>"))
                        .annotate(Annotation::ManyToMany(AssociationAnnotation::default())),
                ),
        );
    let names = registry.class_names();
    let mut reflection = ReflectionService::new(registry);
    reflection
        .build_reflection_data(BTreeMap::from([("Acme.Blog".to_string(), names)]))
        .unwrap();
    reflection
}

// =============================================================================
// Default Limits
// =============================================================================

#[test]
fn tables_follow_class_names() {
    let reflection = blog();
    let settings = Settings::default();
    let mut factory = MetadataFactory::new(&reflection, &settings.persistence);

    let post = factory.get_metadata_for(POST).unwrap();
    assert_eq!(post.table_name(), "acme_blog_domain_model_post");
    let tags = post.association_mapping("tags").unwrap();
    let join_table = tags.join_table.as_ref().unwrap();
    assert_eq!(join_table.name, "acme_blog_domain_model_post_tags_join");
    assert_eq!(join_table.join_columns[0].name.as_deref(), Some("blog_post"));
    assert_eq!(
        join_table.inverse_join_columns[0].name.as_deref(),
        Some("blog_tag")
    );
}

// =============================================================================
// Configured Limits
// =============================================================================

#[test]
fn short_identifier_limit_truncates_names() {
    let reflection = blog();
    let settings = Settings::from_toml_str("[persistence]\nmax_identifier_length = 20\n").unwrap();
    let mut factory = MetadataFactory::new(&reflection, &settings.persistence);

    let post = factory.get_metadata_for(POST).unwrap().clone();
    assert_eq!(post.table_name().len(), 20);
    assert!(post.table_name().starts_with("acme_blog_doma_"));

    let join_table = post
        .association_mapping("tags")
        .unwrap()
        .join_table
        .clone()
        .unwrap();
    assert!(join_table.name.len() <= 20);

    let naming = IdentifierNaming::new(20);
    assert_eq!(post.table_name(), naming.infer_table_name(POST, None));
    assert_eq!(join_table.name, naming.infer_join_table_name(POST, "tags"));
}

#[test]
fn distinct_long_names_stay_distinct() {
    let naming = IdentifierNaming::new(24);
    let first = naming.infer_table_name("Acme\\Blog\\Domain\\Model\\Comment", None);
    let second = naming.infer_table_name("Acme\\Blog\\Domain\\Model\\Commentary", None);
    assert_eq!(first.len(), 24);
    assert_eq!(second.len(), 24);
    assert_ne!(first, second);
}

#[test]
fn discriminator_values_drop_the_model_namespace() {
    assert_eq!(discriminator_value(POST), "acme_blog_post");
    assert_eq!(discriminator_value(&format!("\\{TAG}")), "acme_blog_tag");
}
