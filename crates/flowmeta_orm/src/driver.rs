//! The annotation driver: turns reflected annotations and class schemata
//! into [`ClassMetadata`].
//!
//! Annotations are read from the reflection service, never from source.
//! Defaults follow the framework's conventions:
//!
//! - tables are named after the class, truncated with a hash suffix;
//! - associations to non-aggregate-roots cascade `all` and remove orphans,
//!   associations to value objects cascade `persist`;
//! - join columns reference the target's single identity property, or the
//!   artificial identifier when it has none;
//! - a class-level unique constraint covers the identity properties when
//!   they are not the primary key.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use flowmeta_foundation::names::{
    ARTIFICIAL_IDENTITY_PROPERTY, ENTITY_REPOSITORY_CLASS, ORIGINAL_CLASSNAME_SUFFIX,
    namespace_of, unproxied_class_name,
};
use flowmeta_foundation::{
    Annotation, AnnotationKind, AssociationAnnotation, EntityAnnotation, Error, IndexAnnotation,
    JoinTableAnnotation, LifecycleEvent, MappingError, PersistenceSettings, Result,
    clean_class_name,
};
use flowmeta_reflection::{ClassSchema, ModelType, ReflectionService, SchemaProperty};
use tracing::debug;

use crate::mapping::{
    AssociationKind, AssociationMapping, AssociationOverride, CacheConfig, CacheUsage,
    ChangeTrackingPolicy, DiscriminatorColumn, EmbeddedMapping, FetchMode, FieldMapping,
    GeneratorType, InheritanceType, JoinColumn, JoinTable, NamedNativeQuery, NamedQuery,
    SequenceGeneratorDefinition, TableDescriptor, TableIndex,
};
use crate::metadata::ClassMetadata;
use crate::naming::{IdentifierNaming, discriminator_value};

/// Annotations that make a class persistable.
const PERSISTABLE_ANNOTATIONS: [AnnotationKind; 5] = [
    AnnotationKind::ValueObject,
    AnnotationKind::Entity,
    AnnotationKind::OrmEntity,
    AnnotationKind::MappedSuperclass,
    AnnotationKind::Embeddable,
];

const ASSOCIATION_ANNOTATIONS: [AnnotationKind; 4] = [
    AnnotationKind::OneToOne,
    AnnotationKind::OneToMany,
    AnnotationKind::ManyToOne,
    AnnotationKind::ManyToMany,
];

/// Length of the artificial identifier column (a UUID with room to spare).
const ARTIFICIAL_IDENTITY_LENGTH: u32 = 40;

/// Whose identity a join column references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum JoinDirection {
    /// The association's target entity.
    Target,
    /// The class declaring the property (owning side of a join table).
    Declaring,
}

/// Reads ORM metadata from annotations.
pub struct AnnotationDriver<'a> {
    reflection: &'a ReflectionService,
    naming: IdentifierNaming,
    class_names: OnceCell<Vec<String>>,
}

impl std::fmt::Debug for AnnotationDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationDriver")
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

impl<'a> AnnotationDriver<'a> {
    /// Creates a driver reading from a populated reflection service.
    #[must_use]
    pub fn new(reflection: &'a ReflectionService, settings: &PersistenceSettings) -> Self {
        Self {
            reflection,
            naming: IdentifierNaming::new(settings.max_identifier_length),
            class_names: OnceCell::new(),
        }
    }

    /// The reflection service the driver reads from.
    #[must_use]
    pub fn reflection(&self) -> &'a ReflectionService {
        self.reflection
    }

    /// Identifier naming used for tables and columns.
    #[must_use]
    pub fn naming(&self) -> &IdentifierNaming {
        &self.naming
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Fills `metadata` for its class.
    ///
    /// # Errors
    ///
    /// Fails with a mapping error for classes that are not persistable,
    /// annotation combinations that cannot be mapped, and missing schemata.
    pub fn load_metadata_for_class(&self, metadata: &mut ClassMetadata) -> Result<()> {
        let class_name = metadata.name().to_string();
        debug!("Loading ORM metadata for {class_name}");

        if !self.configure_object_type(&class_name, metadata)? {
            return Ok(());
        }
        let schema = self.class_schema(&class_name, None)?;

        let table = if metadata.is_embedded_class() {
            None
        } else {
            Some(self.evaluate_table_annotation(&class_name))
        };

        if let Some(Annotation::NamedQueries(queries)) =
            self.class_annotation(&class_name, &AnnotationKind::NamedQueries)
        {
            for query in queries {
                metadata.add_named_query(NamedQuery {
                    name: query.name.clone(),
                    query: query.query.clone(),
                })?;
            }
        }
        if let Some(Annotation::NamedNativeQueries(queries)) =
            self.class_annotation(&class_name, &AnnotationKind::NamedNativeQueries)
        {
            for query in queries {
                metadata.add_named_native_query(NamedNativeQuery {
                    name: query.name.clone(),
                    query: query.query.clone(),
                    result_class: query.result_class.clone(),
                    result_set_mapping: query.result_set_mapping.clone(),
                })?;
            }
        }

        self.evaluate_inheritance_annotations(&class_name, metadata)?;

        if let Some(Annotation::ChangeTrackingPolicy(policy)) =
            self.class_annotation(&class_name, &AnnotationKind::ChangeTrackingPolicy)
        {
            metadata.set_change_tracking_policy(ChangeTrackingPolicy::parse(&class_name, policy)?);
        }
        if let Some(Annotation::Cache(cache)) =
            self.class_annotation(&class_name, &AnnotationKind::Cache)
        {
            metadata.enable_cache(CacheConfig {
                usage: CacheUsage::parse(&class_name, &cache.usage)?,
                region: cache.region.clone(),
            });
        }

        self.evaluate_property_annotations(metadata, schema)
            .map_err(|e| {
                e.while_doing(format!(
                    "Failure while evaluating property annotations for class \"{class_name}\""
                ))
            })?;

        if let Some(mut table) = table {
            self.add_identity_unique_constraint(&mut table, metadata, schema);
            metadata.set_primary_table(table);
        }

        self.evaluate_overrides(&class_name, metadata)?;
        self.evaluate_entity_listeners(&class_name, metadata)?;
        self.evaluate_lifecycle_annotations(&class_name, metadata);
        Ok(())
    }

    /// True for classes the ORM must ignore: compiled originals and classes
    /// without any persistence annotation.
    #[must_use]
    pub fn is_transient(&self, class_name: &str) -> bool {
        class_name.contains(ORIGINAL_CLASSNAME_SUFFIX)
            || !PERSISTABLE_ANNOTATIONS
                .iter()
                .any(|kind| self.reflection.is_class_annotated_with(class_name, kind))
    }

    /// All persistable classes, computed once.
    pub fn get_all_class_names(&self) -> &[String] {
        self.class_names.get_or_init(|| {
            let mut names: Vec<String> = Vec::new();
            for kind in &PERSISTABLE_ANNOTATIONS {
                for class_name in self.reflection.get_class_names_by_annotation(kind) {
                    if names.contains(&class_name)
                        || self.reflection.is_class_interface(&class_name)
                        || class_name.contains(ORIGINAL_CLASSNAME_SUFFIX)
                    {
                        continue;
                    }
                    names.push(class_name);
                }
            }
            names
        })
    }

    /// Table name derived from a class name.
    #[must_use]
    pub fn infer_table_name_from_class_name(&self, class_name: &str) -> String {
        self.naming.infer_table_name(class_name, None)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    fn class_annotation(&self, class_name: &str, kind: &AnnotationKind) -> Option<&'a Annotation> {
        self.reflection.get_class_annotation(class_name, kind)
    }

    fn property_annotation(
        &self,
        class_name: &str,
        property: &str,
        kind: &AnnotationKind,
    ) -> Option<&'a Annotation> {
        self.reflection
            .get_property_annotation(class_name, property, kind)
    }

    fn entity_annotation(&self, class_name: &str) -> Option<&'a EntityAnnotation> {
        [AnnotationKind::OrmEntity, AnnotationKind::Entity]
            .iter()
            .find_map(|kind| match self.class_annotation(class_name, kind) {
                Some(Annotation::OrmEntity(entity) | Annotation::Entity(entity)) => Some(entity),
                _ => None,
            })
    }

    fn class_schema(
        &self,
        class_name: &str,
        while_examining: Option<String>,
    ) -> Result<&'a ClassSchema> {
        let class_name = unproxied_class_name(class_name);
        self.reflection.get_class_schema(class_name).ok_or_else(|| {
            Error::mapping(MappingError::ClassSchemaNotFound {
                class_name: class_name.to_string(),
                while_examining,
            })
        })
    }

    fn is_value_object(&self, class_name: &str, source: &str) -> Result<bool> {
        Ok(self
            .class_schema(class_name, Some(source.to_string()))?
            .model_type()
            == Some(ModelType::ValueObject))
    }

    fn is_aggregate_root(&self, class_name: &str, source: &str) -> Result<bool> {
        Ok(self
            .class_schema(class_name, Some(source.to_string()))?
            .is_aggregate_root())
    }

    fn method_callbacks(&self, class_name: &str, method: &str) -> Vec<LifecycleEvent> {
        self.reflection
            .get_method_annotations(class_name, method, None)
            .into_iter()
            .filter_map(|annotation| match annotation {
                Annotation::Lifecycle(event) => Some(*event),
                _ => None,
            })
            .collect()
    }

    // =========================================================================
    // Class level
    // =========================================================================

    /// Returns false when there is nothing more to map.
    fn configure_object_type(&self, class_name: &str, metadata: &mut ClassMetadata) -> Result<bool> {
        if let Some(Annotation::MappedSuperclass { repository_class }) =
            self.class_annotation(class_name, &AnnotationKind::MappedSuperclass)
        {
            if repository_class.is_some() {
                metadata.set_custom_repository_class(repository_class.clone());
            }
            metadata.mark_mapped_superclass();
            return Ok(self.reflection.get_class_schema(class_name).is_some());
        }

        if let Some(entity) = self.entity_annotation(class_name) {
            let schema = self.class_schema(class_name, None)?;
            if entity.repository_class.is_some() {
                metadata.set_custom_repository_class(entity.repository_class.clone());
            } else if let Some(repository) = schema.repository_class_name() {
                if self
                    .reflection
                    .is_class_subclass_of(repository, ENTITY_REPOSITORY_CLASS)
                {
                    metadata.set_custom_repository_class(Some(repository.to_string()));
                }
            }
            if entity.read_only {
                metadata.mark_read_only();
            }
            return Ok(true);
        }

        if let Some(Annotation::ValueObject { embedded }) =
            self.class_annotation(class_name, &AnnotationKind::ValueObject)
        {
            if *embedded {
                metadata.mark_embedded_class();
            } else {
                metadata.mark_read_only();
            }
            return Ok(true);
        }

        if self
            .reflection
            .is_class_annotated_with(class_name, &AnnotationKind::Embeddable)
        {
            metadata.mark_embedded_class();
            return Ok(self.reflection.get_class_schema(class_name).is_some());
        }

        Err(Error::mapping(MappingError::NotAnEntity {
            class_name: class_name.to_string(),
        }))
    }

    fn evaluate_table_annotation(&self, class_name: &str) -> TableDescriptor {
        let mut table = TableDescriptor::default();
        if let Some(Annotation::Table(annotation)) =
            self.class_annotation(class_name, &AnnotationKind::Table)
        {
            if let Some(name) = &annotation.name {
                table.name.clone_from(name);
            }
            table.schema.clone_from(&annotation.schema);
            table.indexes = annotation.indexes.iter().map(table_index).collect();
            table.unique_constraints = annotation
                .unique_constraints
                .iter()
                .map(table_index)
                .collect();
            table.options.clone_from(&annotation.options);
        }
        if table.name.is_empty() {
            table.name = self.infer_table_name_from_class_name(class_name);
        }
        table
    }

    fn evaluate_inheritance_annotations(
        &self,
        class_name: &str,
        metadata: &mut ClassMetadata,
    ) -> Result<()> {
        let Some(Annotation::InheritanceType(value)) =
            self.class_annotation(class_name, &AnnotationKind::InheritanceType)
        else {
            return Ok(());
        };
        let inheritance_type = InheritanceType::parse(class_name, value)?;
        metadata.set_inheritance_type(inheritance_type);
        if inheritance_type == InheritanceType::None {
            return Ok(());
        }

        let column = match self.class_annotation(class_name, &AnnotationKind::DiscriminatorColumn) {
            Some(Annotation::DiscriminatorColumn(annotation)) => DiscriminatorColumn {
                name: annotation.name.clone(),
                column_type: annotation.column_type.clone(),
                length: annotation.length,
                column_definition: annotation.column_definition.clone(),
            },
            _ => DiscriminatorColumn::default(),
        };
        metadata.set_discriminator_column(Some(column));

        if let Some(Annotation::DiscriminatorMap(map)) =
            self.class_annotation(class_name, &AnnotationKind::DiscriminatorMap)
        {
            metadata.set_discriminator_map(map.clone());
            return Ok(());
        }

        let mut map = BTreeMap::new();
        if !self.reflection.is_class_abstract(class_name) {
            map.insert(discriminator_value(class_name), class_name.to_string());
        }
        for subclass in self.reflection.get_all_sub_class_names_for_class(class_name)? {
            if !self.reflection.is_class_abstract(&subclass) {
                map.insert(discriminator_value(&subclass), subclass);
            }
        }
        if map.is_empty() {
            debug!("No concrete classes to discriminate for {class_name}, inheritance disabled");
            metadata.set_inheritance_type(InheritanceType::None);
            metadata.set_discriminator_column(None);
        } else {
            metadata.set_discriminator_map(map);
        }
        Ok(())
    }

    /// Identity properties that are not the primary key get a unique
    /// constraint, unless the table declares its own.
    fn add_identity_unique_constraint(
        &self,
        table: &mut TableDescriptor,
        metadata: &ClassMetadata,
        schema: &ClassSchema,
    ) {
        if !table.unique_constraints.is_empty() {
            return;
        }
        let identity = schema.identity_properties();
        if identity.keys().all(|p| metadata.is_identifier(p)) {
            return;
        }
        let columns = identity
            .keys()
            .map(|property| {
                metadata
                    .column_name(property)
                    .map_or_else(|| property.to_lowercase(), str::to_string)
            })
            .collect();
        table.unique_constraints.push(TableIndex {
            name: Some(self.naming.truncate_identifier(
                &format!("flow_identity_{}", table.name),
                None,
                None,
            )),
            columns,
            ..TableIndex::default()
        });
    }

    fn evaluate_overrides(&self, class_name: &str, metadata: &mut ClassMetadata) -> Result<()> {
        if let Some(Annotation::AssociationOverrides(overrides)) =
            self.class_annotation(class_name, &AnnotationKind::AssociationOverrides)
        {
            for annotation in overrides {
                let fetch = annotation
                    .fetch
                    .as_deref()
                    .map(|fetch| FetchMode::parse(class_name, fetch))
                    .transpose()?;
                let association_override = AssociationOverride {
                    join_columns: annotation
                        .join_columns
                        .iter()
                        .map(|c| JoinColumn::from_annotation(c, None))
                        .collect(),
                    join_table: annotation.join_table.as_ref().map(JoinTable::from_annotation),
                    inversed_by: annotation.inversed_by.clone(),
                    fetch,
                };
                metadata.set_association_override(&annotation.name, association_override)?;
            }
        }
        if let Some(Annotation::AttributeOverrides(overrides)) =
            self.class_annotation(class_name, &AnnotationKind::AttributeOverrides)
        {
            for annotation in overrides {
                let mut mapping = FieldMapping::new(&annotation.name);
                mapping.apply_column(&annotation.column);
                metadata.set_attribute_override(&annotation.name, mapping)?;
            }
        }
        Ok(())
    }

    fn evaluate_entity_listeners(&self, class_name: &str, metadata: &mut ClassMetadata) -> Result<()> {
        let Some(Annotation::EntityListeners(listeners)) =
            self.class_annotation(class_name, &AnnotationKind::EntityListeners)
        else {
            return Ok(());
        };
        for listener in listeners {
            let listener_class = if listener.contains('\\') {
                clean_class_name(listener).to_string()
            } else {
                match namespace_of(class_name) {
                    "" => listener.clone(),
                    namespace => format!("{namespace}\\{listener}"),
                }
            };
            if !self.reflection.source().class_exists(&listener_class) {
                return Err(Error::mapping(MappingError::EntityListenerNotFound {
                    listener_class,
                    class_name: class_name.to_string(),
                }));
            }

            let mut has_mapping = false;
            for method in self.reflection.get_class_method_names(&listener_class) {
                if !self.reflection.is_method_public(&listener_class, &method) {
                    continue;
                }
                for event in self.method_callbacks(&listener_class, &method) {
                    metadata.add_entity_listener(event, &listener_class, &method);
                    has_mapping = true;
                }
            }
            if has_mapping {
                continue;
            }
            for event in LifecycleEvent::ALL {
                let method = event.method_name();
                if self.reflection.is_method_public(&listener_class, method) {
                    metadata.add_entity_listener(event, &listener_class, method);
                }
            }
        }
        Ok(())
    }

    fn evaluate_lifecycle_annotations(&self, class_name: &str, metadata: &mut ClassMetadata) {
        for method in self.reflection.get_class_method_names(class_name) {
            if !self.reflection.is_method_public(class_name, &method) {
                continue;
            }
            for event in self.method_callbacks(class_name, &method) {
                metadata.add_lifecycle_callback(&method, event);
            }
        }
    }

    // =========================================================================
    // Property level
    // =========================================================================

    fn evaluate_property_annotations(
        &self,
        metadata: &mut ClassMetadata,
        schema: &ClassSchema,
    ) -> Result<()> {
        let class_name = metadata.name().to_string();
        for property in self.reflection.get_class_property_names(&class_name) {
            let Some(declared) = schema.property(&property) else {
                continue;
            };
            if metadata.has_field(&property)
                || metadata.has_association(&property)
                || metadata.embedded_classes().contains_key(&property)
            {
                continue;
            }
            self.evaluate_property(&class_name, &property, declared, metadata)?;
        }

        if schema.has_property(ARTIFICIAL_IDENTITY_PROPERTY)
            && !metadata.is_embedded_class()
            && !metadata.has_field(ARTIFICIAL_IDENTITY_PROPERTY)
        {
            metadata.map_field(FieldMapping {
                length: Some(ARTIFICIAL_IDENTITY_LENGTH),
                id: true,
                ..FieldMapping::new(ARTIFICIAL_IDENTITY_PROPERTY)
            })?;
        }
        Ok(())
    }

    fn evaluate_property(
        &self,
        class_name: &str,
        property: &str,
        declared: &SchemaProperty,
        metadata: &mut ClassMetadata,
    ) -> Result<()> {
        let associations: Vec<&Annotation> = ASSOCIATION_ANNOTATIONS
            .iter()
            .filter_map(|kind| self.property_annotation(class_name, property, kind))
            .collect();
        if associations.len() > 1 {
            return Err(Error::mapping(MappingError::ConflictingAssociations {
                class_name: class_name.to_string(),
                property: property.to_string(),
            }));
        }

        match associations.first().copied() {
            Some(Annotation::OneToOne(annotation)) => {
                let mut mapping = self.new_association(
                    class_name,
                    property,
                    AssociationKind::OneToOne,
                    annotation,
                    &declared.type_name,
                )?;
                mapping.id = self.is_id(class_name, property);
                if annotation.inversed_by.is_some() || annotation.mapped_by.is_none() {
                    mapping.join_columns = self.build_join_columns_if_needed(
                        class_name,
                        property,
                        &mapping.target_entity,
                        self.evaluate_join_column_annotations(class_name, property),
                        Some(property.to_lowercase()),
                        JoinDirection::Target,
                    )?;
                }
                metadata.map_one_to_one(mapping)?;
            }
            Some(Annotation::OneToMany(annotation)) => {
                let mut mapping = self.new_association(
                    class_name,
                    property,
                    AssociationKind::OneToMany,
                    annotation,
                    collection_target(declared),
                )?;
                mapping.order_by = self.order_by(class_name, property);
                metadata.map_one_to_many(mapping)?;
            }
            Some(Annotation::ManyToOne(annotation)) => {
                let mut mapping = self.new_association(
                    class_name,
                    property,
                    AssociationKind::ManyToOne,
                    annotation,
                    &declared.type_name,
                )?;
                mapping.id = self.is_id(class_name, property);
                mapping.join_columns = self.build_join_columns_if_needed(
                    class_name,
                    property,
                    &mapping.target_entity,
                    self.evaluate_join_column_annotations(class_name, property),
                    Some(property.to_lowercase()),
                    JoinDirection::Target,
                )?;
                metadata.map_many_to_one(mapping)?;
            }
            Some(Annotation::ManyToMany(annotation)) => {
                let mut mapping = self.new_association(
                    class_name,
                    property,
                    AssociationKind::ManyToMany,
                    annotation,
                    collection_target(declared),
                )?;
                mapping.join_table = match self.property_annotation(
                    class_name,
                    property,
                    &AnnotationKind::JoinTable,
                ) {
                    Some(Annotation::JoinTable(join_table)) => Some(self.evaluate_join_table_annotation(
                        class_name,
                        property,
                        &mapping.target_entity,
                        join_table,
                    )?),
                    _ if annotation.mapped_by.is_none() => {
                        let join_columns = self.evaluate_join_column_annotations(class_name, property);
                        Some(JoinTable {
                            name: self.naming.infer_join_table_name(class_name, property),
                            schema: None,
                            join_columns: self.build_join_columns_if_needed(
                                class_name,
                                property,
                                &mapping.target_entity,
                                join_columns.clone(),
                                None,
                                JoinDirection::Declaring,
                            )?,
                            inverse_join_columns: self.build_join_columns_if_needed(
                                class_name,
                                property,
                                &mapping.target_entity,
                                join_columns,
                                None,
                                JoinDirection::Target,
                            )?,
                        })
                    }
                    _ => None,
                };
                mapping.order_by = self.order_by(class_name, property);
                metadata.map_many_to_many(mapping)?;
            }
            _ => {
                if let Some(Annotation::Embedded {
                    class,
                    column_prefix,
                }) = self.property_annotation(class_name, property, &AnnotationKind::Embedded)
                {
                    return metadata.map_embedded(EmbeddedMapping {
                        field_name: property.to_string(),
                        class: class
                            .as_deref()
                            .map_or_else(|| declared.type_name.clone(), |c| {
                                clean_class_name(c).to_string()
                            }),
                        column_prefix: column_prefix.clone(),
                        inherited: None,
                    });
                }
                return self.map_plain_property(class_name, property, declared, metadata);
            }
        }

        if let Some(Annotation::Cache(cache)) =
            self.property_annotation(class_name, property, &AnnotationKind::Cache)
        {
            metadata.enable_association_cache(
                property,
                CacheConfig {
                    usage: CacheUsage::parse(class_name, &cache.usage)?,
                    region: cache.region.clone(),
                },
            )?;
        }
        Ok(())
    }

    fn is_id(&self, class_name: &str, property: &str) -> bool {
        self.reflection
            .is_property_annotated_with(class_name, property, &AnnotationKind::Id)
    }

    fn order_by(&self, class_name: &str, property: &str) -> BTreeMap<String, String> {
        match self.property_annotation(class_name, property, &AnnotationKind::OrderBy) {
            Some(Annotation::OrderBy(order)) => order.clone(),
            _ => BTreeMap::new(),
        }
    }

    /// Settings shared by all association kinds, with the cascade and
    /// orphan removal defaults derived from the target's schema.
    fn new_association(
        &self,
        class_name: &str,
        property: &str,
        kind: AssociationKind,
        annotation: &AssociationAnnotation,
        default_target: &str,
    ) -> Result<AssociationMapping> {
        let target = annotation
            .target_entity
            .as_deref()
            .map_or(default_target, clean_class_name)
            .to_string();
        let source = format!("{class_name}::{property}");

        let mut mapping = AssociationMapping::new(property, kind, &target);
        mapping.mapped_by.clone_from(&annotation.mapped_by);
        mapping.inversed_by.clone_from(&annotation.inversed_by);
        mapping.index_by.clone_from(&annotation.index_by);
        mapping.fetch = FetchMode::parse(class_name, &annotation.fetch)?;

        mapping.cascade = if !annotation.cascade.is_empty() {
            annotation.cascade.clone()
        } else if self.is_value_object(&target, &source)? {
            vec!["persist".to_string()]
        } else if !self.is_aggregate_root(&target, &source)? {
            vec!["all".to_string()]
        } else {
            Vec::new()
        };
        if kind != AssociationKind::ManyToOne {
            mapping.orphan_removal = annotation.orphan_removal
                || (!self.is_value_object(&target, &source)?
                    && !self.is_aggregate_root(&target, &source)?);
        }
        Ok(mapping)
    }

    fn evaluate_join_column_annotations(&self, class_name: &str, property: &str) -> Vec<JoinColumn> {
        if let Some(Annotation::JoinColumn(column)) =
            self.property_annotation(class_name, property, &AnnotationKind::JoinColumn)
        {
            return vec![JoinColumn::from_annotation(column, None)];
        }
        match self.property_annotation(class_name, property, &AnnotationKind::JoinColumns) {
            Some(Annotation::JoinColumns(columns)) => columns
                .iter()
                .map(|c| JoinColumn::from_annotation(c, None))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn evaluate_join_table_annotation(
        &self,
        class_name: &str,
        property: &str,
        target: &str,
        annotation: &JoinTableAnnotation,
    ) -> Result<JoinTable> {
        let mut join_table = JoinTable::from_annotation(annotation);
        if join_table.name.is_empty() {
            join_table.name = self.naming.infer_join_table_name(class_name, property);
        }
        join_table.join_columns = self.build_join_columns_if_needed(
            class_name,
            property,
            target,
            join_table.join_columns,
            None,
            JoinDirection::Declaring,
        )?;
        join_table.inverse_join_columns = self.build_join_columns_if_needed(
            class_name,
            property,
            target,
            join_table.inverse_join_columns,
            None,
            JoinDirection::Target,
        )?;
        Ok(join_table)
    }

    /// Completes join columns that reference `id` or nothing with the
    /// actual identity column of the referenced class.
    fn build_join_columns_if_needed(
        &self,
        class_name: &str,
        property: &str,
        target: &str,
        mut join_columns: Vec<JoinColumn>,
        default_name: Option<String>,
        direction: JoinDirection,
    ) -> Result<Vec<JoinColumn>> {
        if join_columns.is_empty() {
            join_columns.push(JoinColumn::unresolved(default_name));
        }
        let identity_class = match direction {
            JoinDirection::Target => unproxied_class_name(target),
            JoinDirection::Declaring => unproxied_class_name(
                self.reflection
                    .get_property_declaring_class(class_name, property)
                    .unwrap_or(class_name),
            ),
        };

        for column in &mut join_columns {
            if !column.needs_referenced_column() {
                continue;
            }
            let identities = self
                .reflection
                .get_property_names_by_annotation(identity_class, &AnnotationKind::Id);
            let referenced = match identities.as_slice() {
                [] => ARTIFICIAL_IDENTITY_PROPERTY.to_lowercase(),
                [identity] => identity.to_lowercase(),
                _ => {
                    return Err(Error::mapping(MappingError::CompositeJoinColumn {
                        class_name: class_name.to_string(),
                        property: property.to_string(),
                        identity_class: identity_class.to_string(),
                        identity_count: identities.len(),
                    }));
                }
            };
            if column.name.is_none() {
                column.name = Some(self.naming.join_table_column_name(identity_class));
            }
            column.referenced_column_name = Some(referenced);
        }
        Ok(join_columns)
    }

    fn map_plain_property(
        &self,
        class_name: &str,
        property: &str,
        declared: &SchemaProperty,
        metadata: &mut ClassMetadata,
    ) -> Result<()> {
        let mut mapping = FieldMapping::new(property);
        if let Some(Annotation::Column(column)) =
            self.property_annotation(class_name, property, &AnnotationKind::Column)
        {
            mapping.apply_column(column);
        }

        if mapping.field_type.is_none() {
            match declared.type_name.as_str() {
                "string" => {}
                "DateTime" => mapping.field_type = Some("datetime".to_string()),
                "integer" | "boolean" | "float" | "array" => {
                    mapping.field_type = Some(declared.type_name.clone());
                }
                other => match self.class_annotation(other, &AnnotationKind::ValueObject) {
                    Some(Annotation::ValueObject { embedded: true }) => {
                        return metadata.map_embedded(EmbeddedMapping {
                            field_name: property.to_string(),
                            class: other.to_string(),
                            column_prefix: Some(mapping.column_name),
                            inherited: None,
                        });
                    }
                    Some(_) => mapping.field_type = Some("object".to_string()),
                    None if self.reflection.source().class_exists(other) => {
                        return Err(Error::mapping(MappingError::AmbiguousReference {
                            class_name: class_name.to_string(),
                            property: property.to_string(),
                            target_class: other.to_string(),
                        }));
                    }
                    None => {
                        return Err(Error::mapping(MappingError::MissingTypeDeclaration {
                            class_name: class_name.to_string(),
                            property: property.to_string(),
                            declared_type: other.to_string(),
                        }));
                    }
                },
            }
        }

        mapping.id = self.is_id(class_name, property);
        if let Some(Annotation::GeneratedValue { strategy }) =
            self.property_annotation(class_name, property, &AnnotationKind::GeneratedValue)
        {
            metadata.set_id_generator_type(GeneratorType::parse(class_name, strategy)?);
        }
        if self
            .reflection
            .is_property_annotated_with(class_name, property, &AnnotationKind::Version)
        {
            metadata.set_version_mapping(&mapping)?;
        }
        metadata.map_field(mapping)?;

        if let Some(Annotation::SequenceGenerator(sequence)) =
            self.property_annotation(class_name, property, &AnnotationKind::SequenceGenerator)
        {
            metadata.set_sequence_generator_definition(SequenceGeneratorDefinition {
                sequence_name: sequence.sequence_name.clone(),
                allocation_size: sequence.allocation_size,
                initial_value: sequence.initial_value,
            });
        } else if self.reflection.is_property_annotated_with(
            class_name,
            property,
            &AnnotationKind::TableGenerator,
        ) {
            return Err(Error::mapping(MappingError::TableGeneratorNotImplemented {
                class_name: class_name.to_string(),
            }));
        } else if let Some(Annotation::CustomIdGenerator { class }) =
            self.property_annotation(class_name, property, &AnnotationKind::CustomIdGenerator)
        {
            metadata.set_custom_generator_definition(class.clone());
        }
        Ok(())
    }
}

fn collection_target(declared: &SchemaProperty) -> &str {
    declared
        .element_type
        .as_deref()
        .unwrap_or(&declared.type_name)
}

fn table_index(annotation: &IndexAnnotation) -> TableIndex {
    TableIndex {
        name: annotation.name.clone(),
        columns: annotation.columns.clone(),
        flags: annotation.flags.clone(),
        options: annotation.options.clone(),
    }
}
