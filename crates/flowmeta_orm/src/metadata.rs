//! Per-class ORM metadata, filled in by the annotation driver.

use std::collections::BTreeMap;

use flowmeta_foundation::{Error, LifecycleEvent, MappingError, Result, clean_class_name};
use serde::{Deserialize, Serialize};

use crate::mapping::{
    AssociationKind, AssociationMapping, AssociationOverride, CacheConfig, ChangeTrackingPolicy,
    DiscriminatorColumn, EmbeddedMapping, EntityListener, FieldMapping, GeneratorType,
    InheritanceType, NamedNativeQuery, NamedQuery, SequenceGeneratorDefinition, TableDescriptor,
};

const VERSIONABLE_TYPES: [&str; 6] = [
    "integer",
    "bigint",
    "smallint",
    "datetime",
    "datetime_immutable",
    "datetimetz",
];

/// Mapping metadata of one class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMetadata {
    name: String,
    parent_classes: Vec<String>,
    custom_repository_class_name: Option<String>,
    is_mapped_superclass: bool,
    is_embedded_class: bool,
    read_only: bool,
    table: TableDescriptor,
    inheritance_type: InheritanceType,
    discriminator_column: Option<DiscriminatorColumn>,
    discriminator_map: BTreeMap<String, String>,
    discriminator_value: Option<String>,
    change_tracking_policy: ChangeTrackingPolicy,
    field_mappings: BTreeMap<String, FieldMapping>,
    association_mappings: BTreeMap<String, AssociationMapping>,
    embedded_classes: BTreeMap<String, EmbeddedMapping>,
    identifier: Vec<String>,
    generator_type: GeneratorType,
    sequence_generator: Option<SequenceGeneratorDefinition>,
    custom_generator_class: Option<String>,
    version_field: Option<String>,
    cache: Option<CacheConfig>,
    association_caches: BTreeMap<String, CacheConfig>,
    named_queries: BTreeMap<String, NamedQuery>,
    named_native_queries: BTreeMap<String, NamedNativeQuery>,
    lifecycle_callbacks: BTreeMap<LifecycleEvent, Vec<String>>,
    entity_listeners: BTreeMap<LifecycleEvent, Vec<EntityListener>>,
}

impl ClassMetadata {
    /// Empty metadata for a class.
    #[must_use]
    pub fn new(class_name: &str) -> Self {
        Self {
            name: clean_class_name(class_name).to_string(),
            parent_classes: Vec::new(),
            custom_repository_class_name: None,
            is_mapped_superclass: false,
            is_embedded_class: false,
            read_only: false,
            table: TableDescriptor::default(),
            inheritance_type: InheritanceType::None,
            discriminator_column: None,
            discriminator_map: BTreeMap::new(),
            discriminator_value: None,
            change_tracking_policy: ChangeTrackingPolicy::default(),
            field_mappings: BTreeMap::new(),
            association_mappings: BTreeMap::new(),
            embedded_classes: BTreeMap::new(),
            identifier: Vec::new(),
            generator_type: GeneratorType::None,
            sequence_generator: None,
            custom_generator_class: None,
            version_field: None,
            cache: None,
            association_caches: BTreeMap::new(),
            named_queries: BTreeMap::new(),
            named_native_queries: BTreeMap::new(),
            lifecycle_callbacks: BTreeMap::new(),
            entity_listeners: BTreeMap::new(),
        }
    }

    fn invalid(&self, message: String) -> Error {
        Error::mapping(MappingError::InvalidMapping {
            class_name: self.name.clone(),
            message,
        })
    }

    /// The mapped class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    // -------------------------------------------------------------------------
    // Object type
    // -------------------------------------------------------------------------

    /// Binds a custom repository class.
    pub fn set_custom_repository_class(&mut self, repository: Option<String>) {
        self.custom_repository_class_name = repository;
    }

    /// The custom repository class, if any.
    #[must_use]
    pub fn custom_repository_class_name(&self) -> Option<&str> {
        self.custom_repository_class_name.as_deref()
    }

    /// Marks the class as mapped superclass.
    pub fn mark_mapped_superclass(&mut self) {
        self.is_mapped_superclass = true;
    }

    /// Returns true for mapped superclasses.
    #[must_use]
    pub fn is_mapped_superclass(&self) -> bool {
        self.is_mapped_superclass
    }

    /// Marks the class as embeddable.
    pub fn mark_embedded_class(&mut self) {
        self.is_embedded_class = true;
    }

    /// Returns true for embeddable classes.
    #[must_use]
    pub fn is_embedded_class(&self) -> bool {
        self.is_embedded_class
    }

    /// Instances are never updated.
    pub fn mark_read_only(&mut self) {
        self.read_only = true;
    }

    /// Returns true for read-only classes.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Mapped ancestors, nearest first.
    pub fn set_parent_classes(&mut self, parents: Vec<String>) {
        self.parent_classes = parents;
    }

    /// Mapped ancestors, nearest first.
    #[must_use]
    pub fn parent_classes(&self) -> &[String] {
        &self.parent_classes
    }

    /// The root of the entity hierarchy.
    #[must_use]
    pub fn root_entity_name(&self) -> &str {
        self.parent_classes.last().unwrap_or(&self.name)
    }

    // -------------------------------------------------------------------------
    // Table and inheritance
    // -------------------------------------------------------------------------

    /// Sets the primary table.
    pub fn set_primary_table(&mut self, table: TableDescriptor) {
        self.table = table;
    }

    /// The primary table.
    #[must_use]
    pub fn table(&self) -> &TableDescriptor {
        &self.table
    }

    /// The primary table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    /// Sets the inheritance mapping type.
    pub fn set_inheritance_type(&mut self, inheritance_type: InheritanceType) {
        self.inheritance_type = inheritance_type;
    }

    /// The inheritance mapping type.
    #[must_use]
    pub fn inheritance_type(&self) -> InheritanceType {
        self.inheritance_type
    }

    /// Sets the discriminator column.
    pub fn set_discriminator_column(&mut self, column: Option<DiscriminatorColumn>) {
        self.discriminator_column = column;
    }

    /// The discriminator column.
    #[must_use]
    pub fn discriminator_column(&self) -> Option<&DiscriminatorColumn> {
        self.discriminator_column.as_ref()
    }

    /// Sets the discriminator map; the class's own value is taken from it.
    pub fn set_discriminator_map(&mut self, map: BTreeMap<String, String>) {
        self.discriminator_value = map
            .iter()
            .find(|(_, class)| clean_class_name(class) == self.name)
            .map(|(value, _)| value.clone());
        self.discriminator_map = map;
    }

    /// Discriminator value to class.
    #[must_use]
    pub fn discriminator_map(&self) -> &BTreeMap<String, String> {
        &self.discriminator_map
    }

    /// Discriminator value of this class.
    #[must_use]
    pub fn discriminator_value(&self) -> Option<&str> {
        self.discriminator_value.as_deref()
    }

    /// Sets the change tracking policy.
    pub fn set_change_tracking_policy(&mut self, policy: ChangeTrackingPolicy) {
        self.change_tracking_policy = policy;
    }

    /// The change tracking policy.
    #[must_use]
    pub fn change_tracking_policy(&self) -> ChangeTrackingPolicy {
        self.change_tracking_policy
    }

    // -------------------------------------------------------------------------
    // Fields
    // -------------------------------------------------------------------------

    fn ensure_unmapped(&self, field_name: &str) -> Result<()> {
        if self.field_mappings.contains_key(field_name)
            || self.association_mappings.contains_key(field_name)
            || self.embedded_classes.contains_key(field_name)
        {
            return Err(self.invalid(format!("property \"{field_name}\" is mapped twice")));
        }
        Ok(())
    }

    fn push_identifier(&mut self, field_name: &str) {
        if !self.identifier.iter().any(|f| f == field_name) {
            self.identifier.push(field_name.to_string());
        }
    }

    /// Maps a property to a column.
    ///
    /// # Errors
    ///
    /// Fails if the property is already mapped.
    pub fn map_field(&mut self, mapping: FieldMapping) -> Result<()> {
        self.ensure_unmapped(&mapping.field_name)?;
        if mapping.id {
            self.push_identifier(&mapping.field_name);
        }
        self.field_mappings
            .insert(mapping.field_name.clone(), mapping);
        Ok(())
    }

    /// Copies a field mapping from an ancestor.
    pub fn add_inherited_field_mapping(&mut self, mapping: FieldMapping) {
        self.field_mappings
            .insert(mapping.field_name.clone(), mapping);
    }

    /// Returns true if the property is mapped to a column.
    #[must_use]
    pub fn has_field(&self, field_name: &str) -> bool {
        self.field_mappings.contains_key(field_name)
    }

    /// The mapping of a field.
    #[must_use]
    pub fn field_mapping(&self, field_name: &str) -> Option<&FieldMapping> {
        self.field_mappings.get(field_name)
    }

    /// All field mappings.
    #[must_use]
    pub fn field_mappings(&self) -> &BTreeMap<String, FieldMapping> {
        &self.field_mappings
    }

    /// The column a field is stored in.
    #[must_use]
    pub fn column_name(&self, field_name: &str) -> Option<&str> {
        self.field_mappings
            .get(field_name)
            .map(|m| m.column_name.as_str())
    }

    /// Returns true if the field mapping came from an entity ancestor.
    #[must_use]
    pub fn is_inherited_field(&self, field_name: &str) -> bool {
        self.field_mappings
            .get(field_name)
            .is_some_and(|m| m.inherited.is_some())
    }

    /// Replaces the column of a mapped field, keeping its identifier flag.
    ///
    /// # Errors
    ///
    /// Fails if the field is not mapped.
    pub fn set_attribute_override(&mut self, field_name: &str, mut mapping: FieldMapping) -> Result<()> {
        let Some(existing) = self.field_mappings.get(field_name) else {
            return Err(self.invalid(format!(
                "attribute override for unknown field \"{field_name}\""
            )));
        };
        mapping.field_name = field_name.to_string();
        mapping.id = existing.id;
        mapping.inherited.clone_from(&existing.inherited);
        if mapping.field_type.is_none() {
            mapping.field_type.clone_from(&existing.field_type);
        }
        self.field_mappings.insert(field_name.to_string(), mapping);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Identifier and versioning
    // -------------------------------------------------------------------------

    /// Identifier field names.
    #[must_use]
    pub fn identifier(&self) -> &[String] {
        &self.identifier
    }

    /// Replaces the identifier field names.
    pub fn set_identifier(&mut self, identifier: Vec<String>) {
        self.identifier = identifier;
    }

    /// Returns true if the field is part of the identifier.
    #[must_use]
    pub fn is_identifier(&self, field_name: &str) -> bool {
        self.identifier.iter().any(|f| f == field_name)
    }

    /// Sets the identifier generator.
    pub fn set_id_generator_type(&mut self, generator: GeneratorType) {
        self.generator_type = generator;
    }

    /// The identifier generator.
    #[must_use]
    pub fn id_generator_type(&self) -> GeneratorType {
        self.generator_type
    }

    /// Sets the sequence used by the sequence generator.
    pub fn set_sequence_generator_definition(&mut self, definition: SequenceGeneratorDefinition) {
        self.sequence_generator = Some(definition);
    }

    /// The sequence generator settings.
    #[must_use]
    pub fn sequence_generator_definition(&self) -> Option<&SequenceGeneratorDefinition> {
        self.sequence_generator.as_ref()
    }

    /// Sets the custom identifier generator class.
    pub fn set_custom_generator_definition(&mut self, class: Option<String>) {
        self.custom_generator_class = class;
    }

    /// The custom identifier generator class.
    #[must_use]
    pub fn custom_generator_class(&self) -> Option<&str> {
        self.custom_generator_class.as_deref()
    }

    /// Uses a field for optimistic locking.
    ///
    /// # Errors
    ///
    /// Fails for types that cannot be versioned.
    pub fn set_version_mapping(&mut self, mapping: &FieldMapping) -> Result<()> {
        let field_type = mapping.field_type.as_deref().unwrap_or("string");
        if !VERSIONABLE_TYPES.contains(&field_type) {
            return Err(self.invalid(format!(
                "version field \"{}\" has unsupported type \"{field_type}\"",
                mapping.field_name
            )));
        }
        self.version_field = Some(mapping.field_name.clone());
        Ok(())
    }

    /// The version field.
    #[must_use]
    pub fn version_field(&self) -> Option<&str> {
        self.version_field.as_deref()
    }

    // -------------------------------------------------------------------------
    // Associations and embedded values
    // -------------------------------------------------------------------------

    fn map_association(&mut self, mapping: AssociationMapping) -> Result<()> {
        self.ensure_unmapped(&mapping.field_name)?;
        if mapping.id {
            if !mapping.kind.is_to_one() {
                return Err(self.invalid(format!(
                    "collection \"{}\" cannot be part of the identifier",
                    mapping.field_name
                )));
            }
            self.push_identifier(&mapping.field_name);
        }
        self.association_mappings
            .insert(mapping.field_name.clone(), mapping);
        Ok(())
    }

    /// Maps a one-to-one association.
    ///
    /// # Errors
    ///
    /// Fails if the property is already mapped.
    pub fn map_one_to_one(&mut self, mut mapping: AssociationMapping) -> Result<()> {
        mapping.kind = AssociationKind::OneToOne;
        self.map_association(mapping)
    }

    /// Maps the inverse side of a many-to-one association.
    ///
    /// # Errors
    ///
    /// Fails without `mapped_by` or if the property is already mapped.
    pub fn map_one_to_many(&mut self, mut mapping: AssociationMapping) -> Result<()> {
        if mapping.mapped_by.is_none() {
            return Err(self.invalid(format!(
                "one-to-many association \"{}\" requires mappedBy",
                mapping.field_name
            )));
        }
        mapping.kind = AssociationKind::OneToMany;
        self.map_association(mapping)
    }

    /// Maps a many-to-one association.
    ///
    /// # Errors
    ///
    /// Fails if the property is already mapped.
    pub fn map_many_to_one(&mut self, mut mapping: AssociationMapping) -> Result<()> {
        mapping.kind = AssociationKind::ManyToOne;
        self.map_association(mapping)
    }

    /// Maps a many-to-many association.
    ///
    /// # Errors
    ///
    /// Fails if the property is already mapped.
    pub fn map_many_to_many(&mut self, mut mapping: AssociationMapping) -> Result<()> {
        mapping.kind = AssociationKind::ManyToMany;
        self.map_association(mapping)
    }

    /// Copies an association mapping from an ancestor.
    pub fn add_inherited_association_mapping(&mut self, mapping: AssociationMapping) {
        self.association_mappings
            .insert(mapping.field_name.clone(), mapping);
    }

    /// Returns true if the property is an association.
    #[must_use]
    pub fn has_association(&self, field_name: &str) -> bool {
        self.association_mappings.contains_key(field_name)
    }

    /// The mapping of an association.
    #[must_use]
    pub fn association_mapping(&self, field_name: &str) -> Option<&AssociationMapping> {
        self.association_mappings.get(field_name)
    }

    /// All association mappings.
    #[must_use]
    pub fn association_mappings(&self) -> &BTreeMap<String, AssociationMapping> {
        &self.association_mappings
    }

    /// Returns true if the association mapping came from an entity ancestor.
    #[must_use]
    pub fn is_inherited_association(&self, field_name: &str) -> bool {
        self.association_mappings
            .get(field_name)
            .is_some_and(|m| m.inherited.is_some())
    }

    /// Replaces the join settings of a mapped association.
    ///
    /// # Errors
    ///
    /// Fails if the property is not an association.
    pub fn set_association_override(
        &mut self,
        field_name: &str,
        association_override: AssociationOverride,
    ) -> Result<()> {
        let Some(mapping) = self.association_mappings.get_mut(field_name) else {
            return Err(self.invalid(format!(
                "association override for unknown association \"{field_name}\""
            )));
        };
        if !association_override.join_columns.is_empty() {
            mapping.join_columns = association_override.join_columns;
        }
        if association_override.join_table.is_some() {
            mapping.join_table = association_override.join_table;
        }
        if association_override.inversed_by.is_some() {
            mapping.inversed_by = association_override.inversed_by;
        }
        if let Some(fetch) = association_override.fetch {
            mapping.fetch = fetch;
        }
        Ok(())
    }

    /// Maps a property as embedded value.
    ///
    /// # Errors
    ///
    /// Fails if the property is already mapped.
    pub fn map_embedded(&mut self, mapping: EmbeddedMapping) -> Result<()> {
        self.ensure_unmapped(&mapping.field_name)?;
        self.embedded_classes
            .insert(mapping.field_name.clone(), mapping);
        Ok(())
    }

    /// Copies an embedded mapping from an ancestor.
    pub fn add_inherited_embedded_class(&mut self, mapping: EmbeddedMapping) {
        self.embedded_classes
            .insert(mapping.field_name.clone(), mapping);
    }

    /// All embedded values.
    #[must_use]
    pub fn embedded_classes(&self) -> &BTreeMap<String, EmbeddedMapping> {
        &self.embedded_classes
    }

    /// Returns true if the embedded mapping came from an entity ancestor.
    #[must_use]
    pub fn is_inherited_embedded_class(&self, field_name: &str) -> bool {
        self.embedded_classes
            .get(field_name)
            .is_some_and(|m| m.inherited.is_some())
    }

    // -------------------------------------------------------------------------
    // Caching and queries
    // -------------------------------------------------------------------------

    /// Enables the second-level cache for the class.
    pub fn enable_cache(&mut self, cache: CacheConfig) {
        self.cache = Some(cache);
    }

    /// Second-level cache settings.
    #[must_use]
    pub fn cache(&self) -> Option<&CacheConfig> {
        self.cache.as_ref()
    }

    /// Enables the second-level cache for an association.
    ///
    /// # Errors
    ///
    /// Fails if the property is not an association.
    pub fn enable_association_cache(&mut self, field_name: &str, cache: CacheConfig) -> Result<()> {
        if !self.association_mappings.contains_key(field_name) {
            return Err(self.invalid(format!(
                "cache settings for unknown association \"{field_name}\""
            )));
        }
        self.association_caches.insert(field_name.to_string(), cache);
        Ok(())
    }

    /// Cache settings of an association.
    #[must_use]
    pub fn association_cache(&self, field_name: &str) -> Option<&CacheConfig> {
        self.association_caches.get(field_name)
    }

    /// Adds a named DQL query.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name.
    pub fn add_named_query(&mut self, query: NamedQuery) -> Result<()> {
        if self.named_queries.contains_key(&query.name) {
            return Err(self.invalid(format!("named query \"{}\" declared twice", query.name)));
        }
        self.named_queries.insert(query.name.clone(), query);
        Ok(())
    }

    /// Named DQL queries.
    #[must_use]
    pub fn named_queries(&self) -> &BTreeMap<String, NamedQuery> {
        &self.named_queries
    }

    /// Adds a named native query.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate name.
    pub fn add_named_native_query(&mut self, query: NamedNativeQuery) -> Result<()> {
        if self.named_native_queries.contains_key(&query.name) {
            return Err(self.invalid(format!(
                "named native query \"{}\" declared twice",
                query.name
            )));
        }
        self.named_native_queries.insert(query.name.clone(), query);
        Ok(())
    }

    /// Named native queries.
    #[must_use]
    pub fn named_native_queries(&self) -> &BTreeMap<String, NamedNativeQuery> {
        &self.named_native_queries
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Registers a method of the class for an event.
    pub fn add_lifecycle_callback(&mut self, method: &str, event: LifecycleEvent) {
        let callbacks = self.lifecycle_callbacks.entry(event).or_default();
        if !callbacks.iter().any(|m| m == method) {
            callbacks.push(method.to_string());
        }
    }

    /// Replaces all lifecycle callbacks.
    pub fn set_lifecycle_callbacks(&mut self, callbacks: BTreeMap<LifecycleEvent, Vec<String>>) {
        self.lifecycle_callbacks = callbacks;
    }

    /// Methods registered for an event.
    #[must_use]
    pub fn lifecycle_callbacks(&self, event: LifecycleEvent) -> &[String] {
        self.lifecycle_callbacks
            .get(&event)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All lifecycle callbacks.
    #[must_use]
    pub fn all_lifecycle_callbacks(&self) -> &BTreeMap<LifecycleEvent, Vec<String>> {
        &self.lifecycle_callbacks
    }

    /// Registers a listener method for an event.
    pub fn add_entity_listener(&mut self, event: LifecycleEvent, class: &str, method: &str) {
        let listener = EntityListener {
            class: clean_class_name(class).to_string(),
            method: method.to_string(),
        };
        let listeners = self.entity_listeners.entry(event).or_default();
        if !listeners.contains(&listener) {
            listeners.push(listener);
        }
    }

    /// Listeners registered for an event.
    #[must_use]
    pub fn entity_listeners(&self, event: LifecycleEvent) -> &[EntityListener] {
        self.entity_listeners
            .get(&event)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
