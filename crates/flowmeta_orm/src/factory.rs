//! Loads class metadata through the annotation driver and completes it with
//! what subclasses inherit from mapped ancestors.

use std::collections::BTreeMap;

use flowmeta_foundation::{Error, MappingError, PersistenceSettings, Result, clean_class_name};
use flowmeta_reflection::ReflectionService;
use tracing::{debug, info};

use crate::driver::AnnotationDriver;
use crate::mapping::InheritanceType;
use crate::metadata::ClassMetadata;

/// Caches [`ClassMetadata`] per class, loading ancestors first.
#[derive(Debug)]
pub struct MetadataFactory<'a> {
    driver: AnnotationDriver<'a>,
    loaded: BTreeMap<String, ClassMetadata>,
}

impl<'a> MetadataFactory<'a> {
    /// Creates a factory reading from a populated reflection service.
    #[must_use]
    pub fn new(reflection: &'a ReflectionService, settings: &PersistenceSettings) -> Self {
        Self {
            driver: AnnotationDriver::new(reflection, settings),
            loaded: BTreeMap::new(),
        }
    }

    /// The underlying driver.
    #[must_use]
    pub fn driver(&self) -> &AnnotationDriver<'a> {
        &self.driver
    }

    /// Returns true if metadata for the class has been loaded.
    #[must_use]
    pub fn has_metadata_for(&self, class_name: &str) -> bool {
        self.loaded.contains_key(clean_class_name(class_name))
    }

    /// Metadata of a persistable class, loading it and its ancestors on
    /// first access.
    ///
    /// # Errors
    ///
    /// Fails for transient classes and whatever the driver rejects.
    pub fn get_metadata_for(&mut self, class_name: &str) -> Result<&ClassMetadata> {
        let class_name = clean_class_name(class_name).to_string();
        if !self.loaded.contains_key(&class_name) {
            let metadata = self.load(&class_name)?;
            self.loaded.insert(class_name.clone(), metadata);
        }
        self.loaded
            .get(&class_name)
            .ok_or_else(|| Error::internal(format!("metadata for {class_name} vanished")))
    }

    /// Metadata of every class the driver knows.
    ///
    /// # Errors
    ///
    /// Fails on the first class that cannot be mapped.
    pub fn get_all_metadata(&mut self) -> Result<Vec<&ClassMetadata>> {
        let class_names = self.driver.get_all_class_names().to_vec();
        for class_name in &class_names {
            self.get_metadata_for(class_name)?;
        }
        info!("Loaded ORM metadata for {} classes", class_names.len());
        Ok(class_names
            .iter()
            .filter_map(|class_name| self.loaded.get(class_name))
            .collect())
    }

    fn load(&mut self, class_name: &str) -> Result<ClassMetadata> {
        if self.driver.is_transient(class_name) {
            return Err(Error::mapping(MappingError::NotAnEntity {
                class_name: class_name.to_string(),
            }));
        }
        debug!("Loading class metadata for {class_name}");

        let ancestors: Vec<String> = self
            .driver
            .reflection()
            .get_parent_class_names(class_name)
            .into_iter()
            .filter(|parent| !self.driver.is_transient(parent))
            .collect();
        let parent = match ancestors.first() {
            Some(parent) => Some(self.get_metadata_for(parent)?.clone()),
            None => None,
        };

        let mut metadata = ClassMetadata::new(class_name);
        if let Some(parent) = &parent {
            inherit(&mut metadata, parent)?;
        }
        self.driver.load_metadata_for_class(&mut metadata)?;

        if let Some(parent) = &parent {
            if parent.inheritance_type() == InheritanceType::SingleTable {
                metadata.set_primary_table(parent.table().clone());
            }
        }
        metadata.set_parent_classes(
            ancestors
                .into_iter()
                .filter(|ancestor| {
                    self.loaded
                        .get(ancestor)
                        .is_some_and(|m| !m.is_mapped_superclass())
                })
                .collect(),
        );
        Ok(metadata)
    }
}

/// Copies mappings and settings a class inherits from its nearest mapped
/// ancestor. Mappings from mapped superclasses are not marked inherited.
fn inherit(metadata: &mut ClassMetadata, parent: &ClassMetadata) -> Result<()> {
    let origin = |inherited: &Option<String>| {
        if parent.is_mapped_superclass() {
            inherited.clone()
        } else {
            Some(inherited.clone().unwrap_or_else(|| parent.name().to_string()))
        }
    };

    if parent.inheritance_type() != InheritanceType::None {
        metadata.set_inheritance_type(parent.inheritance_type());
        metadata.set_discriminator_column(parent.discriminator_column().cloned());
        metadata.set_discriminator_map(parent.discriminator_map().clone());
    }
    metadata.set_id_generator_type(parent.id_generator_type());
    if let Some(sequence) = parent.sequence_generator_definition() {
        metadata.set_sequence_generator_definition(sequence.clone());
    }
    metadata.set_custom_generator_definition(parent.custom_generator_class().map(str::to_string));

    for mapping in parent.field_mappings().values() {
        let mut mapping = mapping.clone();
        mapping.inherited = origin(&mapping.inherited);
        metadata.add_inherited_field_mapping(mapping);
    }
    for mapping in parent.association_mappings().values() {
        let mut mapping = mapping.clone();
        mapping.inherited = origin(&mapping.inherited);
        metadata.add_inherited_association_mapping(mapping);
    }
    for mapping in parent.embedded_classes().values() {
        let mut mapping = mapping.clone();
        mapping.inherited = origin(&mapping.inherited);
        metadata.add_inherited_embedded_class(mapping);
    }

    metadata.set_identifier(parent.identifier().to_vec());
    if let Some(version) = parent.version_field().and_then(|v| parent.field_mapping(v)) {
        metadata.set_version_mapping(version)?;
    }
    metadata.set_lifecycle_callbacks(parent.all_lifecycle_callbacks().clone());
    metadata.set_change_tracking_policy(parent.change_tracking_policy());
    if let Some(cache) = parent.cache() {
        metadata.enable_cache(cache.clone());
    }
    if parent.is_mapped_superclass() {
        metadata.set_custom_repository_class(
            parent.custom_repository_class_name().map(str::to_string),
        );
    }
    Ok(())
}
