//! Class schemata: the persistence view of an entity or value object.

use std::collections::BTreeMap;
use std::fmt;

use flowmeta_foundation::{Error, Result, clean_class_name, parse_type, types::is_collection_type};
use serde::{Deserialize, Serialize};

/// Persistence role of a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelType {
    /// Has identity; may be an aggregate root.
    Entity,
    /// Identified by its values only.
    ValueObject,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity => write!(f, "entity"),
            Self::ValueObject => write!(f, "value object"),
        }
    }
}

/// A persisted property.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Main type, normalized.
    pub type_name: String,
    /// Element type of a collection.
    pub element_type: Option<String>,
    /// Loaded lazily.
    pub lazy: bool,
}

/// The persistence schema of one class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSchema {
    class_name: String,
    model_type: Option<ModelType>,
    lazy_loadable: bool,
    repository_class_name: Option<String>,
    properties: BTreeMap<String, SchemaProperty>,
    identity_properties: BTreeMap<String, String>,
}

impl ClassSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new(class_name: &str) -> Self {
        Self {
            class_name: clean_class_name(class_name).to_string(),
            model_type: None,
            lazy_loadable: false,
            repository_class_name: None,
            properties: BTreeMap::new(),
            identity_properties: BTreeMap::new(),
        }
    }

    /// The class this schema describes.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Sets the model type; value objects lose identity properties and repository.
    pub fn set_model_type(&mut self, model_type: ModelType) {
        self.model_type = Some(model_type);
        if model_type == ModelType::ValueObject {
            self.identity_properties.clear();
            self.repository_class_name = None;
        }
    }

    /// The model type, once set.
    #[must_use]
    pub fn model_type(&self) -> Option<ModelType> {
        self.model_type
    }

    /// Marks whether instances may be loaded lazily.
    pub fn set_lazy_loadable_object(&mut self, lazy: bool) {
        self.lazy_loadable = lazy;
    }

    /// Whether instances may be loaded lazily.
    #[must_use]
    pub fn is_lazy_loadable_object(&self) -> bool {
        self.lazy_loadable
    }

    /// Adds a property with the given type string.
    ///
    /// # Errors
    ///
    /// Returns an error if the type string is malformed or carries an element
    /// type on a non-collection type.
    pub fn add_property(&mut self, name: &str, type_string: &str, lazy: bool) -> Result<()> {
        let parsed = parse_type(type_string)?;
        self.properties.insert(
            name.to_string(),
            SchemaProperty {
                type_name: parsed.type_name,
                element_type: parsed.element_type,
                lazy,
            },
        );
        Ok(())
    }

    /// Looks up a property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Returns true if the property exists.
    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// All properties by name.
    #[must_use]
    pub fn properties(&self) -> &BTreeMap<String, SchemaProperty> {
        &self.properties
    }

    /// Returns true if the property is lazy.
    #[must_use]
    pub fn is_property_lazy(&self, name: &str) -> bool {
        self.properties.get(name).is_some_and(|p| p.lazy)
    }

    /// Returns true if the property holds a collection.
    #[must_use]
    pub fn is_multi_valued_property(&self, name: &str) -> bool {
        self.properties
            .get(name)
            .is_some_and(|p| is_collection_type(&p.type_name))
    }

    /// Sets or clears the repository.
    ///
    /// # Errors
    ///
    /// Value objects cannot have a repository.
    pub fn set_repository_class_name(&mut self, repository: Option<String>) -> Result<()> {
        if self.model_type == Some(ModelType::ValueObject) && repository.is_some() {
            return Err(Error::schema_violation(format!(
                "value objects must not be aggregate roots (have a repository), \"{}\" is one",
                self.class_name
            )));
        }
        self.repository_class_name = repository;
        Ok(())
    }

    /// The repository managing this class.
    #[must_use]
    pub fn repository_class_name(&self) -> Option<&str> {
        self.repository_class_name.as_deref()
    }

    /// A class is an aggregate root when it has a repository.
    #[must_use]
    pub fn is_aggregate_root(&self) -> bool {
        self.repository_class_name.is_some()
    }

    /// Marks a property as part of the domain identity.
    ///
    /// # Errors
    ///
    /// Fails for value objects, unknown properties and lazy properties.
    pub fn mark_as_identity_property(&mut self, name: &str) -> Result<()> {
        if self.model_type == Some(ModelType::ValueObject) {
            return Err(Error::schema_violation(format!(
                "value objects have no identity properties, \"{}\" of \"{}\" cannot be one",
                name, self.class_name
            )));
        }
        let Some(property) = self.properties.get(name) else {
            return Err(Error::schema_violation(format!(
                "property \"{name}\" must be added to the class schema of \"{}\" before it can be marked as identity property",
                self.class_name
            )));
        };
        if property.lazy {
            return Err(Error::schema_violation(format!(
                "property \"{name}\" of \"{}\" must not be marked for lazy loading to be marked as identity property",
                self.class_name
            )));
        }
        self.identity_properties
            .insert(name.to_string(), property.type_name.clone());
        Ok(())
    }

    /// Identity properties by name, with their types.
    #[must_use]
    pub fn identity_properties(&self) -> &BTreeMap<String, String> {
        &self.identity_properties
    }
}
