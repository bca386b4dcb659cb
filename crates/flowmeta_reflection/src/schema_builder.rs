//! Building class schemata from reflection data.
//!
//! Schemata are built into a copy of the schema map and only stored once
//! every step succeeded, so a failing build leaves the previous schemata
//! untouched.

use flowmeta_foundation::names::{
    ARTIFICIAL_IDENTITY_PROPERTY, CONSTRUCTOR_METHOD, ENTITY_CLASSNAME_CONSTANT,
    REPOSITORY_INTERFACE,
};
use flowmeta_foundation::{
    Annotation, AnnotationKind, Error, ErrorKind, Result, clean_class_name, parse_type,
};
use im::OrdMap;
use tracing::debug;

use crate::schema::{ClassSchema, ModelType};
use crate::service::ReflectionService;

const PROPERTY_TYPE_WHITELIST: &[&str] = &[
    "DateTime",
    "SplObjectStorage",
    "Doctrine\\Common\\Collections\\Collection",
    "Doctrine\\Common\\Collections\\ArrayCollection",
];

const NON_PERSISTED_PROPERTY_ANNOTATIONS: [AnnotationKind; 3] = [
    AnnotationKind::Transient,
    AnnotationKind::Inject,
    AnnotationKind::InjectConfiguration,
];

/// Derives class schemata from a reflection service's records.
pub struct ClassSchemaBuilder<'a> {
    reflection: &'a ReflectionService,
}

impl<'a> ClassSchemaBuilder<'a> {
    /// Creates a builder reading from `reflection`.
    #[must_use]
    pub fn new(reflection: &'a ReflectionService) -> Self {
        Self { reflection }
    }

    fn is_entity(&self, class_name: &str) -> bool {
        self.reflection
            .is_class_annotated_with(class_name, &AnnotationKind::Entity)
            || self
                .reflection
                .is_class_annotated_with(class_name, &AnnotationKind::OrmEntity)
    }

    fn is_persistable(&self, class_name: &str) -> bool {
        self.is_entity(class_name)
            || self
                .reflection
                .is_class_annotated_with(class_name, &AnnotationKind::ValueObject)
    }

    /// Builds the schema of one entity or value object.
    ///
    /// # Errors
    ///
    /// Fails for value objects violating their requirements, malformed
    /// `@var` types and invalid identity declarations.
    pub fn build_class_schema(&self, class_name: &str) -> Result<ClassSchema> {
        let class_name = clean_class_name(class_name);
        let mut schema = ClassSchema::new(class_name);

        if self.is_entity(class_name) {
            schema.set_model_type(ModelType::Entity);
            if self
                .reflection
                .is_class_annotated_with(class_name, &AnnotationKind::Lazy)
            {
                schema.set_lazy_loadable_object(true);
            }
            let possible_repository =
                format!("{}Repository", class_name.replace("\\Model\\", "\\Repository\\"));
            if self.reflection.is_class_reflected(&possible_repository) {
                schema.set_repository_class_name(Some(possible_repository))?;
            }
        } else if self
            .reflection
            .is_class_annotated_with(class_name, &AnnotationKind::ValueObject)
        {
            self.check_value_object_requirements(class_name)?;
            schema.set_model_type(ModelType::ValueObject);
        }

        self.add_properties(&mut schema)?;
        Ok(schema)
    }

    fn check_value_object_requirements(&self, class_name: &str) -> Result<()> {
        let Some(record) = self.reflection.class_record(class_name) else {
            return Ok(());
        };
        if record.method(CONSTRUCTOR_METHOD).is_none() {
            return Err(Error::invalid_value_object(
                class_name,
                "a value object must have a constructor",
            ));
        }
        if let Some(setter) = record
            .methods
            .iter()
            .find(|m| m.is_public() && m.name.starts_with("set"))
        {
            return Err(Error::invalid_value_object(
                class_name,
                format!("a value object must not have setters, found \"{}\"", setter.name),
            ));
        }
        Ok(())
    }

    fn add_properties(&self, schema: &mut ClassSchema) -> Result<()> {
        let class_name = schema.class_name().to_string();
        let reflection = self.reflection;
        let mut needs_artificial_identity = true;

        for property in reflection.get_class_property_names(&class_name) {
            if !reflection.is_property_tagged_with(&class_name, &property, "var")
                || NON_PERSISTED_PROPERTY_ANNOTATIONS.iter().any(|kind| {
                    reflection.is_property_annotated_with(&class_name, &property, kind)
                })
            {
                continue;
            }

            let declared_type = reflection
                .get_property_tag_values(&class_name, &property, "var")
                .join(" ");
            let declared_type = declared_type.trim_matches([' ', '\\']);
            if declared_type.chars().any(char::is_whitespace) {
                return Err(Error::new(ErrorKind::InvalidPropertyType {
                    class_name: class_name.clone(),
                    property,
                    reason: format!("\"{declared_type}\" seems to be invalid"),
                }));
            }
            if reflection.is_property_annotated_with(&class_name, &property, &AnnotationKind::Id) {
                needs_artificial_identity = false;
            }

            let parsed = parse_type(declared_type).map_err(|e| {
                e.while_doing(format!(
                    "parsing the type of property \"{property}\" in class \"{class_name}\""
                ))
            })?;
            if !PROPERTY_TYPE_WHITELIST.contains(&parsed.type_name.as_str())
                && reflection.source().find_class(&parsed.type_name).is_some()
                && !self.is_persistable(&parsed.type_name)
            {
                debug!(
                    "Skipping property {class_name}::{property}: {} is not persistable",
                    parsed.type_name
                );
                continue;
            }

            let lazy =
                reflection.is_property_annotated_with(&class_name, &property, &AnnotationKind::Lazy);
            schema.add_property(&property, declared_type, lazy)?;
            if reflection.is_property_annotated_with(
                &class_name,
                &property,
                &AnnotationKind::Identity,
            ) {
                schema.mark_as_identity_property(&property)?;
            }
        }

        if needs_artificial_identity {
            schema.add_property(ARTIFICIAL_IDENTITY_PROPERTY, "string", false)?;
        }
        Ok(())
    }

    /// Binds repositories to the entities they claim and propagates
    /// aggregate-root status to subclasses.
    ///
    /// # Errors
    ///
    /// Fails if a repository is not a singleton or claims a value object.
    pub fn complete_repository_assignments(
        &self,
        schemata: &mut OrdMap<String, ClassSchema>,
    ) -> Result<()> {
        let reflection = self.reflection;
        let repositories = if reflection.is_class_reflected(REPOSITORY_INTERFACE) {
            reflection.get_all_implementation_class_names_for_interface(REPOSITORY_INTERFACE)?
        } else {
            Vec::new()
        };

        for repository in repositories {
            if reflection.is_class_interface(&repository) || reflection.is_class_abstract(&repository)
            {
                continue;
            }
            let is_singleton = matches!(
                reflection.get_class_annotation(&repository, &AnnotationKind::Scope),
                Some(Annotation::Scope(scope)) if scope == "singleton"
            );
            if !is_singleton {
                return Err(Error::schema_violation(format!(
                    "the repository \"{repository}\" must be of scope singleton, but it is not"
                )));
            }
            let claimed = reflection
                .get_class_constant(&repository, ENTITY_CLASSNAME_CONSTANT)
                .and_then(|c| c.as_str())
                .map(|c| clean_class_name(c).to_string());
            if let Some(claimed) = claimed {
                if let Some(schema) = schemata.get_mut(&claimed) {
                    schema.set_repository_class_name(Some(repository.clone()))?;
                }
            }
        }

        let roots: Vec<(String, String)> = schemata
            .values()
            .filter_map(|s| {
                s.repository_class_name()
                    .map(|r| (s.class_name().to_string(), r.to_string()))
            })
            .collect();
        for (root, repository) in roots {
            self.make_child_classes_aggregate_root(schemata, &root, &repository)?;
        }
        Ok(())
    }

    fn make_child_classes_aggregate_root(
        &self,
        schemata: &mut OrdMap<String, ClassSchema>,
        class_name: &str,
        repository: &str,
    ) -> Result<()> {
        let mut pending = vec![(class_name.to_string(), repository.to_string())];
        while let Some((parent, repository)) = pending.pop() {
            for child in self.reflection.get_all_sub_class_names_for_class(&parent)? {
                let Some(schema) = schemata.get_mut(&child) else {
                    continue;
                };
                if schema.is_aggregate_root() {
                    continue;
                }
                schema.set_repository_class_name(Some(repository.clone()))?;
                pending.push((child, repository.clone()));
            }
        }
        Ok(())
    }

    /// Checks that no aggregate root descends from a concrete entity that is
    /// not an aggregate root.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistent class and parent found.
    pub fn ensure_aggregate_root_inheritance_chain_consistency(
        &self,
        schemata: &OrdMap<String, ClassSchema>,
    ) -> Result<()> {
        for (class_name, schema) in schemata {
            if self.reflection.is_class_interface(class_name) || !schema.is_aggregate_root() {
                continue;
            }
            for parent in self.reflection.get_parent_class_names(class_name) {
                let Some(parent_schema) = schemata.get(&parent) else {
                    continue;
                };
                if !self.reflection.is_class_abstract(&parent) && !parent_schema.is_aggregate_root()
                {
                    return Err(Error::new(ErrorKind::AggregateRootInheritance {
                        class_name: class_name.clone(),
                        parent_class_name: parent,
                    }));
                }
            }
        }
        Ok(())
    }
}

impl ReflectionService {
    /// Builds schemata for the given classes, then completes repository
    /// assignments and checks aggregate-root consistency over all schemata.
    ///
    /// # Errors
    ///
    /// Any error leaves the stored schemata unchanged.
    pub fn build_class_schemata(&mut self, class_names: &[String]) -> Result<()> {
        let mut schemata = self.data.class_schemata.clone();
        {
            let builder = ClassSchemaBuilder::new(self);
            for class_name in class_names {
                let schema = builder.build_class_schema(class_name)?;
                schemata.insert(schema.class_name().to_string(), schema);
            }
            builder.complete_repository_assignments(&mut schemata)?;
            builder.ensure_aggregate_root_inheritance_chain_consistency(&schemata)?;
        }
        self.data.class_schemata = schemata;
        Ok(())
    }
}
