//! The reflection service: reflects classes and answers queries about them.
//!
//! Reflecting a class records its flags, ancestry, interfaces, annotations,
//! doc tags, properties, methods and constants in a [`ClassRecord`], and
//! updates the reverse indexes (subclasses, interface implementations,
//! annotated classes, annotated methods). Queries are pure reads against
//! these records; an unknown class yields an empty answer.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use flowmeta_foundation::names::{
    ORM_PROXY_INTERFACE, ORM_PROXY_NAMESPACE, PROXY_INTERFACE, is_in_namespace,
};
use flowmeta_foundation::types::{is_simple_type, normalize_type, strip_nullable};
use flowmeta_foundation::{
    Annotation, AnnotationKind, ApplicationContext, Error, ErrorKind, Literal, ReflectionSettings,
    Result, Settings, TargetKind, clean_class_name,
};
use im::{OrdMap, OrdSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::ReflectionCaches;
use crate::doc_comment::{DocComment, TagMap};
use crate::packages::PackageProvider;
use crate::record::{ClassRecord, MethodRecord, ParameterRecord, PropertyRecord};
use crate::schema::ClassSchema;
use crate::source::{
    AnnotationReader, ClassDefinition, ClassSource, DeclaredAnnotationReader, MethodDefinition,
    ParameterDefinition, PropertyDefinition, Visibility,
};

const NON_CLASS_RETURN_TYPES: &[&str] = &[
    "self", "parent", "static", "null", "callable", "void", "never", "iterable", "object",
    "resource", "mixed",
];

/// Everything the service has learned; the unit of caching.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReflectionData {
    /// Records by class name.
    pub classes: OrdMap<String, ClassRecord>,
    /// Class names by class annotation.
    pub annotated_classes: OrdMap<AnnotationKind, OrdSet<String>>,
    /// Method names by method annotation and class.
    pub classes_by_method_annotations: OrdMap<AnnotationKind, OrdMap<String, Vec<String>>>,
    /// Class schemata by class name.
    pub class_schemata: OrdMap<String, ClassSchema>,
}

impl ReflectionData {
    /// Keeps only entries for the given classes.
    #[must_use]
    pub fn filtered(&self, keep: &BTreeSet<String>) -> Self {
        Self {
            classes: self
                .classes
                .iter()
                .filter(|(name, _)| keep.contains(*name))
                .map(|(name, record)| (name.clone(), record.clone()))
                .collect(),
            annotated_classes: self
                .annotated_classes
                .iter()
                .map(|(kind, names)| {
                    let names: OrdSet<String> =
                        names.iter().filter(|n| keep.contains(*n)).cloned().collect();
                    (kind.clone(), names)
                })
                .filter(|(_, names)| !names.is_empty())
                .collect(),
            classes_by_method_annotations: self
                .classes_by_method_annotations
                .iter()
                .map(|(kind, by_class)| {
                    let by_class: OrdMap<String, Vec<String>> = by_class
                        .iter()
                        .filter(|(name, _)| keep.contains(*name))
                        .map(|(name, methods)| (name.clone(), methods.clone()))
                        .collect();
                    (kind.clone(), by_class)
                })
                .filter(|(_, by_class)| !by_class.is_empty())
                .collect(),
            class_schemata: self
                .class_schemata
                .iter()
                .filter(|(name, _)| keep.contains(*name))
                .map(|(name, schema)| (name.clone(), schema.clone()))
                .collect(),
        }
    }

    /// Merges another data set into this one; entries of `other` win.
    pub fn merge(&mut self, other: Self) {
        self.classes = other.classes.union(self.classes.clone());
        for (kind, names) in other.annotated_classes {
            let entry = self
                .annotated_classes
                .entry(kind)
                .or_insert_with(Default::default);
            *entry = entry.clone().union(names);
        }
        for (kind, by_class) in other.classes_by_method_annotations {
            let entry = self
                .classes_by_method_annotations
                .entry(kind)
                .or_insert_with(Default::default);
            *entry = by_class.union(entry.clone());
        }
        self.class_schemata = other.class_schemata.union(self.class_schemata.clone());
    }
}

/// Reflects classes and answers questions about them.
pub struct ReflectionService {
    pub(crate) source: Arc<dyn ClassSource>,
    pub(crate) reader: Arc<dyn AnnotationReader>,
    pub(crate) settings: ReflectionSettings,
    pub(crate) context: ApplicationContext,
    pub(crate) caches: Option<ReflectionCaches>,
    pub(crate) packages: Option<Arc<dyn PackageProvider>>,
    pub(crate) data: ReflectionData,
    pub(crate) available_class_names: BTreeMap<String, Vec<String>>,
    pub(crate) updated_classes: BTreeSet<String>,
    pub(crate) initialized: bool,
    pub(crate) frozen: bool,
}

impl std::fmt::Debug for ReflectionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectionService")
            .field("classes", &self.data.classes.len())
            .field("schemata", &self.data.class_schemata.len())
            .field("context", &self.context)
            .field("frozen", &self.frozen)
            .finish_non_exhaustive()
    }
}

impl ReflectionService {
    /// Creates a service reading classes from `source`.
    #[must_use]
    pub fn new(source: impl ClassSource + 'static) -> Self {
        Self::with_shared_source(Arc::new(source))
    }

    /// Creates a service over a shared class source.
    #[must_use]
    pub fn with_shared_source(source: Arc<dyn ClassSource>) -> Self {
        Self {
            source,
            reader: Arc::new(DeclaredAnnotationReader),
            settings: ReflectionSettings::default(),
            context: ApplicationContext::default(),
            caches: None,
            packages: None,
            data: ReflectionData::default(),
            available_class_names: BTreeMap::new(),
            updated_classes: BTreeSet::new(),
            initialized: false,
            frozen: false,
        }
    }

    /// Uses another annotation reader.
    #[must_use]
    pub fn with_annotation_reader(mut self, reader: Arc<dyn AnnotationReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Applies reflection settings and application context.
    #[must_use]
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.settings = settings.reflection.clone();
        self.context = settings.context;
        self
    }

    /// Persists reflection data in the given caches.
    #[must_use]
    pub fn with_caches(mut self, caches: ReflectionCaches) -> Self {
        self.caches = Some(caches);
        self
    }

    /// Uses a package provider for frozen packages and precompiled data.
    #[must_use]
    pub fn with_packages(mut self, packages: Arc<dyn PackageProvider>) -> Self {
        self.packages = Some(packages);
        self
    }

    /// The class source.
    #[must_use]
    pub fn source(&self) -> &dyn ClassSource {
        self.source.as_ref()
    }

    /// The current reflection data.
    #[must_use]
    pub fn data(&self) -> &ReflectionData {
        &self.data
    }

    /// Returns true if reflection is frozen.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freezes reflection: later attempts to reflect fail.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    // =========================================================================
    // Reflection
    // =========================================================================

    /// Reflects a class, its ancestors and its interfaces.
    ///
    /// Reflecting an already reflected class does nothing.
    ///
    /// # Errors
    ///
    /// Fails if reflection is frozen, the class is a generated proxy, or the
    /// class (or one of its ancestors) cannot be loaded.
    pub fn reflect_class(&mut self, class_name: &str) -> Result<()> {
        let mut in_progress = BTreeSet::new();
        self.reflect_class_guarded(clean_class_name(class_name), &mut in_progress)
    }

    fn reflect_class_guarded(
        &mut self,
        class_name: &str,
        in_progress: &mut BTreeSet<String>,
    ) -> Result<()> {
        if self.data.classes.contains_key(class_name) {
            return Ok(());
        }
        if self.frozen {
            return Err(Error::new(ErrorKind::ReflectionFrozen(class_name.to_string())));
        }
        let definition = self.source.find_class(class_name).ok_or_else(|| {
            Error::class_loading_failed(class_name, "the class source does not know it")
        })?;
        if is_in_namespace(class_name, ORM_PROXY_NAMESPACE)
            && definition.interfaces.iter().any(|i| i == ORM_PROXY_INTERFACE)
        {
            return Err(Error::new(ErrorKind::InvalidClass {
                class_name: class_name.to_string(),
                reason: "generated ORM proxies must not be reflected".to_string(),
            }));
        }
        if !in_progress.insert(class_name.to_string()) {
            return Err(Error::class_loading_failed(
                class_name,
                "circular inheritance",
            ));
        }

        debug!("Reflecting class {class_name}");

        if let Some(parent) = &definition.parent {
            self.reflect_class_guarded(parent, in_progress)
                .map_err(|e| e.while_doing(format!("reflecting parent of {class_name}")))?;
        }
        for interface in &definition.interfaces {
            self.reflect_class_guarded(interface, in_progress)
                .map_err(|e| e.while_doing(format!("reflecting interfaces of {class_name}")))?;
        }

        let record = self.build_class_record(&definition);
        self.register_record(record);
        self.updated_classes.insert(class_name.to_string());
        in_progress.remove(class_name);
        Ok(())
    }

    fn build_class_record(&self, definition: &ClassDefinition) -> ClassRecord {
        let class_name = definition.name.as_str();
        let parent_record = definition
            .parent
            .as_ref()
            .and_then(|p| self.data.classes.get(p));

        let mut interfaces = BTreeSet::new();
        for interface in &definition.interfaces {
            interfaces.insert(interface.clone());
            if let Some(record) = self.data.classes.get(interface) {
                interfaces.extend(record.interfaces.iter().cloned());
            }
        }
        if let Some(parent) = parent_record {
            interfaces.extend(parent.interfaces.iter().cloned());
        }

        let mut properties: Vec<PropertyRecord> = definition
            .properties
            .iter()
            .map(|p| self.reflect_property(definition, p))
            .collect();
        let mut methods: Vec<MethodRecord> = definition
            .methods
            .iter()
            .map(|m| self.reflect_method(definition, m))
            .collect();
        let mut constants: Vec<(String, Literal)> = definition
            .constants
            .iter()
            .map(|(n, v)| (n.clone(), v.clone()))
            .collect();

        if let Some(parent) = parent_record {
            for property in &parent.properties {
                if !property.is_private() && !properties.iter().any(|p| p.name == property.name)
                {
                    properties.push(property.clone());
                }
            }
            for method in &parent.methods {
                if method.visibility != Visibility::Private
                    && !methods.iter().any(|m| m.name == method.name)
                {
                    methods.push(method.clone());
                }
            }
            for (name, value) in &parent.constants {
                if !constants.iter().any(|(n, _)| n == name) {
                    constants.push((name.clone(), value.clone()));
                }
            }
        }

        ClassRecord {
            name: class_name.to_string(),
            is_abstract: definition.is_abstract || definition.is_interface,
            is_final: definition.is_final,
            is_interface: definition.is_interface,
            parent: definition.parent.clone(),
            interfaces,
            subclasses: BTreeSet::new(),
            implementations: BTreeSet::new(),
            tags: self.filter_tags(&DocComment::parse(&definition.doc_comment).tags),
            annotations: self.reader.class_annotations(definition),
            properties,
            methods,
            constants,
        }
    }

    fn register_record(&mut self, record: ClassRecord) {
        let class_name = record.name.clone();

        let mut ancestor = record.parent.clone();
        while let Some(name) = ancestor {
            match self.data.classes.get_mut(&name) {
                Some(parent) => {
                    parent.subclasses.insert(class_name.clone());
                    ancestor = parent.parent.clone();
                }
                None => break,
            }
        }

        if !record.is_abstract {
            for interface in &record.interfaces {
                if let Some(interface_record) = self.data.classes.get_mut(interface) {
                    interface_record.implementations.insert(class_name.clone());
                }
            }
        }

        for annotation in &record.annotations {
            self.data
                .annotated_classes
                .entry(annotation.kind())
                .or_insert_with(Default::default)
                .insert(class_name.clone());
        }

        for method in &record.methods {
            let mut kinds: Vec<AnnotationKind> =
                method.annotations.iter().map(Annotation::kind).collect();
            kinds.sort();
            kinds.dedup();
            for kind in kinds {
                let methods = self
                    .data
                    .classes_by_method_annotations
                    .entry(kind)
                    .or_insert_with(Default::default)
                    .entry(class_name.clone())
                    .or_insert_with(Default::default);
                if !methods.contains(&method.name) {
                    methods.push(method.name.clone());
                }
            }
        }

        self.data.classes.insert(class_name, record);
    }

    fn filter_tags(&self, tags: &TagMap) -> TagMap {
        let mut filtered = TagMap::new();
        for (tag, values) in tags.iter() {
            if self.settings.is_tag_ignored(tag) {
                continue;
            }
            filtered.set(tag, values.to_vec());
        }
        filtered
    }

    fn reflect_property(
        &self,
        class: &ClassDefinition,
        property: &PropertyDefinition,
    ) -> PropertyRecord {
        let mut tags = self.filter_tags(&DocComment::parse(&property.doc_comment).tags);
        if let Some(values) = tags.get("var") {
            if let Some(first) = values.first() {
                let mut expanded = values.to_vec();
                expanded[0] = self.expand_tag_type(class, first);
                tags.set("var", expanded);
            }
        }
        PropertyRecord {
            name: property.name.clone(),
            declaring_class: class.name.clone(),
            visibility: property.visibility,
            declared_type: property
                .type_hint
                .as_deref()
                .map(|t| t.trim_matches('?').to_string()),
            tags,
            annotations: self.reader.property_annotations(class, property),
        }
    }

    fn reflect_method(&self, class: &ClassDefinition, method: &MethodDefinition) -> MethodRecord {
        let tags = self.filter_tags(&DocComment::parse(&method.doc_comment).tags);
        let param_tags: Vec<String> = tags.get("param").map(<[String]>::to_vec).unwrap_or_default();

        let parameters = method
            .parameters
            .iter()
            .enumerate()
            .map(|(position, parameter)| {
                let record = self.reflect_parameter(class, parameter, position, &param_tags);
                if self.settings.log_incorrect_doc_comment_hints {
                    log_doc_comment_hints(method, &record, &param_tags);
                }
                record
            })
            .collect();

        MethodRecord {
            name: method.name.clone(),
            declaring_class: class.name.clone(),
            visibility: method.visibility,
            is_final: method.is_final,
            is_static: method.is_static,
            parameters,
            declared_return_type: method.return_type.as_deref().map(qualify_return_type),
            tags,
            annotations: self.reader.method_annotations(class, method),
        }
    }

    fn reflect_parameter(
        &self,
        class: &ClassDefinition,
        parameter: &ParameterDefinition,
        position: usize,
        param_tags: &[String],
    ) -> ParameterRecord {
        let mut record = ParameterRecord {
            name: parameter.name.clone(),
            position,
            optional: parameter.default_value.is_some(),
            allows_null: parameter.allows_null,
            by_reference: parameter.by_reference,
            is_array: false,
            class: None,
            default_value: parameter.default_value.clone(),
            parameter_type: String::new(),
            scalar_declaration: false,
        };

        let hint = parameter.type_hint.as_deref().map(strip_nullable);
        let mut resolved_type: Option<String> = None;
        let mut scalar_type: Option<String> = None;
        match hint {
            Some("array") => record.is_array = true,
            Some(h) if is_simple_type(h) || NON_CLASS_RETURN_TYPES.contains(&h) => {
                scalar_type = Some(h.to_string());
            }
            Some(h) => {
                record.class = Some(h.to_string());
                resolved_type = Some(h.to_string());
            }
            None => {}
        }

        let documented = param_tags.iter().find_map(|tag| {
            let mut parts = tag.split(' ');
            let doc_type = parts.next()?;
            let doc_name = parts.next()?;
            (doc_name.trim_start_matches(['$', '&']) == parameter.name)
                .then(|| self.expand_type(class, doc_type))
        });
        if documented.is_some() {
            resolved_type = documented;
        }

        record.parameter_type = if let Some(scalar) = scalar_type {
            record.scalar_declaration = true;
            scalar
        } else if let Some(resolved) = resolved_type {
            clean_class_name(&resolved).to_string()
        } else {
            "mixed".to_string()
        };
        record
    }

    fn expand_tag_type(&self, class: &ClassDefinition, value: &str) -> String {
        match value.split_once(char::is_whitespace) {
            Some((type_part, rest)) => format!("{} {rest}", self.expand_type(class, type_part)),
            None => self.expand_type(class, value),
        }
    }

    /// Expands a short type name relative to a class's namespace and imports.
    #[must_use]
    pub fn expand_type(&self, class: &ClassDefinition, type_string: &str) -> String {
        let without_null = strip_nullable(type_string);
        let suffix = if without_null == type_string.trim() {
            ""
        } else {
            "|null"
        };

        if let Some((outer, inner)) = without_null.split_once('<') {
            let element = inner.trim_end_matches('>');
            return format!(
                "{}<{}>{suffix}",
                self.expand_type(class, outer),
                self.expand_type(class, element)
            );
        }
        if let Some(element) = without_null.strip_suffix("[]") {
            return format!("array<{}>{suffix}", self.expand_type(class, element));
        }
        if without_null.is_empty()
            || without_null == "mixed"
            || without_null.starts_with('\\')
            || is_simple_type(without_null)
        {
            return format!("{}{suffix}", normalize_type(without_null));
        }

        let namespace = class.namespace();
        if !namespace.is_empty() {
            let candidate = format!("{namespace}\\{without_null}");
            if self.source.find_class(&candidate).is_some() {
                return format!("{candidate}{suffix}");
            }
        }

        let (first, rest) = match without_null.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (without_null, None),
        };
        if let Some(imported) = class.use_statements.get(&first.to_lowercase()) {
            return match rest {
                Some(rest) => format!("{imported}\\{rest}{suffix}"),
                None => format!("{imported}{suffix}"),
            };
        }

        type_string.to_string()
    }

    // =========================================================================
    // Class queries
    // =========================================================================

    /// Returns true if the class has been reflected.
    #[must_use]
    pub fn is_class_reflected(&self, class_name: &str) -> bool {
        self.data.classes.contains_key(clean_class_name(class_name))
    }

    /// All reflected class names, sorted.
    #[must_use]
    pub fn get_all_class_names(&self) -> Vec<String> {
        self.data.classes.keys().cloned().collect()
    }

    /// The record of a reflected class.
    #[must_use]
    pub fn class_record(&self, class_name: &str) -> Option<&ClassRecord> {
        self.data.classes.get(clean_class_name(class_name))
    }

    /// The single implementation of an interface.
    ///
    /// With two implementations of which exactly one is a compiled proxy, the
    /// other one is returned.
    ///
    /// # Errors
    ///
    /// Fails if the name does not denote an interface.
    pub fn get_default_implementation_class_name_for_interface(
        &self,
        interface_name: &str,
    ) -> Result<Option<String>> {
        let implementations = self.get_all_implementation_class_names_for_interface(interface_name)?;
        match implementations.as_slice() {
            [single] => Ok(Some(single.clone())),
            [first, second] => {
                let first_is_proxy = self.is_class_implementation_of(first, PROXY_INTERFACE);
                let second_is_proxy = self.is_class_implementation_of(second, PROXY_INTERFACE);
                Ok(match (first_is_proxy, second_is_proxy) {
                    (true, false) => Some(second.clone()),
                    (false, true) => Some(first.clone()),
                    _ => None,
                })
            }
            _ => Ok(None),
        }
    }

    /// All concrete implementations of an interface.
    ///
    /// # Errors
    ///
    /// Fails if the name does not denote an interface.
    pub fn get_all_implementation_class_names_for_interface(
        &self,
        interface_name: &str,
    ) -> Result<Vec<String>> {
        let interface_name = clean_class_name(interface_name);
        let is_interface = match self.data.classes.get(interface_name) {
            Some(record) => record.is_interface,
            None => self.source.interface_exists(interface_name),
        };
        if !is_interface {
            return Err(Error::invalid_target(interface_name, TargetKind::Interface));
        }
        Ok(self
            .data
            .classes
            .get(interface_name)
            .map(|r| r.implementations.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// All reflected descendants of a class.
    ///
    /// # Errors
    ///
    /// Fails if the name does not denote a class or interface.
    pub fn get_all_sub_class_names_for_class(&self, class_name: &str) -> Result<Vec<String>> {
        let class_name = clean_class_name(class_name);
        if !self.data.classes.contains_key(class_name)
            && self.source.find_class(class_name).is_none()
        {
            return Err(Error::invalid_target(class_name, TargetKind::Class));
        }
        Ok(self
            .data
            .classes
            .get(class_name)
            .map(|r| r.subclasses.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Ancestors of a class, nearest first.
    #[must_use]
    pub fn get_parent_class_names(&self, class_name: &str) -> Vec<String> {
        let mut parents = Vec::new();
        let mut current = self
            .class_record(class_name)
            .and_then(|r| r.parent.clone());
        while let Some(parent) = current {
            if parents.contains(&parent) {
                break;
            }
            current = self.class_record(&parent).and_then(|r| r.parent.clone());
            parents.push(parent);
        }
        parents
    }

    /// All interfaces a class implements.
    #[must_use]
    pub fn get_interface_names_implemented_by_class(&self, class_name: &str) -> Vec<String> {
        self.class_record(class_name)
            .map(|r| r.interfaces.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Names of classes carrying an annotation.
    #[must_use]
    pub fn get_class_names_by_annotation(&self, kind: &AnnotationKind) -> Vec<String> {
        self.data
            .annotated_classes
            .get(kind)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns true if the class carries an annotation of that kind.
    #[must_use]
    pub fn is_class_annotated_with(&self, class_name: &str, kind: &AnnotationKind) -> bool {
        self.data
            .annotated_classes
            .get(kind)
            .is_some_and(|names| names.contains(clean_class_name(class_name)))
    }

    /// Class annotations, optionally of one kind.
    #[must_use]
    pub fn get_class_annotations(
        &self,
        class_name: &str,
        kind: Option<&AnnotationKind>,
    ) -> Vec<&Annotation> {
        self.class_record(class_name)
            .map(|r| {
                r.annotations
                    .iter()
                    .filter(|a| kind.is_none_or(|k| &a.kind() == k))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The first class annotation of a kind.
    #[must_use]
    pub fn get_class_annotation(
        &self,
        class_name: &str,
        kind: &AnnotationKind,
    ) -> Option<&Annotation> {
        self.class_record(class_name)?
            .annotations
            .iter()
            .find(|a| &a.kind() == kind)
    }

    /// Returns true if the class implements the interface.
    #[must_use]
    pub fn is_class_implementation_of(&self, class_name: &str, interface_name: &str) -> bool {
        self.class_record(class_name)
            .is_some_and(|r| r.interfaces.contains(clean_class_name(interface_name)))
    }

    /// Returns true if the class is the given class or descends from it.
    #[must_use]
    pub fn is_class_subclass_of(&self, class_name: &str, ancestor: &str) -> bool {
        let ancestor = clean_class_name(ancestor);
        clean_class_name(class_name) == ancestor
            || self
                .get_parent_class_names(class_name)
                .iter()
                .any(|p| p == ancestor)
    }

    /// Abstract classes and interfaces.
    #[must_use]
    pub fn is_class_abstract(&self, class_name: &str) -> bool {
        self.class_record(class_name).is_some_and(|r| r.is_abstract)
    }

    /// Final classes.
    #[must_use]
    pub fn is_class_final(&self, class_name: &str) -> bool {
        self.class_record(class_name).is_some_and(|r| r.is_final)
    }

    /// Returns true if the reflected name is an interface.
    #[must_use]
    pub fn is_class_interface(&self, class_name: &str) -> bool {
        self.class_record(class_name).is_some_and(|r| r.is_interface)
    }

    /// Class doc tags.
    #[must_use]
    pub fn get_class_tags_values(&self, class_name: &str) -> Option<&TagMap> {
        self.class_record(class_name).map(|r| &r.tags)
    }

    /// A class constant.
    #[must_use]
    pub fn get_class_constant(&self, class_name: &str, constant: &str) -> Option<&Literal> {
        self.class_record(class_name)?.constant(constant)
    }

    /// The class schema, for entities and value objects.
    #[must_use]
    pub fn get_class_schema(&self, class_name: &str) -> Option<&ClassSchema> {
        self.data.class_schemata.get(clean_class_name(class_name))
    }

    /// All class schemata.
    #[must_use]
    pub fn get_class_schemata(&self) -> &OrdMap<String, ClassSchema> {
        &self.data.class_schemata
    }

    // =========================================================================
    // Method queries
    // =========================================================================

    fn method_record(&self, class_name: &str, method_name: &str) -> Option<&MethodRecord> {
        self.class_record(class_name)?.method(method_name)
    }

    /// Method names of a class.
    #[must_use]
    pub fn get_class_method_names(&self, class_name: &str) -> Vec<String> {
        self.class_record(class_name)
            .map(|r| r.methods.iter().map(|m| m.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns true if the class has the method.
    #[must_use]
    pub fn has_method(&self, class_name: &str, method_name: &str) -> bool {
        self.method_record(class_name, method_name).is_some()
    }

    /// Classes with at least one method carrying the annotation.
    #[must_use]
    pub fn get_classes_containing_methods_annotated_with(&self, kind: &AnnotationKind) -> Vec<String> {
        self.data
            .classes_by_method_annotations
            .get(kind)
            .map(|by_class| by_class.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Methods of a class carrying the annotation.
    #[must_use]
    pub fn get_methods_annotated_with(&self, class_name: &str, kind: &AnnotationKind) -> Vec<String> {
        self.data
            .classes_by_method_annotations
            .get(kind)
            .and_then(|by_class| by_class.get(clean_class_name(class_name)))
            .cloned()
            .unwrap_or_default()
    }

    /// Returns true if the method is final.
    #[must_use]
    pub fn is_method_final(&self, class_name: &str, method_name: &str) -> bool {
        self.method_record(class_name, method_name)
            .is_some_and(|m| m.is_final)
    }

    /// Returns true if the method is static.
    #[must_use]
    pub fn is_method_static(&self, class_name: &str, method_name: &str) -> bool {
        self.method_record(class_name, method_name)
            .is_some_and(|m| m.is_static)
    }

    /// Returns true if the method is public.
    #[must_use]
    pub fn is_method_public(&self, class_name: &str, method_name: &str) -> bool {
        self.method_visibility(class_name, method_name) == Some(Visibility::Public)
    }

    /// Returns true if the method is protected.
    #[must_use]
    pub fn is_method_protected(&self, class_name: &str, method_name: &str) -> bool {
        self.method_visibility(class_name, method_name) == Some(Visibility::Protected)
    }

    /// Returns true if the method is private.
    #[must_use]
    pub fn is_method_private(&self, class_name: &str, method_name: &str) -> bool {
        self.method_visibility(class_name, method_name) == Some(Visibility::Private)
    }

    fn method_visibility(&self, class_name: &str, method_name: &str) -> Option<Visibility> {
        self.method_record(class_name, method_name)
            .map(|m| m.visibility)
    }

    /// Returns true if the method's doc comment has the tag.
    #[must_use]
    pub fn is_method_tagged_with(&self, class_name: &str, method_name: &str, tag: &str) -> bool {
        self.method_record(class_name, method_name)
            .is_some_and(|m| m.tags.contains(tag))
    }

    /// Method doc tags.
    #[must_use]
    pub fn get_method_tags_values(&self, class_name: &str, method_name: &str) -> Option<&TagMap> {
        self.method_record(class_name, method_name).map(|m| &m.tags)
    }

    /// Method annotations, optionally of one kind.
    #[must_use]
    pub fn get_method_annotations(
        &self,
        class_name: &str,
        method_name: &str,
        kind: Option<&AnnotationKind>,
    ) -> Vec<&Annotation> {
        self.method_record(class_name, method_name)
            .map(|m| {
                m.annotations
                    .iter()
                    .filter(|a| kind.is_none_or(|k| &a.kind() == k))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The first method annotation of a kind.
    #[must_use]
    pub fn get_method_annotation(
        &self,
        class_name: &str,
        method_name: &str,
        kind: &AnnotationKind,
    ) -> Option<&Annotation> {
        self.method_record(class_name, method_name)?
            .annotations
            .iter()
            .find(|a| &a.kind() == kind)
    }

    /// Returns true if the method carries an annotation of that kind.
    #[must_use]
    pub fn is_method_annotated_with(
        &self,
        class_name: &str,
        method_name: &str,
        kind: &AnnotationKind,
    ) -> bool {
        self.method_record(class_name, method_name)
            .is_some_and(|m| m.is_annotated_with(kind))
    }

    /// Parameters of a method, in order.
    #[must_use]
    pub fn get_method_parameters(&self, class_name: &str, method_name: &str) -> &[ParameterRecord] {
        self.method_record(class_name, method_name)
            .map_or(&[], |m| m.parameters.as_slice())
    }

    /// The declared return type, class names with a leading backslash.
    #[must_use]
    pub fn get_method_declared_return_type(
        &self,
        class_name: &str,
        method_name: &str,
    ) -> Option<&str> {
        self.method_record(class_name, method_name)?
            .declared_return_type
            .as_deref()
    }

    // =========================================================================
    // Property queries
    // =========================================================================

    fn property_record(&self, class_name: &str, property_name: &str) -> Option<&PropertyRecord> {
        self.class_record(class_name)?.property(property_name)
    }

    /// Property names of a class: own first, then inherited.
    #[must_use]
    pub fn get_class_property_names(&self, class_name: &str) -> Vec<String> {
        self.class_record(class_name)
            .map(|r| r.properties.iter().map(|p| p.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Returns true if the class has the property.
    #[must_use]
    pub fn has_property(&self, class_name: &str, property_name: &str) -> bool {
        self.property_record(class_name, property_name).is_some()
    }

    /// Names of properties whose doc comment has the tag.
    #[must_use]
    pub fn get_property_names_by_tag(&self, class_name: &str, tag: &str) -> Vec<String> {
        self.class_record(class_name)
            .map(|r| {
                r.properties
                    .iter()
                    .filter(|p| p.tags.contains(tag))
                    .map(|p| p.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names of properties carrying the annotation.
    #[must_use]
    pub fn get_property_names_by_annotation(
        &self,
        class_name: &str,
        kind: &AnnotationKind,
    ) -> Vec<String> {
        self.class_record(class_name)
            .map(|r| {
                r.properties
                    .iter()
                    .filter(|p| p.is_annotated_with(kind))
                    .map(|p| p.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Property doc tags.
    #[must_use]
    pub fn get_property_tags_values(
        &self,
        class_name: &str,
        property_name: &str,
    ) -> Option<&TagMap> {
        self.property_record(class_name, property_name)
            .map(|p| &p.tags)
    }

    /// Values of one property doc tag.
    #[must_use]
    pub fn get_property_tag_values(
        &self,
        class_name: &str,
        property_name: &str,
        tag: &str,
    ) -> &[String] {
        self.property_record(class_name, property_name)
            .and_then(|p| p.tags.get(tag))
            .unwrap_or(&[])
    }

    /// The native type hint of a property.
    #[must_use]
    pub fn get_property_type(&self, class_name: &str, property_name: &str) -> Option<&str> {
        self.property_record(class_name, property_name)?
            .declared_type
            .as_deref()
    }

    /// Returns true if the property is private.
    #[must_use]
    pub fn is_property_private(&self, class_name: &str, property_name: &str) -> bool {
        self.property_record(class_name, property_name)
            .is_some_and(PropertyRecord::is_private)
    }

    /// Returns true if the property's doc comment has the tag.
    #[must_use]
    pub fn is_property_tagged_with(&self, class_name: &str, property_name: &str, tag: &str) -> bool {
        self.property_record(class_name, property_name)
            .is_some_and(|p| p.tags.contains(tag))
    }

    /// Returns true if the property carries an annotation of that kind.
    #[must_use]
    pub fn is_property_annotated_with(
        &self,
        class_name: &str,
        property_name: &str,
        kind: &AnnotationKind,
    ) -> bool {
        self.property_record(class_name, property_name)
            .is_some_and(|p| p.is_annotated_with(kind))
    }

    /// Property annotations, optionally of one kind.
    #[must_use]
    pub fn get_property_annotations(
        &self,
        class_name: &str,
        property_name: &str,
        kind: Option<&AnnotationKind>,
    ) -> Vec<&Annotation> {
        self.property_record(class_name, property_name)
            .map(|p| {
                p.annotations
                    .iter()
                    .filter(|a| kind.is_none_or(|k| &a.kind() == k))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The first property annotation of a kind.
    #[must_use]
    pub fn get_property_annotation(
        &self,
        class_name: &str,
        property_name: &str,
        kind: &AnnotationKind,
    ) -> Option<&Annotation> {
        self.property_record(class_name, property_name)?
            .annotations
            .iter()
            .find(|a| &a.kind() == kind)
    }

    /// The class declaring a property.
    #[must_use]
    pub fn get_property_declaring_class(&self, class_name: &str, property_name: &str) -> Option<&str> {
        self.property_record(class_name, property_name)
            .map(|p| p.declaring_class.as_str())
    }
}

fn qualify_return_type(return_type: &str) -> String {
    let qualify = |t: &str| -> String {
        let t = t.trim();
        if NON_CLASS_RETURN_TYPES.contains(&t) || is_simple_type(t) || t.starts_with('\\') {
            t.to_string()
        } else {
            format!("\\{t}")
        }
    };
    if return_type.contains('|') {
        return return_type.split('|').map(qualify).collect::<Vec<_>>().join("|");
    }
    if return_type.contains('&') {
        return return_type.split('&').map(qualify).collect::<Vec<_>>().join("&");
    }
    match return_type.strip_prefix('?') {
        Some(inner) => format!("?{}", qualify(inner)),
        None => qualify(return_type),
    }
}

fn log_doc_comment_hints(method: &MethodDefinition, record: &ParameterRecord, param_tags: &[String]) {
    let Some(tag) = param_tags.get(record.position) else {
        debug!("  Missing @param for \"{}::${}\"", method.name, record.name);
        return;
    };
    let parts: Vec<&str> = tag.splitn(3, ' ').collect();
    if parts.len() < 2 {
        debug!("  Wrong @param use for \"{}::{}\": \"{tag}\"", method.name, record.name);
        return;
    }
    if record.parameter_type != clean_class_name(parts[0]) {
        debug!(
            "  Wrong type in @param for \"{}::{}\": \"{}\"",
            method.name, record.name, parts[0]
        );
    }
    if parts[1].trim_start_matches(['$', '&']) != record.name {
        debug!(
            "  Wrong name in @param for \"{}::${}\": \"{}\"",
            method.name, record.name, parts[1]
        );
    }
}
