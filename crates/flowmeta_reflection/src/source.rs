//! Class definitions and the sources that provide them.
//!
//! Reflection never inspects code directly. It asks a [`ClassSource`] for
//! [`ClassDefinition`]s and an [`AnnotationReader`] for the annotations
//! attached to classes, properties and methods.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use flowmeta_foundation::{Annotation, Literal, clean_class_name};
use serde::{Deserialize, Serialize};

/// Member visibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Visible everywhere.
    #[default]
    Public,
    /// Visible to the class and its descendants.
    Protected,
    /// Visible to the declaring class only.
    Private,
}

/// A method parameter as declared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterDefinition {
    /// Parameter name without `$`.
    pub name: String,
    /// Native type hint.
    pub type_hint: Option<String>,
    /// Whether the hint is nullable or the default is null.
    pub allows_null: bool,
    /// Passed by reference.
    pub by_reference: bool,
    /// Default value; parameters with one are optional.
    pub default_value: Option<Literal>,
}

impl ParameterDefinition {
    /// Creates an untyped, required parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the native type hint.
    #[must_use]
    pub fn typed(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    /// Makes the parameter optional with the given default.
    #[must_use]
    pub fn with_default(mut self, value: Literal) -> Self {
        if value.is_null() {
            self.allows_null = true;
        }
        self.default_value = Some(value);
        self
    }

    /// Allows null.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.allows_null = true;
        self
    }

    /// Passes by reference.
    #[must_use]
    pub fn by_reference(mut self) -> Self {
        self.by_reference = true;
        self
    }
}

/// A property as declared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyDefinition {
    /// Property name without `$`.
    pub name: String,
    /// Visibility.
    pub visibility: Visibility,
    /// Native type hint.
    pub type_hint: Option<String>,
    /// Raw doc comment.
    pub doc_comment: String,
    /// Annotations attached to the property.
    pub annotations: Vec<Annotation>,
}

impl PropertyDefinition {
    /// Creates a protected property.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Protected,
            ..Self::default()
        }
    }

    /// Adds a `@var` tag with the given type to the doc comment.
    #[must_use]
    pub fn typed(mut self, var_type: &str) -> Self {
        self.doc_comment = append_doc_line(&self.doc_comment, &format!("@var {var_type}"));
        self
    }

    /// Appends a line to the doc comment.
    #[must_use]
    pub fn doc_line(mut self, line: &str) -> Self {
        self.doc_comment = append_doc_line(&self.doc_comment, line);
        self
    }

    /// Sets the native type hint.
    #[must_use]
    pub fn type_hint(mut self, type_hint: impl Into<String>) -> Self {
        self.type_hint = Some(type_hint.into());
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Attaches an annotation.
    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A method as declared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MethodDefinition {
    /// Method name.
    pub name: String,
    /// Visibility.
    pub visibility: Visibility,
    /// Declared final.
    pub is_final: bool,
    /// Declared static.
    pub is_static: bool,
    /// Declared abstract.
    pub is_abstract: bool,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterDefinition>,
    /// Native return type.
    pub return_type: Option<String>,
    /// Raw doc comment.
    pub doc_comment: String,
    /// Annotations attached to the method.
    pub annotations: Vec<Annotation>,
}

impl MethodDefinition {
    /// Creates a public method.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a parameter.
    #[must_use]
    pub fn parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Sets the native return type.
    #[must_use]
    pub fn returns(mut self, return_type: impl Into<String>) -> Self {
        self.return_type = Some(return_type.into());
        self
    }

    /// Sets the visibility.
    #[must_use]
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Marks the method final.
    #[must_use]
    pub fn make_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Marks the method static.
    #[must_use]
    pub fn make_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Appends a line to the doc comment.
    #[must_use]
    pub fn doc_line(mut self, line: &str) -> Self {
        self.doc_comment = append_doc_line(&self.doc_comment, line);
        self
    }

    /// Attaches an annotation.
    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// A class or interface as declared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClassDefinition {
    /// Fully qualified name.
    pub name: String,
    /// Declared as interface.
    pub is_interface: bool,
    /// Declared abstract.
    pub is_abstract: bool,
    /// Declared final.
    pub is_final: bool,
    /// Parent class.
    pub parent: Option<String>,
    /// Implemented interfaces (or extended interfaces, for an interface).
    pub interfaces: Vec<String>,
    /// Raw doc comment.
    pub doc_comment: String,
    /// Annotations attached to the class.
    pub annotations: Vec<Annotation>,
    /// Properties declared by this class.
    pub properties: Vec<PropertyDefinition>,
    /// Methods declared by this class.
    pub methods: Vec<MethodDefinition>,
    /// Class constants.
    pub constants: BTreeMap<String, Literal>,
    /// `use` imports: lowercased alias to fully qualified name.
    pub use_statements: BTreeMap<String, String>,
}

impl ClassDefinition {
    /// Creates a concrete class.
    #[must_use]
    pub fn class(name: &str) -> Self {
        Self {
            name: clean_class_name(name).to_string(),
            ..Self::default()
        }
    }

    /// Creates an interface.
    #[must_use]
    pub fn interface(name: &str) -> Self {
        Self {
            name: clean_class_name(name).to_string(),
            is_interface: true,
            ..Self::default()
        }
    }

    /// Sets the parent class.
    #[must_use]
    pub fn extends(mut self, parent: &str) -> Self {
        self.parent = Some(clean_class_name(parent).to_string());
        self
    }

    /// Adds an implemented (or extended) interface.
    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(clean_class_name(interface).to_string());
        self
    }

    /// Marks the class abstract.
    #[must_use]
    pub fn make_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Marks the class final.
    #[must_use]
    pub fn make_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Appends a line to the class doc comment.
    #[must_use]
    pub fn doc_line(mut self, line: &str) -> Self {
        self.doc_comment = append_doc_line(&self.doc_comment, line);
        self
    }

    /// Attaches an annotation.
    #[must_use]
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    /// Adds a method.
    #[must_use]
    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds a constant.
    #[must_use]
    pub fn constant(mut self, name: &str, value: Literal) -> Self {
        self.constants.insert(name.to_string(), value);
        self
    }

    /// Adds a `use` import; the alias defaults to the short name.
    #[must_use]
    pub fn uses(mut self, fully_qualified: &str, alias: Option<&str>) -> Self {
        let fully_qualified = clean_class_name(fully_qualified);
        let alias = alias.unwrap_or_else(|| flowmeta_foundation::names::short_name(fully_qualified));
        self.use_statements
            .insert(alias.to_lowercase(), fully_qualified.to_string());
        self
    }

    /// Namespace of the class.
    #[must_use]
    pub fn namespace(&self) -> &str {
        flowmeta_foundation::names::namespace_of(&self.name)
    }

    /// Finds a declared property.
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Finds a declared method.
    #[must_use]
    pub fn find_method(&self, name: &str) -> Option<&MethodDefinition> {
        self.methods.iter().find(|m| m.name == name)
    }
}

fn append_doc_line(doc_comment: &str, line: &str) -> String {
    let mut lines: Vec<&str> = doc_comment
        .lines()
        .filter(|l| {
            let t = l.trim();
            t != "/**" && t != "*/"
        })
        .collect();
    let new_line = format!(" * {line}");
    lines.push(&new_line);
    let mut doc = String::from("/**\n");
    for l in lines {
        let _ = writeln!(doc, "{l}");
    }
    doc.push_str(" */");
    doc
}

/// Provides class definitions by name.
pub trait ClassSource: Send + Sync {
    /// Looks up a class or interface.
    fn find_class(&self, name: &str) -> Option<Arc<ClassDefinition>>;

    /// All known class and interface names.
    fn class_names(&self) -> Vec<String>;

    /// True if a (non-interface) class of that name exists.
    fn class_exists(&self, name: &str) -> bool {
        self.find_class(name).is_some_and(|c| !c.is_interface)
    }

    /// True if an interface of that name exists.
    fn interface_exists(&self, name: &str) -> bool {
        self.find_class(name).is_some_and(|c| c.is_interface)
    }
}

/// An in-memory class source.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    classes: BTreeMap<String, Arc<ClassDefinition>>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, builder style.
    #[must_use]
    pub fn with(mut self, definition: ClassDefinition) -> Self {
        self.register(definition);
        self
    }

    /// Adds or replaces a definition.
    pub fn register(&mut self, definition: ClassDefinition) {
        self.classes
            .insert(definition.name.clone(), Arc::new(definition));
    }

    /// Removes a definition.
    pub fn remove(&mut self, name: &str) -> Option<Arc<ClassDefinition>> {
        self.classes.remove(clean_class_name(name))
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassSource for ClassRegistry {
    fn find_class(&self, name: &str) -> Option<Arc<ClassDefinition>> {
        self.classes.get(clean_class_name(name)).cloned()
    }

    fn class_names(&self) -> Vec<String> {
        self.classes.keys().cloned().collect()
    }
}

/// Provides the annotations attached to classes and members.
pub trait AnnotationReader: Send + Sync {
    /// Annotations of a class.
    fn class_annotations(&self, class: &ClassDefinition) -> Vec<Annotation>;

    /// Annotations of a property.
    fn property_annotations(
        &self,
        class: &ClassDefinition,
        property: &PropertyDefinition,
    ) -> Vec<Annotation>;

    /// Annotations of a method.
    fn method_annotations(
        &self,
        class: &ClassDefinition,
        method: &MethodDefinition,
    ) -> Vec<Annotation>;
}

/// Reads the annotations recorded on the definitions themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclaredAnnotationReader;

impl AnnotationReader for DeclaredAnnotationReader {
    fn class_annotations(&self, class: &ClassDefinition) -> Vec<Annotation> {
        class.annotations.clone()
    }

    fn property_annotations(
        &self,
        _class: &ClassDefinition,
        property: &PropertyDefinition,
    ) -> Vec<Annotation> {
        property.annotations.clone()
    }

    fn method_annotations(
        &self,
        _class: &ClassDefinition,
        method: &MethodDefinition,
    ) -> Vec<Annotation> {
        method.annotations.clone()
    }
}
