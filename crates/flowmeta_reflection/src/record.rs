//! Reflection records: what the reflection store remembers about a class.
//!
//! Records are plain serializable values. They are built once per class by
//! the reflection service and read by every lookup afterwards.

use std::collections::BTreeSet;

use flowmeta_foundation::{Annotation, AnnotationKind, Literal};
use serde::{Deserialize, Serialize};

use crate::doc_comment::TagMap;
use crate::source::Visibility;

/// A reflected method parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    /// Parameter name.
    pub name: String,
    /// Zero-based position.
    pub position: usize,
    /// Has a default value.
    pub optional: bool,
    /// Accepts null.
    pub allows_null: bool,
    /// Passed by reference.
    pub by_reference: bool,
    /// Type-hinted as `array`.
    pub is_array: bool,
    /// Type-hinted class.
    pub class: Option<String>,
    /// Default value, for optional parameters.
    pub default_value: Option<Literal>,
    /// Resolved type; `mixed` when nothing is known.
    pub parameter_type: String,
    /// The type comes from a scalar type declaration.
    pub scalar_declaration: bool,
}

/// A reflected property.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Property name.
    pub name: String,
    /// Class that declares the property.
    pub declaring_class: String,
    /// Visibility.
    pub visibility: Visibility,
    /// Native type hint, without nullable marker.
    pub declared_type: Option<String>,
    /// Doc tags, minus ignored tags; `var` values are type-expanded.
    pub tags: TagMap,
    /// Annotations in declaration order.
    pub annotations: Vec<Annotation>,
}

impl PropertyRecord {
    /// Returns true if the property is private.
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.visibility == Visibility::Private
    }

    /// Returns true if an annotation of that kind is present.
    #[must_use]
    pub fn is_annotated_with(&self, kind: &AnnotationKind) -> bool {
        self.annotations.iter().any(|a| &a.kind() == kind)
    }

    /// Annotations of one kind.
    pub fn annotations_of<'a>(
        &'a self,
        kind: &'a AnnotationKind,
    ) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.annotations.iter().filter(move |a| &a.kind() == kind)
    }
}

/// A reflected method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodRecord {
    /// Method name.
    pub name: String,
    /// Class that declares the method.
    pub declaring_class: String,
    /// Visibility.
    pub visibility: Visibility,
    /// Declared final.
    pub is_final: bool,
    /// Declared static.
    pub is_static: bool,
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterRecord>,
    /// Native return type.
    pub declared_return_type: Option<String>,
    /// Doc tags, minus ignored tags.
    pub tags: TagMap,
    /// Annotations in declaration order.
    pub annotations: Vec<Annotation>,
}

impl MethodRecord {
    /// Returns true if an annotation of that kind is present.
    #[must_use]
    pub fn is_annotated_with(&self, kind: &AnnotationKind) -> bool {
        self.annotations.iter().any(|a| &a.kind() == kind)
    }

    /// Returns true for public methods.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// Everything reflection knows about one class or interface.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassRecord {
    /// Fully qualified name.
    pub name: String,
    /// Abstract classes and interfaces.
    pub is_abstract: bool,
    /// Declared final.
    pub is_final: bool,
    /// Is an interface.
    pub is_interface: bool,
    /// Parent class.
    pub parent: Option<String>,
    /// All implemented interfaces, including inherited ones.
    pub interfaces: BTreeSet<String>,
    /// All reflected descendants.
    pub subclasses: BTreeSet<String>,
    /// For interfaces: concrete implementations.
    pub implementations: BTreeSet<String>,
    /// Class doc tags, minus ignored tags.
    pub tags: TagMap,
    /// Class annotations.
    pub annotations: Vec<Annotation>,
    /// Own properties followed by inherited non-private ones.
    pub properties: Vec<PropertyRecord>,
    /// Own methods followed by inherited non-private ones.
    pub methods: Vec<MethodRecord>,
    /// Class constants, including inherited ones.
    pub constants: Vec<(String, Literal)>,
}

impl ClassRecord {
    /// Finds a property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Finds a method.
    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodRecord> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Finds a constant.
    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&Literal> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns true if an annotation of that kind is present.
    #[must_use]
    pub fn is_annotated_with(&self, kind: &AnnotationKind) -> bool {
        self.annotations.iter().any(|a| &a.kind() == kind)
    }
}
