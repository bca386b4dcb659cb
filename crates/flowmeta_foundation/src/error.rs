//! Error types for the flowmeta system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

/// The main error type for flowmeta operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Pushes a frame onto the context stack, creating the context if needed.
    #[must_use]
    pub fn while_doing(mut self, frame: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(ErrorContext::new)
            .stack
            .push(frame.into());
        self
    }

    /// Creates an error for a class that could not be loaded.
    #[must_use]
    pub fn class_loading_failed(class_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClassLoadingFailed {
            class_name: class_name.into(),
            reason: reason.into(),
        })
    }

    /// Creates an error for a name that is not of the required kind.
    #[must_use]
    pub fn invalid_target(name: impl Into<String>, expected: TargetKind) -> Self {
        Self::new(ErrorKind::InvalidTarget {
            name: name.into(),
            expected,
        })
    }

    /// Creates a class schema constraint violation.
    #[must_use]
    pub fn schema_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaConstraintViolation(message.into()))
    }

    /// Creates an invalid value object error.
    #[must_use]
    pub fn invalid_value_object(class_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidValueObject {
            class_name: class_name.into(),
            reason: reason.into(),
        })
    }

    /// Creates an invalid type string error.
    #[must_use]
    pub fn invalid_type(type_string: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidType {
            type_string: type_string.into(),
            reason: reason.into(),
        })
    }

    /// Creates an ORM mapping error.
    #[must_use]
    pub fn mapping(error: MappingError) -> Self {
        Self::new(ErrorKind::Mapping(error))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }

    /// Returns true if this is a class loading failure.
    #[must_use]
    pub fn is_class_loading_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::ClassLoadingFailed { .. })
    }
}

/// What a name was expected to denote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// An interface.
    Interface,
    /// A class or interface.
    Class,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interface => write!(f, "interface"),
            Self::Class => write!(f, "class"),
        }
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// The class source could not provide a class that reflection needs.
    #[error("could not load class \"{class_name}\" for reflection: {reason}")]
    ClassLoadingFailed {
        /// The class that was requested.
        class_name: String,
        /// Why loading failed.
        reason: String,
    },

    /// The class must not be reflected (generated proxy classes).
    #[error("the class \"{class_name}\" cannot be reflected: {reason}")]
    InvalidClass {
        /// The refused class.
        class_name: String,
        /// Why it was refused.
        reason: String,
    },

    /// A lookup required an interface or class but got something else.
    #[error("\"{name}\" does not exist or is not an {expected}")]
    InvalidTarget {
        /// The name that was passed in.
        name: String,
        /// The required kind.
        expected: TargetKind,
    },

    /// A class schema invariant was violated.
    #[error("class schema constraint violation: {0}")]
    SchemaConstraintViolation(String),

    /// A class annotated as value object does not meet the requirements.
    #[error("the value object \"{class_name}\" is invalid: {reason}")]
    InvalidValueObject {
        /// The offending class.
        class_name: String,
        /// Which requirement is not met.
        reason: String,
    },

    /// A property's declared type is malformed.
    #[error("the @var annotation for \"{class_name}::${property}\" is invalid: {reason}")]
    InvalidPropertyType {
        /// The class declaring the property.
        class_name: String,
        /// The property name.
        property: String,
        /// What is wrong with the type.
        reason: String,
    },

    /// A type string does not follow the type grammar.
    #[error("invalid type \"{type_string}\": {reason}")]
    InvalidType {
        /// The rejected type string.
        type_string: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Entities and value objects must be prototypes.
    #[error(
        "classes tagged as entity or value object must be of scope prototype, however \"{class_name}\" is declared as {scope}"
    )]
    InvalidScope {
        /// The offending class.
        class_name: String,
        /// The declared scope.
        scope: String,
    },

    /// The ORM mapping configuration is invalid.
    #[error("mapping error: {0}")]
    Mapping(MappingError),

    /// An aggregate root descends from a concrete non-root entity.
    #[error(
        "In a class hierarchy of entities either all or no classes must be an aggregate root, \"{class_name}\" is one but the parent class \"{parent_class_name}\" is not. You probably want to add a repository for \"{parent_class_name}\" or remove the Entity annotation."
    )]
    AggregateRootInheritance {
        /// The aggregate root class.
        class_name: String,
        /// The concrete parent that is not an aggregate root.
        parent_class_name: String,
    },

    /// Reflection was attempted while the reflection data is frozen.
    #[error("cannot reflect \"{0}\": reflection data is frozen")]
    ReflectionFrozen(String),

    /// Settings could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A cache blob could not be encoded or decoded.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// A frozen cache was asked to change.
    #[error("cannot modify entry \"{0}\": the cache is frozen")]
    CacheFrozen(String),

    /// A cache entry identifier contains invalid characters.
    #[error("invalid cache entry identifier \"{0}\"")]
    InvalidCacheIdentifier(String),

    /// Cache storage I/O failed.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Errors raised while turning annotations into ORM metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The class is neither entity, value object, embeddable nor mapped superclass.
    NotAnEntity {
        /// The class being mapped.
        class_name: String,
    },
    /// No class schema exists for a class that needs one.
    ClassSchemaNotFound {
        /// The class without schema.
        class_name: String,
        /// The class and property that caused the lookup, if any.
        while_examining: Option<String>,
    },
    /// A property carries more than one association annotation.
    ConflictingAssociations {
        /// The class being mapped.
        class_name: String,
        /// The property name.
        property: String,
    },
    /// A property has no usable type declaration.
    MissingTypeDeclaration {
        /// The class being mapped.
        class_name: String,
        /// The property name.
        property: String,
        /// The declared type, if any.
        declared_type: String,
    },
    /// A class-typed property carries no association annotation.
    AmbiguousReference {
        /// The class being mapped.
        class_name: String,
        /// The property name.
        property: String,
        /// The referenced class.
        target_class: String,
    },
    /// A fetch mode outside LAZY, EAGER, `EXTRA_LAZY`.
    InvalidFetchMode {
        /// The class being mapped.
        class_name: String,
        /// The rejected mode.
        mode: String,
    },
    /// Unknown inheritance type name.
    InvalidInheritanceType {
        /// The class being mapped.
        class_name: String,
        /// The rejected value.
        value: String,
    },
    /// Unknown change tracking policy name.
    InvalidChangeTrackingPolicy {
        /// The class being mapped.
        class_name: String,
        /// The rejected value.
        value: String,
    },
    /// Unknown id generator strategy.
    InvalidGeneratorStrategy {
        /// The class being mapped.
        class_name: String,
        /// The rejected value.
        value: String,
    },
    /// Table generators are not supported.
    TableGeneratorNotImplemented {
        /// The class being mapped.
        class_name: String,
    },
    /// A to-one join cannot be derived for a target with several identifiers.
    CompositeJoinColumn {
        /// The class being mapped.
        class_name: String,
        /// The property name.
        property: String,
        /// The class whose identity was examined.
        identity_class: String,
        /// How many identity properties it has.
        identity_count: usize,
    },
    /// An entity listener class does not exist.
    EntityListenerNotFound {
        /// The listener class.
        listener_class: String,
        /// The class being mapped.
        class_name: String,
    },
    /// A metadata invariant was violated.
    InvalidMapping {
        /// The class being mapped.
        class_name: String,
        /// What is wrong.
        message: String,
    },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnEntity { class_name } => {
                write!(f, "class \"{class_name}\" is not a valid entity or mapped super class")
            }
            Self::ClassSchemaNotFound {
                class_name,
                while_examining,
            } => {
                write!(f, "no class schema found for \"{class_name}\"")?;
                if let Some(examined) = while_examining {
                    write!(f, " (while examining {examined})")?;
                }
                Ok(())
            }
            Self::ConflictingAssociations {
                class_name,
                property,
            } => write!(
                f,
                "property \"{property}\" of class \"{class_name}\" has more than one association annotation"
            ),
            Self::MissingTypeDeclaration {
                class_name,
                property,
                declared_type,
            } => write!(
                f,
                "the property \"{property}\" in class \"{class_name}\" is missing a valid type declaration (\"{declared_type}\")"
            ),
            Self::AmbiguousReference {
                class_name,
                property,
                target_class,
            } => write!(
                f,
                "the property \"{property}\" in class \"{class_name}\" refers to \"{target_class}\" without an association annotation"
            ),
            Self::InvalidFetchMode { class_name, mode } => {
                write!(f, "entity \"{class_name}\" has an invalid fetch mode \"{mode}\"")
            }
            Self::InvalidInheritanceType { class_name, value } => {
                write!(f, "entity \"{class_name}\" has an invalid inheritance type \"{value}\"")
            }
            Self::InvalidChangeTrackingPolicy { class_name, value } => write!(
                f,
                "entity \"{class_name}\" has an invalid change tracking policy \"{value}\""
            ),
            Self::InvalidGeneratorStrategy { class_name, value } => write!(
                f,
                "entity \"{class_name}\" has an invalid id generator strategy \"{value}\""
            ),
            Self::TableGeneratorNotImplemented { class_name } => {
                write!(f, "table id generator is not implemented (used in \"{class_name}\")")
            }
            Self::CompositeJoinColumn {
                class_name,
                property,
                identity_class,
                identity_count,
            } => write!(
                f,
                "cannot derive a join column for \"{class_name}::{property}\": \"{identity_class}\" has {identity_count} identity properties"
            ),
            Self::EntityListenerNotFound {
                listener_class,
                class_name,
            } => write!(
                f,
                "entity listener \"{listener_class}\" declared on \"{class_name}\" not found"
            ),
            Self::InvalidMapping {
                class_name,
                message,
            } => write!(f, "invalid mapping for \"{class_name}\": {message}"),
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The class being processed.
    pub class_name: Option<String>,
    /// The property or method being processed.
    pub member: Option<String>,
    /// Frames describing what was in progress, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the class being processed.
    #[must_use]
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    /// Sets the member being processed.
    #[must_use]
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }

    /// Adds a frame to the stack.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.class_name, &self.member) {
            (Some(class), Some(member)) => write!(f, "{class}::{member}")?,
            (Some(class), None) => write!(f, "{class}")?,
            (None, Some(member)) => write!(f, "{member}")?,
            (None, None) => {}
        }
        for frame in &self.stack {
            write!(f, "\n  {frame}")?;
        }
        Ok(())
    }
}

/// Result type alias for flowmeta operations.
pub type Result<T> = std::result::Result<T, Error>;
