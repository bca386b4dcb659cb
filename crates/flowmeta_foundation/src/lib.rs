//! flowmeta Foundation
//!
//! Shared vocabulary for the flowmeta layers:
//! - [`Error`] and [`ErrorKind`] covering reflection, schema and mapping failures
//! - [`Annotation`] and [`AnnotationKind`], the closed set of recognized annotations
//! - type string parsing and normalization
//! - [`Literal`] values for parameter defaults and class constants
//! - class name helpers and well-known names
//! - [`Settings`] loaded from TOML

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod annotation;
pub mod error;
pub mod literal;
pub mod names;
pub mod settings;
pub mod types;

pub use annotation::{
    Annotation, AnnotationKind, AssociationAnnotation, AssociationOverrideAnnotation,
    AttributeOverrideAnnotation, CacheAnnotation, ColumnAnnotation, DiscriminatorColumnAnnotation,
    EntityAnnotation, IndexAnnotation, JoinColumnAnnotation, JoinTableAnnotation, LifecycleEvent,
    NamedNativeQueryAnnotation, NamedQueryAnnotation, SequenceGeneratorAnnotation,
    TableAnnotation,
};
pub use error::{Error, ErrorContext, ErrorKind, MappingError, Result, TargetKind};
pub use literal::Literal;
pub use names::{cache_identifier, clean_class_name};
pub use settings::{ApplicationContext, PersistenceSettings, ReflectionSettings, Settings};
pub use types::{ParsedType, parse_type};
