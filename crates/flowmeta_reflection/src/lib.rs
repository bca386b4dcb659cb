//! Class reflection and persistence class schemata for flowmeta.
//!
//! This crate provides:
//! - [`DocComment`] - Description and tag extraction from doc comments
//! - [`ClassSource`] and [`AnnotationReader`] - Where class definitions come from
//! - [`ReflectionService`] - Reflected class records and the queries over them
//! - [`ClassSchema`] and [`ClassSchemaBuilder`] - Entity and value object schemata
//! - [`CacheBackend`] and [`ReflectionCaches`] - Persisting reflection data
//! - [`PackageProvider`] - Packages and their frozen state

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cache;
pub mod doc_comment;
pub mod lifecycle;
pub mod packages;
pub mod record;
pub mod schema;
pub mod schema_builder;
pub mod service;
pub mod source;

pub use cache::{CacheBackend, FileBackend, MemoryBackend, ReflectionCaches};
pub use doc_comment::{DocComment, TagMap};
pub use packages::{PackageInfo, PackageProvider, StaticPackages};
pub use record::{ClassRecord, MethodRecord, ParameterRecord, PropertyRecord};
pub use schema::{ClassSchema, ModelType, SchemaProperty};
pub use schema_builder::ClassSchemaBuilder;
pub use service::{ReflectionData, ReflectionService};
pub use source::{
    AnnotationReader, ClassDefinition, ClassRegistry, ClassSource, DeclaredAnnotationReader,
    MethodDefinition, ParameterDefinition, PropertyDefinition, Visibility,
};
