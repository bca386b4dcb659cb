//! ORM mapping metadata for flowmeta.
//!
//! This crate provides:
//! - [`AnnotationDriver`] - Reads mapping metadata from reflected annotations
//! - [`MetadataFactory`] - Loads metadata with inheritance from mapped ancestors
//! - [`ClassMetadata`] - Tables, fields, associations and callbacks of one class
//! - [`IdentifierNaming`] - Table and column names within the identifier limit

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod driver;
pub mod factory;
pub mod mapping;
pub mod metadata;
pub mod naming;

pub use driver::AnnotationDriver;
pub use factory::MetadataFactory;
pub use mapping::{
    AssociationKind, AssociationMapping, AssociationOverride, CacheConfig, CacheUsage,
    ChangeTrackingPolicy, DiscriminatorColumn, EmbeddedMapping, EntityListener, FetchMode,
    FieldMapping, GeneratorType, InheritanceType, JoinColumn, JoinTable, NamedNativeQuery,
    NamedQuery, SequenceGeneratorDefinition, TableDescriptor, TableIndex,
};
pub use metadata::ClassMetadata;
pub use naming::{IdentifierNaming, discriminator_value};
