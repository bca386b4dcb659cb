//! flowmeta - Class reflection and ORM mapping metadata for domain models
//!
//! This crate re-exports all layers of the flowmeta system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: flowmeta_orm        - Annotation driver, class metadata, naming
//! Layer 1: flowmeta_reflection - Reflection service, class schemata, caches
//! Layer 0: flowmeta_foundation - Annotations, type strings, errors, settings
//! ```

pub use flowmeta_foundation as foundation;
pub use flowmeta_orm as orm;
pub use flowmeta_reflection as reflection;
