//! Integration tests for Layer 2: ORM mapping
//!
//! Tests for the annotation driver, the metadata factory and identifier
//! naming, driven through reflected class registries.

mod class_settings;
mod inheritance;
mod naming;
