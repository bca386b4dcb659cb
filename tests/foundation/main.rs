//! Integration tests for Layer 0: Foundation
//!
//! Tests for the shared vocabulary: annotations, type strings, class names,
//! errors and settings.

mod annotations;
mod errors;
mod names;
mod settings;
mod types;
