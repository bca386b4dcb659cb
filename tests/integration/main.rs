//! End-to-end tests across all layers
//!
//! Settings drive a reflection build, reflection data goes through the
//! caches and the ORM layer maps what a frozen service reports.

mod pipeline;
