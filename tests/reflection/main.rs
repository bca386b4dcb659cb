//! Integration tests for Layer 1: Reflection
//!
//! Tests for reflected class records, hierarchy queries and class schemata.

mod doc_comments;
mod hierarchy;
mod schemata;
