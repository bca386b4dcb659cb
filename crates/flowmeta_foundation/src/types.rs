//! Type strings as written in `@var` and `@param` tags.
//!
//! A type string is a scalar name, `DateTime`, a collection name or a class
//! name, optionally followed by an element type in angle brackets
//! (`array<Acme\Foo>`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static TYPE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\\?(?P<type>integer|int|float|double|boolean|bool|string|DateTime|[A-Z][a-zA-Z0-9\\]+|object|resource|array|ArrayObject|SplObjectStorage|Doctrine\\Common\\Collections\\Collection|Doctrine\\Common\\Collections\\ArrayCollection)(?:<\\?(?P<element_type>[a-zA-Z0-9\\]+)>)?",
    )
    .expect("static type pattern")
});

const LITERAL_TYPES: &[&str] = &[
    "integer", "int", "float", "double", "boolean", "bool", "string",
];

const COLLECTION_TYPES: &[&str] = &[
    "array",
    "ArrayObject",
    "SplObjectStorage",
    "Doctrine\\Common\\Collections\\Collection",
    "Doctrine\\Common\\Collections\\ArrayCollection",
];

/// A parsed type string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParsedType {
    /// The normalized main type.
    pub type_name: String,
    /// The normalized element type of a collection.
    pub element_type: Option<String>,
}

impl ParsedType {
    /// Returns true if the main type is a collection type.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        is_collection_type(&self.type_name)
    }
}

impl fmt::Display for ParsedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element_type {
            Some(element) => write!(f, "{}<{element}>", self.type_name),
            None => write!(f, "{}", self.type_name),
        }
    }
}

/// Parses a type string into main and element type.
///
/// # Errors
///
/// Returns an error when the string does not start with a known type or when
/// an element type is attached to a non-collection type.
pub fn parse_type(type_string: &str) -> Result<ParsedType> {
    let captures = TYPE_PATTERN.captures(type_string).ok_or_else(|| {
        Error::invalid_type(type_string, "the type does not exist")
    })?;
    let type_name = normalize_type(&captures["type"]).to_string();
    let element_type = match captures.name("element_type") {
        Some(element) => {
            if !is_collection_type(&type_name) {
                return Err(Error::invalid_type(
                    type_string,
                    format!("type \"{type_name}\" must not have an element type hint"),
                ));
            }
            Some(normalize_type(element.as_str()).to_string())
        }
        None => None,
    };
    Ok(ParsedType {
        type_name,
        element_type,
    })
}

/// Maps short scalar aliases to their canonical names.
#[must_use]
pub fn normalize_type(type_name: &str) -> &str {
    match type_name {
        "int" => "integer",
        "bool" => "boolean",
        "double" => "float",
        other => other,
    }
}

/// Scalar types: integer, float, boolean, string and their aliases.
#[must_use]
pub fn is_literal_type(type_name: &str) -> bool {
    LITERAL_TYPES.contains(&type_name)
}

/// Literal types plus `array`.
#[must_use]
pub fn is_simple_type(type_name: &str) -> bool {
    is_literal_type(type_name) || type_name == "array"
}

/// Types that may carry an element type.
#[must_use]
pub fn is_collection_type(type_name: &str) -> bool {
    COLLECTION_TYPES.contains(&type_name)
}

/// Removes a nullable marker (`?Foo`, `Foo|null`, `null|Foo`).
#[must_use]
pub fn strip_nullable(type_string: &str) -> &str {
    let trimmed = type_string.trim();
    if let Some(rest) = trimmed.strip_prefix('?') {
        return rest;
    }
    if let Some(rest) = trimmed.strip_suffix("|null") {
        return rest;
    }
    trimmed.strip_prefix("null|").unwrap_or(trimmed)
}
