//! Settings for reflection and persistence mapping.
//!
//! Settings are plain serde structs with framework defaults. They can be
//! loaded from TOML or adjusted with the `with_*` builder methods.
//!
//! ```toml
//! context = "Production"
//!
//! [reflection]
//! log_incorrect_doc_comment_hints = true
//!
//! [reflection.ignored_tags]
//! api = true
//! todo = false
//!
//! [persistence]
//! max_identifier_length = 30
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};

const DEFAULT_IGNORED_TAGS: &[&str] = &[
    "api",
    "package",
    "subpackage",
    "license",
    "copyright",
    "author",
    "const",
    "see",
    "todo",
    "scope",
    "fixme",
    "test",
    "expectedexception",
    "expectedexceptionmessage",
    "expectedexceptioncode",
    "depends",
    "dataprovider",
    "group",
    "codecoverageignore",
    "requires",
    "covers",
    "deprecated",
];

/// Application context; selects how reflection caches are loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationContext {
    /// Reflection data is rebuilt incrementally; unchanged packages may be frozen.
    #[default]
    Development,
    /// Reflection data is frozen into the runtime caches and never rebuilt.
    Production,
    /// Like development, used by test suites.
    Testing,
}

impl ApplicationContext {
    /// Returns true for the production context.
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

/// Settings of the reflection layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionSettings {
    /// Doc tags (lowercase) mapped to whether they are ignored.
    pub ignored_tags: BTreeMap<String, bool>,
    /// Log `@param` hints that are missing or disagree with the signature.
    pub log_incorrect_doc_comment_hints: bool,
}

impl Default for ReflectionSettings {
    fn default() -> Self {
        Self {
            ignored_tags: DEFAULT_IGNORED_TAGS
                .iter()
                .map(|tag| ((*tag).to_string(), true))
                .collect(),
            log_incorrect_doc_comment_hints: false,
        }
    }
}

impl ReflectionSettings {
    /// Returns true if the tag is configured as ignored.
    #[must_use]
    pub fn is_tag_ignored(&self, tag: &str) -> bool {
        self.ignored_tags
            .get(&tag.to_lowercase())
            .copied()
            .unwrap_or(false)
    }

    /// Marks a tag as ignored (or not).
    #[must_use]
    pub fn with_ignored_tag(mut self, tag: &str, ignored: bool) -> Self {
        self.ignored_tags.insert(tag.to_lowercase(), ignored);
        self
    }

    /// Enables or disables logging of incorrect `@param` hints.
    #[must_use]
    pub fn with_doc_comment_hint_logging(mut self, enabled: bool) -> Self {
        self.log_incorrect_doc_comment_hints = enabled;
        self
    }
}

/// Settings of the persistence mapping layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceSettings {
    /// Longest identifier the database platform accepts.
    pub max_identifier_length: usize,
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        Self {
            max_identifier_length: 64,
        }
    }
}

impl PersistenceSettings {
    /// Sets the identifier length limit.
    #[must_use]
    pub fn with_max_identifier_length(mut self, length: usize) -> Self {
        self.max_identifier_length = length;
        self
    }
}

/// All settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application context.
    pub context: ApplicationContext,
    /// Reflection settings.
    pub reflection: ReflectionSettings,
    /// Persistence settings.
    pub persistence: PersistenceSettings,
}

impl Settings {
    /// Parses settings from TOML; missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the TOML is malformed.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::new(ErrorKind::Config(e.to_string())))
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::new(ErrorKind::IoError(format!(
                "failed to read {}: {e}",
                path.display()
            )))
        })?;
        Self::from_toml_str(&content)
    }

    /// Sets the application context.
    #[must_use]
    pub fn with_context(mut self, context: ApplicationContext) -> Self {
        self.context = context;
        self
    }

    /// Replaces the reflection settings.
    #[must_use]
    pub fn with_reflection(mut self, reflection: ReflectionSettings) -> Self {
        self.reflection = reflection;
        self
    }

    /// Replaces the persistence settings.
    #[must_use]
    pub fn with_persistence(mut self, persistence: PersistenceSettings) -> Self {
        self.persistence = persistence;
        self
    }
}
