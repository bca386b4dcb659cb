//! Table, join table and column names derived from class names.
//!
//! Identifiers longer than the database limit are cut and suffixed with
//! `_` and the first five hex digits of a SHA-1 hash, so distinct long
//! names stay distinct.

use std::sync::LazyLock;

use flowmeta_foundation::clean_class_name;
use regex::Regex;
use sha1::{Digest, Sha1};

static DOMAIN_MODEL_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<package>\w+(?:\\\w+)*)\\Domain\\Model\\(?P<prefix>(?:\w+\\)?)(?P<model>\w+)$",
    )
    .expect("static domain model pattern")
});

const HASH_LENGTH: usize = 5;

/// Derives database identifiers under a maximum length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdentifierNaming {
    max_length: usize,
}

impl IdentifierNaming {
    /// Uses the given maximum identifier length.
    #[must_use]
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// The maximum identifier length.
    #[must_use]
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Cuts an identifier to `limit` (default: the maximum length), hashing
    /// `hash_source` (default: the identifier) into the suffix.
    #[must_use]
    pub fn truncate_identifier(
        &self,
        identifier: &str,
        limit: Option<usize>,
        hash_source: Option<&str>,
    ) -> String {
        let limit = limit.unwrap_or(self.max_length);
        if identifier.len() <= limit {
            return identifier.to_string();
        }
        let mut cut = limit.saturating_sub(HASH_LENGTH + 1);
        while !identifier.is_char_boundary(cut) {
            cut -= 1;
        }
        let hash = sha1_hex(hash_source.unwrap_or(identifier));
        format!("{}_{}", &identifier[..cut], &hash[..HASH_LENGTH])
    }

    /// `Acme\Blog\Domain\Model\Post` becomes `acme_blog_domain_model_post`.
    #[must_use]
    pub fn infer_table_name(&self, class_name: &str, limit: Option<usize>) -> String {
        let class_name = clean_class_name(class_name);
        self.truncate_identifier(
            &class_name.replace('\\', "_").to_lowercase(),
            limit,
            Some(class_name),
        )
    }

    /// Table joining a class to the targets of one of its properties:
    /// `<table>_<property>_join`.
    #[must_use]
    pub fn infer_join_table_name(&self, class_name: &str, property_name: &str) -> String {
        let suffix = format!("_{}_join", property_name.to_lowercase());
        let mut prefix = self.infer_table_name(class_name, None);
        if prefix.len() + suffix.len() > self.max_length {
            prefix = self.infer_table_name(
                class_name,
                Some(self.max_length.saturating_sub(suffix.len())),
            );
        }
        let name = format!("{prefix}{suffix}");
        if name.len() > self.max_length {
            self.truncate_identifier(&name, None, None)
        } else {
            name
        }
    }

    /// Join column name for a class: the package's last namespace segment
    /// and the model name, e.g. `blog_post` for `Acme\Blog\Domain\Model\Post`.
    #[must_use]
    pub fn join_table_column_name(&self, class_name: &str) -> String {
        let class_name = clean_class_name(class_name);
        let name = if let Some(captures) = DOMAIN_MODEL_CLASS.captures(class_name) {
            let package = captures["package"].rsplit('\\').next().unwrap_or_default();
            let prefix = captures["prefix"].trim_end_matches('\\');
            let mut name = package.to_string();
            if !prefix.is_empty() {
                name.push('_');
                name.push_str(&prefix.replace('\\', "_"));
            }
            name.push('_');
            name.push_str(&captures["model"]);
            name
        } else {
            let parts: Vec<&str> = class_name.split('\\').collect();
            match parts.as_slice() {
                [_, second, .., last_but_one, last] => {
                    format!("{second}_{last_but_one}_{last}")
                }
                [_, second, last] => format!("{second}_{second}_{last}"),
                [first, last] => format!("{last}_{first}_{last}"),
                _ => class_name.to_string(),
            }
        };
        self.truncate_identifier(&name.to_lowercase(), None, None)
    }
}

impl Default for IdentifierNaming {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Discriminator value of a class in a synthesized discriminator map.
#[must_use]
pub fn discriminator_value(class_name: &str) -> String {
    clean_class_name(class_name)
        .replace('\\', "_")
        .replace("Domain_Model_", "")
        .to_lowercase()
}

fn sha1_hex(input: &str) -> String {
    hex::encode(Sha1::digest(input.as_bytes()))
}
