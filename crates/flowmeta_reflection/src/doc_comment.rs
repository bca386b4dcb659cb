//! Doc comment parsing.
//!
//! A doc comment is split into a free-text description and a set of tags.
//! Description lines are those seen before the first tag; every line
//! containing `* @` starts a tag. Namespaced annotations such as
//! `@ORM\Column(type="text")` are stored under their lowercased short name
//! (`column`) with the parenthesized argument string as value.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static NAMESPACED_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@[A-Za-z0-9\\]+\\([A-Za-z0-9]+)(?:\((.*)\))?$").expect("static tag pattern")
});

static DESCRIPTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*/?[\\*]*\s?(.*)$").expect("static description pattern"));

/// Tags in first-seen order, each with its values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagMap {
    entries: Vec<(String, Vec<String>)>,
}

impl TagMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tag without adding a value.
    pub fn touch(&mut self, tag: &str) {
        if !self.contains(tag) {
            self.entries.push((tag.to_string(), Vec::new()));
        }
    }

    /// Appends a value to a tag.
    pub fn push(&mut self, tag: &str, value: String) {
        match self.entries.iter_mut().find(|(name, _)| name == tag) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((tag.to_string(), vec![value])),
        }
    }

    /// Returns the values of a tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, values)| values.as_slice())
    }

    /// Returns true if the tag is present.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == tag)
    }

    /// Removes a tag.
    pub fn remove(&mut self, tag: &str) {
        self.entries.retain(|(name, _)| name != tag);
    }

    /// Replaces the values of a tag.
    pub fn set(&mut self, tag: &str, values: Vec<String>) {
        match self.entries.iter_mut().find(|(name, _)| name == tag) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((tag.to_string(), values)),
        }
    }

    /// Iterates over tags in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Tag names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Number of distinct tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no tags were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The result of parsing one doc comment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Free text before the first tag, trimmed.
    pub description: String,
    /// Tags with their values.
    pub tags: TagMap,
}

impl DocComment {
    /// Parses a raw doc comment.
    #[must_use]
    pub fn parse(doc_comment: &str) -> Self {
        let mut description = String::new();
        let mut tags = TagMap::new();

        for raw_line in doc_comment.split('\n') {
            let line = raw_line.trim_end_matches('\r');
            if line.trim() == "*/" {
                break;
            }
            let line = line.trim_end().strip_suffix("*/").unwrap_or(line);
            if line.contains("* @") || line.trim_start().starts_with('@') {
                if let Some(at) = line.find('@') {
                    parse_tag(&line[at..], &mut tags);
                }
            } else if tags.is_empty() {
                if let Some(captures) = DESCRIPTION_LINE.captures(line) {
                    description.push_str(&captures[1]);
                }
                description.push('\n');
            }
        }

        Self {
            description: description.trim().to_string(),
            tags,
        }
    }

    /// Values of a tag, empty if absent.
    #[must_use]
    pub fn tag_values(&self, tag: &str) -> &[String] {
        self.tags.get(tag).unwrap_or(&[])
    }

    /// Returns true if the tag is present.
    #[must_use]
    pub fn is_tagged_with(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

fn parse_tag(line: &str, tags: &mut TagMap) {
    let line = line.trim_end();
    let (tag, value) = if let Some(captures) = NAMESPACED_TAG.captures(line) {
        (
            captures[1].to_string(),
            captures.get(2).map(|m| m.as_str().to_string()),
        )
    } else {
        let mut parts = line.splitn(2, char::is_whitespace);
        let tag = parts.next().unwrap_or_default().to_string();
        (tag, parts.next().map(str::to_string))
    };

    let tag = tag.trim_matches('@').to_lowercase();
    if tag.is_empty() {
        return;
    }
    match value {
        Some(value) => tags.push(&tag, value.trim_matches([' ', '"']).to_string()),
        None => tags.touch(&tag),
    }
}
