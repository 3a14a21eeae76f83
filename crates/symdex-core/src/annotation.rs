//! Declarative comment annotations.
//!
//! An annotation is a doc-comment line of the form
//!
//! ```text
//! //namespace:name key=value other=thing
//! ```
//!
//! The default grammar is [`DEFAULT_ANNOTATION_PATTERN`]. The matched text
//! minus the leading `//` is the annotation name, verbatim. Whatever follows
//! the match (after one separating space) is split on spaces into `key=value`
//! parameters.
//!
//! # Usage
//!
//! ```
//! use symdex_core::annotation::AnnotationParser;
//!
//! let parser = AnnotationParser::default();
//! let set = parser.parse(["// User is a user.", "//orm:table name=users"]);
//!
//! let table = set.get("orm:table").unwrap();
//! assert_eq!(table.param("name"), Some("users"));
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SymdexError, SymdexResult};

/// Default annotation grammar, anchored at line start.
pub const DEFAULT_ANNOTATION_PATTERN: &str = r"^//([0-9A-Za-z_\.]+):([0-9A-Za-z_\.]+)";

static DEFAULT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_ANNOTATION_PATTERN).unwrap());

/// A parsed annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Namespace-qualified name, e.g. `test:test`.
    pub name: String,
    pub params: BTreeMap<String, String>,
}

impl Annotation {
    /// Create an annotation without parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Annotation {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    /// Add a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parameter value by key.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Annotations of one declaration, keyed by name, in first-seen order.
///
/// Inserting a name that is already present replaces the earlier annotation
/// in place (last write wins).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnotationSet {
    entries: Vec<Annotation>,
}

impl AnnotationSet {
    pub fn new() -> Self {
        AnnotationSet::default()
    }

    /// Insert an annotation, replacing one with the same name.
    pub fn insert(&mut self, annotation: Annotation) {
        match self.entries.iter_mut().find(|a| a.name == annotation.name) {
            Some(existing) => *existing = annotation,
            None => self.entries.push(annotation),
        }
    }

    /// Annotation by name.
    pub fn get(&self, name: &str) -> Option<&Annotation> {
        self.entries.iter().find(|a| a.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Annotation names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|a| a.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Annotation> for AnnotationSet {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut set = AnnotationSet::new();
        for annotation in iter {
            set.insert(annotation);
        }
        set
    }
}

/// Turns doc-comment lines into annotations.
#[derive(Debug, Clone)]
pub struct AnnotationParser {
    regex: Regex,
}

impl Default for AnnotationParser {
    fn default() -> Self {
        AnnotationParser {
            regex: DEFAULT_REGEX.clone(),
        }
    }
}

impl AnnotationParser {
    /// Create a parser with a custom grammar.
    ///
    /// The whole match is treated as the annotation token, so an override
    /// should match `//ns:name` and nothing after it.
    pub fn with_pattern(pattern: &str) -> SymdexResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| SymdexError::InvalidAnnotationPattern {
            pattern: pattern.to_string(),
            source: e,
        })?;
        Ok(AnnotationParser { regex })
    }

    /// The grammar in use.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Parse a comment block. Non-matching lines are ignored.
    pub fn parse<I, S>(&self, lines: I) -> AnnotationSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = AnnotationSet::new();
        for line in lines {
            if let Some(annotation) = self.parse_line(line.as_ref()) {
                set.insert(annotation);
            }
        }
        set
    }

    /// Parse a single comment line.
    pub fn parse_line(&self, line: &str) -> Option<Annotation> {
        let found = self.regex.find(line)?;
        let token = found.as_str();
        let name = token.strip_prefix("//").unwrap_or(token);
        let name = name.strip_suffix(' ').unwrap_or(name);
        if name.is_empty() {
            return None;
        }

        let mut annotation = Annotation::new(name);
        let rest = &line[found.end()..];
        if rest.is_empty() {
            return Some(annotation);
        }

        let rest = rest.strip_prefix(' ').unwrap_or(rest);
        for piece in rest.split(' ').filter(|p| !p.is_empty()) {
            match piece.split_once('=') {
                Some((key, value)) => {
                    annotation.params.insert(key.to_string(), value.to_string());
                }
                None => {
                    warn!(
                        "annotation {} has parameter '{}' without '=', keeping it as a flag",
                        name, piece
                    );
                    annotation.params.insert(piece.to_string(), String::new());
                }
            }
        }
        Some(annotation)
    }
}

// ============================================================================
// Tests
// ============================================================================
