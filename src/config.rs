//! Configuration handling for the indexer

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use symdex_core::adapter::LoadMode;
use symdex_core::annotation::DEFAULT_ANNOTATION_PATTERN;
use symdex_core::error::{SymdexError, SymdexResult};

/// Indexer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Annotation grammar (regex)
    #[serde(default = "default_annotation_pattern")]
    pub annotation_pattern: String,

    /// Patterns used by `load()`
    #[serde(default = "default_source_patterns")]
    pub source_patterns: Vec<String>,

    /// Emit debug-level trace events while indexing
    #[serde(default)]
    pub debug: bool,

    /// Do not index ecosystem packages or anything only they import
    #[serde(default = "default_skip_ecosystem_packages")]
    pub skip_ecosystem_packages: bool,

    /// Extra toolchain features, OR'ed into the base mask
    #[serde(default = "default_load_mode")]
    pub load_mode: LoadMode,

    /// Ecosystem package patterns; fetched from the toolchain when unset
    #[serde(default)]
    pub ecosystem_packages: Option<Vec<String>>,
}

fn default_annotation_pattern() -> String {
    DEFAULT_ANNOTATION_PATTERN.to_string()
}

fn default_source_patterns() -> Vec<String> {
    vec!["./...".to_string()]
}

fn default_skip_ecosystem_packages() -> bool {
    true
}

fn default_load_mode() -> LoadMode {
    LoadMode::MODULE
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            annotation_pattern: default_annotation_pattern(),
            source_patterns: default_source_patterns(),
            debug: false,
            skip_ecosystem_packages: default_skip_ecosystem_packages(),
            load_mode: default_load_mode(),
            ecosystem_packages: None,
        }
    }
}

impl IndexerConfig {
    /// Parse configuration from JSON text
    pub fn from_json_str(text: &str) -> SymdexResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| SymdexError::config(format!("failed to parse config: {}", e)))
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> SymdexResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SymdexError::config(format!("failed to read config file: {}", e)))?;
        Self::from_json_str(&content)
    }

    pub fn with_annotation_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.annotation_pattern = pattern.into();
        self
    }

    pub fn with_source_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_skip_ecosystem_packages(mut self, skip: bool) -> Self {
        self.skip_ecosystem_packages = skip;
        self
    }

    pub fn with_load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    /// Inject the ecosystem set instead of asking the toolchain
    pub fn with_ecosystem_packages<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ecosystem_packages = Some(patterns.into_iter().map(Into::into).collect());
        self
    }
}
