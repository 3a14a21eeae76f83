//! Error types for symdex.
//!
//! This module provides the unified error type ([`SymdexError`]) returned by
//! every fallible operation in the workspace: toolchain resolution, catalog
//! construction, configuration and field walks.
//!
//! ## Fatal vs. Tolerated
//!
//! Only conditions that would leave the index inconsistent are errors:
//! - **Resolution**: the toolchain failed or reported diagnostics
//! - **MissingImport**: the resolved graph is not closed over its imports
//! - **UnsupportedDeclarationKind**: the declaration catalog cannot be complete
//! - **CycleDetected**: a field walk would recurse forever
//!
//! Lookup misses, unsupported symbol kinds and malformed annotation
//! parameters are never errors. Queries return empty or absent results and
//! the indexer logs what it skipped.

use thiserror::Error;

/// Unified error type for symdex.
#[derive(Debug, Error)]
pub enum SymdexError {
    /// The toolchain failed to run or reported diagnostics.
    #[error("resolving packages for patterns [{}]: {message}", patterns.join(", "))]
    Resolution {
        patterns: Vec<String>,
        message: String,
    },

    /// A package imports an id the toolchain did not supply.
    #[error("package {package} imports {import}, which was not resolved")]
    MissingImport { package: String, import: String },

    /// A top-level declaration that is neither a type nor a function.
    #[error("unsupported declaration kind '{kind}' in {file} (package {package})")]
    UnsupportedDeclarationKind {
        package: String,
        file: String,
        kind: String,
    },

    /// The configured annotation pattern does not compile.
    #[error("invalid annotation pattern '{pattern}': {source}")]
    InvalidAnnotationPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A package pattern could not be turned into a matcher.
    #[error("invalid package pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Configuration could not be parsed.
    #[error("config error: {message}")]
    Config { message: String },

    /// A field walk descended into a record already on the current path.
    #[error("cycle detected in field graph: {}", path.join(" -> "))]
    CycleDetected { path: Vec<String> },

    /// Manifest or other I/O failure inside a bundled toolchain.
    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Manifest content is not a valid graph dump.
    #[error("manifest {path} is malformed: {source}")]
    Manifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result alias used across symdex.
pub type SymdexResult<T> = Result<T, SymdexError>;

// ============================================================================
// Convenience Constructors
// ============================================================================

impl SymdexError {
    /// Create a resolution error for a set of patterns.
    pub fn resolution(patterns: &[String], message: impl Into<String>) -> Self {
        SymdexError::Resolution {
            patterns: patterns.to_vec(),
            message: message.into(),
        }
    }

    /// Create an unsupported declaration error.
    pub fn unsupported_declaration(
        package: impl Into<String>,
        file: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        SymdexError::UnsupportedDeclarationKind {
            package: package.into(),
            file: file.into(),
            kind: kind.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SymdexError::Config {
            message: message.into(),
        }
    }

    /// Returns true if this error aborted a load.
    ///
    /// Walk and configuration errors are raised outside of `load`.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            SymdexError::Resolution { .. }
                | SymdexError::MissingImport { .. }
                | SymdexError::UnsupportedDeclarationKind { .. }
                | SymdexError::Io { .. }
                | SymdexError::Manifest { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
