//! Source analysis toolchain trait and the resolved data it produces.
//!
//! This module defines the [`SourceToolchain`] trait, the seam between symdex
//! and whatever parses and type-checks the analyzed program, along with the
//! data types used to hand resolved packages over to the index.
//!
//! # Architecture
//!
//! A toolchain resolves a set of package patterns into a [`ResolvedGraph`]:
//! 1. `roots`: the packages matched by the patterns, in match order
//! 2. `packages`: every package reachable from the roots, keyed by id
//! 3. `types`: one [`TypeTable`] shared by all packages of the graph
//!
//! The index walks the graph from the roots through each package's
//! `imports`, in the order the toolchain reports them.
//!
//! # All-or-nothing
//!
//! Toolchains report per-package problems as [`Diagnostic`]s instead of
//! dropping packages. The index rejects a graph carrying any diagnostic, so a
//! toolchain never needs to decide which partial results are usable.
//!
//! # Serialization
//!
//! Every type here round-trips through serde so a graph produced by an
//! out-of-process analyzer can be dumped to JSON and replayed through
//! [`ManifestToolchain`](crate::toolchain::ManifestToolchain).

use std::collections::BTreeMap;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::types::{TypeId, TypeTable};

// ============================================================================
// Load Mode
// ============================================================================

/// Feature mask forwarded to the toolchain.
///
/// Each bit asks the toolchain to populate one part of the resolved graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LoadMode(pub u32);

impl LoadMode {
    /// Package names.
    pub const NAMES: LoadMode = LoadMode(1 << 0);
    /// Source file list.
    pub const FILES: LoadMode = LoadMode(1 << 1);
    /// Direct imports.
    pub const IMPORTS: LoadMode = LoadMode(1 << 2);
    /// Resolved scope and type table.
    pub const TYPES: LoadMode = LoadMode(1 << 3);
    /// Declaration syntax with doc comments.
    pub const SYNTAX: LoadMode = LoadMode(1 << 4);
    /// Type-resolution details (method sets, field metadata).
    pub const TYPES_INFO: LoadMode = LoadMode(1 << 5);
    /// Module metadata.
    pub const MODULE: LoadMode = LoadMode(1 << 6);

    /// Mask always requested by the index.
    pub const BASE: LoadMode = LoadMode(
        Self::NAMES.0
            | Self::FILES.0
            | Self::IMPORTS.0
            | Self::TYPES.0
            | Self::SYNTAX.0
            | Self::TYPES_INFO.0,
    );

    /// Empty mask.
    pub fn empty() -> Self {
        LoadMode(0)
    }

    /// Returns true if every bit of `other` is set.
    pub fn contains(self, other: LoadMode) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LoadMode {
    type Output = LoadMode;

    fn bitor(self, rhs: LoadMode) -> LoadMode {
        LoadMode(self.0 | rhs.0)
    }
}

impl BitOrAssign for LoadMode {
    fn bitor_assign(&mut self, rhs: LoadMode) {
        self.0 |= rhs.0;
    }
}

// ============================================================================
// Syntax
// ============================================================================

/// Comment block attached to a declaration, one entry per line, each line
/// with its comment marker (`// ...`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocComment {
    pub lines: Vec<String>,
}

impl DocComment {
    /// Build a doc comment from raw lines.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DocComment {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Syntactic shape of a type spec, as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecShape {
    /// `type X struct { ... }`
    Record,
    /// `type X interface { ... }`
    Contract,
    /// Any other type expression.
    Other,
}

/// One spec inside a grouped declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "spec", rename_all = "snake_case")]
pub enum DeclSpec {
    Type {
        name: String,
        shape: SpecShape,
        #[serde(default)]
        doc: Option<DocComment>,
    },
    Value {
        names: Vec<String>,
    },
    Import {
        path: String,
    },
}

/// Top-level declaration in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decl", rename_all = "snake_case")]
pub enum Declaration {
    /// Grouped declaration (`type`, `var`, `const`, `import` blocks).
    Group {
        #[serde(default)]
        doc: Option<DocComment>,
        specs: Vec<DeclSpec>,
    },
    /// Function or method declaration.
    Function {
        name: String,
        #[serde(default)]
        doc: Option<DocComment>,
        /// Receiver type name for methods.
        #[serde(default)]
        receiver: Option<String>,
    },
    /// Anything else the parser produced (e.g. a bad declaration).
    Other { kind: String },
}

/// Declarations of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyntaxFile {
    pub path: String,
    pub declarations: Vec<Declaration>,
}

// ============================================================================
// Scope
// ============================================================================

/// Kind of a package-level object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    TypeName,
    TypeAlias,
    Func,
    Var,
    Const,
}

/// Package-level object from the resolved symbol table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeObject {
    pub name: String,
    pub kind: ObjectKind,
    pub ty: TypeId,
}

// ============================================================================
// Packages
// ============================================================================

/// Module metadata for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleData {
    pub path: String,
    #[serde(default)]
    pub version: String,
    /// True for the module being analyzed.
    #[serde(default)]
    pub main: bool,
}

/// A problem reported by the toolchain for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default)]
    pub position: Option<String>,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.position {
            Some(pos) => write!(f, "{pos}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// One resolved compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedPackage {
    /// Stable, path-like package id.
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub module: Option<ModuleData>,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub syntax: Vec<SyntaxFile>,
    /// Package scope, in toolchain order.
    #[serde(default)]
    pub scope: Vec<ScopeObject>,
    /// Ids of direct imports, in toolchain order.
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of resolving a pattern set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedGraph {
    /// Ids of the packages matched by the patterns.
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub packages: BTreeMap<String, ResolvedPackage>,
    #[serde(default)]
    pub types: TypeTable,
}

impl ResolvedGraph {
    /// Look up a package of the graph.
    pub fn package(&self, id: &str) -> Option<&ResolvedPackage> {
        self.packages.get(id)
    }

    /// Every diagnostic in the graph, prefixed with its package id.
    pub fn diagnostics(&self) -> Vec<String> {
        self.packages
            .values()
            .flat_map(|pkg| {
                pkg.diagnostics
                    .iter()
                    .map(move |d| format!("{}: {}", pkg.id, d))
            })
            .collect()
    }
}

// ============================================================================
// Source Toolchain Trait
// ============================================================================

/// Trait for source analysis toolchains.
///
/// A toolchain turns package patterns into a fully resolved package graph.
/// It owns parsing, name resolution and type checking; symdex only reads the
/// result.
///
/// # Contract
///
/// - `resolve` blocks until the whole graph is available; there are no
///   partial results.
/// - The returned graph is closed over imports: every id in any package's
///   `imports` is a key of `packages`.
/// - Problems are reported either as `Err` (the toolchain could not run) or
///   as package diagnostics (the program does not resolve cleanly).
///
/// # Example Implementation
///
/// ```
/// use symdex_core::adapter::{LoadMode, ResolvedGraph, SourceToolchain};
///
/// struct EmptyToolchain;
///
/// impl SourceToolchain for EmptyToolchain {
///     type Error = std::io::Error;
///
///     fn resolve(&self, _mode: LoadMode, _patterns: &[String])
///         -> Result<ResolvedGraph, Self::Error>
///     {
///         Ok(ResolvedGraph::default())
///     }
/// }
///
/// let graph = EmptyToolchain.resolve(LoadMode::BASE, &["./...".to_string()]).unwrap();
/// assert!(graph.roots.is_empty());
/// ```
pub trait SourceToolchain {
    /// The error type for this toolchain.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve `patterns` into a package graph.
    fn resolve(&self, mode: LoadMode, patterns: &[String]) -> Result<ResolvedGraph, Self::Error>;

    /// Package patterns that belong to the language's standard distribution.
    ///
    /// Called at most once per index, and only when ecosystem pruning is
    /// enabled without an injected set.
    fn ecosystem_packages(&self) -> Result<Vec<String>, Self::Error> {
        Ok(Vec::new())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod load_mode_tests {
        use super::*;

        #[test]
        fn base_contains_required_bits() {
            let base = LoadMode::BASE;
            assert!(base.contains(LoadMode::SYNTAX));
            assert!(base.contains(LoadMode::NAMES));
            assert!(base.contains(LoadMode::TYPES));
            assert!(base.contains(LoadMode::TYPES_INFO));
            assert!(base.contains(LoadMode::IMPORTS));
            assert!(base.contains(LoadMode::FILES));
            assert!(!base.contains(LoadMode::MODULE));
        }

        #[test]
        fn or_combines_masks() {
            let mut mode = LoadMode::BASE;
            mode |= LoadMode::MODULE;
            assert!(mode.contains(LoadMode::MODULE | LoadMode::SYNTAX));
            assert!(!LoadMode::empty().contains(LoadMode::NAMES));
        }
    }

    mod graph_tests {
        use super::*;

        #[test]
        fn diagnostics_are_prefixed_with_package() {
            let mut graph = ResolvedGraph::default();
            graph.packages.insert(
                "a".to_string(),
                ResolvedPackage {
                    id: "a".to_string(),
                    diagnostics: vec![Diagnostic {
                        position: Some("a.go:3:1".to_string()),
                        message: "undefined: x".to_string(),
                    }],
                    ..Default::default()
                },
            );
            assert_eq!(graph.diagnostics(), vec!["a: a.go:3:1: undefined: x"]);
        }

        #[test]
        fn declarations_round_trip_through_json() {
            let decl = Declaration::Group {
                doc: Some(DocComment::new(["//test:test"])),
                specs: vec![DeclSpec::Type {
                    name: "User".to_string(),
                    shape: SpecShape::Record,
                    doc: None,
                }],
            };
            let json = serde_json::to_string(&decl).unwrap();
            assert!(json.contains("\"decl\":\"group\""));
            let back: Declaration = serde_json::from_str(&json).unwrap();
            assert_eq!(back, decl);
        }
    }
}
