//! Compile-only test to verify public API surface.
//!
//! This file serves as a compile-time contract for the public API.
//! If this file fails to compile, the public API has regressed.
//!
//! Run with: cargo test -- api_surface

// Allow unused imports - this test is about compile-time verification, not runtime usage
#![allow(unused_imports)]

// ============================================================================
// Core Types (re-exported from symdex-core)
// ============================================================================

// adapter module - toolchain boundary
use symdex::adapter::{
    DeclSpec, Declaration, Diagnostic, DocComment, LoadMode, ModuleData, ObjectKind,
    ResolvedGraph, ResolvedPackage, ScopeObject, SourceToolchain, SpecShape, SyntaxFile,
};

// annotation module - doc-comment grammar
use symdex::annotation::{
    Annotation, AnnotationParser, AnnotationSet, DEFAULT_ANNOTATION_PATTERN,
};

// builder module - programmatic graphs
use symdex::builder::GraphBuilder;

// error module - error types
use symdex::error::{SymdexError, SymdexResult};

// pattern module - package patterns
use symdex::pattern::{PatternSet, WILDCARD};

// tag module - field metadata strings
use symdex::tag::FieldTag;

// toolchain module - bundled toolchains
use symdex::toolchain::{Manifest, ManifestToolchain, StaticToolchain, MANIFEST_SUFFIX};

// types module - resolved type model
use symdex::types::{
    qualified_id, ArrayType, BasicType, FieldDef, InterfaceType, MapType, Method, MethodSig,
    NamedType, Receiver, Shape, SliceType, StructType, TypeId, TypeKind, TypeTable,
};

// ============================================================================
// Index Types
// ============================================================================

use symdex::catalog::{DeclarationCatalog, FunctionDecl, TypeDecl};
use symdex::config::IndexerConfig;
use symdex::conformance::{implementations, implements};
use symdex::entities::{
    Contract, ContractId, Function, FunctionId, Module, ModuleId, Package, PackageId, Record,
    RecordId,
};
use symdex::index::Indexer;
use symdex::walker::{FieldInfo, FieldVisitor, Metadata, RecordNode};

// ============================================================================
// Test
// ============================================================================

#[test]
fn api_surface_compiles() {
    // This test exists only to verify imports compile.
    // If you're here because this test broke, you may have
    // accidentally removed a public re-export.

    // Use some types to avoid unused import warnings
    let _ = std::any::type_name::<Indexer<StaticToolchain>>();
    let _ = std::any::type_name::<Record>();
    let _ = std::any::type_name::<TypeTable>();
    let _ = std::any::type_name::<SymdexError>();
    let _ = std::any::type_name::<RecordNode<'static>>();
    let _ = std::any::type_name::<ManifestToolchain>();
}

#[test]
fn default_annotation_pattern_is_stable() {
    // The annotation grammar is part of the public API contract
    assert_eq!(
        DEFAULT_ANNOTATION_PATTERN,
        r"^//([0-9A-Za-z_\.]+):([0-9A-Za-z_\.]+)"
    );
    assert_eq!(
        IndexerConfig::default().annotation_pattern,
        DEFAULT_ANNOTATION_PATTERN
    );
}
