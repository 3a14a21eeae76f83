//! Core primitives for symdex.
//!
//! This crate provides the language-agnostic pieces the symbol index is
//! built on:
//! - Source toolchain trait and the resolved package graph it produces
//! - Type table and shape classification
//! - Annotation parser for declarative doc comments
//! - Field metadata micro-format
//! - Package patterns
//! - Error types
//! - Bundled toolchains (in-memory graph, JSON manifests) and a graph builder

pub mod adapter;
pub mod annotation;
pub mod builder;
pub mod error;
pub mod pattern;
pub mod tag;
pub mod toolchain;
pub mod types;
