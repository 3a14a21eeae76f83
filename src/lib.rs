//! symdex: a reflection index over resolved source packages.
//!
//! Loads a program's resolved symbols transitively through its import graph,
//! recognizes declarative doc-comment annotations on types and functions, and
//! answers queries:
//! - lookup by qualified name (`package + "." + name`)
//! - lookup by annotation
//! - which records satisfy a contract's method set
//!
//! [`Record::fields`](entities::Record::fields) walks a record's field graph
//! with a caller-supplied [`FieldVisitor`](walker::FieldVisitor), for code
//! generators that need the nested composition of a type.
//!
//! Parsing and type checking are delegated to a
//! [`SourceToolchain`](adapter::SourceToolchain).
//!
//! ```
//! use symdex::builder::GraphBuilder;
//! use symdex::config::IndexerConfig;
//! use symdex::index::Indexer;
//! use symdex::toolchain::StaticToolchain;
//! use symdex::types::FieldDef;
//!
//! let mut b = GraphBuilder::new();
//! let string = b.basic("string");
//! b.record("example.com/app", "User", vec![FieldDef::new("Name", string)]);
//! b.document("example.com/app", "User", ["//orm:table name=users"]);
//! b.root("example.com/app");
//!
//! let toolchain = StaticToolchain::new(b.build());
//! let mut index = Indexer::new(toolchain, IndexerConfig::default()).unwrap();
//! index.load_pattern(&["example.com/app"]).unwrap();
//!
//! let tables = index.find_records_by_annotation("orm:table");
//! assert_eq!(tables[0].id, "example.com/app.User");
//! ```

// Core primitives - re-exported from symdex-core
pub use symdex_core::adapter;
pub use symdex_core::annotation;
pub use symdex_core::builder;
pub use symdex_core::error;
pub use symdex_core::pattern;
pub use symdex_core::tag;
pub use symdex_core::toolchain;
pub use symdex_core::types;

// Index
pub mod catalog;
pub mod config;
pub mod conformance;
pub mod entities;
pub mod index;
pub mod walker;
