//! Graph fixtures for integration tests.
//!
//! The main fixture is a small module with one heavily nested record,
//! `UserTest`, whose twenty fields cover every field category the walker
//! dispatches on.

use symdex::adapter::ResolvedGraph;
use symdex::builder::GraphBuilder;
use symdex::config::IndexerConfig;
use symdex::index::Indexer;
use symdex::toolchain::StaticToolchain;
use symdex::types::{FieldDef, Method, MethodSig, TypeId};

pub const MODULE: &str = "example.com/gondex";
pub const TEST_PKG: &str = "example.com/gondex/internal/test";
pub const PROJECT_PKG: &str = "example.com/gondex/internal/test/project";

/// Ecosystem patterns used by the fixtures.
pub const ECOSYSTEM: [&str; 3] = ["fmt", "strings", "golang.org/x/..."];

/// Top-level fields of `UserTest`: name, category, `test` tag value.
pub const USER_TEST_FIELDS: [(&str, &str, &str); 20] = [
    ("Embedded", "struct", "embedded"),
    ("T", "interface", "t"),
    ("Data", "struct", "data"),
    ("Name", "basic", "name"),
    ("Password", "basic", "password"),
    ("Count", "basic", "count"),
    ("Check", "basic", "check"),
    ("Number", "basic", "number"),
    ("Special", "struct", "special"),
    ("Address", "struct", "address"),
    ("Options", "map", "options"),
    ("ListInt", "slice", "list_int"),
    ("ListString", "slice", "list_string"),
    ("ListBool", "slice", "list_bool"),
    ("ListFloat", "slice", "list_float"),
    ("MapInt", "map", "map_int"),
    ("MapString", "map", "map_string"),
    ("MapBool", "map", "map_bool"),
    ("Options2", "map", "options2"),
    ("MapStruct", "map", "map_struct"),
];

/// Qualified id of a fixture symbol.
pub fn qualified(package: &str, name: &str) -> String {
    format!("{package}.{name}")
}

fn tagged(name: &str, ty: TypeId, tag: &str) -> FieldDef {
    FieldDef::new(name, ty).with_tag(format!("test:\"{tag}\""))
}

/// The `UserTest` module.
///
/// `internal/test` imports `internal/test/project` and the ecosystem
/// package `fmt`. `UserTest` and `Special` satisfy `TestI`.
pub fn user_test_graph() -> ResolvedGraph {
    let mut b = GraphBuilder::new();
    b.root(TEST_PKG);
    b.module(TEST_PKG, MODULE, "", true)
        .module(PROJECT_PKG, MODULE, "", true);
    b.import(TEST_PKG, PROJECT_PKG).import(TEST_PKG, "fmt");

    let string = b.basic("string");
    let int = b.basic("int");
    let boolean = b.basic("bool");
    let float = b.basic("float64");

    b.contract("fmt", "Stringer", vec![MethodSig::new("String", "func() string")]);
    b.function("fmt", "Sprint", "func(...any) string");

    let members = b.slice(string);
    let project = b.record(
        PROJECT_PKG,
        "ProjectTest",
        vec![
            tagged("Title", string, "title"),
            tagged("Members", members, "members"),
        ],
    );
    b.document(
        PROJECT_PKG,
        "ProjectTest",
        ["// ProjectTest is referenced from UserTest.", "//test:project table=projects"],
    );

    let embedded = b.record(TEST_PKG, "Embedded", vec![tagged("E", string, "e")]);
    let special = b.record(
        TEST_PKG,
        "Special",
        vec![tagged("Name", string, "name"), tagged("Option", boolean, "option")],
    );
    b.method(special, Method::reference("Test", "func() string"));
    let test_i = b.contract(TEST_PKG, "TestI", vec![MethodSig::new("Test", "func() string")]);
    b.document(TEST_PKG, "TestI", ["//test:contract"]);

    let options = b.map(string, special);
    let address = b.struct_type(vec![
        tagged("Street", string, "street"),
        tagged("Number", int, "number"),
        tagged("Options", options, "options"),
    ]);
    let list_int = b.slice(int);
    let list_string = b.slice(string);
    let list_bool = b.slice(boolean);
    let list_float = b.slice(float);
    let map_int = b.map(string, int);
    let map_string = b.map(string, string);
    let map_bool = b.map(string, boolean);
    let options2 = b.map(string, project);
    let pair = b.struct_type(vec![
        tagged("Name", string, "name"),
        tagged("Number", int, "number"),
    ]);
    let map_struct = b.map(string, pair);

    let user = b.record(
        TEST_PKG,
        "UserTest",
        vec![
            tagged("Embedded", embedded, "embedded").embedded(),
            tagged("T", test_i, "t"),
            tagged("Data", project, "data"),
            tagged("Name", string, "name"),
            tagged("Password", string, "password"),
            tagged("Count", int, "count"),
            tagged("Check", boolean, "check"),
            tagged("Number", float, "number"),
            FieldDef::new("Special", special).with_tag(r#"test:"special" json:"s""#),
            tagged("Address", address, "address"),
            tagged("Options", options, "options"),
            tagged("ListInt", list_int, "list_int"),
            tagged("ListString", list_string, "list_string"),
            tagged("ListBool", list_bool, "list_bool"),
            tagged("ListFloat", list_float, "list_float"),
            tagged("MapInt", map_int, "map_int"),
            tagged("MapString", map_string, "map_string"),
            tagged("MapBool", map_bool, "map_bool"),
            tagged("Options2", options2, "options2"),
            tagged("MapStruct", map_struct, "map_struct"),
        ],
    );
    b.document(
        TEST_PKG,
        "UserTest",
        ["// UserTest exercises every field category.", "//test:test"],
    );
    b.method(user, Method::value("Test", "func() string"));

    b.function(TEST_PKG, "NewUserTest", "func() *UserTest");
    b.document(TEST_PKG, "NewUserTest", ["//test:constructor kind=default"]);
    b.build()
}

/// Configuration with the fixture ecosystem injected.
pub fn config() -> IndexerConfig {
    IndexerConfig::default().with_ecosystem_packages(ECOSYSTEM)
}

/// Index over `graph` with the fixture configuration, nothing loaded yet.
pub fn indexer(graph: ResolvedGraph) -> Indexer<StaticToolchain> {
    Indexer::new(StaticToolchain::new(graph), config()).expect("fixture config is valid")
}

/// Index with the `UserTest` module loaded.
pub fn loaded_user_test() -> Indexer<StaticToolchain> {
    let mut index = indexer(user_test_graph());
    index.load().expect("fixture loads");
    index
}

/// Records with a configurable method set, all in package `store`:
/// `A` (value methods), `B` (one reference method), `C` (missing `Save`)
/// and `D` (wrong `Save` signature), plus the contract `store.Store`.
pub fn store_graph() -> ResolvedGraph {
    let mut b = GraphBuilder::new();
    b.root("store");
    b.contract(
        "store",
        "Store",
        vec![
            MethodSig::new("Load", "func(string) error"),
            MethodSig::new("Save", "func() error"),
        ],
    );
    let a = b.record("store", "A", vec![]);
    b.method(a, Method::value("Load", "func(string) error"))
        .method(a, Method::value("Save", "func() error"));
    let bb = b.record("store", "B", vec![]);
    b.method(bb, Method::value("Load", "func(string) error"))
        .method(bb, Method::reference("Save", "func() error"));
    let c = b.record("store", "C", vec![]);
    b.method(c, Method::value("Load", "func(string) error"));
    let d = b.record("store", "D", vec![]);
    b.method(d, Method::value("Load", "func(string) error"))
        .method(d, Method::value("Save", "func() bool"));
    b.build()
}
