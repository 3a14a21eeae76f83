//! End-to-end tests over manifests on disk.
//!
//! Graphs are dumped with `Manifest::save` into a temporary directory,
//! merged back by `ManifestToolchain::open`, indexed and walked.

mod support;

use std::fs;

use support::fixtures::{self, qualified, ECOSYSTEM, MODULE, TEST_PKG};
use support::visitors::EventLog;
use symdex::config::IndexerConfig;
use symdex::index::Indexer;
use symdex::toolchain::{Manifest, ManifestToolchain, MANIFEST_SUFFIX};
use tempfile::TempDir;

/// Write the fixture module and the store package as two manifests.
fn write_manifests(dir: &TempDir) {
    Manifest {
        root_module: Some(MODULE.to_string()),
        ecosystem: ECOSYSTEM.iter().map(|s| s.to_string()).collect(),
        graph: fixtures::user_test_graph(),
    }
    .save(&dir.path().join(format!("a-gondex{MANIFEST_SUFFIX}")))
    .unwrap();

    let nested = dir.path().join("vendor");
    fs::create_dir_all(&nested).unwrap();
    Manifest {
        root_module: None,
        ecosystem: vec!["fmt".to_string()],
        graph: fixtures::store_graph(),
    }
    .save(&nested.join(format!("store{MANIFEST_SUFFIX}")))
    .unwrap();

    fs::write(dir.path().join("notes.json"), "not a manifest").unwrap();
}

#[test]
fn manifests_are_merged_in_path_order() {
    let dir = TempDir::new().unwrap();
    write_manifests(&dir);

    let toolchain = ManifestToolchain::open(dir.path()).unwrap();
    assert_eq!(toolchain.dir(), dir.path());
    assert_eq!(toolchain.manifests().len(), 2);
    assert!(toolchain.manifests()[0].ends_with(format!("a-gondex{MANIFEST_SUFFIX}")));
    assert!(toolchain.graph().package("store").is_some());
}

#[test]
fn merged_manifests_index_and_walk() {
    support::init_tracing();
    let dir = TempDir::new().unwrap();
    write_manifests(&dir);

    let toolchain = ManifestToolchain::open(dir.path()).unwrap();
    let mut index = Indexer::new(toolchain, IndexerConfig::default()).unwrap();
    index.load().unwrap();

    let found = index.find_records_by_annotation("test:test");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, qualified(TEST_PKG, "UserTest"));
    assert!(index.package("fmt").is_none());
    assert!(index.package("store").is_none());

    let mut log = EventLog::new();
    found[0].fields(&mut log).unwrap();
    assert_eq!(log.fields_at(0).len(), 20);
    assert_eq!(log.of("field").len(), 36);

    // Type ids of the second manifest were shifted past the first.
    index.load_pattern(&["store"]).unwrap();
    let names: Vec<_> = index
        .find_implementations("store.Store")
        .unwrap()
        .into_iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn configuration_file_drives_the_load() {
    let dir = TempDir::new().unwrap();
    write_manifests(&dir);
    let config_path = dir.path().join("symdex.json");
    fs::write(
        &config_path,
        r#"{
            "source_patterns": ["store"],
            "debug": true,
            "ecosystem_packages": ["fmt"]
        }"#,
    )
    .unwrap();

    let config = IndexerConfig::load(&config_path).unwrap();
    let toolchain = ManifestToolchain::open(dir.path()).unwrap();
    let mut index = Indexer::new(toolchain, config).unwrap();
    index.load().unwrap();

    let ids: Vec<_> = index.packages().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["store"]);
    assert_eq!(index.record_count(), 4);
}

#[test]
fn empty_directory_yields_an_empty_index() {
    let dir = TempDir::new().unwrap();
    let toolchain = ManifestToolchain::open(dir.path()).unwrap();
    assert!(toolchain.manifests().is_empty());

    let mut index = Indexer::new(toolchain, IndexerConfig::default()).unwrap();
    index.load().unwrap();
    assert_eq!(index.package_count(), 0);
}

#[test]
fn corrupt_manifest_fails_to_open() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(format!("bad{MANIFEST_SUFFIX}")), "{").unwrap();
    let err = ManifestToolchain::open(dir.path()).unwrap_err();
    assert!(err.is_load_failure());
}
