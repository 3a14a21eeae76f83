//! Bundled source toolchains.
//!
//! Neither toolchain parses source code. Both serve a graph that was resolved
//! elsewhere:
//!
//! - [`StaticToolchain`] holds a [`ResolvedGraph`] in memory, typically built
//!   with [`GraphBuilder`](crate::builder::GraphBuilder), and answers pattern
//!   queries against it.
//! - [`ManifestToolchain`] reads `*.symdex.json` graph dumps written by an
//!   out-of-process analyzer, merges them and then behaves like
//!   [`StaticToolchain`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::adapter::{LoadMode, ResolvedGraph, ResolvedPackage, SourceToolchain};
use crate::error::{SymdexError, SymdexResult};
use crate::pattern::PatternSet;
use crate::types::{
    ArrayType, FieldDef, MapType, NamedType, SliceType, StructType, TypeId, TypeKind,
};

/// File name suffix of graph manifests.
pub const MANIFEST_SUFFIX: &str = ".symdex.json";

// ============================================================================
// Static Toolchain
// ============================================================================

/// Toolchain over a prebuilt graph.
///
/// `resolve` selects the packages matching the patterns as roots (first the
/// graph's own roots, in order, then any other package, by id) and returns
/// them with every package reachable through imports. Import ids the graph
/// does not hold are passed through for the index to reject.
#[derive(Debug, Clone, Default)]
pub struct StaticToolchain {
    graph: ResolvedGraph,
    root_module: Option<String>,
    ecosystem: Vec<String>,
}

impl StaticToolchain {
    /// Serve `graph`. The root module for `./` patterns defaults to the path
    /// of the first package's module flagged as main.
    pub fn new(graph: ResolvedGraph) -> Self {
        let root_module = graph
            .packages
            .values()
            .filter_map(|pkg| pkg.module.as_ref())
            .find(|module| module.main)
            .map(|module| module.path.clone());
        StaticToolchain {
            graph,
            root_module,
            ecosystem: Vec::new(),
        }
    }

    /// Override the root module used to expand `./` patterns.
    pub fn with_root_module(mut self, path: impl Into<String>) -> Self {
        self.root_module = Some(path.into());
        self
    }

    /// Patterns reported by [`SourceToolchain::ecosystem_packages`].
    pub fn with_ecosystem<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ecosystem = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn graph(&self) -> &ResolvedGraph {
        &self.graph
    }

    pub fn root_module(&self) -> Option<&str> {
        self.root_module.as_deref()
    }

    /// Ids matching `set`, graph roots first.
    fn matching_roots(&self, set: &PatternSet) -> Vec<String> {
        let mut roots: Vec<String> = self
            .graph
            .roots
            .iter()
            .filter(|id| set.is_match(id))
            .cloned()
            .collect();
        for id in self.graph.packages.keys() {
            if set.is_match(id) && !roots.contains(id) {
                roots.push(id.clone());
            }
        }
        roots
    }

    /// Packages reachable from `roots` through imports.
    fn reachable(&self, roots: &[String]) -> BTreeMap<String, ResolvedPackage> {
        let mut packages = BTreeMap::new();
        let mut pending: Vec<&str> = roots.iter().map(String::as_str).collect();
        while let Some(id) = pending.pop() {
            if packages.contains_key(id) {
                continue;
            }
            if let Some(pkg) = self.graph.package(id) {
                pending.extend(pkg.imports.iter().map(String::as_str));
                packages.insert(id.to_string(), pkg.clone());
            }
        }
        packages
    }
}

impl SourceToolchain for StaticToolchain {
    type Error = SymdexError;

    fn resolve(&self, mode: LoadMode, patterns: &[String]) -> SymdexResult<ResolvedGraph> {
        let set = PatternSet::new(patterns, self.root_module.as_deref())?;
        let roots = self.matching_roots(&set);
        if roots.is_empty() {
            warn!("patterns [{}] matched no packages", patterns.join(", "));
        }
        debug!(
            "resolved [{}] to {} root packages of {}",
            patterns.join(", "),
            roots.len(),
            self.graph.packages.len()
        );

        let mut graph = ResolvedGraph {
            roots: Vec::new(),
            packages: self.reachable(&roots),
            types: self.graph.types.clone(),
        };
        graph.roots = roots;
        if !mode.contains(LoadMode::MODULE) {
            for pkg in graph.packages.values_mut() {
                pkg.module = None;
            }
        }
        Ok(graph)
    }

    fn ecosystem_packages(&self) -> SymdexResult<Vec<String>> {
        Ok(self.ecosystem.clone())
    }
}

// ============================================================================
// Manifests
// ============================================================================

/// On-disk graph dump.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Path of the module `./` patterns are relative to.
    #[serde(default)]
    pub root_module: Option<String>,
    /// Ecosystem package patterns known to the analyzer.
    #[serde(default)]
    pub ecosystem: Vec<String>,
    pub graph: ResolvedGraph,
}

impl Manifest {
    /// Read a manifest file.
    pub fn load(path: &Path) -> SymdexResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| SymdexError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| SymdexError::Manifest {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Write the manifest as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> SymdexResult<()> {
        let text = serde_json::to_string_pretty(self).map_err(|e| SymdexError::Manifest {
            path: path.display().to_string(),
            source: e,
        })?;
        fs::write(path, text).map_err(|e| SymdexError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// Toolchain over a directory of manifests.
#[derive(Debug, Clone)]
pub struct ManifestToolchain {
    dir: PathBuf,
    manifests: Vec<PathBuf>,
    inner: StaticToolchain,
}

impl ManifestToolchain {
    /// Read and merge every manifest under `dir`, in path order.
    ///
    /// Type ids of later manifests are shifted past the earlier ones. A
    /// package id already supplied by an earlier manifest is ignored with a
    /// warning. The first manifest naming a root module wins.
    pub fn open(dir: impl AsRef<Path>) -> SymdexResult<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| SymdexError::Io {
                path: e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| dir.display().to_string()),
                source: e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
            })?;
            let is_manifest = entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.ends_with(MANIFEST_SUFFIX));
            if is_manifest {
                paths.push(entry.into_path());
            }
        }

        let mut merged = ResolvedGraph::default();
        let mut root_module = None;
        let mut ecosystem: Vec<String> = Vec::new();
        for path in &paths {
            let manifest = Manifest::load(path)?;
            debug!(
                "manifest {}: {} packages",
                path.display(),
                manifest.graph.packages.len()
            );
            if root_module.is_none() {
                root_module = manifest.root_module;
            }
            for pattern in manifest.ecosystem {
                if !ecosystem.contains(&pattern) {
                    ecosystem.push(pattern);
                }
            }
            merge_graph(&mut merged, manifest.graph);
        }

        let mut inner = StaticToolchain::new(merged).with_ecosystem(ecosystem);
        if let Some(root) = root_module {
            inner = inner.with_root_module(root);
        }
        Ok(ManifestToolchain {
            dir: dir.to_path_buf(),
            manifests: paths,
            inner,
        })
    }

    /// Directory the manifests were read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Manifest files that were merged, in merge order.
    pub fn manifests(&self) -> &[PathBuf] {
        &self.manifests
    }

    pub fn graph(&self) -> &ResolvedGraph {
        self.inner.graph()
    }
}

impl SourceToolchain for ManifestToolchain {
    type Error = SymdexError;

    fn resolve(&self, mode: LoadMode, patterns: &[String]) -> SymdexResult<ResolvedGraph> {
        self.inner.resolve(mode, patterns)
    }

    fn ecosystem_packages(&self) -> SymdexResult<Vec<String>> {
        self.inner.ecosystem_packages()
    }
}

/// Append `graph` to `into`, shifting its type ids.
fn merge_graph(into: &mut ResolvedGraph, graph: ResolvedGraph) {
    let offset = into.types.len() as u32;
    let shift = |id: TypeId| TypeId::new(id.0 + offset);

    for index in 0..graph.types.len() {
        if let Some(kind) = graph.types.get(TypeId::new(index as u32)) {
            into.types.push(shift_kind(kind, shift));
        }
    }
    for root in graph.roots {
        if !into.roots.contains(&root) {
            into.roots.push(root);
        }
    }
    for (id, mut pkg) in graph.packages {
        if into.packages.contains_key(&id) {
            warn!("package {} supplied by more than one manifest, keeping the first", id);
            continue;
        }
        for object in &mut pkg.scope {
            object.ty = shift(object.ty);
        }
        into.packages.insert(id, pkg);
    }
}

fn shift_kind(kind: &TypeKind, shift: impl Fn(TypeId) -> TypeId) -> TypeKind {
    match kind {
        TypeKind::Array(a) => TypeKind::Array(ArrayType {
            elem: shift(a.elem),
            len: a.len,
        }),
        TypeKind::Slice(s) => TypeKind::Slice(SliceType {
            elem: shift(s.elem),
        }),
        TypeKind::Map(m) => TypeKind::Map(MapType {
            key: shift(m.key),
            value: shift(m.value),
        }),
        TypeKind::Struct(s) => TypeKind::Struct(StructType {
            fields: s
                .fields
                .iter()
                .map(|f| FieldDef {
                    ty: shift(f.ty),
                    ..f.clone()
                })
                .collect(),
        }),
        TypeKind::Pointer { elem } => TypeKind::Pointer { elem: shift(*elem) },
        TypeKind::Named(n) => TypeKind::Named(NamedType {
            underlying: shift(n.underlying),
            ..n.clone()
        }),
        TypeKind::Basic(_)
        | TypeKind::Interface(_)
        | TypeKind::Signature { .. }
        | TypeKind::Other { .. } => kind.clone(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;

    fn patterns(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    fn app_graph() -> ResolvedGraph {
        let mut b = GraphBuilder::new();
        b.module("example.com/app", "example.com/app", "", true);
        b.module("example.com/app/db", "example.com/app", "", true);
        b.root("example.com/app").root("example.com/app/db");
        b.import("example.com/app", "example.com/app/db");
        b.import("example.com/app/db", "fmt");
        b.build()
    }

    mod static_toolchain {
        use super::*;

        #[test]
        fn root_module_comes_from_main_module() {
            let tc = StaticToolchain::new(app_graph());
            assert_eq!(tc.root_module(), Some("example.com/app"));
        }

        #[test]
        fn relative_wildcard_selects_module_packages() {
            let tc = StaticToolchain::new(app_graph());
            let graph = tc
                .resolve(LoadMode::BASE, &patterns(&["./..."]))
                .unwrap();
            assert_eq!(graph.roots, vec!["example.com/app", "example.com/app/db"]);
            assert_eq!(graph.packages.len(), 3);
        }

        #[test]
        fn non_root_packages_can_be_selected() {
            let tc = StaticToolchain::new(app_graph());
            let graph = tc.resolve(LoadMode::BASE, &patterns(&["fmt"])).unwrap();
            assert_eq!(graph.roots, vec!["fmt"]);
            assert_eq!(graph.packages.len(), 1);
        }

        #[test]
        fn unreachable_packages_are_left_out() {
            let mut b = GraphBuilder::new();
            b.root("a").root("b");
            b.import("a", "c");
            b.diagnostic("b", "undefined: x");
            let tc = StaticToolchain::new(b.build());

            let graph = tc.resolve(LoadMode::BASE, &patterns(&["a"])).unwrap();
            let ids: Vec<_> = graph.packages.keys().map(String::as_str).collect();
            assert_eq!(ids, vec!["a", "c"]);
            assert!(graph.diagnostics().is_empty());
        }

        #[test]
        fn module_data_follows_mode() {
            let tc = StaticToolchain::new(app_graph());
            let without = tc.resolve(LoadMode::BASE, &patterns(&["."])).unwrap();
            assert!(without.package("example.com/app").unwrap().module.is_none());

            let with = tc
                .resolve(LoadMode::BASE | LoadMode::MODULE, &patterns(&["."]))
                .unwrap();
            assert!(with.package("example.com/app").unwrap().module.is_some());
        }

        #[test]
        fn ecosystem_is_reported() {
            let tc = StaticToolchain::new(app_graph()).with_ecosystem(["std", "fmt"]);
            assert_eq!(tc.ecosystem_packages().unwrap(), vec!["std", "fmt"]);
        }
    }

    mod manifest_toolchain {
        use super::*;

        fn write(dir: &Path, name: &str, manifest: &Manifest) {
            manifest.save(&dir.join(name)).unwrap();
        }

        #[test]
        fn merges_manifests_and_shifts_type_ids() {
            let temp = tempfile::tempdir().unwrap();

            let mut a = GraphBuilder::new();
            let int = a.basic("int");
            a.record("example.com/app", "User", vec![FieldDef::new("ID", int)]);
            a.root("example.com/app");
            write(
                temp.path(),
                "a.symdex.json",
                &Manifest {
                    root_module: Some("example.com/app".to_string()),
                    ecosystem: vec!["std".to_string()],
                    graph: a.build(),
                },
            );

            let mut b = GraphBuilder::new();
            let string = b.basic("string");
            b.record("example.com/lib", "Tag", vec![FieldDef::new("Name", string)]);
            fs::create_dir(temp.path().join("nested")).unwrap();
            write(
                &temp.path().join("nested"),
                "b.symdex.json",
                &Manifest {
                    graph: b.build(),
                    ..Default::default()
                },
            );
            fs::write(temp.path().join("notes.json"), "not a manifest").unwrap();

            let tc = ManifestToolchain::open(temp.path()).unwrap();
            assert_eq!(tc.manifests().len(), 2);
            assert_eq!(tc.ecosystem_packages().unwrap(), vec!["std"]);

            let graph = tc.resolve(LoadMode::BASE, &patterns(&["./..."])).unwrap();
            assert_eq!(graph.roots, vec!["example.com/app"]);

            assert!(graph.package("example.com/lib").is_none());

            let merged = tc.graph();
            let tag = &merged.package("example.com/lib").unwrap().scope[0];
            let (named, fields) = merged.types.record_shape(tag.ty).unwrap();
            assert_eq!(named.unwrap().name, "Tag");
            assert_eq!(merged.types.display(fields.field(0).unwrap().ty), "string");
        }

        #[test]
        fn malformed_manifest_is_an_error() {
            let temp = tempfile::tempdir().unwrap();
            fs::write(temp.path().join("bad.symdex.json"), "{").unwrap();
            let err = ManifestToolchain::open(temp.path()).unwrap_err();
            assert!(matches!(err, SymdexError::Manifest { .. }));
        }

        #[test]
        fn empty_directory_is_an_empty_graph() {
            let temp = tempfile::tempdir().unwrap();
            let tc = ManifestToolchain::open(temp.path()).unwrap();
            assert!(tc.graph().packages.is_empty());
        }
    }
}
