//! The symbol index.
//!
//! [`Indexer`] resolves package patterns through a [`SourceToolchain`] and
//! walks the resulting import graph depth-first, classifying each package's
//! top-level symbols into records, contracts and functions.
//!
//! # Traversal
//!
//! For each root, then recursively for each direct import in toolchain
//! order, a package is:
//! 1. pruned (with its whole import subtree) if ecosystem packages are
//!    skipped and it is one
//! 2. skipped if it was already indexed or visited in this load
//! 3. otherwise cataloged and classified
//!
//! # Atomic loads
//!
//! A load runs in two phases. Planning performs every fallible step
//! (resolution, diagnostics, import closure, declaration catalogs) without
//! touching the index and yields the packages to add in visit order.
//! Committing then classifies those packages, which cannot fail. A failed
//! load therefore leaves the index exactly as it was.
//!
//! # Storage
//!
//! Entities live in arena `Vec`s addressed by typed ids. Qualified ids and
//! annotation names map to those ids through `HashMap` lookups; annotation
//! postings only ever grow.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use symdex_core::adapter::{
    LoadMode, ObjectKind, ResolvedGraph, ResolvedPackage, SourceToolchain,
};
use symdex_core::annotation::{AnnotationParser, AnnotationSet};
use symdex_core::error::{SymdexError, SymdexResult};
use symdex_core::pattern::PatternSet;
use symdex_core::types::{qualified_id, Shape, TypeTable};

use crate::catalog::DeclarationCatalog;
use crate::config::IndexerConfig;
use crate::conformance;
use crate::entities::{
    Contract, ContractId, Function, FunctionId, Module, ModuleId, Package, PackageId, Record,
    RecordId,
};

/// Most diagnostics quoted in a resolution error.
const MAX_REPORTED_DIAGNOSTICS: usize = 5;

/// A package that passed planning, with its catalog.
struct Planned<'g> {
    package: &'g ResolvedPackage,
    catalog: DeclarationCatalog,
}

/// Symbol index over one logical load set.
pub struct Indexer<T: SourceToolchain> {
    toolchain: T,
    config: IndexerConfig,
    parser: AnnotationParser,
    /// Ecosystem patterns, resolved on first use.
    ecosystem: Option<PatternSet>,

    // Primary storage
    modules: Vec<Module>,
    packages: Vec<Package>,
    records: Vec<Record>,
    contracts: Vec<Contract>,
    functions: Vec<Function>,
    main_module: Option<ModuleId>,

    // Lookups
    module_by_path: HashMap<String, ModuleId>,
    package_by_id: HashMap<String, PackageId>,
    record_by_id: HashMap<String, RecordId>,
    contract_by_id: HashMap<String, ContractId>,
    function_by_id: HashMap<String, FunctionId>,

    // Postings lists
    /// annotation name → records, in indexing order.
    records_by_annotation: HashMap<String, Vec<RecordId>>,
    /// annotation name → contracts, in indexing order.
    contracts_by_annotation: HashMap<String, Vec<ContractId>>,
    /// annotation name → functions, in indexing order.
    functions_by_annotation: HashMap<String, Vec<FunctionId>>,
}

impl<T: SourceToolchain> Indexer<T> {
    /// Create an empty index. Fails if the configured annotation pattern
    /// does not compile.
    pub fn new(toolchain: T, config: IndexerConfig) -> SymdexResult<Self> {
        let parser = AnnotationParser::with_pattern(&config.annotation_pattern)?;
        Ok(Indexer {
            toolchain,
            config,
            parser,
            ecosystem: None,
            modules: Vec::new(),
            packages: Vec::new(),
            records: Vec::new(),
            contracts: Vec::new(),
            functions: Vec::new(),
            main_module: None,
            module_by_path: HashMap::new(),
            package_by_id: HashMap::new(),
            record_by_id: HashMap::new(),
            contract_by_id: HashMap::new(),
            function_by_id: HashMap::new(),
            records_by_annotation: HashMap::new(),
            contracts_by_annotation: HashMap::new(),
            functions_by_annotation: HashMap::new(),
        })
    }

    /// Configuration the index was built with.
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// The toolchain loads are resolved through.
    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    // ------------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------------

    /// Load the configured source patterns.
    pub fn load(&mut self) -> SymdexResult<()> {
        let patterns = self.config.source_patterns.clone();
        self.load_pattern(&patterns)
    }

    /// Load `patterns` and everything they import.
    pub fn load_pattern<S: AsRef<str>>(&mut self, patterns: &[S]) -> SymdexResult<()> {
        let patterns: Vec<String> = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        let mode = LoadMode::BASE | self.config.load_mode;

        let mut graph = self
            .toolchain
            .resolve(mode, &patterns)
            .map_err(|e| SymdexError::resolution(&patterns, e.to_string()))?;
        let diagnostics = graph.diagnostics();
        if !diagnostics.is_empty() {
            let shown: Vec<&str> = diagnostics
                .iter()
                .take(MAX_REPORTED_DIAGNOSTICS)
                .map(String::as_str)
                .collect();
            return Err(SymdexError::resolution(
                &patterns,
                format!("{} diagnostics: {}", diagnostics.len(), shown.join("; ")),
            ));
        }
        if self.config.skip_ecosystem_packages {
            self.resolve_ecosystem(&patterns)?;
        }

        let types = Arc::new(std::mem::take(&mut graph.types));
        let planned = self.plan(&graph, &patterns)?;
        if self.config.debug {
            debug!(
                "load [{}]: {} roots, {} new packages",
                patterns.join(", "),
                graph.roots.len(),
                planned.len()
            );
        }

        let modules = mode.contains(LoadMode::MODULE);
        for item in planned {
            self.commit(item, &types, modules);
        }
        Ok(())
    }

    /// Fetch the ecosystem set from the configuration or, once, from the
    /// toolchain.
    fn resolve_ecosystem(&mut self, patterns: &[String]) -> SymdexResult<()> {
        if self.ecosystem.is_some() {
            return Ok(());
        }
        let ecosystem = match &self.config.ecosystem_packages {
            Some(configured) => configured.clone(),
            None => self
                .toolchain
                .ecosystem_packages()
                .map_err(|e| SymdexError::resolution(patterns, e.to_string()))?,
        };
        if self.config.debug {
            debug!("ecosystem packages: [{}]", ecosystem.join(", "));
        }
        self.ecosystem = Some(PatternSet::new(&ecosystem, None)?);
        Ok(())
    }

    fn is_ecosystem(&self, id: &str) -> bool {
        self.config.skip_ecosystem_packages
            && self.ecosystem.as_ref().is_some_and(|set| set.is_match(id))
    }

    /// Depth-first planning pass over the import graph.
    fn plan<'g>(
        &self,
        graph: &'g ResolvedGraph,
        patterns: &[String],
    ) -> SymdexResult<Vec<Planned<'g>>> {
        let mut visited = HashSet::new();
        let mut planned = Vec::new();
        for root in &graph.roots {
            let package = graph.package(root).ok_or_else(|| {
                SymdexError::resolution(patterns, format!("root package {root} was not resolved"))
            })?;
            self.visit(graph, package, &mut visited, &mut planned)?;
        }
        Ok(planned)
    }

    fn visit<'g>(
        &self,
        graph: &'g ResolvedGraph,
        package: &'g ResolvedPackage,
        visited: &mut HashSet<&'g str>,
        planned: &mut Vec<Planned<'g>>,
    ) -> SymdexResult<()> {
        let id = package.id.as_str();
        if self.is_ecosystem(id) {
            if self.config.debug {
                debug!("skipping ecosystem package {}", id);
            }
            return Ok(());
        }
        if self.package_by_id.contains_key(id) || !visited.insert(id) {
            return Ok(());
        }

        let catalog = DeclarationCatalog::build(package)?;
        planned.push(Planned { package, catalog });

        for import in &package.imports {
            let imported = graph
                .package(import)
                .ok_or_else(|| SymdexError::MissingImport {
                    package: id.to_string(),
                    import: import.clone(),
                })?;
            self.visit(graph, imported, visited, planned)?;
        }
        Ok(())
    }

    /// Add a planned package and classify its symbols.
    fn commit(&mut self, item: Planned<'_>, types: &Arc<TypeTable>, modules: bool) {
        let Planned { package: pkg, catalog } = item;
        let package_id = PackageId::new(self.packages.len() as u32);
        if self.config.debug {
            debug!("indexing package {} ({})", pkg.id, package_id);
        }

        let module = match (&pkg.module, modules) {
            (Some(data), true) => {
                self.ensure_module(&data.path, &data.version, data.main);
                Some(data.path.clone())
            }
            _ => None,
        };

        let mut package = Package {
            package_id,
            id: pkg.id.clone(),
            name: pkg.name.clone(),
            module,
            imports: pkg.imports.clone(),
            files: pkg.files.clone(),
            catalog: DeclarationCatalog::default(),
            records: Vec::new(),
            contracts: Vec::new(),
            functions: Vec::new(),
        };

        for object in &pkg.scope {
            match object.kind {
                ObjectKind::TypeName => match types.shape(object.ty) {
                    Some(Shape::Struct(Some(named), _)) => {
                        let decl = catalog.type_decl(&object.name).cloned();
                        let annotations = self.annotations(decl.as_ref().map(|d| d.doc_lines()));
                        let record_id = RecordId::new(self.records.len() as u32);
                        let record = Record::new(
                            record_id,
                            named,
                            object.ty,
                            Arc::clone(types),
                            annotations,
                            decl,
                        );
                        package.records.push(record_id);
                        self.insert_record(record);
                    }
                    Some(Shape::Interface(Some(named), interface)) => {
                        let decl = catalog.type_decl(&object.name).cloned();
                        let annotations = self.annotations(decl.as_ref().map(|d| d.doc_lines()));
                        let contract_id = ContractId::new(self.contracts.len() as u32);
                        package.contracts.push(contract_id);
                        self.insert_contract(Contract {
                            contract_id,
                            id: named.qualified_name(),
                            name: named.name.clone(),
                            package: named.package.clone(),
                            annotations,
                            declaration: decl,
                            methods: interface.methods.clone(),
                            ty: object.ty,
                        });
                    }
                    shape => {
                        let kind = shape.map_or("dangling", |s| s.category());
                        self.skipped(pkg, &object.name, kind);
                    }
                },
                ObjectKind::Func => {
                    let decl = catalog.function_decl(&object.name).cloned();
                    let annotations = self.annotations(decl.as_ref().map(|d| d.doc_lines()));
                    let function_id = FunctionId::new(self.functions.len() as u32);
                    package.functions.push(function_id);
                    self.insert_function(Function {
                        function_id,
                        id: qualified_id(&pkg.id, &object.name),
                        name: object.name.clone(),
                        package: pkg.id.clone(),
                        annotations,
                        declaration: decl,
                        signature: types.display(object.ty),
                    });
                }
                ObjectKind::TypeAlias => self.skipped(pkg, &object.name, "alias"),
                ObjectKind::Var => self.skipped(pkg, &object.name, "variable"),
                ObjectKind::Const => self.skipped(pkg, &object.name, "constant"),
            }
        }

        package.catalog = catalog;
        self.package_by_id.insert(package.id.clone(), package_id);
        self.packages.push(package);
    }

    fn annotations(&self, doc: Option<&[String]>) -> AnnotationSet {
        doc.map(|lines| self.parser.parse(lines)).unwrap_or_default()
    }

    fn skipped(&self, pkg: &ResolvedPackage, name: &str, kind: &str) {
        if self.config.debug {
            debug!("skipping {} {}.{}", kind, pkg.id, name);
        }
    }

    fn ensure_module(&mut self, path: &str, version: &str, main: bool) {
        if self.module_by_path.contains_key(path) {
            return;
        }
        let module_id = ModuleId::new(self.modules.len() as u32);
        if self.config.debug {
            debug!("indexing module {} {} ({})", path, version, module_id);
        }
        if main && self.main_module.is_none() {
            self.main_module = Some(module_id);
        }
        self.module_by_path.insert(path.to_string(), module_id);
        self.modules.push(Module::new(module_id, path, version, main));
    }

    fn insert_record(&mut self, record: Record) {
        for name in record.annotations.names() {
            self.records_by_annotation
                .entry(name.to_string())
                .or_default()
                .push(record.record_id);
        }
        self.record_by_id.insert(record.id.clone(), record.record_id);
        self.records.push(record);
    }

    fn insert_contract(&mut self, contract: Contract) {
        for name in contract.annotations.names() {
            self.contracts_by_annotation
                .entry(name.to_string())
                .or_default()
                .push(contract.contract_id);
        }
        self.contract_by_id
            .insert(contract.id.clone(), contract.contract_id);
        self.contracts.push(contract);
    }

    fn insert_function(&mut self, function: Function) {
        for name in function.annotations.names() {
            self.functions_by_annotation
                .entry(name.to_string())
                .or_default()
                .push(function.function_id);
        }
        self.function_by_id
            .insert(function.id.clone(), function.function_id);
        self.functions.push(function);
    }

    // ------------------------------------------------------------------------
    // Annotation queries
    // ------------------------------------------------------------------------

    /// Records annotated `name`, in indexing order.
    pub fn find_records_by_annotation(&self, name: &str) -> Vec<&Record> {
        self.records_by_annotation
            .get(name)
            .map(|ids| ids.iter().map(|&id| &self.records[id.index()]).collect())
            .unwrap_or_default()
    }

    /// Contracts annotated `name`, in indexing order.
    pub fn find_contracts_by_annotation(&self, name: &str) -> Vec<&Contract> {
        self.contracts_by_annotation
            .get(name)
            .map(|ids| ids.iter().map(|&id| &self.contracts[id.index()]).collect())
            .unwrap_or_default()
    }

    /// Functions annotated `name`, in indexing order.
    pub fn find_functions_by_annotation(&self, name: &str) -> Vec<&Function> {
        self.functions_by_annotation
            .get(name)
            .map(|ids| ids.iter().map(|&id| &self.functions[id.index()]).collect())
            .unwrap_or_default()
    }

    /// Records satisfying the contract `contract_id`, in indexing order.
    ///
    /// Returns `None` (and logs) for an unknown contract.
    pub fn find_implementations(&self, contract_id: &str) -> Option<Vec<&Record>> {
        let Some(contract) = self.contract(contract_id) else {
            warn!("find_implementations: unknown contract {}", contract_id);
            return None;
        };
        Some(conformance::implementations(&self.records, contract))
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    /// Package by id.
    pub fn package(&self, id: &str) -> Option<&Package> {
        self.package_by_id.get(id).map(|&pid| &self.packages[pid.index()])
    }

    /// Record by qualified id.
    pub fn record(&self, id: &str) -> Option<&Record> {
        self.record_by_id.get(id).map(|&rid| &self.records[rid.index()])
    }

    /// Contract by qualified id.
    pub fn contract(&self, id: &str) -> Option<&Contract> {
        self.contract_by_id
            .get(id)
            .map(|&cid| &self.contracts[cid.index()])
    }

    /// Function by qualified id.
    pub fn function(&self, id: &str) -> Option<&Function> {
        self.function_by_id
            .get(id)
            .map(|&fid| &self.functions[fid.index()])
    }

    /// Module by path.
    pub fn module(&self, path: &str) -> Option<&Module> {
        self.module_by_path
            .get(path)
            .map(|&mid| &self.modules[mid.index()])
    }

    /// Package by typed id.
    pub fn package_by_id(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.index())
    }

    /// Record by typed id.
    pub fn record_by_id(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.index())
    }

    /// Contract by typed id.
    pub fn contract_by_id(&self, id: ContractId) -> Option<&Contract> {
        self.contracts.get(id.index())
    }

    /// Function by typed id.
    pub fn function_by_id(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }

    /// Module by typed id.
    pub fn module_by_id(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.index())
    }

    /// Records declared directly in package `id`.
    pub fn records_of(&self, id: &str) -> Vec<&Record> {
        self.package(id)
            .map(|pkg| {
                pkg.records
                    .iter()
                    .map(|&rid| &self.records[rid.index()])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The module being analyzed: the first main module indexed.
    pub fn main_module(&self) -> Option<&Module> {
        self.main_module.and_then(|id| self.module_by_id(id))
    }

    // ------------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------------

    /// Packages in indexing order.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    /// Records in indexing order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Contracts in indexing order.
    pub fn contracts(&self) -> impl Iterator<Item = &Contract> {
        self.contracts.iter()
    }

    /// Functions in indexing order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    /// Modules in indexing order.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn contract_count(&self) -> usize {
        self.contracts.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl<T: SourceToolchain + std::fmt::Debug> std::fmt::Debug for Indexer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Indexer")
            .field("toolchain", &self.toolchain)
            .field("packages", &self.packages.len())
            .field("records", &self.records.len())
            .field("contracts", &self.contracts.len())
            .field("functions", &self.functions.len())
            .field("modules", &self.modules.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
