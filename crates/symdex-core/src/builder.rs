//! Programmatic construction of [`ResolvedGraph`]s.
//!
//! [`GraphBuilder`] keeps the syntax, scope and type table of each package in
//! step: declaring a record adds the struct and named types, a scope entry
//! and a type declaration in one call. Toolchains that already have a
//! resolved program in memory, and tests, use it instead of assembling the
//! adapter types by hand.
//!
//! ```
//! use symdex_core::builder::GraphBuilder;
//! use symdex_core::types::FieldDef;
//!
//! let mut b = GraphBuilder::new();
//! let string = b.basic("string");
//! b.record("example.com/app", "User", vec![FieldDef::new("Name", string)]);
//! b.document("example.com/app", "User", ["//test:test"]);
//! b.root("example.com/app");
//!
//! let graph = b.build();
//! assert_eq!(graph.roots, vec!["example.com/app"]);
//! assert_eq!(graph.package("example.com/app").unwrap().scope.len(), 1);
//! ```

use crate::adapter::{
    DeclSpec, Declaration, Diagnostic, DocComment, ModuleData, ObjectKind, ResolvedGraph,
    ResolvedPackage, ScopeObject, SpecShape, SyntaxFile,
};
use crate::types::{
    ArrayType, BasicType, FieldDef, InterfaceType, MapType, Method, MethodSig, NamedType,
    SliceType, StructType, TypeId, TypeKind, TypeTable,
};

/// Incremental builder for a [`ResolvedGraph`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: ResolvedGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder::default()
    }

    /// Finish and return the graph.
    pub fn build(self) -> ResolvedGraph {
        self.graph
    }

    /// Type table under construction.
    pub fn types(&self) -> &TypeTable {
        &self.graph.types
    }

    // ------------------------------------------------------------------------
    // Packages
    // ------------------------------------------------------------------------

    /// Package `id`, created on first use with one source file.
    ///
    /// The package name defaults to the last path segment of `id`.
    pub fn package(&mut self, id: &str) -> &mut ResolvedPackage {
        self.graph
            .packages
            .entry(id.to_string())
            .or_insert_with(|| {
                let name = id.rsplit('/').next().unwrap_or(id).to_string();
                let file = format!("{id}/{name}.src");
                ResolvedPackage {
                    id: id.to_string(),
                    name,
                    files: vec![file.clone()],
                    syntax: vec![SyntaxFile {
                        path: file,
                        declarations: Vec::new(),
                    }],
                    ..Default::default()
                }
            })
    }

    /// Mark `id` as matched by the load patterns.
    pub fn root(&mut self, id: &str) -> &mut Self {
        self.package(id);
        if !self.graph.roots.iter().any(|r| r == id) {
            self.graph.roots.push(id.to_string());
        }
        self
    }

    /// Add a direct import edge. Both packages are created if needed.
    pub fn import(&mut self, from: &str, to: &str) -> &mut Self {
        self.package(to);
        let pkg = self.package(from);
        if !pkg.imports.iter().any(|i| i == to) {
            pkg.imports.push(to.to_string());
        }
        self
    }

    /// Attach module metadata to a package.
    pub fn module(&mut self, id: &str, path: &str, version: &str, main: bool) -> &mut Self {
        self.package(id).module = Some(ModuleData {
            path: path.to_string(),
            version: version.to_string(),
            main,
        });
        self
    }

    /// Attach a toolchain diagnostic to a package.
    pub fn diagnostic(&mut self, id: &str, message: &str) -> &mut Self {
        self.package(id).diagnostics.push(Diagnostic {
            position: None,
            message: message.to_string(),
        });
        self
    }

    /// Append a raw declaration to the package's source file.
    pub fn declaration(&mut self, id: &str, declaration: Declaration) -> &mut Self {
        let pkg = self.package(id);
        if let Some(file) = pkg.syntax.first_mut() {
            file.declarations.push(declaration);
        }
        self
    }

    /// Append a raw scope object.
    pub fn scope_object(
        &mut self,
        id: &str,
        name: &str,
        kind: ObjectKind,
        ty: TypeId,
    ) -> &mut Self {
        self.package(id).scope.push(ScopeObject {
            name: name.to_string(),
            kind,
            ty,
        });
        self
    }

    // ------------------------------------------------------------------------
    // Anonymous types
    // ------------------------------------------------------------------------

    pub fn basic(&mut self, name: &str) -> TypeId {
        self.graph.types.push(TypeKind::Basic(BasicType {
            name: name.to_string(),
        }))
    }

    pub fn array(&mut self, elem: TypeId, len: u64) -> TypeId {
        self.graph.types.push(TypeKind::Array(ArrayType { elem, len }))
    }

    pub fn slice(&mut self, elem: TypeId) -> TypeId {
        self.graph.types.push(TypeKind::Slice(SliceType { elem }))
    }

    pub fn map(&mut self, key: TypeId, value: TypeId) -> TypeId {
        self.graph.types.push(TypeKind::Map(MapType { key, value }))
    }

    pub fn pointer(&mut self, elem: TypeId) -> TypeId {
        self.graph.types.push(TypeKind::Pointer { elem })
    }

    pub fn signature(&mut self, text: &str) -> TypeId {
        self.graph.types.push(TypeKind::Signature {
            text: text.to_string(),
        })
    }

    pub fn other(&mut self, description: &str) -> TypeId {
        self.graph.types.push(TypeKind::Other {
            description: description.to_string(),
        })
    }

    /// Anonymous struct.
    pub fn struct_type(&mut self, fields: Vec<FieldDef>) -> TypeId {
        self.graph.types.push(TypeKind::Struct(StructType { fields }))
    }

    /// Anonymous interface.
    pub fn interface_type(&mut self, methods: Vec<MethodSig>) -> TypeId {
        self.graph
            .types
            .push(TypeKind::Interface(InterfaceType { methods }))
    }

    // ------------------------------------------------------------------------
    // Declared symbols
    // ------------------------------------------------------------------------

    /// Declare a named type over an existing underlying type.
    ///
    /// Adds the named type, a `TypeName` scope entry and a type declaration
    /// whose spec shape follows the underlying kind.
    pub fn named(&mut self, package: &str, name: &str, underlying: TypeId) -> TypeId {
        let shape = match self.graph.types.get(underlying) {
            Some(TypeKind::Struct(_)) => SpecShape::Record,
            Some(TypeKind::Interface(_)) => SpecShape::Contract,
            _ => SpecShape::Other,
        };
        let id = self.graph.types.push(TypeKind::Named(NamedType {
            package: package.to_string(),
            name: name.to_string(),
            underlying,
            methods: Vec::new(),
        }));
        self.scope_object(package, name, ObjectKind::TypeName, id);
        self.declaration(
            package,
            Declaration::Group {
                doc: None,
                specs: vec![DeclSpec::Type {
                    name: name.to_string(),
                    shape,
                    doc: None,
                }],
            },
        );
        id
    }

    /// Declare a record with no fields yet; see [`GraphBuilder::define_fields`].
    ///
    /// Used for self-referencing and mutually recursive records.
    pub fn reserve_record(&mut self, package: &str, name: &str) -> TypeId {
        let underlying = self.struct_type(Vec::new());
        self.named(package, name, underlying)
    }

    /// Set the fields of a record declared earlier.
    pub fn define_fields(&mut self, record: TypeId, fields: Vec<FieldDef>) {
        if let Some(underlying) = self.graph.types.named(record).map(|n| n.underlying) {
            self.graph
                .types
                .set(underlying, TypeKind::Struct(StructType { fields }));
        }
    }

    /// Declare a record.
    pub fn record(&mut self, package: &str, name: &str, fields: Vec<FieldDef>) -> TypeId {
        let id = self.reserve_record(package, name);
        self.define_fields(id, fields);
        id
    }

    /// Declare a contract.
    pub fn contract(&mut self, package: &str, name: &str, methods: Vec<MethodSig>) -> TypeId {
        let underlying = self.interface_type(methods);
        self.named(package, name, underlying)
    }

    /// Declare a type alias. Aliases have a scope entry and a declaration but
    /// no named type of their own.
    pub fn alias(&mut self, package: &str, name: &str, target: TypeId) -> &mut Self {
        self.scope_object(package, name, ObjectKind::TypeAlias, target);
        self.declaration(
            package,
            Declaration::Group {
                doc: None,
                specs: vec![DeclSpec::Type {
                    name: name.to_string(),
                    shape: SpecShape::Other,
                    doc: None,
                }],
            },
        )
    }

    /// Declare a package-level variable.
    pub fn var(&mut self, package: &str, name: &str, ty: TypeId) -> &mut Self {
        self.scope_object(package, name, ObjectKind::Var, ty);
        self.declaration(
            package,
            Declaration::Group {
                doc: None,
                specs: vec![DeclSpec::Value {
                    names: vec![name.to_string()],
                }],
            },
        )
    }

    /// Declare a package-level constant.
    pub fn constant(&mut self, package: &str, name: &str, ty: TypeId) -> &mut Self {
        self.scope_object(package, name, ObjectKind::Const, ty);
        self.declaration(
            package,
            Declaration::Group {
                doc: None,
                specs: vec![DeclSpec::Value {
                    names: vec![name.to_string()],
                }],
            },
        )
    }

    /// Declare a top-level function.
    pub fn function(&mut self, package: &str, name: &str, signature: &str) -> TypeId {
        let ty = self.signature(signature);
        self.scope_object(package, name, ObjectKind::Func, ty);
        self.declaration(
            package,
            Declaration::Function {
                name: name.to_string(),
                doc: None,
                receiver: None,
            },
        );
        ty
    }

    /// Attach a method to a named type, with its declaration.
    pub fn method(&mut self, named: TypeId, method: Method) -> &mut Self {
        let Some(TypeKind::Named(target)) = self.graph.types.get_mut(named) else {
            return self;
        };
        let package = target.package.clone();
        let receiver = target.name.clone();
        let name = method.name.clone();
        target.methods.push(method);
        self.declaration(
            &package,
            Declaration::Function {
                name,
                doc: None,
                receiver: Some(receiver),
            },
        )
    }

    /// Set the doc comment of the declaration named `name` in `package`.
    ///
    /// For types the comment lands on the enclosing group, the usual place
    /// for a comment above a single `type X ...` line.
    pub fn document<I, S>(&mut self, package: &str, name: &str, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let comment = DocComment::new(lines);
        let target = self
            .package(package)
            .syntax
            .iter_mut()
            .flat_map(|f| f.declarations.iter_mut())
            .find(|decl| declares(decl, name));
        match target {
            Some(Declaration::Function { doc, .. }) | Some(Declaration::Group { doc, .. }) => {
                *doc = Some(comment);
            }
            _ => {}
        }
        self
    }
}

/// Returns true if `decl` declares the top-level type or function `name`.
fn declares(decl: &Declaration, name: &str) -> bool {
    match decl {
        Declaration::Function {
            name: fn_name,
            receiver: None,
            ..
        } => fn_name == name,
        Declaration::Group { specs, .. } => specs
            .iter()
            .any(|s| matches!(s, DeclSpec::Type { name: n, .. } if n == name)),
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
