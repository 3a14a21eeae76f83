//! Per-package declaration catalog.
//!
//! The toolchain's scope tells the index *what* a package declares; the
//! catalog maps each declared name back to the declaration that wrote it, so
//! the index can read doc comments (and through them, annotations).
//!
//! A catalog is built once per package, before classification, from every
//! top-level declaration of every source file:
//! - grouped declarations contribute their type specs; value and import
//!   specs are skipped
//! - function declarations without a receiver are cataloged as functions;
//!   methods are not top-level symbols
//! - any other declaration kind fails the build with
//!   [`SymdexError::UnsupportedDeclarationKind`]

use std::collections::HashMap;

use symdex_core::adapter::{DeclSpec, Declaration, DocComment, ResolvedPackage, SpecShape};
use symdex_core::error::{SymdexError, SymdexResult};

/// Cataloged type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    /// Record-shaped, contract-shaped or neither, as written.
    pub shape: SpecShape,
    /// The spec's own doc comment, else the enclosing group's.
    pub doc: Option<DocComment>,
    /// Source file holding the declaration.
    pub file: String,
}

impl TypeDecl {
    /// Doc comment lines, empty when there is no comment.
    pub fn doc_lines(&self) -> &[String] {
        self.doc.as_ref().map(|d| d.lines.as_slice()).unwrap_or(&[])
    }
}

/// Cataloged function declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub doc: Option<DocComment>,
    pub file: String,
}

impl FunctionDecl {
    /// Doc comment lines, empty when there is no comment.
    pub fn doc_lines(&self) -> &[String] {
        self.doc.as_ref().map(|d| d.lines.as_slice()).unwrap_or(&[])
    }
}

/// Name → declaration maps for one package.
///
/// Declarations keep source order; a name declared twice resolves to the
/// later declaration.
#[derive(Debug, Clone, Default)]
pub struct DeclarationCatalog {
    types: Vec<TypeDecl>,
    functions: Vec<FunctionDecl>,
    type_by_name: HashMap<String, usize>,
    function_by_name: HashMap<String, usize>,
}

impl DeclarationCatalog {
    /// Scan the top-level declarations of `package`.
    pub fn build(package: &ResolvedPackage) -> SymdexResult<Self> {
        let mut catalog = DeclarationCatalog::default();
        for file in &package.syntax {
            for decl in &file.declarations {
                match decl {
                    Declaration::Group { doc, specs } => {
                        for spec in specs {
                            if let DeclSpec::Type {
                                name,
                                shape,
                                doc: spec_doc,
                            } = spec
                            {
                                let doc = spec_doc
                                    .as_ref()
                                    .filter(|d| !d.is_empty())
                                    .or(doc.as_ref())
                                    .cloned();
                                catalog.insert_type(TypeDecl {
                                    name: name.clone(),
                                    shape: *shape,
                                    doc,
                                    file: file.path.clone(),
                                });
                            }
                        }
                    }
                    Declaration::Function {
                        name,
                        doc,
                        receiver: None,
                    } => {
                        catalog.insert_function(FunctionDecl {
                            name: name.clone(),
                            doc: doc.clone(),
                            file: file.path.clone(),
                        });
                    }
                    Declaration::Function {
                        receiver: Some(_), ..
                    } => {}
                    Declaration::Other { kind } => {
                        return Err(SymdexError::unsupported_declaration(
                            package.id.as_str(),
                            file.path.as_str(),
                            kind.as_str(),
                        ));
                    }
                }
            }
        }
        Ok(catalog)
    }

    fn insert_type(&mut self, decl: TypeDecl) {
        self.type_by_name
            .insert(decl.name.clone(), self.types.len());
        self.types.push(decl);
    }

    fn insert_function(&mut self, decl: FunctionDecl) {
        self.function_by_name
            .insert(decl.name.clone(), self.functions.len());
        self.functions.push(decl);
    }

    /// Type declaration by name.
    pub fn type_decl(&self, name: &str) -> Option<&TypeDecl> {
        self.type_by_name.get(name).map(|&i| &self.types[i])
    }

    /// Function declaration by name.
    pub fn function_decl(&self, name: &str) -> Option<&FunctionDecl> {
        self.function_by_name.get(name).map(|&i| &self.functions[i])
    }

    /// Type declarations in source order.
    pub fn type_decls(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter()
    }

    /// Function declarations in source order.
    pub fn function_decls(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len() + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.functions.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
