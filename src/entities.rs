//! Indexed entities: modules, packages, records, contracts and functions.
//!
//! Entities live in arena `Vec`s inside the [`Indexer`](crate::index::Indexer)
//! and are addressed by typed ids. Records, contracts and functions are
//! additionally keyed by their qualified id, `package + "." + name`.

use std::fmt;
use std::sync::Arc;

use symdex_core::annotation::AnnotationSet;
use symdex_core::error::SymdexResult;
use symdex_core::types::{Method, MethodSig, NamedType, StructType, TypeId, TypeTable};

use crate::catalog::{DeclarationCatalog, FunctionDecl, TypeDecl};
use crate::conformance;
use crate::walker::{self, FieldVisitor};

// ============================================================================
// ID Types
// ============================================================================

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(id: u32) -> Self {
                $name(id)
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Position of a [`Module`] in the index.
    ModuleId,
    "mod"
);
entity_id!(
    /// Position of a [`Package`] in the index.
    PackageId,
    "pkg"
);
entity_id!(
    /// Position of a [`Record`] in the index.
    RecordId,
    "rec"
);
entity_id!(
    /// Position of a [`Contract`] in the index.
    ContractId,
    "con"
);
entity_id!(
    /// Position of a [`Function`] in the index.
    FunctionId,
    "fn"
);

// ============================================================================
// Module and Package
// ============================================================================

/// A versioned source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub module_id: ModuleId,
    pub path: String,
    /// Last path segment.
    pub name: String,
    pub version: String,
    /// True for the module being analyzed.
    pub main: bool,
}

impl Module {
    pub fn new(module_id: ModuleId, path: &str, version: &str, main: bool) -> Self {
        Module {
            module_id,
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            version: version.to_string(),
            main,
        }
    }
}

/// A compilation unit, indexed at most once.
#[derive(Debug, Clone)]
pub struct Package {
    pub package_id: PackageId,
    /// Stable, path-like id.
    pub id: String,
    pub name: String,
    /// Path of the owning module, when module metadata was loaded.
    pub module: Option<String>,
    /// Direct imports, in toolchain order.
    pub imports: Vec<String>,
    pub files: Vec<String>,
    pub catalog: DeclarationCatalog,
    /// Directly declared records, in classification order.
    pub records: Vec<RecordId>,
    pub contracts: Vec<ContractId>,
    pub functions: Vec<FunctionId>,
}

// ============================================================================
// Record
// ============================================================================

/// A named record-shaped type.
#[derive(Debug, Clone)]
pub struct Record {
    pub record_id: RecordId,
    /// Qualified id, `package + "." + name`.
    pub id: String,
    pub name: String,
    pub package: String,
    pub annotations: AnnotationSet,
    pub declaration: Option<TypeDecl>,
    ty: TypeId,
    types: Arc<TypeTable>,
}

impl Record {
    pub(crate) fn new(
        record_id: RecordId,
        named: &NamedType,
        ty: TypeId,
        types: Arc<TypeTable>,
        annotations: AnnotationSet,
        declaration: Option<TypeDecl>,
    ) -> Self {
        Record {
            record_id,
            id: named.qualified_name(),
            name: named.name.clone(),
            package: named.package.clone(),
            annotations,
            declaration,
            ty,
            types,
        }
    }

    /// Type of the record in [`Record::types`].
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    /// Type table of the load that produced this record.
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    /// The named type.
    pub fn named(&self) -> Option<&NamedType> {
        self.types.named(self.ty)
    }

    /// The record's fields, in declaration order.
    pub fn shape(&self) -> Option<&StructType> {
        self.types.record_shape(self.ty).map(|(_, s)| s)
    }

    /// Number of direct fields, zero when the shape is unavailable.
    pub fn num_fields(&self) -> usize {
        self.shape().map(StructType::num_fields).unwrap_or(0)
    }

    /// Methods callable on the value form.
    pub fn value_methods(&self) -> impl Iterator<Item = &Method> + Clone {
        self.named().into_iter().flat_map(|n| n.value_methods())
    }

    /// Methods callable on the mutable-reference form.
    pub fn reference_methods(&self) -> impl Iterator<Item = &Method> + Clone {
        self.named().into_iter().flat_map(|n| n.reference_methods())
    }

    /// Returns true if either form of the record satisfies `contract`.
    pub fn implements(&self, contract: &Contract) -> bool {
        conformance::implements(self, contract)
    }

    /// Walk the record's field graph with `visitor`.
    pub fn fields<V: FieldVisitor + ?Sized>(&self, visitor: &mut V) -> SymdexResult<()> {
        walker::walk(self, visitor)
    }
}

// ============================================================================
// Contract and Function
// ============================================================================

/// A named method-set specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    pub contract_id: ContractId,
    pub id: String,
    pub name: String,
    pub package: String,
    pub annotations: AnnotationSet,
    pub declaration: Option<TypeDecl>,
    /// Required methods, flattened over embedded contracts.
    pub methods: Vec<MethodSig>,
    pub ty: TypeId,
}

/// A top-level callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub function_id: FunctionId,
    pub id: String,
    pub name: String,
    pub package: String,
    pub annotations: AnnotationSet,
    pub declaration: Option<FunctionDecl>,
    /// Canonical signature text.
    pub signature: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_display_with_prefix() {
        assert_eq!(RecordId::new(3).to_string(), "rec_3");
        assert_eq!(ContractId::new(0).to_string(), "con_0");
        assert_eq!(FunctionId::new(1).to_string(), "fn_1");
        assert_eq!(PackageId::new(2).to_string(), "pkg_2");
        assert_eq!(ModuleId::new(4).to_string(), "mod_4");
    }

    #[test]
    fn module_name_is_last_segment() {
        let module = Module::new(ModuleId::new(0), "github.com/acme/shop", "v1.2.0", true);
        assert_eq!(module.name, "shop");
        assert_eq!(Module::new(ModuleId::new(1), "local", "", false).name, "local");
    }
}
