//! Resolved type graph supplied by the toolchain.
//!
//! Types live in a [`TypeTable`] arena and refer to each other through
//! [`TypeId`] indices, so recursive and mutually recursive named types need no
//! shared ownership. A table belongs to one [`ResolvedGraph`]; ids from two
//! different graphs must never be mixed.
//!
//! [`TypeTable::shape`] is the single classification point used by the index
//! (record vs. contract vs. function) and by the field walker (category
//! dispatch). It unwraps at most one named layer and reports the named
//! identity next to the unwrapped payload.
//!
//! [`ResolvedGraph`]: crate::adapter::ResolvedGraph

use serde::{Deserialize, Serialize};

// ============================================================================
// ID Types
// ============================================================================

/// Index of a type in a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Create a new type ID.
    pub fn new(id: u32) -> Self {
        TypeId(id)
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "type_{}", self.0)
    }
}

// ============================================================================
// Type Kinds
// ============================================================================

/// A predeclared scalar type (`string`, `int`, `bool`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicType {
    pub name: String,
}

/// Fixed-length sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayType {
    pub elem: TypeId,
    pub len: u64,
}

/// Variable-length sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceType {
    pub elem: TypeId,
}

/// Associative container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapType {
    pub key: TypeId,
    pub value: TypeId,
}

/// One field of a record-shaped type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub ty: TypeId,
    /// Raw metadata string, e.g. `json:"name" db:"user_name"`.
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub embedded: bool,
}

impl FieldDef {
    /// Create a field with no metadata.
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        FieldDef {
            name: name.into(),
            ty,
            tag: String::new(),
            embedded: false,
        }
    }

    /// Attach a raw metadata string.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Mark the field as embedded.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }
}

/// Record-shaped composite: ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructType {
    pub fields: Vec<FieldDef>,
}

impl StructType {
    /// Number of fields.
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Field at `index`.
    pub fn field(&self, index: usize) -> Option<&FieldDef> {
        self.fields.get(index)
    }
}

/// Method required by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    /// Canonical signature text, compared verbatim, e.g. `func() string`.
    pub signature: String,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, signature: impl Into<String>) -> Self {
        MethodSig {
            name: name.into(),
            signature: signature.into(),
        }
    }
}

/// Pure method-set specification. `methods` is already flattened over any
/// embedded contracts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceType {
    pub methods: Vec<MethodSig>,
}

/// How a method is bound to its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    /// Declared against the value form; callable on both forms.
    #[default]
    Value,
    /// Declared against the mutable-reference form only.
    Reference,
}

/// A method declared on a named type, including promoted methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: String,
    #[serde(default)]
    pub receiver: Receiver,
}

impl Method {
    /// Method bound to the value form.
    pub fn value(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Method {
            name: name.into(),
            signature: signature.into(),
            receiver: Receiver::Value,
        }
    }

    /// Method bound to the reference form.
    pub fn reference(name: impl Into<String>, signature: impl Into<String>) -> Self {
        Method {
            name: name.into(),
            signature: signature.into(),
            receiver: Receiver::Reference,
        }
    }

    /// Returns true if this method satisfies `required`.
    pub fn matches(&self, required: &MethodSig) -> bool {
        self.name == required.name && self.signature == required.signature
    }
}

/// A declared type name with its underlying shape and method set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    /// Id of the declaring package.
    pub package: String,
    pub name: String,
    pub underlying: TypeId,
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl NamedType {
    /// Qualified id: `package + "." + name`.
    pub fn qualified_name(&self) -> String {
        qualified_id(&self.package, &self.name)
    }

    /// Methods callable on the value form.
    pub fn value_methods(&self) -> impl Iterator<Item = &Method> + Clone {
        self.methods
            .iter()
            .filter(|m| m.receiver == Receiver::Value)
    }

    /// Methods callable on the reference form: every method.
    pub fn reference_methods(&self) -> impl Iterator<Item = &Method> + Clone {
        self.methods.iter()
    }
}

/// One entry of the type arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Basic(BasicType),
    Array(ArrayType),
    Slice(SliceType),
    Map(MapType),
    Struct(StructType),
    Interface(InterfaceType),
    Pointer { elem: TypeId },
    /// Callable type; the text is the canonical signature.
    Signature { text: String },
    Named(NamedType),
    /// Anything else the toolchain resolves (channels, tuples, ...).
    Other { description: String },
}

/// Qualified id scheme shared by records, contracts and functions.
pub fn qualified_id(package: &str, name: &str) -> String {
    format!("{package}.{name}")
}

// ============================================================================
// Shape Classification
// ============================================================================

/// Category of a type after unwrapping at most one named layer.
///
/// Every variant carries the named identity (if the classified type was a
/// named type) next to the unwrapped payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape<'t> {
    Basic(Option<&'t NamedType>, &'t BasicType),
    Array(Option<&'t NamedType>, &'t ArrayType),
    Slice(Option<&'t NamedType>, &'t SliceType),
    Map(Option<&'t NamedType>, &'t MapType),
    Struct(Option<&'t NamedType>, &'t StructType),
    Interface(Option<&'t NamedType>, &'t InterfaceType),
    /// Pointers, callables, nested named layers and other kinds.
    Other(Option<&'t NamedType>, &'t TypeKind),
}

impl<'t> Shape<'t> {
    /// Named identity of the classified type, if any.
    pub fn named(&self) -> Option<&'t NamedType> {
        match *self {
            Shape::Basic(n, _)
            | Shape::Array(n, _)
            | Shape::Slice(n, _)
            | Shape::Map(n, _)
            | Shape::Struct(n, _)
            | Shape::Interface(n, _)
            | Shape::Other(n, _) => n,
        }
    }

    /// Short category label for logs and tests.
    pub fn category(&self) -> &'static str {
        match self {
            Shape::Basic(..) => "basic",
            Shape::Array(..) => "array",
            Shape::Slice(..) => "slice",
            Shape::Map(..) => "map",
            Shape::Struct(..) => "struct",
            Shape::Interface(..) => "interface",
            Shape::Other(..) => "other",
        }
    }
}

// ============================================================================
// Type Table
// ============================================================================

/// Arena of resolved types. Serializes as a plain array; a type's id is its
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTable {
    types: Vec<TypeKind>,
}

impl TypeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        TypeTable::default()
    }

    /// Append a type and return its id.
    pub fn push(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(kind);
        id
    }

    /// Replace the type at `id`. Used to close recursive named types after
    /// reserving their slot.
    pub fn set(&mut self, id: TypeId, kind: TypeKind) {
        if let Some(slot) = self.types.get_mut(id.index()) {
            *slot = kind;
        }
    }

    /// Look up a type.
    pub fn get(&self, id: TypeId) -> Option<&TypeKind> {
        self.types.get(id.index())
    }

    /// Mutable access, for builders that attach methods after the fact.
    pub fn get_mut(&mut self, id: TypeId) -> Option<&mut TypeKind> {
        self.types.get_mut(id.index())
    }

    /// Number of types in the table.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the table holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Named type at `id`, if it is one.
    pub fn named(&self, id: TypeId) -> Option<&NamedType> {
        match self.get(id)? {
            TypeKind::Named(named) => Some(named),
            _ => None,
        }
    }

    /// Classify `id`, unwrapping at most one named layer.
    ///
    /// Returns `None` only for dangling ids.
    pub fn shape(&self, id: TypeId) -> Option<Shape<'_>> {
        match self.get(id)? {
            TypeKind::Named(named) => {
                let underlying = self.get(named.underlying)?;
                Some(Self::unwrapped(Some(named), underlying))
            }
            kind => Some(Self::unwrapped(None, kind)),
        }
    }

    fn unwrapped<'t>(named: Option<&'t NamedType>, kind: &'t TypeKind) -> Shape<'t> {
        match kind {
            TypeKind::Basic(t) => Shape::Basic(named, t),
            TypeKind::Array(t) => Shape::Array(named, t),
            TypeKind::Slice(t) => Shape::Slice(named, t),
            TypeKind::Map(t) => Shape::Map(named, t),
            TypeKind::Struct(t) => Shape::Struct(named, t),
            TypeKind::Interface(t) => Shape::Interface(named, t),
            other => Shape::Other(named, other),
        }
    }

    /// Record-shaped view of `id`: an anonymous struct, or a named type whose
    /// underlying type is a struct.
    pub fn record_shape(&self, id: TypeId) -> Option<(Option<&NamedType>, &StructType)> {
        match self.shape(id)? {
            Shape::Struct(named, record) => Some((named, record)),
            _ => None,
        }
    }

    /// Render a type as readable text, e.g. `map[string][]pkg.User`.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            None => format!("<dangling {id}>"),
            Some(TypeKind::Basic(b)) => b.name.clone(),
            Some(TypeKind::Array(a)) => format!("[{}]{}", a.len, self.display(a.elem)),
            Some(TypeKind::Slice(s)) => format!("[]{}", self.display(s.elem)),
            Some(TypeKind::Map(m)) => {
                format!("map[{}]{}", self.display(m.key), self.display(m.value))
            }
            Some(TypeKind::Struct(s)) => format!("struct{{{} fields}}", s.num_fields()),
            Some(TypeKind::Interface(i)) => format!("interface{{{} methods}}", i.methods.len()),
            Some(TypeKind::Pointer { elem }) => format!("*{}", self.display(*elem)),
            Some(TypeKind::Signature { text }) => text.clone(),
            Some(TypeKind::Named(n)) => n.qualified_name(),
            Some(TypeKind::Other { description }) => description.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
