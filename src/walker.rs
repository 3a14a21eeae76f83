//! Recursive walk over a record's field graph.
//!
//! [`Record::fields`](crate::entities::Record::fields) drives a
//! [`FieldVisitor`] depth-first through the record's fields and, where the
//! visitor asks for it, through records nested in fields, sequences and
//! associative containers.
//!
//! # Hook order
//!
//! For every record level (a [`RecordNode`]):
//!
//! 1. `visit_record`; returning false skips the whole level, including
//!    `leave_record`
//! 2. for each field, in declaration order:
//!    - `visit_field`; returning false skips only the category hook below
//!    - exactly one category hook, chosen from the field type's shape after
//!      unwrapping at most one named layer: `visit_basic`,
//!      `visit_interface`, `visit_array`, `visit_slice`, `visit_map` or
//!      `visit_struct`. Pointers, callables and other kinds get none.
//!    - `leave_field`
//! 3. `leave_record`
//!
//! The container hooks return whether to descend. Descending into an array
//! or slice element, a map key or value, or a nested struct opens a new
//! level at `depth + 1` when the target is record-shaped.
//!
//! # Cycles
//!
//! The walker keeps the named records of the current path on a stack.
//! Descending into a record already on it fails the walk with
//! [`SymdexError::CycleDetected`]. Reaching the same record twice through
//! sibling fields is not a cycle.

use std::collections::BTreeMap;

use symdex_core::error::{SymdexError, SymdexResult};
use symdex_core::tag::FieldTag;
use symdex_core::types::{
    ArrayType, BasicType, FieldDef, InterfaceType, MapType, NamedType, Shape, SliceType,
    StructType, TypeId, TypeTable,
};
use tracing::trace;

use crate::entities::Record;

/// Caller-owned scratch data attached to nodes and fields during a walk.
pub type Metadata = BTreeMap<String, serde_json::Value>;

// ============================================================================
// Nodes
// ============================================================================

/// One nesting level of a walk.
#[derive(Debug)]
pub struct RecordNode<'a> {
    /// The record the walk started from; set on the root node only.
    pub record: Option<&'a Record>,
    /// The field this level was reached through; `None` at the root.
    pub parent: Option<&'a FieldInfo<'a>>,
    /// Named identity of the record type, if it has one.
    pub named: Option<&'a NamedType>,
    pub ty: TypeId,
    pub shape: &'a StructType,
    /// 0 at the root, +1 per nesting level.
    pub depth: usize,
    pub metadata: Metadata,
    types: &'a TypeTable,
}

impl<'a> RecordNode<'a> {
    /// Type table the walked types live in.
    pub fn types(&self) -> &'a TypeTable {
        self.types
    }

    /// Qualified name of the record type, or its rendered form when
    /// anonymous.
    pub fn type_name(&self) -> String {
        match self.named {
            Some(named) => named.qualified_name(),
            None => self.types.display(self.ty),
        }
    }

    pub fn num_fields(&self) -> usize {
        self.shape.num_fields()
    }
}

/// One field of a [`RecordNode`].
#[derive(Debug)]
pub struct FieldInfo<'a> {
    /// The level this field belongs to.
    pub node: &'a RecordNode<'a>,
    /// Position in the record's field list.
    pub index: usize,
    pub def: &'a FieldDef,
    pub metadata: Metadata,
}

impl<'a> FieldInfo<'a> {
    pub fn name(&self) -> &'a str {
        &self.def.name
    }

    pub fn ty(&self) -> TypeId {
        self.def.ty
    }

    pub fn depth(&self) -> usize {
        self.node.depth
    }

    pub fn is_embedded(&self) -> bool {
        self.def.embedded
    }

    /// Shape of the field type; `None` for a dangling type id.
    pub fn shape(&self) -> Option<Shape<'a>> {
        self.node.types.shape(self.def.ty)
    }

    /// Named identity of the field type, if it has one.
    pub fn named(&self) -> Option<&'a NamedType> {
        self.shape().and_then(|s| s.named())
    }

    /// Rendered field type, e.g. `[]example.com/app.Order`.
    pub fn type_name(&self) -> String {
        self.node.types.display(self.def.ty)
    }

    /// Raw metadata string.
    pub fn tag(&self) -> FieldTag<'a> {
        FieldTag::new(&self.def.tag)
    }

    /// Metadata value for `key` with a found flag.
    pub fn tag_value(&self, key: &str) -> (String, bool) {
        self.tag().get(key)
    }
}

// ============================================================================
// Visitor
// ============================================================================

/// Hooks called during a field walk. Every hook has a default that keeps
/// walking.
#[allow(unused_variables)]
pub trait FieldVisitor {
    /// Entering a record level. Returning false skips the level entirely.
    fn visit_record(&mut self, node: &mut RecordNode<'_>) -> bool {
        true
    }

    /// Leaving a record level whose `visit_record` returned true.
    fn leave_record(&mut self, node: &mut RecordNode<'_>) {}

    /// Entering a field. Returning false skips its category hook.
    fn visit_field(&mut self, field: &mut FieldInfo<'_>) -> bool {
        true
    }

    /// Leaving a field. Called even when `visit_field` returned false.
    fn leave_field(&mut self, field: &mut FieldInfo<'_>) {}

    /// Scalar field. Leaf.
    fn visit_basic(&mut self, field: &mut FieldInfo<'_>, basic: &BasicType) {}

    /// Method-set field. Leaf.
    fn visit_interface(&mut self, field: &mut FieldInfo<'_>, interface: &InterfaceType) {}

    /// Fixed-length sequence. Returns whether to descend into a
    /// record-shaped element.
    fn visit_array(&mut self, field: &mut FieldInfo<'_>, array: &ArrayType) -> bool {
        true
    }

    /// Variable-length sequence. Returns whether to descend into a
    /// record-shaped element.
    fn visit_slice(&mut self, field: &mut FieldInfo<'_>, slice: &SliceType) -> bool {
        true
    }

    /// Associative container. Returns whether to descend into a
    /// record-shaped key and value, independently.
    fn visit_map(&mut self, field: &mut FieldInfo<'_>, map: &MapType) -> (bool, bool) {
        (true, true)
    }

    /// Nested record. Returns whether to descend into it.
    fn visit_struct(&mut self, field: &mut FieldInfo<'_>, record: &StructType) -> bool {
        true
    }
}

// ============================================================================
// Walk
// ============================================================================

/// Walk `record` with `visitor`.
pub(crate) fn walk<V: FieldVisitor + ?Sized>(
    record: &Record,
    visitor: &mut V,
) -> SymdexResult<()> {
    let types = record.types();
    let Some((named, shape)) = types.record_shape(record.ty()) else {
        return Ok(());
    };
    let mut node = RecordNode {
        record: Some(record),
        parent: None,
        named,
        ty: record.ty(),
        shape,
        depth: 0,
        metadata: Metadata::new(),
        types,
    };
    let mut walker = Walker { path: Vec::new() };
    walker.walk_node(&mut node, visitor)
}

struct Walker {
    /// Qualified names of the named records on the current path.
    path: Vec<String>,
}

impl Walker {
    fn walk_node<V: FieldVisitor + ?Sized>(
        &mut self,
        node: &mut RecordNode<'_>,
        visitor: &mut V,
    ) -> SymdexResult<()> {
        if !visitor.visit_record(node) {
            return Ok(());
        }
        let named = node.named.map(NamedType::qualified_name);
        if let Some(name) = &named {
            self.path.push(name.clone());
        }
        trace!("walking {} at depth {}", node.type_name(), node.depth);

        let fields = node.shape;
        for (index, def) in fields.fields.iter().enumerate() {
            let mut field = FieldInfo {
                node: &*node,
                index,
                def,
                metadata: Metadata::new(),
            };
            if visitor.visit_field(&mut field) {
                self.dispatch(&mut field, visitor)?;
            }
            visitor.leave_field(&mut field);
        }

        visitor.leave_record(node);
        if named.is_some() {
            self.path.pop();
        }
        Ok(())
    }

    /// Call the field's category hook and descend where it asks to.
    fn dispatch<V: FieldVisitor + ?Sized>(
        &mut self,
        field: &mut FieldInfo<'_>,
        visitor: &mut V,
    ) -> SymdexResult<()> {
        match field.shape() {
            Some(Shape::Basic(_, basic)) => visitor.visit_basic(field, basic),
            Some(Shape::Interface(_, interface)) => visitor.visit_interface(field, interface),
            Some(Shape::Array(_, array)) => {
                if visitor.visit_array(field, array) {
                    self.descend(field, array.elem, visitor)?;
                }
            }
            Some(Shape::Slice(_, slice)) => {
                if visitor.visit_slice(field, slice) {
                    self.descend(field, slice.elem, visitor)?;
                }
            }
            Some(Shape::Map(_, map)) => {
                let (key, value) = visitor.visit_map(field, map);
                if key {
                    self.descend(field, map.key, visitor)?;
                }
                if value {
                    self.descend(field, map.value, visitor)?;
                }
            }
            Some(Shape::Struct(_, record)) => {
                if visitor.visit_struct(field, record) {
                    self.descend(field, field.ty(), visitor)?;
                }
            }
            Some(Shape::Other(..)) | None => {}
        }
        Ok(())
    }

    /// Open a new level for `ty` if it is record-shaped.
    fn descend<V: FieldVisitor + ?Sized>(
        &mut self,
        field: &FieldInfo<'_>,
        ty: TypeId,
        visitor: &mut V,
    ) -> SymdexResult<()> {
        let types = field.node.types;
        let Some((named, shape)) = types.record_shape(ty) else {
            return Ok(());
        };
        if let Some(named) = named {
            let name = named.qualified_name();
            if self.path.contains(&name) {
                let mut path = self.path.clone();
                path.push(name);
                return Err(SymdexError::CycleDetected { path });
            }
        }
        let mut child = RecordNode {
            record: None,
            parent: Some(field),
            named,
            ty,
            shape,
            depth: field.node.depth + 1,
            metadata: Metadata::new(),
            types,
        };
        self.walk_node(&mut child, visitor)
    }
}

// ============================================================================
// Tests
// ============================================================================
