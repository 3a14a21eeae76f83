//! A field visitor that records every hook call.

use symdex::types::{ArrayType, BasicType, InterfaceType, MapType, SliceType, StructType};
use symdex::walker::{FieldInfo, FieldVisitor, RecordNode};

/// One hook call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub hook: &'static str,
    /// Record type name for record hooks, field name otherwise.
    pub name: String,
    pub depth: usize,
    /// Names of the fields leading to a record level, innermost first.
    pub via: Vec<String>,
}

/// Records hook calls and prunes on request.
#[derive(Debug, Default)]
pub struct EventLog {
    pub events: Vec<Event>,
    /// Record type names whose level is skipped.
    pub skip_records: Vec<String>,
    /// Field names whose category hook is skipped.
    pub skip_fields: Vec<String>,
    /// When set, container and struct hooks refuse to descend.
    pub shallow: bool,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn shallow() -> Self {
        EventLog {
            shallow: true,
            ..EventLog::default()
        }
    }

    /// Events of one hook.
    pub fn of(&self, hook: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.hook == hook).collect()
    }

    /// `visit_field` events at `depth`, by field name.
    pub fn fields_at(&self, depth: usize) -> Vec<&str> {
        self.events
            .iter()
            .filter(|e| e.hook == "field" && e.depth == depth)
            .map(|e| e.name.as_str())
            .collect()
    }

    /// Category hook called for the first field named `name` at `depth`.
    pub fn category_of(&self, name: &str, depth: usize) -> Option<&'static str> {
        self.events
            .iter()
            .find(|e| {
                e.name == name
                    && e.depth == depth
                    && !matches!(e.hook, "field" | "leave_field" | "record" | "leave_record")
            })
            .map(|e| e.hook)
    }

    fn field(&mut self, hook: &'static str, field: &FieldInfo<'_>) {
        self.events.push(Event {
            hook,
            name: field.name().to_string(),
            depth: field.depth(),
            via: Vec::new(),
        });
    }
}

impl FieldVisitor for EventLog {
    fn visit_record(&mut self, node: &mut RecordNode<'_>) -> bool {
        let name = node.type_name();
        if self.skip_records.contains(&name) {
            return false;
        }
        let mut via = Vec::new();
        let mut parent = node.parent;
        while let Some(field) = parent {
            via.push(field.name().to_string());
            parent = field.node.parent;
        }
        self.events.push(Event {
            hook: "record",
            name,
            depth: node.depth,
            via,
        });
        true
    }

    fn leave_record(&mut self, node: &mut RecordNode<'_>) {
        self.events.push(Event {
            hook: "leave_record",
            name: node.type_name(),
            depth: node.depth,
            via: Vec::new(),
        });
    }

    fn visit_field(&mut self, field: &mut FieldInfo<'_>) -> bool {
        self.field("field", field);
        !self.skip_fields.iter().any(|f| f == field.name())
    }

    fn leave_field(&mut self, field: &mut FieldInfo<'_>) {
        self.field("leave_field", field);
    }

    fn visit_basic(&mut self, field: &mut FieldInfo<'_>, _basic: &BasicType) {
        self.field("basic", field);
    }

    fn visit_interface(&mut self, field: &mut FieldInfo<'_>, _interface: &InterfaceType) {
        self.field("interface", field);
    }

    fn visit_array(&mut self, field: &mut FieldInfo<'_>, _array: &ArrayType) -> bool {
        self.field("array", field);
        !self.shallow
    }

    fn visit_slice(&mut self, field: &mut FieldInfo<'_>, _slice: &SliceType) -> bool {
        self.field("slice", field);
        !self.shallow
    }

    fn visit_map(&mut self, field: &mut FieldInfo<'_>, _map: &MapType) -> (bool, bool) {
        self.field("map", field);
        (!self.shallow, !self.shallow)
    }

    fn visit_struct(&mut self, field: &mut FieldInfo<'_>, _record: &StructType) -> bool {
        self.field("struct", field);
        !self.shallow
    }
}
