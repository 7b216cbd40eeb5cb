//! Wire-format table entries and action invocations.
//!
//! These are the runtime hand-over types: the shape a forwarding-plane
//! client submits, with integers still in their canonical big-endian
//! byte-string encoding. The binder in [`crate::bind`] turns them into
//! fully-populated bindings against a table or action schema.

/// A table entry as installed through the runtime API.
#[derive(Debug, Clone)]
pub struct TableEntry {
    pub table_id: u32,
    /// Entry priority; must be non-negative.
    pub priority: i32,
    /// Match field values. Keys of kind ternary, LPM, or range may be
    /// omitted to mean "match anything"; exact keys must be present.
    pub matches: Vec<FieldMatch>,
}

/// One match field of a table entry.
#[derive(Debug, Clone)]
pub struct FieldMatch {
    pub field_id: u32,
    pub value: FieldMatchValue,
}

/// The value of a match field, tagged by match kind. All byte strings
/// are canonical big-endian encodings of non-negative integers.
#[derive(Debug, Clone)]
pub enum FieldMatchValue {
    Exact {
        value: Vec<u8>,
    },
    Ternary {
        value: Vec<u8>,
        mask: Vec<u8>,
    },
    Lpm {
        value: Vec<u8>,
        prefix_length: i32,
    },
    Range {
        low: Vec<u8>,
        high: Vec<u8>,
    },
}

impl FieldMatchValue {
    /// The match kind this wire value encodes, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldMatchValue::Exact { .. } => "exact",
            FieldMatchValue::Ternary { .. } => "ternary",
            FieldMatchValue::Lpm { .. } => "lpm",
            FieldMatchValue::Range { .. } => "range",
        }
    }
}

/// An action invocation as submitted through the runtime API.
#[derive(Debug, Clone)]
pub struct ActionInvocation {
    pub action_id: u32,
    pub params: Vec<ParamValue>,
}

/// One parameter of an action invocation.
#[derive(Debug, Clone)]
pub struct ParamValue {
    pub param_id: u32,
    pub value: Vec<u8>,
}
