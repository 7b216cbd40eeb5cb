//! Error types for binding and evaluation.
//!
//! Three disjoint failure domains cover the whole system: definition
//! errors (schema construction, in `p4check-schema`), input errors
//! (an entry or invocation fails to map onto the schema), and internal
//! errors (a malformed AST or type-tag mismatch, indicating a bug in
//! the external parser or type checker). A violated constraint is not
//! an error; it is a non-empty reason string.

use p4check_ast::SourceLocation;
use thiserror::Error;

/// An entry or action invocation that cannot be bound against the
/// schema. The entry is rejected before any constraint is evaluated.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("table entry refers to unknown table id {id}")]
    UnknownTable { id: u32 },

    #[error("action invocation refers to unknown action id {id}")]
    UnknownAction { id: u32 },

    #[error("entry for table \"{table}\" has unknown match field id {id}")]
    UnknownMatchField { table: String, id: u32 },

    #[error("entry for table \"{table}\" sets match field id {id} more than once")]
    DuplicateMatchField { table: String, id: u32 },

    #[error(
        "entry for table \"{table}\" sends a {wire_kind} value for key \"{key}\" of type {declared}"
    )]
    MatchKindMismatch {
        table: String,
        key: String,
        declared: String,
        wire_kind: &'static str,
    },

    #[error("entry for table \"{table}\" omits exact key \"{key}\"")]
    MissingExactKey { table: String, key: String },

    #[error("entry for table \"{table}\" has negative priority {priority}")]
    NegativePriority { table: String, priority: i32 },

    #[error(
        "value of {what} \"{name}\" needs {actual_bits} bits but is declared with bitwidth {bitwidth}"
    )]
    ValueTooWide {
        /// "key" or "parameter".
        what: &'static str,
        name: String,
        bitwidth: u32,
        actual_bits: u64,
    },

    #[error(
        "ternary key \"{key}\" is not canonical: value {value} has bits set outside mask {mask}"
    )]
    NonCanonicalTernary {
        key: String,
        value: String,
        mask: String,
    },

    #[error(
        "lpm key \"{key}\" is not canonical: value {value} has bits set below prefix length {prefix_length}"
    )]
    NonCanonicalLpm {
        key: String,
        value: String,
        prefix_length: i32,
    },

    #[error(
        "lpm key \"{key}\" has prefix length {prefix_length} outside [0, {bitwidth}]"
    )]
    InvalidPrefixLength {
        key: String,
        prefix_length: i32,
        bitwidth: u32,
    },

    #[error("range key \"{key}\" is inverted: low {low} exceeds high {high}")]
    InvertedRange {
        key: String,
        low: String,
        high: String,
    },

    #[error("invocation of action \"{action}\" has unknown parameter id {id}")]
    UnknownActionParam { action: String, id: u32 },

    #[error("invocation of action \"{action}\" sets parameter id {id} more than once")]
    DuplicateActionParam { action: String, id: u32 },

    #[error("invocation of action \"{action}\" omits parameter \"{param}\"")]
    MissingActionParam { action: String, param: String },
}

/// A malformed AST observed during evaluation: a type-tag mismatch, an
/// unresolved name, or an impossible cast. These indicate bugs in the
/// external parser or type checker, never in the entry under check.
/// Each variant quotes the offending source fragment and its location.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("expected {expected}, got {actual}, when evaluating \"{fragment}\" at {location}")]
    TypeTagMismatch {
        expected: String,
        actual: String,
        fragment: String,
        location: SourceLocation,
    },

    #[error("\"{name}\" does not resolve in this context, in \"{fragment}\" at {location}")]
    UnresolvedName {
        name: String,
        fragment: String,
        location: SourceLocation,
    },

    #[error("unknown attribute \"{name}\" in \"{fragment}\" at {location}")]
    UnknownAttribute {
        name: String,
        fragment: String,
        location: SourceLocation,
    },

    #[error("cannot cast {from} to {to} in \"{fragment}\" at {location}")]
    InvalidCast {
        from: String,
        to: String,
        fragment: String,
        location: SourceLocation,
    },

    #[error(
        "match value of kind {actual} has no field \"{field}\", in \"{fragment}\" at {location}"
    )]
    NoSuchField {
        actual: String,
        field: String,
        fragment: String,
        location: SourceLocation,
    },

    #[error(
        "explanation reached \"{fragment}\" at {location} with no cached boolean result; \
         the expression cannot have evaluated to a boolean"
    )]
    MissingCachedResult {
        fragment: String,
        location: SourceLocation,
    },

    #[error(
        "cached operand results contradict the cached result of \"{fragment}\" at {location}"
    )]
    InconsistentCache {
        fragment: String,
        location: SourceLocation,
    },
}

/// Any non-value outcome of the top-level check.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}
