//! Schema construction error types.

use thiserror::Error;

/// An error in the program metadata, detected while building the
/// registry. Fatal to that construction; no partial registry is
/// returned.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("duplicate table id {id} (tables \"{first}\" and \"{second}\")")]
    DuplicateTableId { id: u32, first: String, second: String },

    #[error("duplicate action id {id} (actions \"{first}\" and \"{second}\")")]
    DuplicateActionId { id: u32, first: String, second: String },

    #[error("table \"{table}\" declares duplicate match field id {id}")]
    DuplicateKeyId { table: String, id: u32 },

    #[error("table \"{table}\" declares duplicate match field name \"{name}\"")]
    DuplicateKeyName { table: String, name: String },

    #[error("action \"{action}\" declares duplicate parameter id {id}")]
    DuplicateParamId { action: String, id: u32 },

    #[error("action \"{action}\" declares duplicate parameter name \"{name}\"")]
    DuplicateParamName { action: String, name: String },

    #[error("match field \"{field}\" of table \"{table}\" has unsupported match kind")]
    UnsupportedMatchKind { table: String, field: String },

    #[error("match field \"{field}\" of table \"{table}\" has invalid bitwidth {bitwidth}")]
    InvalidKeyBitwidth {
        table: String,
        field: String,
        bitwidth: u32,
    },

    #[error("parameter \"{param}\" of action \"{action}\" has invalid bitwidth {bitwidth}")]
    InvalidParamBitwidth {
        action: String,
        param: String,
        bitwidth: u32,
    },
}

/// Result type for schema construction.
pub type DefinitionResult<T> = Result<T, DefinitionError>;
