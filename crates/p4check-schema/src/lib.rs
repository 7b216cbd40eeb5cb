//! Program-derived schema registry for p4check constraint checking.
//!
//! [`ConstraintInfo`] is built once from the program metadata handed
//! over by the external P4Info extractor and is read-only afterwards:
//! per-table key metadata, per-action parameter metadata, and the
//! attached constraint AST with its source text for quoting. Immutable
//! after construction, it may be shared by concurrent evaluations.

pub mod error;
pub mod metadata;
pub mod registry;

pub use error::{DefinitionError, DefinitionResult};
pub use metadata::{
    ActionMetadata, AnnotatedConstraint, MatchFieldMetadata, MatchKind, ParamMetadata,
    TableMetadata,
};
pub use registry::{
    attribute_info, ActionInfo, AttributeInfo, ConstraintInfo, KeyInfo, ParamInfo, TableInfo,
};
