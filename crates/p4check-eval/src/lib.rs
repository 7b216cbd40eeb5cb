//! Constraint evaluator and violation minimizer for p4check.
//!
//! Answers, for a table entry or action invocation installed against a
//! P4 program: does it satisfy the constraint attached to its table or
//! action, and if not, why not? The public surface is
//! [`reason_entry_violates_constraint`] and
//! [`reason_action_violates_constraint`]: an empty string means the
//! constraint is satisfied, a non-empty string is a human-readable
//! reason quoting the smallest subexpression responsible for the
//! violation.
//!
//! The lower layers (wire decoding, binding, [`eval`], the minimizer)
//! are public for testing.

pub mod bind;
pub mod entry;
pub mod error;
pub mod eval;
pub mod minimize;
pub mod reason;
pub mod value;
pub mod wire;

pub use bind::{
    parse_action, parse_table_entry, ActionBinding, Binding, EvaluationContext, TableBinding,
};
pub use entry::{ActionInvocation, FieldMatch, FieldMatchValue, ParamValue, TableEntry};
pub use error::{CheckError, InputError, InternalError};
pub use eval::{eval, eval_to_bool, EvalCache};
pub use minimize::minimal_subexpression_leading_to_eval_result;
pub use reason::{reason_action_violates_constraint, reason_entry_violates_constraint};
pub use value::{EvalResult, Exact, Integer, Lpm, Range, Ternary};
