//! Typed expression AST, source spans, and quoting for p4check constraints.
//!
//! The AST defined here is the hand-over point from the external parser
//! and type checker: every node carries its source span, its inferred
//! type, and a stable [`NodeId`] assigned at construction. The evaluator
//! keys its caches on node ids, so ids must be unique within one
//! constraint expression.

pub mod ast;
pub mod pretty;
pub mod size;
pub mod source;
pub mod types;

pub use ast::{BinOp, ExprKind, Expression, MatchValueField, NodeId, NodeIdGen, UnaryOp};
pub use pretty::pretty_print_expr;
pub use size::{subtree_size, SizeCache};
pub use source::{ConstraintSource, SourceLocation, Span};
pub use types::Type;
