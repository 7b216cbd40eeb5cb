//! Abstract syntax tree for constraint expressions.
//!
//! Expressions arrive here already parsed and type-checked. Every node
//! carries a [`NodeId`] that is unique within its constraint; caches in
//! the evaluator are keyed on these ids, never on structural equality,
//! so distinct occurrences of syntactically equal subexpressions stay
//! distinct.

use crate::source::Span;
use crate::types::Type;
use num_bigint::BigInt;
use std::fmt;

/// Stable identity of an AST node within one constraint expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Node id generator, owned by whoever constructs an expression tree.
#[derive(Debug, Clone, Default)]
pub struct NodeIdGen {
    next_id: u32,
}

impl NodeIdGen {
    /// Create a new generator.
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Generate a fresh node id.
    pub fn fresh(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// A typed constraint expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    /// Stable node identity, unique within the constraint.
    pub id: NodeId,
    /// Source span within the annotation text.
    pub span: Span,
    /// Type inferred by the external checker.
    pub ty: Type,
    pub kind: ExprKind,
}

impl Expression {
    pub fn new(id: NodeId, span: Span, ty: Type, kind: ExprKind) -> Self {
        Self { id, span, ty, kind }
    }

    /// Direct children, in evaluation order.
    pub fn children(&self) -> Vec<&Expression> {
        match &self.kind {
            ExprKind::BoolLit(_)
            | ExprKind::IntLit(_)
            | ExprKind::Key(_)
            | ExprKind::ActionParam(_)
            | ExprKind::Attribute(_) => Vec::new(),
            ExprKind::FieldAccess { base, .. } => vec![base],
            ExprKind::Unary { operand, .. } => vec![operand],
            ExprKind::TypeCast(operand) => vec![operand],
            ExprKind::Binary { left, right, .. } => vec![left, right],
            ExprKind::Conditional {
                cond,
                then_branch,
                else_branch,
            } => vec![cond, then_branch, else_branch],
        }
    }
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Boolean literal.
    BoolLit(bool),
    /// Integer literal (arbitrary precision).
    IntLit(BigInt),
    /// Reference to a table key, by name.
    Key(String),
    /// Reference to an action parameter, by name.
    ActionParam(String),
    /// Access to a built-in entry attribute, `::priority`.
    Attribute(String),
    /// Access to a component of a match-key value, `key::mask`.
    FieldAccess {
        base: Box<Expression>,
        field: MatchValueField,
    },
    /// Unary operation.
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    /// Binary operation.
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// Cast to the node's own type, inserted by the type checker
    /// (e.g. widening an integer literal to the key kind it is
    /// compared against).
    TypeCast(Box<Expression>),
    /// Conditional `cond ? then : else`.
    Conditional {
        cond: Box<Expression>,
        then_branch: Box<Expression>,
        else_branch: Box<Expression>,
    },
}

/// A named component of a match-key value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchValueField {
    /// `value` of an exact, ternary, or LPM key.
    Value,
    /// `mask` of a ternary key.
    Mask,
    /// `prefix_length` of an LPM key.
    PrefixLength,
    /// `low` bound of a range key.
    Low,
    /// `high` bound of a range key.
    High,
}

impl fmt::Display for MatchValueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchValueField::Value => "value",
            MatchValueField::Mask => "mask",
            MatchValueField::PrefixLength => "prefix_length",
            MatchValueField::Low => "low",
            MatchValueField::High => "high",
        };
        write!(f, "{}", name)
    }
}

/// Unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Boolean negation `!`.
    Not,
    /// Arithmetic negation `-`.
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

/// Binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    And,
    Or,
    Implies,

    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,

    // Arithmetic
    Add,
    Sub,
}

impl BinOp {
    /// Get the precedence of this operator (higher = binds tighter).
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Implies => 1,
            BinOp::Or => 2,
            BinOp::And => 3,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 4,
            BinOp::Add | BinOp::Sub => 5,
        }
    }

    /// Check if this operator is right-associative.
    pub fn is_right_assoc(self) -> bool {
        matches!(self, BinOp::Implies)
    }

    /// Check if this is a short-circuiting boolean connective.
    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or | BinOp::Implies)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Implies => "->",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
        };
        write!(f, "{}", symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_gen() {
        let mut gen = NodeIdGen::new();
        let a = gen.fresh();
        let b = gen.fresh();
        assert_ne!(a, b);
        assert_eq!(a, NodeId(0));
        assert_eq!(b, NodeId(1));
    }

    #[test]
    fn test_binop_precedence() {
        // Arithmetic binds tighter than comparison
        assert!(BinOp::Add.precedence() > BinOp::Eq.precedence());
        // Comparison binds tighter than and
        assert!(BinOp::Eq.precedence() > BinOp::And.precedence());
        // And binds tighter than or
        assert!(BinOp::And.precedence() > BinOp::Or.precedence());
        // Or binds tighter than implies
        assert!(BinOp::Or.precedence() > BinOp::Implies.precedence());
    }

    #[test]
    fn test_children_order() {
        let mut gen = NodeIdGen::new();
        let left = Expression::new(
            gen.fresh(),
            Span::dummy(),
            Type::Bool,
            ExprKind::BoolLit(true),
        );
        let right = Expression::new(
            gen.fresh(),
            Span::dummy(),
            Type::Bool,
            ExprKind::BoolLit(false),
        );
        let left_id = left.id;
        let right_id = right.id;
        let and = Expression::new(
            gen.fresh(),
            Span::dummy(),
            Type::Bool,
            ExprKind::Binary {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            },
        );
        let children = and.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id, left_id);
        assert_eq!(children[1].id, right_id);
    }
}
