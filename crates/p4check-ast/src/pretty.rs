//! Pretty printer for constraint expressions.
//!
//! Reconstructs surface syntax from the AST. Diagnostics prefer quoting
//! the original annotation text via [`crate::ConstraintSource`]; the
//! printer is the fallback for synthesized expressions and the workhorse
//! for test assertions.

use crate::ast::{ExprKind, Expression, UnaryOp};

/// Pretty print an expression to a string.
pub fn pretty_print_expr(expr: &Expression) -> String {
    let mut printer = PrettyPrinter::default();
    printer.print_expr(expr, 0);
    printer.output
}

#[derive(Default)]
struct PrettyPrinter {
    output: String,
}

impl PrettyPrinter {
    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    /// Print `expr`, parenthesizing if it binds looser than the
    /// enclosing precedence.
    fn print_expr(&mut self, expr: &Expression, enclosing: u8) {
        match &expr.kind {
            ExprKind::BoolLit(b) => self.write(if *b { "true" } else { "false" }),
            ExprKind::IntLit(n) => self.write(&n.to_string()),
            ExprKind::Key(name) | ExprKind::ActionParam(name) => self.write(name),
            ExprKind::Attribute(name) => {
                self.write("::");
                self.write(name);
            }
            ExprKind::FieldAccess { base, field } => {
                self.print_expr(base, u8::MAX);
                self.write("::");
                self.write(&field.to_string());
            }
            ExprKind::Unary { op, operand } => {
                self.write(&op.to_string());
                // - -x must not print as --x
                if matches!(op, UnaryOp::Neg) {
                    if let ExprKind::Unary {
                        op: UnaryOp::Neg, ..
                    } = operand.kind
                    {
                        self.write(" ");
                    }
                }
                self.print_expr(operand, u8::MAX);
            }
            ExprKind::Binary { op, left, right } => {
                let prec = op.precedence();
                let parenthesize = prec < enclosing;
                if parenthesize {
                    self.write("(");
                }
                // Left child of a right-associative operator (and vice
                // versa) needs one level tighter.
                let (left_prec, right_prec) = if op.is_right_assoc() {
                    (prec + 1, prec)
                } else {
                    (prec, prec + 1)
                };
                self.print_expr(left, left_prec);
                self.write(" ");
                self.write(&op.to_string());
                self.write(" ");
                self.print_expr(right, right_prec);
                if parenthesize {
                    self.write(")");
                }
            }
            // Casts are inserted by the type checker; they have no
            // surface syntax.
            ExprKind::TypeCast(operand) => self.print_expr(operand, enclosing),
            ExprKind::Conditional {
                cond,
                then_branch,
                else_branch,
            } => {
                let parenthesize = enclosing > 0;
                if parenthesize {
                    self.write("(");
                }
                self.print_expr(cond, 1);
                self.write(" ? ");
                self.print_expr(then_branch, 1);
                self.write(" : ");
                self.print_expr(else_branch, 0);
                if parenthesize {
                    self.write(")");
                }
            }
        }
    }
}
