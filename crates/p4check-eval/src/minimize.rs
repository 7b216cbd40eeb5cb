//! Minimal-subexpression explanation for constraint verdicts.
//!
//! Given a boolean root expression and the cache populated while
//! evaluating it, finds the smallest subexpression whose value under
//! the current binding is sufficient to force the root's verdict: for
//! any hypothetical binding in which that subexpression evaluates
//! differently, the root would too. Descent reads only the caches and
//! never re-evaluates, so operands dropped by short-circuiting stay
//! untouched, and the total work across verdict and explanation is
//! linear in the expression size.

use crate::bind::EvaluationContext;
use crate::error::InternalError;
use crate::eval::{eval_to_bool, quote, EvalCache};
use p4check_ast::{subtree_size, BinOp, ExprKind, Expression, SizeCache, UnaryOp};

/// Find the smallest subexpression of `expression` that decides its
/// verdict under `context`.
///
/// `eval_cache` is the cache populated by [`crate::eval::eval`] during
/// the verdict pass; if the root has no entry yet (no prior pass), one
/// verdict pass is run here to populate it. `size_cache` memoizes
/// subtree node counts.
pub fn minimal_subexpression_leading_to_eval_result<'e>(
    expression: &'e Expression,
    context: &EvaluationContext,
    eval_cache: &mut EvalCache,
    size_cache: &mut SizeCache,
) -> Result<&'e Expression, InternalError> {
    if !eval_cache.contains_key(&expression.id) {
        eval_to_bool(expression, context, Some(eval_cache))?;
    }
    descend(expression, context, eval_cache, size_cache)
}

fn descend<'e>(
    expr: &'e Expression,
    context: &EvaluationContext,
    eval_cache: &EvalCache,
    size_cache: &mut SizeCache,
) -> Result<&'e Expression, InternalError> {
    let value = require_cached(expr, context, eval_cache)?;

    match &expr.kind {
        // A negation's verdict is decided exactly where its operand's
        // is.
        ExprKind::Unary {
            op: UnaryOp::Not,
            operand,
        } => descend(operand, context, eval_cache, size_cache),

        ExprKind::Binary { op, left, right } if op.is_logical() => {
            // Each connective either has a single deciding operand
            // (short-circuit polarity) or needs both operands; in the
            // latter case both subexplanations are computed and the
            // smaller one returned.
            let (left_decides, right_decides) = match op {
                // a && b is false where an operand is false, true only
                // because both are true.
                BinOp::And => {
                    if !value {
                        (cached(left, eval_cache) == Some(false),
                         cached(right, eval_cache) == Some(false))
                    } else {
                        (true, true)
                    }
                }
                // Dual.
                BinOp::Or => {
                    if value {
                        (cached(left, eval_cache) == Some(true),
                         cached(right, eval_cache) == Some(true))
                    } else {
                        (true, true)
                    }
                }
                // a -> b behaves as !a || b.
                BinOp::Implies => {
                    if value {
                        (cached(left, eval_cache) == Some(false),
                         cached(right, eval_cache) == Some(true))
                    } else {
                        (true, true)
                    }
                }
                _ => unreachable!("is_logical covers And, Or, Implies"),
            };

            match (left_decides, right_decides) {
                (true, false) => descend(left, context, eval_cache, size_cache),
                (false, true) => descend(right, context, eval_cache, size_cache),
                (true, true) if single_decider(*op, value) => {
                    // Two independent deciders; explain inside the
                    // smaller one (tie-break: left).
                    if subtree_size(right, size_cache) < subtree_size(left, size_cache) {
                        descend(right, context, eval_cache, size_cache)
                    } else {
                        descend(left, context, eval_cache, size_cache)
                    }
                }
                (true, true) => {
                    // Both operands are needed; return the smaller of
                    // the two explanations (tie-break: left).
                    let from_left = descend(left, context, eval_cache, size_cache)?;
                    let from_right = descend(right, context, eval_cache, size_cache)?;
                    Ok(smaller(from_left, from_right, size_cache))
                }
                (false, false) => Err(InternalError::InconsistentCache {
                    fragment: quote(expr, context),
                    location: context.source.locate(expr.span),
                }),
            }
        }

        ExprKind::Conditional {
            cond,
            then_branch,
            else_branch,
        } => {
            // The verdict is decided by the condition together with
            // the branch it selected; the untaken branch was never
            // evaluated.
            let taken = if require_cached(cond, context, eval_cache)? {
                then_branch
            } else {
                else_branch
            };
            let from_cond = descend(cond, context, eval_cache, size_cache)?;
            let from_branch = descend(taken, context, eval_cache, size_cache)?;
            Ok(smaller(from_cond, from_branch, size_cache))
        }

        // Leaves and boolean nodes over non-boolean operands
        // (comparisons): the node itself is the smallest decider.
        _ => Ok(expr),
    }
}

/// Whether a connective with this cached value is decided by a single
/// operand under short-circuit semantics.
fn single_decider(op: BinOp, value: bool) -> bool {
    match op {
        BinOp::And => !value,
        BinOp::Or | BinOp::Implies => value,
        _ => unreachable!("is_logical covers And, Or, Implies"),
    }
}

/// The smaller of two subexpressions by subtree size; `a` on ties.
fn smaller<'e>(
    a: &'e Expression,
    b: &'e Expression,
    size_cache: &mut SizeCache,
) -> &'e Expression {
    if subtree_size(b, size_cache) < subtree_size(a, size_cache) {
        b
    } else {
        a
    }
}

fn cached(expr: &Expression, eval_cache: &EvalCache) -> Option<bool> {
    eval_cache.get(&expr.id).copied()
}

fn require_cached(
    expr: &Expression,
    context: &EvaluationContext,
    eval_cache: &EvalCache,
) -> Result<bool, InternalError> {
    cached(expr, eval_cache).ok_or_else(|| InternalError::MissingCachedResult {
        fragment: quote(expr, context),
        location: context.source.locate(expr.span),
    })
}
