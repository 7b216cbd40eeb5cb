//! Expression evaluator for constraints.
//!
//! [`eval`] walks a typed AST over a binding and produces an
//! [`EvalResult`]. Boolean connectives short-circuit strictly left to
//! right; the dropped operand is never evaluated, and constraints may
//! rely on this. Every step checks its operands' runtime tags before
//! consuming them, so a bug in the external type checker surfaces as
//! an [`InternalError`] quoting the offending source span, never as a
//! wrong verdict.

use crate::bind::{Binding, EvaluationContext};
use crate::error::InternalError;
use crate::value::{EvalResult, Exact, Integer, Lpm, Range, Ternary};
use crate::wire::all_ones;
use num_bigint::BigInt;
use num_traits::One;
use p4check_ast::{
    pretty_print_expr, BinOp, ExprKind, Expression, MatchValueField, NodeId, Type, UnaryOp,
};
use p4check_schema::attribute_info;
use std::collections::HashMap;
use std::mem::discriminant;

/// Memoizes boolean results by node identity, so that a later
/// explanation pass can re-read any evaluated subexpression without
/// re-descending. One cache per top-level evaluation; passing `None`
/// disables caching.
pub type EvalCache = HashMap<NodeId, bool>;

/// Evaluate `expr` over the binding in `context`.
///
/// If a cache is provided, boolean-typed nodes store their result
/// keyed by node id and are not re-descended on a hit. Operands
/// dropped by short-circuiting have no cache entry.
pub fn eval(
    expr: &Expression,
    context: &EvaluationContext,
    mut cache: Option<&mut EvalCache>,
) -> Result<EvalResult, InternalError> {
    if expr.ty == Type::Bool {
        if let Some(cache) = cache.as_deref_mut() {
            if let Some(&hit) = cache.get(&expr.id) {
                return Ok(EvalResult::Bool(hit));
            }
        }
    }
    let result = eval_uncached(expr, context, cache.as_deref_mut())?;
    if expr.ty == Type::Bool {
        if let (Some(cache), EvalResult::Bool(b)) = (cache, &result) {
            cache.insert(expr.id, *b);
        }
    }
    Ok(result)
}

/// Same as [`eval`], but asserts the result is a boolean.
pub fn eval_to_bool(
    expr: &Expression,
    context: &EvaluationContext,
    cache: Option<&mut EvalCache>,
) -> Result<bool, InternalError> {
    let result = eval(expr, context, cache)?;
    result
        .as_bool()
        .ok_or_else(|| tag_mismatch("bool", &result, expr, context))
}

fn eval_uncached(
    expr: &Expression,
    context: &EvaluationContext,
    mut cache: Option<&mut EvalCache>,
) -> Result<EvalResult, InternalError> {
    match &expr.kind {
        ExprKind::BoolLit(b) => Ok(EvalResult::Bool(*b)),

        ExprKind::IntLit(n) => Ok(EvalResult::Int(n.clone())),

        ExprKind::Key(name) => match &context.binding {
            Binding::Table(table) => table
                .keys
                .get(name)
                .cloned()
                .ok_or_else(|| unresolved(name, expr, context)),
            Binding::Action(_) => Err(unresolved(name, expr, context)),
        },

        ExprKind::ActionParam(name) => match &context.binding {
            Binding::Action(action) => action
                .params
                .get(name)
                .cloned()
                .map(EvalResult::Int)
                .ok_or_else(|| unresolved(name, expr, context)),
            Binding::Table(_) => Err(unresolved(name, expr, context)),
        },

        ExprKind::Attribute(name) => {
            match (attribute_info(name), &context.binding) {
                (Some(_), Binding::Table(table)) if name == "priority" => {
                    Ok(EvalResult::Int(table.priority.clone()))
                }
                (Some(_), Binding::Action(_)) => {
                    Err(unresolved(&format!("::{}", name), expr, context))
                }
                // Registered but not handled here, or not registered
                // at all: either way the AST refers to an attribute
                // the evaluator does not know.
                _ => Err(InternalError::UnknownAttribute {
                    name: name.clone(),
                    fragment: quote(expr, context),
                    location: context.source.locate(expr.span),
                }),
            }
        }

        ExprKind::FieldAccess { base, field } => {
            let base_value = eval(base, context, cache)?;
            let component = match (&base_value, field) {
                (EvalResult::Exact(v), MatchValueField::Value) => &v.value,
                (EvalResult::Ternary(v), MatchValueField::Value) => &v.value,
                (EvalResult::Ternary(v), MatchValueField::Mask) => &v.mask,
                (EvalResult::Lpm(v), MatchValueField::Value) => &v.value,
                (EvalResult::Lpm(v), MatchValueField::PrefixLength) => &v.prefix_length,
                (EvalResult::Range(v), MatchValueField::Low) => &v.low,
                (EvalResult::Range(v), MatchValueField::High) => &v.high,
                _ => {
                    return Err(InternalError::NoSuchField {
                        actual: base_value.type_name().to_string(),
                        field: field.to_string(),
                        fragment: quote(expr, context),
                        location: context.source.locate(expr.span),
                    });
                }
            };
            Ok(EvalResult::Int(component.clone()))
        }

        ExprKind::Unary { op, operand } => match op {
            UnaryOp::Not => {
                let value = eval(operand, context, cache)?;
                let b = expect_bool(value, operand, context)?;
                Ok(EvalResult::Bool(!b))
            }
            UnaryOp::Neg => {
                let value = eval(operand, context, cache)?;
                let n = expect_int(value, operand, context)?;
                Ok(EvalResult::Int(-n))
            }
        },

        ExprKind::Binary { op, left, right } => match op {
            // Short-circuit connectives, strictly left to right: the
            // dropped operand is not evaluated and gets no cache entry.
            BinOp::And => {
                if !eval_operand_bool(left, context, cache.as_deref_mut())? {
                    return Ok(EvalResult::Bool(false));
                }
                let b = eval_operand_bool(right, context, cache)?;
                Ok(EvalResult::Bool(b))
            }
            BinOp::Or => {
                if eval_operand_bool(left, context, cache.as_deref_mut())? {
                    return Ok(EvalResult::Bool(true));
                }
                let b = eval_operand_bool(right, context, cache)?;
                Ok(EvalResult::Bool(b))
            }
            BinOp::Implies => {
                if !eval_operand_bool(left, context, cache.as_deref_mut())? {
                    return Ok(EvalResult::Bool(true));
                }
                let b = eval_operand_bool(right, context, cache)?;
                Ok(EvalResult::Bool(b))
            }

            BinOp::Eq | BinOp::Ne => {
                let lhs = eval(left, context, cache.as_deref_mut())?;
                let rhs = eval(right, context, cache)?;
                if discriminant(&lhs) != discriminant(&rhs) {
                    return Err(tag_mismatch(lhs.type_name(), &rhs, right, context));
                }
                let equal = lhs == rhs;
                Ok(EvalResult::Bool(if *op == BinOp::Eq { equal } else { !equal }))
            }

            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let lhs = eval_operand_int(left, context, cache.as_deref_mut())?;
                let rhs = eval_operand_int(right, context, cache)?;
                let holds = match op {
                    BinOp::Lt => lhs < rhs,
                    BinOp::Le => lhs <= rhs,
                    BinOp::Gt => lhs > rhs,
                    BinOp::Ge => lhs >= rhs,
                    _ => unreachable!(),
                };
                Ok(EvalResult::Bool(holds))
            }

            BinOp::Add | BinOp::Sub => {
                let lhs = eval_operand_int(left, context, cache.as_deref_mut())?;
                let rhs = eval_operand_int(right, context, cache)?;
                let value = match op {
                    BinOp::Add => lhs + rhs,
                    BinOp::Sub => lhs - rhs,
                    _ => unreachable!(),
                };
                Ok(EvalResult::Int(value))
            }
        },

        ExprKind::TypeCast(operand) => {
            let value = eval(operand, context, cache)?;
            let value = expect_int(value, operand, context)?;
            match expr.ty {
                // Truncate to the low `bitwidth` bits.
                Type::FixedUnsigned { bitwidth } => {
                    Ok(EvalResult::Int(truncate_to_width(value, bitwidth)))
                }
                Type::Exact { .. } => Ok(EvalResult::Exact(Exact { value })),
                // A mask of all ones behaves as exact.
                Type::Ternary { bitwidth } => Ok(EvalResult::Ternary(Ternary {
                    value,
                    mask: all_ones(bitwidth),
                })),
                // A full-length prefix behaves as exact.
                Type::Lpm { bitwidth } => Ok(EvalResult::Lpm(Lpm {
                    value,
                    prefix_length: Integer::from(bitwidth),
                })),
                Type::Range { .. } => Ok(EvalResult::Range(Range {
                    low: value.clone(),
                    high: value,
                })),
                Type::Bool | Type::Int => Err(InternalError::InvalidCast {
                    from: "int".to_string(),
                    to: expr.ty.to_string(),
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
            // Exactly one branch is evaluated.
            if eval_operand_bool(cond, context, cache.as_deref_mut())? {
                eval(then_branch, context, cache)
            } else {
                eval(else_branch, context, cache)
            }
        }
    }
}

fn eval_operand_bool(
    operand: &Expression,
    context: &EvaluationContext,
    cache: Option<&mut EvalCache>,
) -> Result<bool, InternalError> {
    let value = eval(operand, context, cache)?;
    expect_bool(value, operand, context)
}

fn eval_operand_int(
    operand: &Expression,
    context: &EvaluationContext,
    cache: Option<&mut EvalCache>,
) -> Result<Integer, InternalError> {
    let value = eval(operand, context, cache)?;
    expect_int(value, operand, context)
}

fn expect_bool(
    value: EvalResult,
    operand: &Expression,
    context: &EvaluationContext,
) -> Result<bool, InternalError> {
    match value {
        EvalResult::Bool(b) => Ok(b),
        other => Err(tag_mismatch("bool", &other, operand, context)),
    }
}

fn expect_int(
    value: EvalResult,
    operand: &Expression,
    context: &EvaluationContext,
) -> Result<Integer, InternalError> {
    match value {
        EvalResult::Int(n) => Ok(n),
        other => Err(tag_mismatch("int", &other, operand, context)),
    }
}

/// Reduce a signed value into `[0, 2^bitwidth)`.
fn truncate_to_width(value: Integer, bitwidth: u32) -> Integer {
    let modulus = BigInt::one() << bitwidth;
    ((value % &modulus) + &modulus) % modulus
}

fn tag_mismatch(
    expected: &str,
    actual: &EvalResult,
    expr: &Expression,
    context: &EvaluationContext,
) -> InternalError {
    InternalError::TypeTagMismatch {
        expected: expected.to_string(),
        actual: actual.type_name().to_string(),
        fragment: quote(expr, context),
        location: context.source.locate(expr.span),
    }
}

fn unresolved(name: &str, expr: &Expression, context: &EvaluationContext) -> InternalError {
    InternalError::UnresolvedName {
        name: name.to_string(),
        fragment: quote(expr, context),
        location: context.source.locate(expr.span),
    }
}

/// Quote the node's span from the constraint source, falling back to
/// the pretty-printer for spans the source cannot account for.
pub(crate) fn quote(expr: &Expression, context: &EvaluationContext) -> String {
    match context.source.quote(expr.span) {
        Some(text) => text.to_string(),
        None => pretty_print_expr(expr),
    }
}
