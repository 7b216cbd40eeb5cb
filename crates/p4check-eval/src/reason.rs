//! Top-level constraint checking.
//!
//! The public contract: an empty string means the entry satisfies its
//! constraint (or there is none); a non-empty string is a
//! human-readable reason quoting the smallest subexpression that
//! decides the violation, its location in the P4 source, and the
//! binding it was evaluated over.

use crate::bind::{parse_action, parse_table_entry, Binding, EvaluationContext, TableBinding};
use crate::entry::{ActionInvocation, TableEntry};
use crate::error::{CheckError, InputError};
use crate::eval::{eval_to_bool, quote, EvalCache};
use crate::minimize::minimal_subexpression_leading_to_eval_result;
use crate::value::Integer;
use p4check_ast::{Expression, SizeCache};
use p4check_schema::ConstraintInfo;
use std::collections::HashMap;
use std::fmt::Write;
use tracing::debug;

/// Check a table entry against the constraint attached to its table.
///
/// Returns the empty string if the entry satisfies the constraint (or
/// the table has none), a non-empty reason if it does not, an
/// [`InputError`] if the entry is inconsistent with the schema, and an
/// [`crate::InternalError`] if the constraint AST is malformed.
pub fn reason_entry_violates_constraint(
    entry: &TableEntry,
    constraint_info: &ConstraintInfo,
) -> Result<String, CheckError> {
    let table_info = constraint_info
        .table_by_id(entry.table_id)
        .ok_or(InputError::UnknownTable { id: entry.table_id })?;
    let Some(constraint) = &table_info.constraint else {
        return Ok(String::new());
    };

    let binding = parse_table_entry(entry, table_info)?;
    let summary = summarize_table_binding(&binding);
    let context = EvaluationContext::new(Binding::Table(binding), &constraint.source);

    let mut eval_cache = EvalCache::new();
    if eval_to_bool(&constraint.expression, &context, Some(&mut eval_cache))? {
        debug!(table = %table_info.name, "entry satisfies constraint");
        return Ok(String::new());
    }

    let mut size_cache = SizeCache::new();
    let culprit = minimal_subexpression_leading_to_eval_result(
        &constraint.expression,
        &context,
        &mut eval_cache,
        &mut size_cache,
    )?;
    debug!(
        table = %table_info.name,
        culprit = %quote(culprit, &context),
        "entry violates constraint"
    );
    Ok(format_reason(
        culprit,
        &context,
        &format!("table \"{}\"", table_info.name),
        &summary,
    ))
}

/// Check an action invocation against the constraint attached to its
/// action. Same contract as [`reason_entry_violates_constraint`].
pub fn reason_action_violates_constraint(
    invocation: &ActionInvocation,
    constraint_info: &ConstraintInfo,
) -> Result<String, CheckError> {
    let action_info = constraint_info
        .action_by_id(invocation.action_id)
        .ok_or(InputError::UnknownAction {
            id: invocation.action_id,
        })?;
    let Some(constraint) = &action_info.constraint else {
        return Ok(String::new());
    };

    let binding = parse_action(invocation, action_info)?;
    let summary = summarize_params(&binding.params);
    let context = EvaluationContext::new(Binding::Action(binding), &constraint.source);

    let mut eval_cache = EvalCache::new();
    if eval_to_bool(&constraint.expression, &context, Some(&mut eval_cache))? {
        debug!(action = %action_info.name, "invocation satisfies constraint");
        return Ok(String::new());
    }

    let mut size_cache = SizeCache::new();
    let culprit = minimal_subexpression_leading_to_eval_result(
        &constraint.expression,
        &context,
        &mut eval_cache,
        &mut size_cache,
    )?;
    debug!(
        action = %action_info.name,
        culprit = %quote(culprit, &context),
        "invocation violates constraint"
    );
    Ok(format_reason(
        culprit,
        &context,
        &format!("action \"{}\"", action_info.name),
        &summary,
    ))
}

fn format_reason(
    culprit: &Expression,
    context: &EvaluationContext,
    subject: &str,
    binding_summary: &str,
) -> String {
    let mut reason = String::new();
    let _ = writeln!(
        reason,
        "constraint of {} violated by \"{}\" at {}",
        subject,
        quote(culprit, context),
        context.source.locate(culprit.span),
    );
    let _ = write!(reason, "  binding: {}", binding_summary);
    reason
}

fn summarize_table_binding(binding: &TableBinding) -> String {
    let mut keys: Vec<_> = binding.keys.iter().collect();
    keys.sort_by(|a, b| a.0.cmp(b.0));
    let mut summary = format!("priority = {}", binding.priority);
    for (name, value) in keys {
        let _ = write!(summary, "; {} = {}", name, value);
    }
    summary
}

fn summarize_params(params: &HashMap<String, Integer>) -> String {
    let mut params: Vec<_> = params.iter().collect();
    params.sort_by(|a, b| a.0.cmp(b.0));
    params
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}
