//! Binding wire-format entries against the schema.
//!
//! A binding is the fully-populated mapping the evaluator reads:
//! every key declared by the table (or every parameter declared by the
//! action) is present, typed, and within its declared bitwidth. Keys a
//! well-formed entry may omit are completed with the wildcard of their
//! kind. Anything the schema cannot account for is an [`InputError`],
//! reported before any constraint is evaluated.

use crate::entry::{ActionInvocation, FieldMatchValue, TableEntry};
use crate::error::InputError;
use crate::value::{EvalResult, Exact, Integer, Lpm, Range, Ternary};
use crate::wire::{all_ones, decode_wire_integer, fits_bitwidth};
use num_traits::Zero;
use p4check_ast::{ConstraintSource, Type};
use p4check_schema::{ActionInfo, KeyInfo, TableInfo};
use std::collections::HashMap;
use tracing::debug;

/// A bound table entry: a total map from declared key names to typed
/// runtime values, plus the entry attributes.
#[derive(Debug, Clone)]
pub struct TableBinding {
    pub table_name: String,
    pub priority: Integer,
    pub keys: HashMap<String, EvalResult>,
}

/// A bound action invocation: a total map from declared parameter
/// names to integer values.
#[derive(Debug, Clone)]
pub struct ActionBinding {
    pub action_id: u32,
    pub action_name: String,
    pub params: HashMap<String, Integer>,
}

/// What a constraint is evaluated over: a table binding for entry
/// restrictions, an action binding for action restrictions.
#[derive(Debug, Clone)]
pub enum Binding {
    Table(TableBinding),
    Action(ActionBinding),
}

/// Context for one evaluation: the binding plus a borrowed reference
/// to the constraint's source text, used only for diagnostics.
/// Read-only throughout the evaluation.
#[derive(Debug)]
pub struct EvaluationContext<'a> {
    pub binding: Binding,
    pub source: &'a ConstraintSource,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(binding: Binding, source: &'a ConstraintSource) -> Self {
        Self { binding, source }
    }
}

/// Parse a wire-format table entry into a binding against
/// `table_info`. Every declared key ends up present: ternary, LPM, and
/// range keys omitted by the entry bind to the wildcard of their kind;
/// an omitted exact key is an input error.
pub fn parse_table_entry(
    entry: &TableEntry,
    table_info: &TableInfo,
) -> Result<TableBinding, InputError> {
    if entry.priority < 0 {
        return Err(InputError::NegativePriority {
            table: table_info.name.clone(),
            priority: entry.priority,
        });
    }

    let mut keys: HashMap<String, EvalResult> = HashMap::with_capacity(table_info.keys_by_id.len());

    for field in &entry.matches {
        let key_info = table_info.keys_by_id.get(&field.field_id).ok_or_else(|| {
            InputError::UnknownMatchField {
                table: table_info.name.clone(),
                id: field.field_id,
            }
        })?;
        if keys.contains_key(&key_info.name) {
            return Err(InputError::DuplicateMatchField {
                table: table_info.name.clone(),
                id: field.field_id,
            });
        }
        let value = bind_match_value(&field.value, key_info, table_info)?;
        keys.insert(key_info.name.clone(), value);
    }

    for key_info in table_info.keys_by_id.values() {
        if keys.contains_key(&key_info.name) {
            continue;
        }
        let wildcard = match key_info.ty {
            Type::Exact { .. } => {
                return Err(InputError::MissingExactKey {
                    table: table_info.name.clone(),
                    key: key_info.name.clone(),
                });
            }
            Type::Ternary { .. } => EvalResult::Ternary(Ternary {
                value: Integer::zero(),
                mask: Integer::zero(),
            }),
            Type::Lpm { .. } => EvalResult::Lpm(Lpm {
                value: Integer::zero(),
                prefix_length: Integer::zero(),
            }),
            Type::Range { bitwidth } => EvalResult::Range(Range {
                low: Integer::zero(),
                high: all_ones(bitwidth),
            }),
            // Key types are restricted to match kinds at schema build.
            Type::Bool | Type::Int | Type::FixedUnsigned { .. } => unreachable!(
                "table \"{}\" declares key \"{}\" with non-match type",
                table_info.name, key_info.name
            ),
        };
        keys.insert(key_info.name.clone(), wildcard);
    }

    debug!(
        table = %table_info.name,
        priority = entry.priority,
        keys = keys.len(),
        "bound table entry"
    );

    Ok(TableBinding {
        table_name: table_info.name.clone(),
        priority: Integer::from(entry.priority),
        keys,
    })
}

/// Decode one wire match value against the key's declared type,
/// enforcing the structural invariants of its kind.
fn bind_match_value(
    wire: &FieldMatchValue,
    key_info: &KeyInfo,
    table_info: &TableInfo,
) -> Result<EvalResult, InputError> {
    match (key_info.ty, wire) {
        (Type::Exact { bitwidth }, FieldMatchValue::Exact { value }) => {
            let value = decode_key_integer(value, bitwidth, key_info)?;
            Ok(EvalResult::Exact(Exact { value }))
        }
        (Type::Ternary { bitwidth }, FieldMatchValue::Ternary { value, mask }) => {
            let value = decode_key_integer(value, bitwidth, key_info)?;
            let mask = decode_key_integer(mask, bitwidth, key_info)?;
            if &value & &mask != value {
                return Err(InputError::NonCanonicalTernary {
                    key: key_info.name.clone(),
                    value: value.to_string(),
                    mask: mask.to_string(),
                });
            }
            Ok(EvalResult::Ternary(Ternary { value, mask }))
        }
        (
            Type::Lpm { bitwidth },
            FieldMatchValue::Lpm {
                value,
                prefix_length,
            },
        ) => {
            if *prefix_length < 0 || *prefix_length > bitwidth as i32 {
                return Err(InputError::InvalidPrefixLength {
                    key: key_info.name.clone(),
                    prefix_length: *prefix_length,
                    bitwidth,
                });
            }
            let value = decode_key_integer(value, bitwidth, key_info)?;
            let suffix_bits = bitwidth - *prefix_length as u32;
            if !(&value & all_ones(suffix_bits)).is_zero() {
                return Err(InputError::NonCanonicalLpm {
                    key: key_info.name.clone(),
                    value: value.to_string(),
                    prefix_length: *prefix_length,
                });
            }
            Ok(EvalResult::Lpm(Lpm {
                value,
                prefix_length: Integer::from(*prefix_length),
            }))
        }
        (Type::Range { bitwidth }, FieldMatchValue::Range { low, high }) => {
            let low = decode_key_integer(low, bitwidth, key_info)?;
            let high = decode_key_integer(high, bitwidth, key_info)?;
            if low > high {
                return Err(InputError::InvertedRange {
                    key: key_info.name.clone(),
                    low: low.to_string(),
                    high: high.to_string(),
                });
            }
            Ok(EvalResult::Range(Range { low, high }))
        }
        (declared, wire) => Err(InputError::MatchKindMismatch {
            table: table_info.name.clone(),
            key: key_info.name.clone(),
            declared: declared.to_string(),
            wire_kind: wire.kind_name(),
        }),
    }
}

fn decode_key_integer(
    bytes: &[u8],
    bitwidth: u32,
    key_info: &KeyInfo,
) -> Result<Integer, InputError> {
    let value = decode_wire_integer(bytes);
    if !fits_bitwidth(&value, bitwidth) {
        return Err(InputError::ValueTooWide {
            what: "key",
            name: key_info.name.clone(),
            bitwidth,
            actual_bits: value.bits(),
        });
    }
    Ok(value)
}

/// Parse a wire-format action invocation into a binding against
/// `action_info`. Every declared parameter must be present exactly
/// once.
pub fn parse_action(
    invocation: &ActionInvocation,
    action_info: &ActionInfo,
) -> Result<ActionBinding, InputError> {
    let mut params: HashMap<String, Integer> =
        HashMap::with_capacity(action_info.params_by_id.len());

    for param in &invocation.params {
        let param_info = action_info.params_by_id.get(&param.param_id).ok_or_else(|| {
            InputError::UnknownActionParam {
                action: action_info.name.clone(),
                id: param.param_id,
            }
        })?;
        if params.contains_key(&param_info.name) {
            return Err(InputError::DuplicateActionParam {
                action: action_info.name.clone(),
                id: param.param_id,
            });
        }
        let value = decode_wire_integer(&param.value);
        let bitwidth = param_info.ty.bitwidth().unwrap_or(0);
        if !fits_bitwidth(&value, bitwidth) {
            return Err(InputError::ValueTooWide {
                what: "parameter",
                name: param_info.name.clone(),
                bitwidth,
                actual_bits: value.bits(),
            });
        }
        params.insert(param_info.name.clone(), value);
    }

    for param_info in action_info.params_by_id.values() {
        if !params.contains_key(&param_info.name) {
            return Err(InputError::MissingActionParam {
                action: action_info.name.clone(),
                param: param_info.name.clone(),
            });
        }
    }

    debug!(
        action = %action_info.name,
        params = params.len(),
        "bound action invocation"
    );

    Ok(ActionBinding {
        action_id: action_info.id,
        action_name: action_info.name.clone(),
        params,
    })
}
