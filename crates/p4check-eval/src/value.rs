//! Runtime values for constraint evaluation.

use num_bigint::BigInt;
use std::fmt;

/// All integers at runtime are arbitrary-precision and signed:
/// literals, key components, masks, prefix lengths, range bounds, and
/// the `priority` attribute. Bitwidths are enforced when an entry is
/// bound, not during arithmetic.
pub type Integer = BigInt;

/// Runtime value of an exact match key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exact {
    pub value: Integer,
}

/// Runtime value of a ternary match key. Also represents optional keys,
/// whose mask is all zeros or all ones. Invariant:
/// `value & mask == value`; an all-zero mask is the wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ternary {
    pub value: Integer,
    pub mask: Integer,
}

/// Runtime value of a longest-prefix match key. Invariant:
/// `0 <= prefix_length <= bitwidth` and all bits below the prefix are
/// zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lpm {
    pub value: Integer,
    pub prefix_length: Integer,
}

/// Runtime value of a range match key. Invariant: `low <= high`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    pub low: Integer,
    pub high: Integer,
}

/// The value universe of the evaluator.
///
/// The tag is carried explicitly so every evaluation step can check its
/// operands' tags dynamically. The static types on the AST are trusted
/// from an external checker; the runtime check turns a checker bug into
/// an internal error instead of a wrong verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalResult {
    Bool(bool),
    Int(Integer),
    Exact(Exact),
    Ternary(Ternary),
    Lpm(Lpm),
    Range(Range),
}

impl EvalResult {
    /// Return a human-readable tag name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            EvalResult::Bool(_) => "bool",
            EvalResult::Int(_) => "int",
            EvalResult::Exact(_) => "exact",
            EvalResult::Ternary(_) => "ternary",
            EvalResult::Lpm(_) => "lpm",
            EvalResult::Range(_) => "range",
        }
    }

    /// Get as boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EvalResult::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer, if this is an integer value.
    pub fn as_int(&self) -> Option<&Integer> {
        match self {
            EvalResult::Int(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for Exact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exact{{value: {}}}", self.value)
    }
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ternary{{value: {}, mask: {}}}", self.value, self.mask)
    }
}

impl fmt::Display for Lpm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lpm{{value: {}, prefix_length: {}}}",
            self.value, self.prefix_length
        )
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Range{{low: {}, high: {}}}", self.low, self.high)
    }
}

impl fmt::Display for EvalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalResult::Bool(b) => write!(f, "{}", b),
            EvalResult::Int(n) => write!(f, "{}", n),
            EvalResult::Exact(v) => write!(f, "{}", v),
            EvalResult::Ternary(v) => write!(f, "{}", v),
            EvalResult::Lpm(v) => write!(f, "{}", v),
            EvalResult::Range(v) => write!(f, "{}", v),
        }
    }
}
