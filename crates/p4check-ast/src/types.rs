//! Type representation for constraint expressions.

use std::fmt;

/// The type of a constraint expression node, as inferred by the
/// external type checker.
///
/// Match-kind types carry the declared bitwidth of the key they
/// describe. The evaluator trusts these types for control flow (cache
/// eligibility, cast targets) but re-checks runtime value tags at every
/// step, so a type-checker bug surfaces as an internal error rather
/// than a wrong verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean.
    Bool,
    /// Arbitrary-precision integer.
    Int,
    /// Unsigned integer of a fixed width, `bit<w>`.
    FixedUnsigned { bitwidth: u32 },
    /// Exact match key of width `w`.
    Exact { bitwidth: u32 },
    /// Ternary match key of width `w`. Optional keys are normalized to
    /// this type at schema build time.
    Ternary { bitwidth: u32 },
    /// Longest-prefix match key of width `w`.
    Lpm { bitwidth: u32 },
    /// Range match key of width `w`.
    Range { bitwidth: u32 },
}

impl Type {
    /// The declared bitwidth, for types that have one.
    pub fn bitwidth(&self) -> Option<u32> {
        match self {
            Type::Bool | Type::Int => None,
            Type::FixedUnsigned { bitwidth }
            | Type::Exact { bitwidth }
            | Type::Ternary { bitwidth }
            | Type::Lpm { bitwidth }
            | Type::Range { bitwidth } => Some(*bitwidth),
        }
    }

    /// Check if this is one of the four match-key types.
    pub fn is_match_kind(&self) -> bool {
        matches!(
            self,
            Type::Exact { .. } | Type::Ternary { .. } | Type::Lpm { .. } | Type::Range { .. }
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::FixedUnsigned { bitwidth } => write!(f, "bit<{}>", bitwidth),
            Type::Exact { bitwidth } => write!(f, "exact<{}>", bitwidth),
            Type::Ternary { bitwidth } => write!(f, "ternary<{}>", bitwidth),
            Type::Lpm { bitwidth } => write!(f, "lpm<{}>", bitwidth),
            Type::Range { bitwidth } => write!(f, "range<{}>", bitwidth),
        }
    }
}
