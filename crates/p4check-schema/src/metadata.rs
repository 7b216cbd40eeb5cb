//! Program metadata records consumed by the registry builder.
//!
//! These are the hand-over types from the external P4Info extractor:
//! one record per table and action, carrying ids, names, typed match
//! fields or parameters, and the constraint annotation (already parsed
//! and type-checked) where one is attached.

use p4check_ast::{ConstraintSource, Expression};

/// How a match field matches, as declared in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// No usable match kind was declared; rejected at registry build.
    Unspecified,
    Exact,
    Ternary,
    Lpm,
    Range,
    /// Optional keys are ternary keys whose mask is all zeros or all
    /// ones; normalized to [`MatchKind::Ternary`] at registry build.
    Optional,
}

/// A match field of a table.
#[derive(Debug, Clone)]
pub struct MatchFieldMetadata {
    pub id: u32,
    pub name: String,
    pub kind: MatchKind,
    pub bitwidth: u32,
}

/// A parameter of an action.
#[derive(Debug, Clone)]
pub struct ParamMetadata {
    pub id: u32,
    pub name: String,
    pub bitwidth: u32,
    /// The P4 named type of the parameter, when the program declares
    /// one. The runtime representation is the bitwidth alone.
    pub type_name: Option<String>,
}

/// A constraint annotation after external parsing and type checking:
/// the typed AST together with the verbatim source it was parsed from.
#[derive(Debug, Clone)]
pub struct AnnotatedConstraint {
    pub expression: Expression,
    pub source: ConstraintSource,
}

/// A match-action table as described by the program metadata.
#[derive(Debug, Clone)]
pub struct TableMetadata {
    pub id: u32,
    pub name: String,
    pub match_fields: Vec<MatchFieldMetadata>,
    /// The table's entry restriction, if one is annotated.
    pub constraint: Option<AnnotatedConstraint>,
}

/// An action as described by the program metadata.
#[derive(Debug, Clone)]
pub struct ActionMetadata {
    pub id: u32,
    pub name: String,
    pub params: Vec<ParamMetadata>,
    /// The action restriction, if one is annotated.
    pub constraint: Option<AnnotatedConstraint>,
}
