//! Integration tests: schema → binder → evaluator → minimizer →
//! reason, over wire-format entries, the way a P4Runtime-facing caller
//! drives the crate.

use p4check_ast::{
    BinOp, ConstraintSource, ExprKind, Expression, MatchValueField, NodeIdGen, SizeCache,
    SourceLocation, Span, Type,
};
use p4check_eval::{
    eval_to_bool, minimal_subexpression_leading_to_eval_result, parse_table_entry,
    reason_action_violates_constraint, reason_entry_violates_constraint, ActionInvocation, Binding,
    EvalCache, EvaluationContext, FieldMatch, FieldMatchValue, Integer, ParamValue, TableEntry,
};
use p4check_schema::{
    ActionMetadata, AnnotatedConstraint, ConstraintInfo, MatchFieldMetadata, MatchKind,
    ParamMetadata, TableMetadata,
};

/// Builds constraint expressions the way the external parser would:
/// spans point into the annotation text, nodes are uniquely numbered,
/// casts carry the span of the literal they widen.
struct Cb {
    gen: NodeIdGen,
    text: String,
}

impl Cb {
    fn new(text: &str) -> Self {
        Self {
            gen: NodeIdGen::new(),
            text: text.to_string(),
        }
    }

    fn source(&self) -> ConstraintSource {
        ConstraintSource::new(self.text.clone(), SourceLocation::new("switch.p4", 42, 12))
    }

    fn span(&self, fragment: &str) -> Span {
        let start = self.text.find(fragment).expect("fragment not in source");
        Span::new(
            start,
            start + fragment.len(),
            1,
            start as u32 + 1,
        )
    }

    fn span_last(&self, fragment: &str) -> Span {
        let start = self.text.rfind(fragment).expect("fragment not in source");
        Span::new(
            start,
            start + fragment.len(),
            1,
            start as u32 + 1,
        )
    }

    fn node(&mut self, ty: Type, kind: ExprKind, span: Span) -> Expression {
        Expression::new(self.gen.fresh(), span, ty, kind)
    }

    fn key(&mut self, name: &str, ty: Type) -> Expression {
        let span = self.span(name);
        self.node(ty, ExprKind::Key(name.to_string()), span)
    }

    fn param(&mut self, name: &str) -> Expression {
        let span = self.span(name);
        self.node(Type::Int, ExprKind::ActionParam(name.to_string()), span)
    }

    fn param_last(&mut self, name: &str) -> Expression {
        let span = self.span_last(name);
        self.node(Type::Int, ExprKind::ActionParam(name.to_string()), span)
    }

    fn priority(&mut self) -> Expression {
        let span = self.span("::priority");
        self.node(Type::Int, ExprKind::Attribute("priority".to_string()), span)
    }

    fn int(&mut self, fragment: &str, value: i64) -> Expression {
        let span = self.span(fragment);
        self.node(Type::Int, ExprKind::IntLit(Integer::from(value)), span)
    }

    fn int_last(&mut self, fragment: &str, value: i64) -> Expression {
        let span = self.span_last(fragment);
        self.node(Type::Int, ExprKind::IntLit(Integer::from(value)), span)
    }

    fn cast(&mut self, ty: Type, operand: Expression) -> Expression {
        let span = operand.span;
        self.node(ty, ExprKind::TypeCast(Box::new(operand)), span)
    }

    fn field(&mut self, base: Expression, field: MatchValueField, fragment: &str) -> Expression {
        let span = self.span(fragment);
        let kind = ExprKind::FieldAccess {
            base: Box::new(base),
            field,
        };
        self.node(Type::Int, kind, span)
    }

    fn binary(&mut self, op: BinOp, ty: Type, left: Expression, right: Expression) -> Expression {
        let span = left.span.merge(right.span);
        let kind = ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
        self.node(ty, kind, span)
    }
}

/// Table with a single exact key `k: bit<8>` constrained by
/// `k == <value>`.
fn exact_key_schema(value: i64) -> ConstraintInfo {
    let text = format!("k == {}", value);
    let mut b = Cb::new(&text);
    let k = b.key("k", Type::Exact { bitwidth: 8 });
    let lit = b.int(&value.to_string(), value);
    let fixed = b.cast(Type::FixedUnsigned { bitwidth: 8 }, lit);
    let widened = b.cast(Type::Exact { bitwidth: 8 }, fixed);
    let eq = b.binary(BinOp::Eq, Type::Bool, k, widened);
    let source = b.source();

    ConstraintInfo::build(
        vec![TableMetadata {
            id: 1,
            name: "acl".to_string(),
            match_fields: vec![MatchFieldMetadata {
                id: 1,
                name: "k".to_string(),
                kind: MatchKind::Exact,
                bitwidth: 8,
            }],
            constraint: Some(AnnotatedConstraint {
                expression: eq,
                source,
            }),
        }],
        vec![],
    )
    .unwrap()
}

/// Table with a single ternary key `t: bit<8>` constrained by
/// `t::mask != 0 -> ::priority > 0`.
fn ternary_priority_schema() -> ConstraintInfo {
    let mut b = Cb::new("t::mask != 0 -> ::priority > 0");
    let t = b.key("t", Type::Ternary { bitwidth: 8 });
    let mask = b.field(t, MatchValueField::Mask, "t::mask");
    let zero = b.int("0", 0);
    let guard = b.binary(BinOp::Ne, Type::Bool, mask, zero);
    let priority = b.priority();
    let zero = b.int_last("0", 0);
    let conclusion = b.binary(BinOp::Gt, Type::Bool, priority, zero);
    let implies = b.binary(BinOp::Implies, Type::Bool, guard, conclusion);
    let source = b.source();

    ConstraintInfo::build(
        vec![TableMetadata {
            id: 2,
            name: "flow".to_string(),
            match_fields: vec![MatchFieldMetadata {
                id: 1,
                name: "t".to_string(),
                kind: MatchKind::Ternary,
                bitwidth: 8,
            }],
            constraint: Some(AnnotatedConstraint {
                expression: implies,
                source,
            }),
        }],
        vec![],
    )
    .unwrap()
}

/// Action `fwd(p: bit<16>, q: bit<16>)` constrained by
/// `p + q == 7 && p <cmp> q`.
fn action_schema(cmp: BinOp, text: &str) -> ConstraintInfo {
    let mut b = Cb::new(text);
    let p = b.param("p");
    let q = b.param("q");
    let sum = b.binary(BinOp::Add, Type::Int, p, q);
    let seven = b.int("7", 7);
    let left = b.binary(BinOp::Eq, Type::Bool, sum, seven);
    let p = b.param_last("p");
    let q = b.param_last("q");
    let right = b.binary(cmp, Type::Bool, p, q);
    let and = b.binary(BinOp::And, Type::Bool, left, right);
    let source = b.source();

    ConstraintInfo::build(
        vec![],
        vec![ActionMetadata {
            id: 9,
            name: "fwd".to_string(),
            params: vec![
                ParamMetadata {
                    id: 1,
                    name: "p".to_string(),
                    bitwidth: 16,
                    type_name: None,
                },
                ParamMetadata {
                    id: 2,
                    name: "q".to_string(),
                    bitwidth: 16,
                    type_name: None,
                },
            ],
            constraint: Some(AnnotatedConstraint {
                expression: and,
                source,
            }),
        }],
    )
    .unwrap()
}

fn exact_entry(table_id: u32, value: u8) -> TableEntry {
    TableEntry {
        table_id,
        priority: 0,
        matches: vec![FieldMatch {
            field_id: 1,
            value: FieldMatchValue::Exact { value: vec![value] },
        }],
    }
}

fn ternary_entry(value: u8, mask: u8, priority: i32) -> TableEntry {
    let matches = if mask == 0 && value == 0 {
        vec![]
    } else {
        vec![FieldMatch {
            field_id: 1,
            value: FieldMatchValue::Ternary {
                value: vec![value],
                mask: vec![mask],
            },
        }]
    };
    TableEntry {
        table_id: 2,
        priority,
        matches,
    }
}

fn invocation(p: u16, q: u16) -> ActionInvocation {
    ActionInvocation {
        action_id: 9,
        params: vec![
            ParamValue {
                param_id: 1,
                value: p.to_be_bytes().to_vec(),
            },
            ParamValue {
                param_id: 2,
                value: q.to_be_bytes().to_vec(),
            },
        ],
    }
}

#[test]
fn exact_key_satisfied() {
    let info = exact_key_schema(5);
    let reason = reason_entry_violates_constraint(&exact_entry(1, 5), &info).unwrap();
    assert_eq!(reason, "");
}

#[test]
fn exact_key_violated_quotes_whole_comparison() {
    let info = exact_key_schema(6);
    let reason = reason_entry_violates_constraint(&exact_entry(1, 5), &info).unwrap();
    assert!(!reason.is_empty());
    assert!(reason.contains("\"k == 6\""), "reason was: {}", reason);
    assert!(reason.contains("switch.p4:42:12"), "reason was: {}", reason);
    assert!(reason.contains("k = Exact{value: 5}"), "reason was: {}", reason);
}

#[test]
fn unknown_table_is_input_error() {
    let info = exact_key_schema(5);
    assert!(reason_entry_violates_constraint(&exact_entry(77, 5), &info).is_err());
}

#[test]
fn ternary_implication_satisfied() {
    let info = ternary_priority_schema();
    let reason =
        reason_entry_violates_constraint(&ternary_entry(0x0f, 0xff, 10), &info).unwrap();
    assert_eq!(reason, "");
}

#[test]
fn ternary_implication_vacuously_true() {
    let info = ternary_priority_schema();
    let reason = reason_entry_violates_constraint(&ternary_entry(0, 0, 0), &info).unwrap();
    assert_eq!(reason, "");

    // The guard alone explains the vacuous truth.
    let table = info.table_by_id(2).unwrap();
    let constraint = table.constraint.as_ref().unwrap();
    let binding = parse_table_entry(&ternary_entry(0, 0, 0), table).unwrap();
    let context = EvaluationContext::new(Binding::Table(binding), &constraint.source);
    let mut eval_cache = EvalCache::new();
    let mut size_cache = SizeCache::new();
    assert!(eval_to_bool(&constraint.expression, &context, Some(&mut eval_cache)).unwrap());
    let culprit = minimal_subexpression_leading_to_eval_result(
        &constraint.expression,
        &context,
        &mut eval_cache,
        &mut size_cache,
    )
    .unwrap();
    assert_eq!(
        constraint.source.quote(culprit.span).unwrap(),
        "t::mask != 0"
    );
}

#[test]
fn ternary_implication_violated_blames_conclusion() {
    let info = ternary_priority_schema();
    let reason =
        reason_entry_violates_constraint(&ternary_entry(0x0f, 0xff, 0), &info).unwrap();
    assert!(!reason.is_empty());
    assert!(
        reason.contains("\"::priority > 0\""),
        "reason was: {}",
        reason
    );
    assert!(reason.contains("priority = 0"), "reason was: {}", reason);
}

#[test]
fn action_constraint_satisfied() {
    let info = action_schema(BinOp::Lt, "p + q == 7 && p < q");
    let reason = reason_action_violates_constraint(&invocation(3, 4), &info).unwrap();
    assert_eq!(reason, "");
}

#[test]
fn action_constraint_violated_blames_false_conjunct() {
    let info = action_schema(BinOp::Gt, "p + q == 7 && p > q");
    let reason = reason_action_violates_constraint(&invocation(3, 4), &info).unwrap();
    assert!(!reason.is_empty());
    assert!(reason.contains("\"p > q\""), "reason was: {}", reason);
    assert!(reason.contains("p = 3"), "reason was: {}", reason);
    assert!(reason.contains("q = 4"), "reason was: {}", reason);
}

#[test]
fn unconstrained_table_always_satisfied() {
    let info = ConstraintInfo::build(
        vec![TableMetadata {
            id: 3,
            name: "plain".to_string(),
            match_fields: vec![MatchFieldMetadata {
                id: 1,
                name: "k".to_string(),
                kind: MatchKind::Exact,
                bitwidth: 8,
            }],
            constraint: None,
        }],
        vec![],
    )
    .unwrap();
    // Even a malformed entry passes: no constraint, no binding.
    let entry = TableEntry {
        table_id: 3,
        priority: 0,
        matches: vec![],
    };
    assert_eq!(reason_entry_violates_constraint(&entry, &info).unwrap(), "");
}

#[test]
fn binder_error_reported_before_evaluation() {
    let info = exact_key_schema(5);
    // Exact key omitted: input error, not a violation.
    let entry = TableEntry {
        table_id: 1,
        priority: 0,
        matches: vec![],
    };
    assert!(reason_entry_violates_constraint(&entry, &info).is_err());
}
