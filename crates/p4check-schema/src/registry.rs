//! The constraint-checking registry and its construction.

use crate::error::{DefinitionError, DefinitionResult};
use crate::metadata::{ActionMetadata, AnnotatedConstraint, MatchKind, TableMetadata};
use p4check_ast::{ConstraintSource, Expression, Type};
use std::collections::HashMap;
use tracing::debug;

/// Schema of one table key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInfo {
    /// Same as the match field id in the program metadata.
    pub id: u32,
    /// Same as the match field name in the program metadata.
    pub name: String,
    /// Key type specifying how many bits to match on and how,
    /// e.g. `ternary<16>`.
    pub ty: Type,
}

/// Schema of one action parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub id: u32,
    pub name: String,
    pub ty: Type,
}

/// Everything known about one table: its keys, indexed both ways, and
/// the entry restriction if one is attached.
#[derive(Debug, Clone)]
pub struct TableInfo {
    pub id: u32,
    pub name: String,
    /// The table's entry restriction and its source, if annotated.
    pub constraint: Option<AnnotatedConstraint>,
    pub keys_by_id: HashMap<u32, KeyInfo>,
    pub keys_by_name: HashMap<String, KeyInfo>,
}

impl TableInfo {
    /// The parsed constraint expression, if one is attached.
    pub fn constraint_expr(&self) -> Option<&Expression> {
        self.constraint.as_ref().map(|c| &c.expression)
    }

    /// The constraint's source text, if one is attached.
    pub fn constraint_source(&self) -> Option<&ConstraintSource> {
        self.constraint.as_ref().map(|c| &c.source)
    }
}

/// Everything known about one action.
#[derive(Debug, Clone)]
pub struct ActionInfo {
    pub id: u32,
    pub name: String,
    /// The action restriction and its source, if annotated.
    pub constraint: Option<AnnotatedConstraint>,
    pub params_by_id: HashMap<u32, ParamInfo>,
    pub params_by_name: HashMap<String, ParamInfo>,
}

impl ActionInfo {
    pub fn constraint_expr(&self) -> Option<&Expression> {
        self.constraint.as_ref().map(|c| &c.expression)
    }

    pub fn constraint_source(&self) -> Option<&ConstraintSource> {
        self.constraint.as_ref().map(|c| &c.source)
    }
}

/// All information required for constraint checking. Built once from
/// program metadata, never mutated afterwards; safe to share across
/// concurrent evaluations.
#[derive(Debug, Clone, Default)]
pub struct ConstraintInfo {
    pub tables_by_id: HashMap<u32, TableInfo>,
    pub actions_by_id: HashMap<u32, ActionInfo>,
}

impl ConstraintInfo {
    /// Build the registry from program metadata.
    pub fn build(
        tables: Vec<TableMetadata>,
        actions: Vec<ActionMetadata>,
    ) -> DefinitionResult<Self> {
        let mut info = ConstraintInfo::default();

        for table in tables {
            let table_info = build_table(table)?;
            if let Some(previous) = info.tables_by_id.get(&table_info.id) {
                return Err(DefinitionError::DuplicateTableId {
                    id: table_info.id,
                    first: previous.name.clone(),
                    second: table_info.name,
                });
            }
            debug!(
                table = %table_info.name,
                id = table_info.id,
                keys = table_info.keys_by_id.len(),
                constrained = table_info.constraint.is_some(),
                "registered table"
            );
            info.tables_by_id.insert(table_info.id, table_info);
        }

        for action in actions {
            let action_info = build_action(action)?;
            if let Some(previous) = info.actions_by_id.get(&action_info.id) {
                return Err(DefinitionError::DuplicateActionId {
                    id: action_info.id,
                    first: previous.name.clone(),
                    second: action_info.name,
                });
            }
            debug!(
                action = %action_info.name,
                id = action_info.id,
                params = action_info.params_by_id.len(),
                constrained = action_info.constraint.is_some(),
                "registered action"
            );
            info.actions_by_id.insert(action_info.id, action_info);
        }

        Ok(info)
    }

    /// Look up a table by its id.
    pub fn table_by_id(&self, id: u32) -> Option<&TableInfo> {
        self.tables_by_id.get(&id)
    }

    /// Look up an action by its id.
    pub fn action_by_id(&self, id: u32) -> Option<&ActionInfo> {
        self.actions_by_id.get(&id)
    }
}

fn build_table(table: TableMetadata) -> DefinitionResult<TableInfo> {
    let mut keys_by_id = HashMap::with_capacity(table.match_fields.len());
    let mut keys_by_name = HashMap::with_capacity(table.match_fields.len());

    for field in table.match_fields {
        if field.bitwidth == 0 {
            return Err(DefinitionError::InvalidKeyBitwidth {
                table: table.name,
                field: field.name,
                bitwidth: field.bitwidth,
            });
        }
        let ty = match field.kind {
            MatchKind::Exact => Type::Exact {
                bitwidth: field.bitwidth,
            },
            // An optional key is a ternary key whose mask is all zeros
            // or all ones.
            MatchKind::Ternary | MatchKind::Optional => Type::Ternary {
                bitwidth: field.bitwidth,
            },
            MatchKind::Lpm => Type::Lpm {
                bitwidth: field.bitwidth,
            },
            MatchKind::Range => Type::Range {
                bitwidth: field.bitwidth,
            },
            MatchKind::Unspecified => {
                return Err(DefinitionError::UnsupportedMatchKind {
                    table: table.name,
                    field: field.name,
                });
            }
        };
        let key = KeyInfo {
            id: field.id,
            name: field.name,
            ty,
        };
        if keys_by_id.contains_key(&key.id) {
            return Err(DefinitionError::DuplicateKeyId {
                table: table.name,
                id: key.id,
            });
        }
        if keys_by_name.contains_key(&key.name) {
            return Err(DefinitionError::DuplicateKeyName {
                table: table.name,
                name: key.name,
            });
        }
        keys_by_id.insert(key.id, key.clone());
        keys_by_name.insert(key.name.clone(), key);
    }

    Ok(TableInfo {
        id: table.id,
        name: table.name,
        constraint: table.constraint,
        keys_by_id,
        keys_by_name,
    })
}

fn build_action(action: ActionMetadata) -> DefinitionResult<ActionInfo> {
    let mut params_by_id = HashMap::with_capacity(action.params.len());
    let mut params_by_name = HashMap::with_capacity(action.params.len());

    for param in action.params {
        if param.bitwidth == 0 {
            return Err(DefinitionError::InvalidParamBitwidth {
                action: action.name,
                param: param.name,
                bitwidth: param.bitwidth,
            });
        }
        let param = ParamInfo {
            id: param.id,
            name: param.name,
            ty: Type::FixedUnsigned {
                bitwidth: param.bitwidth,
            },
        };
        if params_by_id.contains_key(&param.id) {
            return Err(DefinitionError::DuplicateParamId {
                action: action.name,
                id: param.id,
            });
        }
        if params_by_name.contains_key(&param.name) {
            return Err(DefinitionError::DuplicateParamName {
                action: action.name,
                name: param.name,
            });
        }
        params_by_id.insert(param.id, param.clone());
        params_by_name.insert(param.name.clone(), param);
    }

    Ok(ActionInfo {
        id: action.id,
        name: action.name,
        constraint: action.constraint,
        params_by_id,
        params_by_name,
    })
}

/// Schema of a built-in entry attribute accessible in constraints,
/// e.g. `::priority`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name: String,
    pub ty: Type,
}

/// Information for a built-in attribute, `None` for unknown names.
/// Lookups are case-sensitive exact matches.
pub fn attribute_info(attribute_name: &str) -> Option<AttributeInfo> {
    match attribute_name {
        "priority" => Some(AttributeInfo {
            name: "priority".to_string(),
            ty: Type::Int,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MatchFieldMetadata, ParamMetadata};

    fn field(id: u32, name: &str, kind: MatchKind, bitwidth: u32) -> MatchFieldMetadata {
        MatchFieldMetadata {
            id,
            name: name.to_string(),
            kind,
            bitwidth,
        }
    }

    fn table(id: u32, name: &str, fields: Vec<MatchFieldMetadata>) -> TableMetadata {
        TableMetadata {
            id,
            name: name.to_string(),
            match_fields: fields,
            constraint: None,
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let info = ConstraintInfo::build(
            vec![table(
                1,
                "acl",
                vec![
                    field(1, "dst", MatchKind::Exact, 32),
                    field(2, "port", MatchKind::Range, 16),
                ],
            )],
            vec![],
        )
        .unwrap();

        let acl = info.table_by_id(1).unwrap();
        assert_eq!(acl.name, "acl");
        assert_eq!(acl.keys_by_id[&1].ty, Type::Exact { bitwidth: 32 });
        assert_eq!(acl.keys_by_name["port"].ty, Type::Range { bitwidth: 16 });
        assert!(info.table_by_id(2).is_none());
    }

    #[test]
    fn test_optional_normalizes_to_ternary() {
        let info = ConstraintInfo::build(
            vec![table(1, "t", vec![field(1, "opt", MatchKind::Optional, 12)])],
            vec![],
        )
        .unwrap();
        assert_eq!(
            info.table_by_id(1).unwrap().keys_by_name["opt"].ty,
            Type::Ternary { bitwidth: 12 }
        );
    }

    #[test]
    fn test_duplicate_table_id() {
        let err = ConstraintInfo::build(
            vec![table(7, "a", vec![]), table(7, "b", vec![])],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateTableId { id: 7, .. }));
    }

    #[test]
    fn test_duplicate_key_name() {
        let err = ConstraintInfo::build(
            vec![table(
                1,
                "t",
                vec![
                    field(1, "k", MatchKind::Exact, 8),
                    field(2, "k", MatchKind::Exact, 8),
                ],
            )],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateKeyName { .. }));
    }

    #[test]
    fn test_zero_bitwidth_rejected() {
        let err = ConstraintInfo::build(
            vec![table(1, "t", vec![field(1, "k", MatchKind::Exact, 0)])],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidKeyBitwidth { .. }));
    }

    #[test]
    fn test_unspecified_match_kind_rejected() {
        let err = ConstraintInfo::build(
            vec![table(1, "t", vec![field(1, "k", MatchKind::Unspecified, 8)])],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::UnsupportedMatchKind { .. }));
    }

    #[test]
    fn test_duplicate_param_id() {
        let err = ConstraintInfo::build(
            vec![],
            vec![ActionMetadata {
                id: 9,
                name: "set_port".to_string(),
                params: vec![
                    ParamMetadata {
                        id: 1,
                        name: "p".to_string(),
                        bitwidth: 9,
                        type_name: None,
                    },
                    ParamMetadata {
                        id: 1,
                        name: "q".to_string(),
                        bitwidth: 9,
                        type_name: None,
                    },
                ],
                constraint: None,
            }],
        )
        .unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateParamId { .. }));
    }

    #[test]
    fn test_attribute_info() {
        let priority = attribute_info("priority").unwrap();
        assert_eq!(priority.ty, Type::Int);
        assert!(attribute_info("Priority").is_none());
        assert!(attribute_info("metadata").is_none());
    }
}
