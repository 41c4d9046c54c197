//! Filter tree preprocessing
//!
//! Runs on a private clone before compilation: substitutes the actor
//! placeholder, drops vacuous conditions and prunes groups left empty.

use std::collections::HashMap;

use serde_json::Value;

use super::error::{FilterError, FilterResult};
use super::operator::parse_operator;
use super::types::{CellKind, ColumnMeta, CompileContext, FilterCondition, FilterGroup, FilterNode};

/// Returns `None` when nothing in the tree constrains the result
pub fn preprocess(
    tree: &FilterNode,
    columns: &HashMap<String, ColumnMeta>,
    ctx: &CompileContext,
    actor_placeholder: &str,
) -> FilterResult<Option<FilterNode>> {
    match tree {
        FilterNode::Group(group) => {
            let mut children = Vec::with_capacity(group.children.len());
            for child in &group.children {
                if let Some(child) = preprocess(child, columns, ctx, actor_placeholder)? {
                    children.push(child);
                }
            }
            if children.is_empty() {
                tracing::trace!(conjunction = ?group.conjunction, "Dropping empty filter group");
                return Ok(None);
            }
            Ok(Some(FilterNode::Group(FilterGroup {
                conjunction: group.conjunction,
                children,
            })))
        }
        FilterNode::Condition(condition) => {
            // Unknown columns pass through untouched; validation reports them
            let Some(column) = columns.get(&condition.column_id) else {
                return Ok(Some(tree.clone()));
            };
            let mut condition = condition.clone();
            if column.options.actor_reference {
                substitute_actor(&mut condition, column, ctx, actor_placeholder)?;
            }
            if is_vacuous(&condition, column) {
                tracing::trace!(
                    column = %condition.column_id,
                    operator = %condition.operator,
                    "Dropping condition without a value"
                );
                return Ok(None);
            }
            Ok(Some(FilterNode::Condition(condition)))
        }
    }
}

fn is_vacuous(condition: &FilterCondition, column: &ColumnMeta) -> bool {
    let presence_check =
        parse_operator(condition, column.kind()).is_some_and(|op| op.is_presence_check());
    if presence_check {
        return false;
    }
    match &condition.value {
        Value::Null => column.kind() != CellKind::Boolean,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn substitute_actor(
    condition: &mut FilterCondition,
    column: &ColumnMeta,
    ctx: &CompileContext,
    placeholder: &str,
) -> FilterResult<()> {
    if !mentions_placeholder(&condition.value, placeholder) {
        return Ok(());
    }
    let actor = ctx.actor_id.as_deref().ok_or_else(|| FilterError::MissingActor {
        column: column.id.clone(),
    })?;
    tracing::trace!(column = %column.id, "Substituting actor placeholder");
    replace_placeholder(&mut condition.value, placeholder, actor);
    Ok(())
}

fn is_placeholder(value: &Value, placeholder: &str) -> bool {
    match value {
        Value::String(s) => s == placeholder,
        Value::Object(map) => map.get("id").is_some_and(|id| id.as_str() == Some(placeholder)),
        _ => false,
    }
}

fn mentions_placeholder(value: &Value, placeholder: &str) -> bool {
    match value {
        Value::Array(items) => items.iter().any(|item| is_placeholder(item, placeholder)),
        scalar => is_placeholder(scalar, placeholder),
    }
}

fn replace_placeholder(value: &mut Value, placeholder: &str, actor: &str) {
    match value {
        Value::Array(items) => {
            for item in items {
                replace_placeholder(item, placeholder, actor);
            }
        }
        Value::String(s) if *s == placeholder => *s = actor.to_string(),
        Value::Object(map) => {
            if let Some(id) = map.get_mut("id")
                && id.as_str() == Some(placeholder)
            {
                *id = Value::String(actor.to_string());
            }
        }
        _ => {}
    }
}
