//! Filter tree walker
//!
//! Entry point of the engine: preprocesses the tree, validates every condition,
//! dispatches it to the dialect compiler and merges the assembled predicate into
//! the caller's query. Compilation is all-or-nothing.

use std::collections::HashMap;

use chrono_tz::Tz;

use super::contract::parse_date_filter;
use super::dispatch::{self, CompileEnv};
use super::error::{ErrorKind, FilterError, FilterResult};
use super::operator::resolve_operator;
use super::preprocess::preprocess;
use super::types::{CellKind, ColumnMeta, CompileContext, FilterCondition, FilterGroup, FilterNode};
use crate::core::config::FilterConfig;
use crate::core::constants::DEFAULT_ACTOR_PLACEHOLDER;
use crate::data::sql::{Dialect, QueryBuilder, SqlParams};

/// A compiled predicate and the parameters its placeholders refer to
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    pub sql: String,
    pub params: SqlParams,
}

/// Compiles filter trees for one dialect
///
/// Holds only immutable configuration; share it freely across threads.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    dialect: Dialect,
    default_time_zone: Tz,
    actor_placeholder: String,
    table_alias: Option<String>,
}

impl FilterCompiler {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            default_time_zone: Tz::UTC,
            actor_placeholder: DEFAULT_ACTOR_PLACEHOLDER.to_string(),
            table_alias: None,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            dialect: config.dialect,
            default_time_zone: config.default_time_zone,
            actor_placeholder: config.actor_placeholder.clone(),
            table_alias: None,
        }
    }

    /// Zone for datetime columns that do not name their own
    pub fn with_default_time_zone(mut self, time_zone: Tz) -> Self {
        self.default_time_zone = time_zone;
        self
    }

    pub fn with_actor_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.actor_placeholder = placeholder.into();
        self
    }

    /// Qualify column references, e.g. `"r"."score"`
    pub fn with_table_alias(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = Some(alias.into());
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Start a query in this compiler's dialect
    pub fn query(&self, select: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(self.dialect, select)
    }

    /// Compile `tree` and append it to `query`
    ///
    /// On error `query` is left untouched. A tree with no effective conditions
    /// adds nothing.
    pub fn compile(
        &self,
        query: &mut QueryBuilder,
        tree: &FilterNode,
        columns: &HashMap<String, ColumnMeta>,
        ctx: &CompileContext,
    ) -> FilterResult<()> {
        if query.dialect() != self.dialect {
            let err = FilterError::DialectMismatch {
                compiler: self.dialect,
                query: query.dialect(),
            };
            tracing::error!(error = %err, "Filter compilation failed");
            return Err(err);
        }

        if let Some(compiled) = self.to_predicate(tree, columns, ctx, query.param_count())? {
            query.merge(compiled.sql, compiled.params);
        }
        Ok(())
    }

    /// Compile `tree` to a standalone predicate whose placeholders start
    /// after `param_offset` existing parameters
    pub fn to_predicate(
        &self,
        tree: &FilterNode,
        columns: &HashMap<String, ColumnMeta>,
        ctx: &CompileContext,
        param_offset: usize,
    ) -> FilterResult<Option<CompiledPredicate>> {
        tracing::debug!(
            dialect = %self.dialect,
            conditions = tree.condition_count(),
            "Compiling filter"
        );

        let result = self.compile_tree(tree, columns, ctx, param_offset);
        match &result {
            Ok(Some(compiled)) => tracing::debug!(
                dialect = %self.dialect,
                params = compiled.params.len(),
                "Filter compiled"
            ),
            Ok(None) => tracing::debug!("Filter has no effective conditions"),
            Err(e) if e.kind() == ErrorKind::Internal => {
                tracing::error!(error = %e, code = e.code(), "Filter compilation failed")
            }
            Err(e) => tracing::debug!(error = %e, code = e.code(), "Filter rejected"),
        }
        result
    }

    fn compile_tree(
        &self,
        tree: &FilterNode,
        columns: &HashMap<String, ColumnMeta>,
        ctx: &CompileContext,
        param_offset: usize,
    ) -> FilterResult<Option<CompiledPredicate>> {
        let Some(tree) = preprocess(tree, columns, ctx, &self.actor_placeholder)? else {
            return Ok(None);
        };

        let env = CompileEnv {
            dialect: self.dialect,
            now: ctx.now,
            default_time_zone: self.default_time_zone,
            table_alias: self.table_alias.as_deref(),
        };
        let mut params = SqlParams::starting_after(self.dialect, param_offset);
        let sql = render_node(&tree, columns, &env, &mut params)?;
        Ok(Some(CompiledPredicate { sql, params }))
    }
}

fn render_node(
    node: &FilterNode,
    columns: &HashMap<String, ColumnMeta>,
    env: &CompileEnv<'_>,
    params: &mut SqlParams,
) -> FilterResult<String> {
    match node {
        FilterNode::Group(group) => render_group(group, columns, env, params),
        FilterNode::Condition(condition) => render_condition(condition, columns, env, params),
    }
}

/// `(child1 C child2 C ...)` with the group's own conjunction
fn render_group(
    group: &FilterGroup,
    columns: &HashMap<String, ColumnMeta>,
    env: &CompileEnv<'_>,
    params: &mut SqlParams,
) -> FilterResult<String> {
    let parts = group
        .children
        .iter()
        .map(|child| render_node(child, columns, env, params))
        .collect::<FilterResult<Vec<_>>>()?;
    Ok(format!("({})", parts.join(group.conjunction.as_sql())))
}

fn render_condition(
    condition: &FilterCondition,
    columns: &HashMap<String, ColumnMeta>,
    env: &CompileEnv<'_>,
    params: &mut SqlParams,
) -> FilterResult<String> {
    let column = columns
        .get(&condition.column_id)
        .ok_or_else(|| FilterError::UnknownColumn(condition.column_id.clone()))?;

    let op = resolve_operator(condition, column)?;
    if column.kind() == CellKind::Datetime && op.takes_date_filter() {
        parse_date_filter(column, op, &condition.value)?;
    }

    let compiler = dispatch::select(column, env)?;
    let sql = compiler.apply(params, op, &condition.value)?;
    tracing::trace!(
        column = %column.id,
        operator = %op,
        compiler = compiler.name(),
        sql = %sql,
        "Compiled condition"
    );
    Ok(sql)
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
