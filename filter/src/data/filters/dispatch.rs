//! Column-type dispatch
//!
//! Picks the compiler for a column from its kind, cardinality and the active
//! dialect. Compilers borrow the column metadata for the duration of a call.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::contract::{DateClock, OperatorContract};
use super::error::{FilterError, FilterResult};
use super::types::{Cardinality, CellKind, ColumnMeta};
use crate::data::sql::Dialect;

/// Call-wide settings every compiler needs
#[derive(Debug, Clone, Copy)]
pub struct CompileEnv<'a> {
    pub dialect: Dialect,
    pub now: DateTime<Utc>,
    pub default_time_zone: Tz,
    pub table_alias: Option<&'a str>,
}

/// Quoted column reference, qualified by the table alias when one is set
pub fn column_expr(dialect: Dialect, column: &ColumnMeta, table_alias: Option<&str>) -> String {
    let sql = dialect.sql();
    match table_alias {
        Some(alias) => format!(
            "{}.{}",
            sql.quote_identifier(alias),
            sql.quote_identifier(&column.db_name)
        ),
        None => sql.quote_identifier(&column.db_name),
    }
}

/// The column's own time zone, or the engine default
pub fn column_time_zone(column: &ColumnMeta, default: Tz) -> FilterResult<Tz> {
    match column.options.time_zone.as_deref() {
        None => Ok(default),
        Some(name) => name
            .trim()
            .parse::<Tz>()
            .map_err(|e| FilterError::InvalidColumnMetadata {
                column: column.id.clone(),
                reason: format!("unknown time zone '{}': {}", name, e),
            }),
    }
}

pub fn select<'a>(
    column: &'a ColumnMeta,
    env: &CompileEnv<'_>,
) -> FilterResult<Box<dyn OperatorContract + 'a>> {
    let expr = column_expr(env.dialect, column, env.table_alias);
    let clock = || -> FilterResult<DateClock> {
        Ok(DateClock {
            time_zone: column_time_zone(column, env.default_time_zone)?,
            now: env.now,
        })
    };

    match env.dialect {
        Dialect::Postgres => select_postgres(column, expr, clock),
        Dialect::Sqlite => select_sqlite(column, expr, clock),
    }
}

fn select_postgres<'a>(
    column: &'a ColumnMeta,
    expr: String,
    clock: impl FnOnce() -> FilterResult<DateClock>,
) -> FilterResult<Box<dyn OperatorContract + 'a>> {
    use super::postgres::*;

    let compiler: Box<dyn OperatorContract + 'a> = match (column.kind(), column.cardinality()) {
        (CellKind::Boolean, Cardinality::Single) => Box::new(BooleanCell::new(column, expr)),
        (CellKind::Boolean, Cardinality::Multi) => Box::new(BooleanArray::new(column, expr)),
        (CellKind::Number, Cardinality::Single) => Box::new(NumberCell::new(column, expr)),
        (CellKind::Number, Cardinality::Multi) => Box::new(NumberArray::new(column, expr)),
        (CellKind::Datetime, Cardinality::Single) => {
            Box::new(DatetimeCell::new(column, expr, clock()?))
        }
        (CellKind::Datetime, Cardinality::Multi) => {
            Box::new(DatetimeArray::new(column, expr, clock()?))
        }
        (CellKind::Text, Cardinality::Single) => Box::new(TextCell::new(column, expr)),
        (CellKind::Text, Cardinality::Multi) => Box::new(StringArray::text(column, expr)),
        (CellKind::Structured, Cardinality::Single) => Box::new(StructuredCell::new(column, expr)),
        (CellKind::Structured, Cardinality::Multi) => {
            Box::new(StringArray::structured(column, expr))
        }
    };
    Ok(compiler)
}

fn select_sqlite<'a>(
    column: &'a ColumnMeta,
    expr: String,
    clock: impl FnOnce() -> FilterResult<DateClock>,
) -> FilterResult<Box<dyn OperatorContract + 'a>> {
    use super::sqlite::*;

    let compiler: Box<dyn OperatorContract + 'a> = match (column.kind(), column.cardinality()) {
        (CellKind::Boolean, Cardinality::Single) => Box::new(BooleanCell::new(column, expr)),
        (CellKind::Boolean, Cardinality::Multi) => Box::new(BooleanArray::new(column, expr)),
        (CellKind::Number, Cardinality::Single) => Box::new(NumberCell::new(column, expr)),
        (CellKind::Number, Cardinality::Multi) => Box::new(NumberArray::new(column, expr)),
        (CellKind::Datetime, Cardinality::Single) => {
            Box::new(DatetimeCell::new(column, expr, clock()?))
        }
        (CellKind::Datetime, Cardinality::Multi) => {
            Box::new(DatetimeArray::new(column, expr, clock()?))
        }
        (CellKind::Text, Cardinality::Single) => Box::new(TextCell::new(column, expr)),
        (CellKind::Text, Cardinality::Multi) => Box::new(StringArray::text(column, expr)),
        (CellKind::Structured, Cardinality::Single) => Box::new(StructuredCell::new(column, expr)),
        (CellKind::Structured, Cardinality::Multi) => {
            Box::new(StringArray::structured(column, expr))
        }
    };
    Ok(compiler)
}
