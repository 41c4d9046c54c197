//! Operators, symbols and per-column legality
//!
//! The operator set is closed. Symbols map onto operators through two static
//! tables (datetime columns use their own), each usable in both directions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::error::{FilterError, FilterResult};
use super::types::{Cardinality, CellKind, ColumnMeta, FilterCondition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    Exactly,
    Contains,
    NotContains,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    AnyOf,
    NoneOf,
    AllOf,
    Within,
    IsEmpty,
    IsNotEmpty,
    Before,
    After,
    OnOrBefore,
    OnOrAfter,
}

impl Operator {
    pub const ALL: [Operator; 19] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Exactly,
        Operator::Contains,
        Operator::NotContains,
        Operator::GreaterThan,
        Operator::GreaterOrEqual,
        Operator::LessThan,
        Operator::LessOrEqual,
        Operator::AnyOf,
        Operator::NoneOf,
        Operator::AllOf,
        Operator::Within,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::Before,
        Operator::After,
        Operator::OnOrBefore,
        Operator::OnOrAfter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::Exactly => "exactly",
            Operator::Contains => "contains",
            Operator::NotContains => "notContains",
            Operator::GreaterThan => "greaterThan",
            Operator::GreaterOrEqual => "greaterOrEqual",
            Operator::LessThan => "lessThan",
            Operator::LessOrEqual => "lessOrEqual",
            Operator::AnyOf => "anyOf",
            Operator::NoneOf => "noneOf",
            Operator::AllOf => "allOf",
            Operator::Within => "within",
            Operator::IsEmpty => "isEmpty",
            Operator::IsNotEmpty => "isNotEmpty",
            Operator::Before => "before",
            Operator::After => "after",
            Operator::OnOrBefore => "onOrBefore",
            Operator::OnOrAfter => "onOrAfter",
        }
    }

    /// Map date aliases onto the ordering operator they stand for
    pub fn canonical(self) -> Self {
        match self {
            Operator::Before => Operator::LessThan,
            Operator::After => Operator::GreaterThan,
            Operator::OnOrBefore => Operator::LessOrEqual,
            Operator::OnOrAfter => Operator::GreaterOrEqual,
            other => other,
        }
    }

    /// Operators that ignore their value
    pub fn is_presence_check(self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }

    /// Operators whose value is a date filter on datetime columns
    pub fn takes_date_filter(self) -> bool {
        matches!(
            self.canonical(),
            Operator::Equals
                | Operator::NotEquals
                | Operator::Within
                | Operator::GreaterThan
                | Operator::GreaterOrEqual
                | Operator::LessThan
                | Operator::LessOrEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| format!("Unknown operator: {}", name))
    }
}

// =============================================================================
// Symbols
// =============================================================================

/// Which symbol table applies to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolFamily {
    Generic,
    Datetime,
}

impl SymbolFamily {
    pub fn for_kind(kind: CellKind) -> Self {
        match kind {
            CellKind::Datetime => SymbolFamily::Datetime,
            _ => SymbolFamily::Generic,
        }
    }
}

const GENERIC_SYMBOLS: &[(&str, Operator)] = &[
    ("=", Operator::Equals),
    ("!=", Operator::NotEquals),
    (">", Operator::GreaterThan),
    (">=", Operator::GreaterOrEqual),
    ("<", Operator::LessThan),
    ("<=", Operator::LessOrEqual),
    ("LIKE", Operator::Contains),
    ("NOT LIKE", Operator::NotContains),
    ("IN", Operator::AnyOf),
    ("NOT IN", Operator::NoneOf),
    ("HAS", Operator::AllOf),
    ("==", Operator::Exactly),
    ("IS NULL", Operator::IsEmpty),
    ("IS NOT NULL", Operator::IsNotEmpty),
];

const DATETIME_SYMBOLS: &[(&str, Operator)] = &[
    ("=", Operator::Equals),
    ("!=", Operator::NotEquals),
    ("<", Operator::Before),
    (">", Operator::After),
    ("<=", Operator::OnOrBefore),
    (">=", Operator::OnOrAfter),
    ("IS WITHIN", Operator::Within),
    ("IS NULL", Operator::IsEmpty),
    ("IS NOT NULL", Operator::IsNotEmpty),
];

struct SymbolTable {
    to_operator: HashMap<&'static str, Operator>,
    to_symbol: HashMap<Operator, &'static str>,
}

impl SymbolTable {
    fn build(entries: &[(&'static str, Operator)]) -> Self {
        let mut to_operator = HashMap::with_capacity(entries.len());
        let mut to_symbol = HashMap::with_capacity(entries.len() * 2);
        for &(symbol, op) in entries {
            to_operator.insert(symbol, op);
            to_symbol.insert(op, symbol);
            // `lessThan` on a datetime column prints as the `before` symbol
            to_symbol.entry(op.canonical()).or_insert(symbol);
        }
        Self {
            to_operator,
            to_symbol,
        }
    }
}

static GENERIC_TABLE: LazyLock<SymbolTable> = LazyLock::new(|| SymbolTable::build(GENERIC_SYMBOLS));
static DATETIME_TABLE: LazyLock<SymbolTable> =
    LazyLock::new(|| SymbolTable::build(DATETIME_SYMBOLS));

fn table(family: SymbolFamily) -> &'static SymbolTable {
    match family {
        SymbolFamily::Generic => &*GENERIC_TABLE,
        SymbolFamily::Datetime => &*DATETIME_TABLE,
    }
}

/// Look up a symbol, ignoring case and surrounding/repeated whitespace
pub fn operator_for_symbol(family: SymbolFamily, symbol: &str) -> Option<Operator> {
    let normalized = symbol
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    table(family).to_operator.get(normalized.as_str()).copied()
}

pub fn symbol_for_operator(family: SymbolFamily, op: Operator) -> Option<&'static str> {
    table(family).to_symbol.get(&op).copied()
}

// =============================================================================
// Legality
// =============================================================================

const BOOLEAN_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

const NUMBER_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::GreaterThan,
    Operator::GreaterOrEqual,
    Operator::LessThan,
    Operator::LessOrEqual,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

const DATETIME_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Within,
    Operator::GreaterThan,
    Operator::GreaterOrEqual,
    Operator::LessThan,
    Operator::LessOrEqual,
    Operator::Before,
    Operator::After,
    Operator::OnOrBefore,
    Operator::OnOrAfter,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

const TEXT_SINGLE_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::NotContains,
    Operator::AnyOf,
    Operator::NoneOf,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

const TEXT_MULTI_OPS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::NotContains,
    Operator::AnyOf,
    Operator::NoneOf,
    Operator::AllOf,
    Operator::Exactly,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

/// Operators a column of this shape accepts
pub fn legal_operators(kind: CellKind, cardinality: Cardinality) -> &'static [Operator] {
    match (kind, cardinality) {
        (CellKind::Boolean, _) => BOOLEAN_OPS,
        (CellKind::Number, _) => NUMBER_OPS,
        (CellKind::Datetime, _) => DATETIME_OPS,
        (CellKind::Text | CellKind::Structured, Cardinality::Single) => TEXT_SINGLE_OPS,
        (CellKind::Text | CellKind::Structured, Cardinality::Multi) => TEXT_MULTI_OPS,
    }
}

/// Parse a condition's operator without validating it against the column
pub fn parse_operator(condition: &FilterCondition, kind: CellKind) -> Option<Operator> {
    if condition.is_symbol {
        operator_for_symbol(SymbolFamily::for_kind(kind), &condition.operator)
    } else {
        condition.operator.parse().ok()
    }
}

/// Resolve a condition's operator and check it is legal for the column
pub fn resolve_operator(
    condition: &FilterCondition,
    column: &ColumnMeta,
) -> FilterResult<Operator> {
    let kind = column.kind();
    let invalid = |reason: String| FilterError::InvalidOperator {
        column: column.id.clone(),
        operator: condition.operator.clone(),
        reason,
    };

    let op = parse_operator(condition, kind).ok_or_else(|| {
        if condition.is_symbol {
            invalid("unknown symbol".to_string())
        } else {
            invalid("unknown operator".to_string())
        }
    })?;

    if !legal_operators(kind, column.cardinality()).contains(&op) {
        return Err(invalid(format!("{} is not allowed for this column type", op)));
    }
    Ok(op)
}
