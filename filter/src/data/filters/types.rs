//! Filter type definitions
//!
//! Defines the filter tree, column metadata and per-call compilation context.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Filter Tree
// =============================================================================

/// A node of a filter tree: a group of children or a single condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Group(FilterGroup),
    Condition(FilterCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterGroup {
    pub conjunction: Conjunction,
    #[serde(default)]
    pub children: Vec<FilterNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    pub column_id: String,
    /// Canonical operator name, or a symbol when `is_symbol` is set
    pub operator: String,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub is_symbol: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    /// Separator used when joining child predicates
    pub fn as_sql(&self) -> &'static str {
        match self {
            Conjunction::And => " AND ",
            Conjunction::Or => " OR ",
        }
    }
}

impl FilterNode {
    pub fn condition(
        column_id: impl Into<String>,
        operator: impl Into<String>,
        value: Value,
    ) -> Self {
        Self::Condition(FilterCondition {
            column_id: column_id.into(),
            operator: operator.into(),
            value,
            is_symbol: false,
        })
    }

    /// Condition whose operator is given as a symbol (`>=`, `IN`, `IS WITHIN`, ...)
    pub fn symbol(column_id: impl Into<String>, symbol: impl Into<String>, value: Value) -> Self {
        Self::Condition(FilterCondition {
            column_id: column_id.into(),
            operator: symbol.into(),
            value,
            is_symbol: true,
        })
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        Self::Group(FilterGroup {
            conjunction: Conjunction::And,
            children,
        })
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        Self::Group(FilterGroup {
            conjunction: Conjunction::Or,
            children,
        })
    }

    /// Number of conditions in the tree
    pub fn condition_count(&self) -> usize {
        match self {
            Self::Condition(_) => 1,
            Self::Group(group) => group.children.iter().map(Self::condition_count).sum(),
        }
    }

    /// Nesting depth: a lone condition has depth 1, each group adds one level
    pub fn depth(&self) -> usize {
        match self {
            Self::Condition(_) => 1,
            Self::Group(group) => {
                1 + group
                    .children
                    .iter()
                    .map(Self::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }

    /// Distinct column ids referenced by the tree, sorted
    pub fn column_ids(&self) -> Vec<&str> {
        let mut ids = BTreeSet::new();
        self.collect_column_ids(&mut ids);
        ids.into_iter().collect()
    }

    fn collect_column_ids<'a>(&'a self, ids: &mut BTreeSet<&'a str>) {
        match self {
            Self::Condition(condition) => {
                ids.insert(condition.column_id.as_str());
            }
            Self::Group(group) => {
                for child in &group.children {
                    child.collect_column_ids(ids);
                }
            }
        }
    }
}

// =============================================================================
// Column Metadata
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Boolean,
    Number,
    Datetime,
    Text,
    Structured,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Storage {
    #[default]
    Plain,
    Json,
}

/// Column kind the compilers dispatch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Boolean,
    Number,
    Datetime,
    Text,
    /// JSON objects `{ "id", "title" }`; text columns with json storage land here too
    Structured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    Single,
    Multi,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnOptions {
    /// IANA zone for datetime columns; the engine default applies when absent
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Assignee/creator/last-modifier column that accepts the actor placeholder
    #[serde(default)]
    pub actor_reference: bool,
}

/// Resolved metadata for one filterable column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMeta {
    pub id: String,
    /// Physical column name, quoted by the dialect when compiled
    pub db_name: String,
    pub semantic_type: SemanticType,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub is_multi_valued: bool,
    #[serde(default)]
    pub options: ColumnOptions,
}

impl ColumnMeta {
    pub fn new(
        id: impl Into<String>,
        db_name: impl Into<String>,
        semantic_type: SemanticType,
    ) -> Self {
        Self {
            id: id.into(),
            db_name: db_name.into(),
            semantic_type,
            storage: Storage::Plain,
            is_multi_valued: false,
            options: ColumnOptions::default(),
        }
    }

    pub fn json(mut self) -> Self {
        self.storage = Storage::Json;
        self
    }

    pub fn multi(mut self) -> Self {
        self.is_multi_valued = true;
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.options.time_zone = Some(time_zone.into());
        self
    }

    pub fn actor_reference(mut self) -> Self {
        self.options.actor_reference = true;
        self
    }

    pub fn kind(&self) -> CellKind {
        match (self.semantic_type, self.storage) {
            (SemanticType::Boolean, _) => CellKind::Boolean,
            (SemanticType::Number, _) => CellKind::Number,
            (SemanticType::Datetime, _) => CellKind::Datetime,
            (SemanticType::Text, Storage::Plain) => CellKind::Text,
            (SemanticType::Text, Storage::Json) | (SemanticType::Structured, _) => {
                CellKind::Structured
            }
        }
    }

    pub fn cardinality(&self) -> Cardinality {
        if self.is_multi_valued {
            Cardinality::Multi
        } else {
            Cardinality::Single
        }
    }
}

/// Index column metadata by id
pub fn index_columns(columns: impl IntoIterator<Item = ColumnMeta>) -> HashMap<String, ColumnMeta> {
    columns.into_iter().map(|c| (c.id.clone(), c)).collect()
}

// =============================================================================
// Compilation Context
// =============================================================================

/// Per-call inputs: who is asking and what "now" means
#[derive(Debug, Clone, PartialEq)]
pub struct CompileContext {
    pub actor_id: Option<String>,
    pub now: DateTime<Utc>,
}

impl CompileContext {
    pub fn new() -> Self {
        Self {
            actor_id: None,
            now: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Pin the reference instant used by relative date filters
    pub fn with_reference_time(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

impl Default for CompileContext {
    fn default() -> Self {
        Self::new()
    }
}
