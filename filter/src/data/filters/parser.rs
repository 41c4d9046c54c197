//! Filter parsing
//!
//! Parses JSON filter trees with request limits. Trees built in code skip
//! this step; the walker itself imposes no depth limit.

use serde::{Deserialize, Serialize};

use super::error::{FilterError, FilterResult};
use super::types::FilterNode;
use crate::core::constants::{
    DEFAULT_FILTER_MAX_CONDITIONS, DEFAULT_FILTER_MAX_DEPTH, DEFAULT_FILTER_MAX_JSON_BYTES,
};

/// Limits applied to untrusted filter JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterLimits {
    pub max_json_bytes: usize,
    pub max_conditions: usize,
    pub max_depth: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            max_json_bytes: DEFAULT_FILTER_MAX_JSON_BYTES,
            max_conditions: DEFAULT_FILTER_MAX_CONDITIONS,
            max_depth: DEFAULT_FILTER_MAX_DEPTH,
        }
    }
}

/// Parse a filter tree from JSON
///
/// Validates JSON size, parses into a `FilterNode`, then checks the condition
/// count and nesting depth. Column and operator validation happens at compile time.
pub fn parse_filter(json_str: &str, limits: &FilterLimits) -> FilterResult<FilterNode> {
    if json_str.len() > limits.max_json_bytes {
        return Err(FilterError::FilterTooLarge {
            max: limits.max_json_bytes,
        });
    }

    let tree: FilterNode =
        serde_json::from_str(json_str).map_err(|e| FilterError::InvalidFilterJson(e.to_string()))?;

    if tree.condition_count() > limits.max_conditions {
        return Err(FilterError::TooManyConditions {
            max: limits.max_conditions,
        });
    }

    if tree.depth() > limits.max_depth {
        return Err(FilterError::TooDeep {
            max: limits.max_depth,
        });
    }

    tracing::trace!(
        conditions = tree.condition_count(),
        depth = tree.depth(),
        "Parsed filter tree"
    );
    Ok(tree)
}
