//! Filter compilation errors
//!
//! Every error carries a stable machine-readable code and is classified as a
//! caller mistake (validation) or an engine fault (internal).

use thiserror::Error;

use super::date_range::DateRangeError;
use super::operator::Operator;
use crate::data::sql::Dialect;

/// Error classification for callers mapping errors onto responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Internal => 500,
        }
    }
}

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Cannot filter by unknown column: {0}")]
    UnknownColumn(String),

    #[error("Invalid operator '{operator}' for column {column}: {reason}")]
    InvalidOperator {
        column: String,
        operator: String,
        reason: String,
    },

    #[error("Date mode '{mode}' cannot be used with {operator} on column {column}")]
    InvalidSubMode {
        column: String,
        operator: Operator,
        mode: String,
    },

    #[error("Malformed value for {operator} on column {column}: {reason}")]
    MalformedValue {
        column: String,
        operator: Operator,
        reason: String,
    },

    #[error("Invalid date filter on column {column}: {source}")]
    DateRange {
        column: String,
        source: DateRangeError,
    },

    #[error("Column {column} references the current user but no actor is set")]
    MissingActor { column: String },

    #[error("Invalid filter JSON: {0}")]
    InvalidFilterJson(String),

    #[error("Filter JSON exceeds maximum size of {max} bytes")]
    FilterTooLarge { max: usize },

    #[error("Maximum {max} filter conditions allowed")]
    TooManyConditions { max: usize },

    #[error("Filter nesting exceeds maximum depth of {max}")]
    TooDeep { max: usize },

    #[error("Invalid metadata for column {column}: {reason}")]
    InvalidColumnMetadata { column: String, reason: String },

    #[error("Operator {operator} is not supported by {compiler} (column {column})")]
    UnsupportedOperation {
        column: String,
        operator: Operator,
        compiler: &'static str,
    },

    #[error("Query builder targets {query} but the compiler targets {compiler}")]
    DialectMismatch { compiler: Dialect, query: Dialect },
}

impl FilterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidColumnMetadata { .. }
            | Self::UnsupportedOperation { .. }
            | Self::DialectMismatch { .. } => ErrorKind::Internal,
            _ => ErrorKind::Validation,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownColumn(_) => "INVALID_FILTER_COLUMN",
            Self::InvalidOperator { .. } => "INVALID_FILTER_OPERATOR",
            Self::InvalidSubMode { .. } => "INVALID_DATE_MODE",
            Self::MalformedValue { .. } => "INVALID_FILTER_VALUE",
            Self::DateRange { .. } => "INVALID_DATE_FILTER",
            Self::MissingActor { .. } => "MISSING_ACTOR",
            Self::InvalidFilterJson(_) => "INVALID_FILTER_JSON",
            Self::FilterTooLarge { .. } => "FILTER_JSON_TOO_LARGE",
            Self::TooManyConditions { .. } => "TOO_MANY_FILTERS",
            Self::TooDeep { .. } => "FILTER_TOO_DEEP",
            Self::InvalidColumnMetadata { .. } => "INVALID_COLUMN_METADATA",
            Self::UnsupportedOperation { .. } => "UNSUPPORTED_FILTER_OPERATION",
            Self::DialectMismatch { .. } => "DIALECT_MISMATCH",
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
