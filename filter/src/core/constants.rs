// =============================================================================
// Configuration Files
// =============================================================================

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "TABULA_FILTER_CONFIG";

// =============================================================================
// Environment Variables - Logging
// =============================================================================

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "TABULA_LOG";

/// Default log filter when neither TABULA_LOG nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = "warn,tabula_filter=info";

// =============================================================================
// Environment Variables - Filter Engine
// =============================================================================

/// Environment variable for the storage dialect (`postgres` or `sqlite`)
pub const ENV_DIALECT: &str = "TABULA_FILTER_DIALECT";

/// Environment variable for the maximum filter nesting depth
pub const ENV_MAX_DEPTH: &str = "TABULA_FILTER_MAX_DEPTH";

/// Environment variable for the maximum number of conditions per filter
pub const ENV_MAX_CONDITIONS: &str = "TABULA_FILTER_MAX_CONDITIONS";

/// Environment variable for the maximum filter JSON size in bytes
pub const ENV_MAX_JSON_BYTES: &str = "TABULA_FILTER_MAX_JSON_BYTES";

/// Environment variable for the default time zone of datetime columns
pub const ENV_TIME_ZONE: &str = "TABULA_FILTER_TIME_ZONE";

/// Environment variable for the "current user" placeholder value
pub const ENV_ACTOR_PLACEHOLDER: &str = "TABULA_FILTER_ACTOR_PLACEHOLDER";

// =============================================================================
// Filter Defaults
// =============================================================================

/// Maximum size of filter JSON in bytes (64KB)
pub const DEFAULT_FILTER_MAX_JSON_BYTES: usize = 64 * 1024;

/// Maximum number of conditions in one filter tree
pub const DEFAULT_FILTER_MAX_CONDITIONS: usize = 200;

/// Maximum nesting depth of parsed filter trees
pub const DEFAULT_FILTER_MAX_DEPTH: usize = 64;

/// Default time zone for datetime columns without one
pub const DEFAULT_TIME_ZONE: &str = "UTC";

/// Value that stands for the current user on actor-reference columns
pub const DEFAULT_ACTOR_PLACEHOLDER: &str = "me";

// =============================================================================
// Testing
// =============================================================================

/// PostgreSQL URL enabling the PostgreSQL execution tests
pub const ENV_TEST_POSTGRES_URL: &str = "TABULA_TEST_POSTGRES_URL";
