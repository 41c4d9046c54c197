//! Engine configuration
//!
//! Configuration is layered: defaults, then an optional JSON config file, then
//! environment variables. Later layers win.
//!
//! ```json
//! {
//!   "dialect": "sqlite",
//!   "limits": { "max_json_bytes": 65536, "max_conditions": 200, "max_depth": 64 },
//!   "default_time_zone": "Europe/Berlin",
//!   "actor_placeholder": "me"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::core::constants::{
    DEFAULT_ACTOR_PLACEHOLDER, DEFAULT_TIME_ZONE, ENV_ACTOR_PLACEHOLDER, ENV_CONFIG, ENV_DIALECT,
    ENV_MAX_CONDITIONS, ENV_MAX_DEPTH, ENV_MAX_JSON_BYTES, ENV_TIME_ZONE,
};
use crate::data::filters::FilterLimits;
use crate::data::sql::Dialect;

// =============================================================================
// File Configuration (all fields optional)
// =============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LimitsFileConfig {
    pub max_json_bytes: Option<usize>,
    pub max_conditions: Option<usize>,
    pub max_depth: Option<usize>,

    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub dialect: Option<Dialect>,
    pub limits: Option<LimitsFileConfig>,
    pub default_time_zone: Option<String>,
    pub actor_placeholder: Option<String>,

    /// Catch unknown fields for typo detection
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load config from a JSON file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        warn_unknown(&self.extra, "");
        if let Some(limits) = &self.limits {
            warn_unknown(&limits.extra, "limits.");
        }
    }
}

fn warn_unknown(extra: &serde_json::Value, prefix: &str) {
    if let serde_json::Value::Object(map) = extra
        && !map.is_empty()
    {
        let keys_str: String = map
            .keys()
            .map(|k| format!("{}{}", prefix, k))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::warn!(
            fields = %keys_str,
            "Unknown fields in config file (possible typos)"
        );
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved engine configuration
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub dialect: Dialect,
    pub limits: FilterLimits,
    pub default_time_zone: Tz,
    pub actor_placeholder: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            limits: FilterLimits::default(),
            default_time_zone: Tz::UTC,
            actor_placeholder: DEFAULT_ACTOR_PLACEHOLDER.to_string(),
        }
    }
}

impl FilterConfig {
    /// Load configuration from `path` (or `TABULA_FILTER_CONFIG`) and the
    /// process environment, reading `.env` first
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Same as [`FilterConfig::load`] with an explicit environment lookup
    pub fn load_with_env<F>(path: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from));

        let file = match path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                let file = FileConfig::load_from_file(&path)?;
                file.warn_unknown_fields();
                Some(file)
            }
            None => None,
        };

        Self::from_sources(file, env)
    }

    /// Resolve defaults, file values and environment overrides
    pub fn from_sources<F>(file: Option<FileConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = file.unwrap_or_default();
        let file_limits = file.limits.unwrap_or_default();
        let defaults = FilterLimits::default();

        let dialect = match env(ENV_DIALECT) {
            Some(value) => value
                .parse::<Dialect>()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Invalid {}", ENV_DIALECT))?,
            None => file.dialect.unwrap_or_default(),
        };

        let limits = FilterLimits {
            max_json_bytes: resolve_limit(
                &env,
                ENV_MAX_JSON_BYTES,
                file_limits.max_json_bytes,
                defaults.max_json_bytes,
            )?,
            max_conditions: resolve_limit(
                &env,
                ENV_MAX_CONDITIONS,
                file_limits.max_conditions,
                defaults.max_conditions,
            )?,
            max_depth: resolve_limit(
                &env,
                ENV_MAX_DEPTH,
                file_limits.max_depth,
                defaults.max_depth,
            )?,
        };

        let time_zone_name = env(ENV_TIME_ZONE)
            .or(file.default_time_zone)
            .unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());
        let default_time_zone = time_zone_name
            .parse::<Tz>()
            .map_err(|_| anyhow::anyhow!("Unknown time zone: {}", time_zone_name))?;

        let actor_placeholder = env(ENV_ACTOR_PLACEHOLDER)
            .or(file.actor_placeholder)
            .unwrap_or_else(|| DEFAULT_ACTOR_PLACEHOLDER.to_string());
        if actor_placeholder.trim().is_empty() {
            bail!("actor_placeholder must not be empty");
        }

        let config = Self {
            dialect,
            limits,
            default_time_zone,
            actor_placeholder,
        };
        tracing::debug!(
            dialect = %config.dialect,
            time_zone = %config.default_time_zone,
            max_depth = config.limits.max_depth,
            max_conditions = config.limits.max_conditions,
            "Filter config resolved"
        );
        Ok(config)
    }
}

fn resolve_limit<F>(env: &F, key: &str, file_value: Option<usize>, default: usize) -> Result<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let value = match env(key) {
        Some(raw) => {
            tracing::trace!(key, value = %raw, "Merging env override");
            raw.trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid {}: {}", key, raw))?
        }
        None => file_value.unwrap_or(default),
    };
    if value == 0 {
        bail!("{} must be greater than 0", key);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();
        temp_file
    }

    #[test]
    fn test_defaults() {
        let config = FilterConfig::from_sources(None, no_env).unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.limits, FilterLimits::default());
        assert_eq!(config.default_time_zone, Tz::UTC);
        assert_eq!(config.actor_placeholder, "me");
    }

    #[test]
    fn test_load_from_file() {
        let temp_file = write_config(
            r#"{
                "dialect": "sqlite",
                "limits": { "max_depth": 8 },
                "default_time_zone": "Europe/Berlin",
                "actor_placeholder": "@me"
            }"#,
        );
        let config = FilterConfig::load_with_env(Some(temp_file.path()), no_env).unwrap();
        assert_eq!(config.dialect, Dialect::Sqlite);
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(config.limits.max_conditions, 200);
        assert_eq!(config.default_time_zone, chrono_tz::Europe::Berlin);
        assert_eq!(config.actor_placeholder, "@me");
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let temp_file = write_config(r#"{ "dialekt": "sqlite", "limits": { "depth": 3 } }"#);
        let file = FileConfig::load_from_file(temp_file.path()).unwrap();
        assert!(file.extra.get("dialekt").is_some());
        assert!(file.limits.unwrap().extra.get("depth").is_some());
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_file = write_config(r#"{ "dialect": "sqlite", "limits": { "max_depth": 8 } }"#);
        let env = env_from(&[
            (ENV_DIALECT, "pg"),
            (ENV_MAX_DEPTH, "12"),
            (ENV_TIME_ZONE, "Asia/Tokyo"),
        ]);
        let config = FilterConfig::load_with_env(Some(temp_file.path()), env).unwrap();
        assert_eq!(config.dialect, Dialect::Postgres);
        assert_eq!(config.limits.max_depth, 12);
        assert_eq!(config.default_time_zone, chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn test_config_path_from_env() {
        let temp_file = write_config(r#"{ "dialect": "sqlite" }"#);
        let path = temp_file.path().to_string_lossy().to_string();
        let env = env_from(&[(ENV_CONFIG, path.as_str())]);
        let config = FilterConfig::load_with_env(None, env).unwrap();
        assert_eq!(config.dialect, Dialect::Sqlite);
    }

    #[test]
    fn test_missing_config_file() {
        let err = FilterConfig::load_with_env(Some(Path::new("/nonexistent/filter.json")), no_env)
            .unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_malformed_config_file() {
        let temp_file = write_config("{ not json");
        let err = FilterConfig::load_with_env(Some(temp_file.path()), no_env).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = FilterConfig::from_sources(None, env_from(&[(ENV_DIALECT, "oracle")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_DIALECT));

        let err = FilterConfig::from_sources(None, env_from(&[(ENV_MAX_DEPTH, "deep")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_DEPTH));

        let err = FilterConfig::from_sources(None, env_from(&[(ENV_MAX_CONDITIONS, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("greater than 0"));

        let err = FilterConfig::from_sources(None, env_from(&[(ENV_TIME_ZONE, "Mars/Olympus")]))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown time zone"));

        let err = FilterConfig::from_sources(None, env_from(&[(ENV_ACTOR_PLACEHOLDER, "  ")]))
            .unwrap_err();
        assert!(err.to_string().contains("actor_placeholder"));
    }
}
