use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub analytics: AnalyticsConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    /// Window length when `from`/`to` are omitted.
    pub default_window_days: u32,
    /// Trailing window for inventory sales velocity.
    pub velocity_window_days: u32,
    /// Stock at or below this is always Critical.
    pub critical_stock_threshold: u32,
    /// Days-of-cover boundary between Low Stock and Normal.
    pub safety_days: f64,
    /// Maximum scored customers returned by the segments operation.
    pub segment_customer_cap: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub cache_ttl_secs: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://shopgauge.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            cache: CacheConfig { ttl_secs: 300 },
            analytics: AnalyticsConfig {
                default_window_days: 30,
                velocity_window_days: 14,
                critical_stock_threshold: 5,
                safety_days: 14.0,
                segment_customer_cap: 100,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("shopgauge.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(cache) = patch.cache {
            if let Some(ttl_secs) = cache.ttl_secs {
                self.cache.ttl_secs = ttl_secs;
            }
        }

        if let Some(analytics) = patch.analytics {
            if let Some(default_window_days) = analytics.default_window_days {
                self.analytics.default_window_days = default_window_days;
            }
            if let Some(velocity_window_days) = analytics.velocity_window_days {
                self.analytics.velocity_window_days = velocity_window_days;
            }
            if let Some(critical_stock_threshold) = analytics.critical_stock_threshold {
                self.analytics.critical_stock_threshold = critical_stock_threshold;
            }
            if let Some(safety_days) = analytics.safety_days {
                self.analytics.safety_days = safety_days;
            }
            if let Some(segment_customer_cap) = analytics.segment_customer_cap {
                self.analytics.segment_customer_cap = segment_customer_cap;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SHOPGAUGE_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("SHOPGAUGE_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections =
                parse_u32("SHOPGAUGE_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("SHOPGAUGE_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("SHOPGAUGE_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SHOPGAUGE_CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_u64("SHOPGAUGE_CACHE_TTL_SECS", &value)?;
        }

        if let Some(value) = read_env("SHOPGAUGE_DEFAULT_WINDOW_DAYS") {
            self.analytics.default_window_days =
                parse_u32("SHOPGAUGE_DEFAULT_WINDOW_DAYS", &value)?;
        }
        if let Some(value) = read_env("SHOPGAUGE_VELOCITY_WINDOW_DAYS") {
            self.analytics.velocity_window_days =
                parse_u32("SHOPGAUGE_VELOCITY_WINDOW_DAYS", &value)?;
        }
        if let Some(value) = read_env("SHOPGAUGE_CRITICAL_STOCK_THRESHOLD") {
            self.analytics.critical_stock_threshold =
                parse_u32("SHOPGAUGE_CRITICAL_STOCK_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("SHOPGAUGE_SAFETY_DAYS") {
            self.analytics.safety_days = parse_f64("SHOPGAUGE_SAFETY_DAYS", &value)?;
        }
        if let Some(value) = read_env("SHOPGAUGE_SEGMENT_CUSTOMER_CAP") {
            self.analytics.segment_customer_cap =
                parse_u32("SHOPGAUGE_SEGMENT_CUSTOMER_CAP", &value)? as usize;
        }

        let log_level =
            read_env("SHOPGAUGE_LOGGING_LEVEL").or_else(|| read_env("SHOPGAUGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SHOPGAUGE_LOGGING_FORMAT").or_else(|| read_env("SHOPGAUGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(cache_ttl_secs) = overrides.cache_ttl_secs {
            self.cache.ttl_secs = cache_ttl_secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.database.url.trim();
        let sqlite_url =
            url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
        if !sqlite_url {
            return Err(ConfigError::Validation(
                "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                    .to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Validation(
                "database.max_connections must be greater than zero".to_string(),
            ));
        }
        if self.database.timeout_secs == 0 || self.database.timeout_secs > 300 {
            return Err(ConfigError::Validation(
                "database.timeout_secs must be in range 1..=300".to_string(),
            ));
        }

        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache.ttl_secs must be greater than zero".to_string(),
            ));
        }

        if self.analytics.default_window_days == 0 {
            return Err(ConfigError::Validation(
                "analytics.default_window_days must be greater than zero".to_string(),
            ));
        }
        if self.analytics.velocity_window_days == 0 {
            return Err(ConfigError::Validation(
                "analytics.velocity_window_days must be greater than zero".to_string(),
            ));
        }
        if self.analytics.safety_days <= 0.0 {
            return Err(ConfigError::Validation(
                "analytics.safety_days must be greater than zero".to_string(),
            ));
        }
        if self.analytics.segment_customer_cap == 0 {
            return Err(ConfigError::Validation(
                "analytics.segment_customer_cap must be greater than zero".to_string(),
            ));
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::Validation(
                "logging.level must be one of trace|debug|info|warn|error".to_string(),
            )),
        }
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("shopgauge.toml"), PathBuf::from("config/shopgauge.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    toml::from_str::<ConfigPatch>(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    cache: Option<CachePatch>,
    analytics: Option<AnalyticsPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CachePatch {
    ttl_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsPatch {
    default_window_days: Option<u32>,
    velocity_window_days: Option<u32>,
    critical_stock_threshold: Option<u32>,
    safety_days: Option<f64>,
    segment_customer_cap: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
