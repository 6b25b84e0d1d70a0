use std::env;
use std::fs;
use std::path::PathBuf;

use shopgauge_core::config::{AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file = load_config_file();
    let entries: Vec<(&str, String, &str)> = vec![
        ("database.url", config.database.url.clone(), "SHOPGAUGE_DATABASE_URL"),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            "SHOPGAUGE_DATABASE_MAX_CONNECTIONS",
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            "SHOPGAUGE_DATABASE_TIMEOUT_SECS",
        ),
        ("cache.ttl_secs", config.cache.ttl_secs.to_string(), "SHOPGAUGE_CACHE_TTL_SECS"),
        (
            "analytics.default_window_days",
            config.analytics.default_window_days.to_string(),
            "SHOPGAUGE_DEFAULT_WINDOW_DAYS",
        ),
        (
            "analytics.velocity_window_days",
            config.analytics.velocity_window_days.to_string(),
            "SHOPGAUGE_VELOCITY_WINDOW_DAYS",
        ),
        (
            "analytics.critical_stock_threshold",
            config.analytics.critical_stock_threshold.to_string(),
            "SHOPGAUGE_CRITICAL_STOCK_THRESHOLD",
        ),
        (
            "analytics.safety_days",
            config.analytics.safety_days.to_string(),
            "SHOPGAUGE_SAFETY_DAYS",
        ),
        (
            "analytics.segment_customer_cap",
            config.analytics.segment_customer_cap.to_string(),
            "SHOPGAUGE_SEGMENT_CUSTOMER_CAP",
        ),
        ("logging.level", config.logging.level.clone(), "SHOPGAUGE_LOG_LEVEL"),
        (
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            "SHOPGAUGE_LOG_FORMAT",
        ),
    ];

    let mut lines =
        vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in entries {
        lines.push(format!("  {key} = {value} (source: {})", field_source(key, env_key, &file)));
    }
    lines.join("\n")
}

fn load_config_file() -> Option<(PathBuf, Value)> {
    let path = [PathBuf::from("shopgauge.toml"), PathBuf::from("config/shopgauge.toml")]
        .into_iter()
        .find(|path| path.exists())?;
    let doc = fs::read_to_string(&path).ok()?.parse::<Value>().ok()?;
    Some((path, doc))
}

fn field_source(dotted_key: &str, env_key: &str, file: &Option<(PathBuf, Value)>) -> String {
    let env_set = env::var(env_key).map(|value| !value.trim().is_empty()).unwrap_or(false);
    if env_set {
        return format!("env {env_key}");
    }

    if let Some((path, doc)) = file {
        let found = dotted_key.split('.').try_fold(doc, |node, part| node.get(part));
        if found.is_some() {
            return format!("file {}", path.display());
        }
    }

    "default".to_string()
}
