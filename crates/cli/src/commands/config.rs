use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::Value;

use skillrank_core::config::{AppConfig, LoadOptions};

use crate::commands::{load_config, to_data, CommandResult};

const COMMAND: &str = "config";

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

/// Effective configuration with the layer each value came from.
pub fn run(options: LoadOptions) -> CommandResult {
    let explicit_path = options.config_path.clone();
    let config = match load_config(COMMAND, options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let config_file_path = detect_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let entries = fields(&config)
        .into_iter()
        .map(|field| ConfigEntry {
            key: field.key,
            value: field.value,
            source: field_source(
                field.key,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        })
        .collect::<Vec<_>>();

    let data = match to_data(COMMAND, &entries) {
        Ok(data) => data,
        Err(failure) => return failure,
    };
    CommandResult::success_with_data(
        COMMAND,
        "effective config (source precedence: env > file > default)",
        Some(data),
    )
}

struct ConfigField {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

fn fields(config: &AppConfig) -> Vec<ConfigField> {
    vec![
        ConfigField {
            key: "ranking.minimum_rating",
            env_keys: &["SKILLRANK_RANKING_MINIMUM_RATING"],
            value: config.ranking.minimum_rating.to_string(),
        },
        ConfigField {
            key: "ranking.minimum_rating_count",
            env_keys: &["SKILLRANK_RANKING_MINIMUM_RATING_COUNT"],
            value: config.ranking.minimum_rating_count.to_string(),
        },
        ConfigField {
            key: "ranking.autocomplete_limit",
            env_keys: &["SKILLRANK_RANKING_AUTOCOMPLETE_LIMIT"],
            value: config.ranking.autocomplete_limit.to_string(),
        },
        ConfigField {
            key: "ranking.dashboard_limit",
            env_keys: &["SKILLRANK_RANKING_DASHBOARD_LIMIT"],
            value: config.ranking.dashboard_limit.to_string(),
        },
        ConfigField {
            key: "catalog.snapshot_path",
            env_keys: &["SKILLRANK_CATALOG_SNAPSHOT_PATH"],
            value: config.catalog.snapshot_path.display().to_string(),
        },
        ConfigField {
            key: "logging.level",
            env_keys: &["SKILLRANK_LOGGING_LEVEL", "SKILLRANK_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        ConfigField {
            key: "logging.format",
            env_keys: &["SKILLRANK_LOGGING_FORMAT", "SKILLRANK_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format).to_ascii_lowercase(),
        },
    ]
}

fn detect_config_path(explicit_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path);
    }

    let root = PathBuf::from("skillrank.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/skillrank.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        if env::var(env_key).is_ok_and(|value| !value.trim().is_empty()) {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}
