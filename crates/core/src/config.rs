use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::completion::{CompletionRating, DEFAULT_MINIMUM_RATING};
use crate::proximity::AUTOCOMPLETE_LIMIT;
use crate::recommendations::DEFAULT_DASHBOARD_LIMIT;

const MAX_AUTOCOMPLETE_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppConfig {
    pub ranking: RankingConfig,
    pub catalog: CatalogConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankingConfig {
    pub minimum_rating: f64,
    pub minimum_rating_count: u32,
    pub autocomplete_limit: usize,
    pub dashboard_limit: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CatalogConfig {
    pub snapshot_path: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
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
    pub minimum_rating: Option<f64>,
    pub minimum_rating_count: Option<u32>,
    pub snapshot_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
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
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ranking: RankingConfig {
                minimum_rating: DEFAULT_MINIMUM_RATING,
                minimum_rating_count: 0,
                autocomplete_limit: AUTOCOMPLETE_LIMIT,
                dashboard_limit: DEFAULT_DASHBOARD_LIMIT,
            },
            catalog: CatalogConfig { snapshot_path: PathBuf::from("catalog.json") },
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("skillrank.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(ranking) = patch.ranking {
            if let Some(minimum_rating) = ranking.minimum_rating {
                self.ranking.minimum_rating = minimum_rating;
            }
            if let Some(minimum_rating_count) = ranking.minimum_rating_count {
                self.ranking.minimum_rating_count = minimum_rating_count;
            }
            if let Some(autocomplete_limit) = ranking.autocomplete_limit {
                self.ranking.autocomplete_limit = autocomplete_limit;
            }
            if let Some(dashboard_limit) = ranking.dashboard_limit {
                self.ranking.dashboard_limit = dashboard_limit;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(snapshot_path) = catalog.snapshot_path {
                self.catalog.snapshot_path = snapshot_path;
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
        if let Some(value) = read_env("SKILLRANK_RANKING_MINIMUM_RATING") {
            self.ranking.minimum_rating = parse_f64("SKILLRANK_RANKING_MINIMUM_RATING", &value)?;
        }
        if let Some(value) = read_env("SKILLRANK_RANKING_MINIMUM_RATING_COUNT") {
            self.ranking.minimum_rating_count =
                parse_u32("SKILLRANK_RANKING_MINIMUM_RATING_COUNT", &value)?;
        }
        if let Some(value) = read_env("SKILLRANK_RANKING_AUTOCOMPLETE_LIMIT") {
            self.ranking.autocomplete_limit =
                parse_usize("SKILLRANK_RANKING_AUTOCOMPLETE_LIMIT", &value)?;
        }
        if let Some(value) = read_env("SKILLRANK_RANKING_DASHBOARD_LIMIT") {
            self.ranking.dashboard_limit = parse_usize("SKILLRANK_RANKING_DASHBOARD_LIMIT", &value)?;
        }

        if let Some(value) = read_env("SKILLRANK_CATALOG_SNAPSHOT_PATH") {
            self.catalog.snapshot_path = PathBuf::from(value);
        }

        let log_level =
            read_env("SKILLRANK_LOGGING_LEVEL").or_else(|| read_env("SKILLRANK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SKILLRANK_LOGGING_FORMAT").or_else(|| read_env("SKILLRANK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(minimum_rating) = overrides.minimum_rating {
            self.ranking.minimum_rating = minimum_rating;
        }
        if let Some(minimum_rating_count) = overrides.minimum_rating_count {
            self.ranking.minimum_rating_count = minimum_rating_count;
        }
        if let Some(snapshot_path) = overrides.snapshot_path {
            self.catalog.snapshot_path = snapshot_path;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_ranking(&self.ranking)?;
        validate_catalog(&self.catalog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("skillrank.toml"), PathBuf::from("config/skillrank.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_ranking(ranking: &RankingConfig) -> Result<(), ConfigError> {
    let max_rating = f64::from(CompletionRating::ExtremelySatisfied.value());
    if !(0.0..=max_rating).contains(&ranking.minimum_rating) {
        return Err(ConfigError::Validation(format!(
            "ranking.minimum_rating must be in range 0..={max_rating}"
        )));
    }

    if ranking.autocomplete_limit == 0 || ranking.autocomplete_limit > MAX_AUTOCOMPLETE_LIMIT {
        return Err(ConfigError::Validation(format!(
            "ranking.autocomplete_limit must be in range 1..={MAX_AUTOCOMPLETE_LIMIT}"
        )));
    }

    if ranking.dashboard_limit == 0 {
        return Err(ConfigError::Validation(
            "ranking.dashboard_limit must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.snapshot_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation("catalog.snapshot_path cannot be empty".to_string()));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    ranking: Option<RankingPatch>,
    catalog: Option<CatalogPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RankingPatch {
    minimum_rating: Option<f64>,
    minimum_rating_count: Option<u32>,
    autocomplete_limit: Option<usize>,
    dashboard_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_dashboard_conventions() -> Result<(), String> {
        let config = AppConfig::default();

        ensure(config.ranking.minimum_rating == 2.0, "default minimum rating is neutral")?;
        ensure(config.ranking.minimum_rating_count == 0, "default rating count is zero")?;
        ensure(config.ranking.autocomplete_limit == 10, "autocomplete shows ten entries")?;
        ensure(config.ranking.dashboard_limit == 10, "dashboard shows ten entries")?;
        ensure(
            config.catalog.snapshot_path == PathBuf::from("catalog.json"),
            "default snapshot path is catalog.json",
        )?;
        ensure(config.validate().is_ok(), "defaults should validate")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_SKILLRANK_SNAPSHOT", "/srv/skillrank/catalog.json");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("skillrank.toml");
            fs::write(
                &path,
                r#"
[catalog]
snapshot_path = "${TEST_SKILLRANK_SNAPSHOT}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.catalog.snapshot_path == PathBuf::from("/srv/skillrank/catalog.json"),
                "snapshot path should be interpolated from environment",
            )
        })();

        clear_vars(&["TEST_SKILLRANK_SNAPSHOT"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["TEST_SKILLRANK_UNSET"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("skillrank.toml");
        fs::write(&path, "[catalog]\nsnapshot_path = \"${TEST_SKILLRANK_UNSET}\"\n")
            .map_err(|err| err.to_string())?;

        let error =
            match AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            {
                Ok(_) => return Err("expected interpolation failure".to_string()),
                Err(error) => error,
            };
        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_SKILLRANK_UNSET"),
            "missing variable should be named",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SKILLRANK_LOG_LEVEL", "warn");
        env::set_var("SKILLRANK_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["SKILLRANK_LOG_LEVEL", "SKILLRANK_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SKILLRANK_RANKING_MINIMUM_RATING_COUNT", "7");
        env::set_var("SKILLRANK_CATALOG_SNAPSHOT_PATH", "from-env.json");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("skillrank.toml");
            fs::write(
                &path,
                r#"
[ranking]
minimum_rating = 3.0
minimum_rating_count = 2
autocomplete_limit = 5

[catalog]
snapshot_path = "from-file.json"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    snapshot_path: Some(PathBuf::from("from-override.json")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.ranking.minimum_rating == 3.0, "file minimum rating should apply")?;
            ensure(config.ranking.autocomplete_limit == 5, "file autocomplete limit should apply")?;
            ensure(
                config.ranking.minimum_rating_count == 7,
                "env rating count should win over file",
            )?;
            ensure(
                config.catalog.snapshot_path == PathBuf::from("from-override.json"),
                "override snapshot path should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            Ok(())
        })();

        clear_vars(&["SKILLRANK_RANKING_MINIMUM_RATING_COUNT", "SKILLRANK_CATALOG_SNAPSHOT_PATH"]);
        result
    }

    #[test]
    fn invalid_env_override_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SKILLRANK_RANKING_DASHBOARD_LIMIT", "lots");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected invalid override".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "SKILLRANK_RANKING_DASHBOARD_LIMIT"
                ),
                "invalid override should name the variable",
            )
        })();

        clear_vars(&["SKILLRANK_RANKING_DASHBOARD_LIMIT"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("SKILLRANK_RANKING_AUTOCOMPLETE_LIMIT", "0");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("ranking.autocomplete_limit")
            );
            ensure(has_message, "validation failure should mention ranking.autocomplete_limit")
        })();

        clear_vars(&["SKILLRANK_RANKING_AUTOCOMPLETE_LIMIT"]);
        result
    }

    #[test]
    fn out_of_range_minimum_rating_is_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides { minimum_rating: Some(-0.5), ..ConfigOverrides::default() },
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected validation failure".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("ranking.minimum_rating")),
            "validation failure should mention ranking.minimum_rating",
        )
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("absent.toml");

        let error = match AppConfig::load(LoadOptions {
            config_path: Some(path.clone()),
            require_file: true,
            ..LoadOptions::default()
        }) {
            Ok(_) => return Err("expected missing file error".to_string()),
            Err(error) => error,
        };
        ensure(
            matches!(error, ConfigError::MissingConfigFile(ref missing) if *missing == path),
            "missing file should be reported with its path",
        )
    }
}
