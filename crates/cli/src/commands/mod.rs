pub mod autocomplete;
pub mod config;
pub mod prioritize;
pub mod recommend;

use serde::Serialize;
use serde_json::Value;

use skillrank_core::config::{AppConfig, LoadOptions};
use skillrank_core::errors::{ApplicationError, InterfaceError};
use skillrank_store::InMemoryCatalog;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::failure_with_correlation(command, error_class, message, exit_code, None)
    }

    fn failure_with_correlation(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        correlation_id: Option<String>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id,
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Map an engine failure onto the interface error classes.
    pub fn from_application_error(command: &str, error: ApplicationError) -> Self {
        let correlation_id = format!("{command}-{}", std::process::id());
        let detail = error.to_string();
        let interface = error.into_interface(correlation_id.clone());
        let exit_code = match interface {
            InterfaceError::BadRequest { .. } => 5,
            InterfaceError::ServiceUnavailable { .. } => 6,
        };

        tracing::warn!(
            event_name = "cli.command_failed",
            command,
            correlation_id = %correlation_id,
            error_class = interface.error_class(),
            error = %detail,
            "command failed"
        );
        Self::failure_with_correlation(
            command,
            interface.error_class(),
            format!("{} ({detail})", interface.user_message()),
            exit_code,
            Some(correlation_id),
        )
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str, options: LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn runtime(command: &str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

pub(crate) async fn load_catalog(
    command: &str,
    config: &AppConfig,
) -> Result<InMemoryCatalog, CommandResult> {
    let path = &config.catalog.snapshot_path;
    let catalog = InMemoryCatalog::from_path(path).await.map_err(|error| {
        CommandResult::failure(command, "catalog", format!("catalog snapshot issue: {error}"), 4)
    })?;
    tracing::debug!(
        event_name = "cli.catalog_loaded",
        command,
        path = %path.display(),
        "catalog snapshot loaded"
    );
    Ok(catalog)
}

pub(crate) fn to_data<T: Serialize>(command: &str, value: &T) -> Result<Value, CommandResult> {
    serde_json::to_value(value).map_err(|error| {
        CommandResult::failure(command, "serialization", error.to_string(), 7)
    })
}
