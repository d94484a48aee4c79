//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::session::SessionMode;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match read_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(
            key,
            &read_value(&config, key).unwrap_or_else(|| NOT_SET.to_string()),
        );
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Validate `value` for `key` and store it in `config`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "server_url" => {
            let trimmed = value.trim();
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(invalid(
                    "Value must start with http:// or https://".to_string(),
                ));
            }
            config.server_url = Some(trimmed.trim_end_matches('/').to_string());
        }
        "user_id" => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(invalid("Value must not be empty".to_string()));
            }
            config.user_id = Some(trimmed.to_string());
        }
        "mode" => {
            let mode = value
                .parse::<SessionMode>()
                .map_err(|e| invalid(e.to_string()))?;
            config.mode = Some(mode.to_string());
        }
        "health_timeout_secs" => config.health_timeout_secs = Some(parse_secs(value, invalid)?),
        "request_timeout_secs" => config.request_timeout_secs = Some(parse_secs(value, invalid)?),
        "visualizer" => {
            config.visualizer = Some(
                parse_bool(value)
                    .map_err(|_| invalid("Value must be 'true' or 'false'".to_string()))?,
            )
        }
        _ => return Err(invalid("Unknown key".to_string())),
    }
    Ok(())
}

fn read_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "server_url" => config.server_url.clone(),
        "user_id" => config.user_id.clone(),
        "mode" => config.mode.clone(),
        "health_timeout_secs" => config.health_timeout_secs.map(|s| s.to_string()),
        "request_timeout_secs" => config.request_timeout_secs.map(|s| s.to_string()),
        "visualizer" => config.visualizer.map(|b| b.to_string()),
        _ => None,
    }
}

fn parse_secs(value: &str, invalid: impl Fn(String) -> ConfigError) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(invalid("Value must be a positive number of seconds".to_string())),
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ()> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(()),
    }
}
