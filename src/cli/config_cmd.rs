//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{mask_secret, AppConfig, ServerConfig};
use crate::domain::duration::Duration;
use crate::domain::error::ConfigError;

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
    ensure_known_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;
    store.save(&config).await?;

    let shown = if key == "subscription_key" {
        mask_secret(value)
    } else {
        value.to_string()
    };
    presenter.success(&format!("{} = {}", key, shown));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    ensure_known_key(key)?;

    let config = store.load().await?;
    presenter.output(display_value(&config, key).as_deref().unwrap_or(NOT_SET));

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, display_value(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn ensure_known_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Validate and store a value under `key`
fn apply_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid("Value must not be empty".to_string()));
    }

    match key {
        "region" => config.region = Some(value.to_string()),
        "subscription_key" => config.subscription_key = Some(value.to_string()),
        "api_version" => config.api_version = Some(value.to_string()),
        "poll_interval" | "max_wait" => {
            value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            if key == "poll_interval" {
                config.poll_interval = Some(value.to_string());
            } else {
                config.max_wait = Some(value.to_string());
            }
        }
        "job_retention" => {
            if !matches!(value, "0" | "never") {
                value
                    .parse::<Duration>()
                    .map_err(|e| invalid(format!("{} (or use 0/never to keep jobs)", e)))?;
            }
            config.job_retention = Some(value.to_string());
        }
        "download_dir" => config.download_dir = Some(value.to_string()),
        "input_dir" => config.input_dir = Some(value.to_string()),
        "server.host" => {
            config.server.get_or_insert_with(ServerConfig::default).host = Some(value.to_string())
        }
        "server.port" => {
            let port = value
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| invalid("Value must be a port number (1-65535)".to_string()))?;
            config.server.get_or_insert_with(ServerConfig::default).port = Some(port);
        }
        _ => return Err(invalid("Unknown key".to_string())),
    }
    Ok(())
}

/// Value of `key` for display, with the subscription key masked
fn display_value(config: &AppConfig, key: &str) -> Option<String> {
    let server = config.server.as_ref();
    match key {
        "region" => config.region.clone(),
        "subscription_key" => config.subscription_key.as_deref().map(mask_secret),
        "api_version" => config.api_version.clone(),
        "poll_interval" => config.poll_interval.clone(),
        "max_wait" => config.max_wait.clone(),
        "download_dir" => config.download_dir.clone(),
        "input_dir" => config.input_dir.clone(),
        "job_retention" => config.job_retention.clone(),
        "server.host" => server.and_then(|s| s.host.clone()),
        "server.port" => server.and_then(|s| s.port).map(|p| p.to_string()),
        _ => None,
    }
}
