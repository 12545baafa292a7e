//! XDG config store adapter

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, ServerConfig, ServiceCredentials};
use crate::domain::duration::Duration;
use crate::domain::error::ConfigError;

/// XDG-compliant config store (`~/.config/podcast-gen/config.toml`)
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// Create a new XDG config store with default path
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("podcast-gen");

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content)
            .map(normalize)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn to_toml(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(&normalize(config.clone()))
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim string settings and drop blank ones, so `key = ""` reads as unset
fn normalize(config: AppConfig) -> AppConfig {
    fn clean(value: Option<String>) -> Option<String> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    AppConfig {
        region: clean(config.region),
        subscription_key: clean(config.subscription_key),
        api_version: clean(config.api_version),
        poll_interval: clean(config.poll_interval),
        max_wait: clean(config.max_wait),
        download_dir: clean(config.download_dir),
        input_dir: clean(config.input_dir),
        job_retention: clean(config.job_retention),
        server: config.server.map(|server| ServerConfig {
            host: clean(server.host),
            port: server.port,
        }),
    }
}

/// Credentials the file alone is enough for, if any
fn stored_credentials(config: &AppConfig) -> Option<ServiceCredentials> {
    config.region.as_ref()?;
    config.subscription_key.as_ref()?;
    ServiceCredentials::from_config(config).ok()
}

/// Duration settings that commands will reject, with the reason
///
/// Loading still succeeds so `config set` can repair them.
fn invalid_settings(config: &AppConfig) -> Vec<(&'static str, String)> {
    let mut invalid = Vec::new();
    for (key, value) in [
        ("poll_interval", &config.poll_interval),
        ("max_wait", &config.max_wait),
    ] {
        if let Some(Err(e)) = value.as_deref().map(str::parse::<Duration>) {
            invalid.push((key, e.to_string()));
        }
    }
    if let Err(e) = config.job_retention_or_default() {
        invalid.push(("job_retention", e.to_string()));
    }
    invalid
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        if !self.exists() {
            return Ok(AppConfig::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        let config = Self::parse_toml(&content)?;

        for (key, reason) in invalid_settings(&config) {
            tracing::warn!(key, %reason, path = %self.path.display(), "invalid config value");
        }
        if let Some(credentials) = stored_credentials(&config) {
            tracing::debug!(?credentials, path = %self.path.display(), "stored credentials loaded");
        }

        Ok(config)
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = Self::to_toml(config)?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }

        self.save(&AppConfig::defaults()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_path_is_xdg() {
        let store = XdgConfigStore::new();
        let path = store.path();
        assert!(path.to_string_lossy().contains("podcast-gen"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn parse_toml_with_server_table() {
        let content = r#"
region = "eastus"
subscription_key = "secret"
poll_interval = "10s"

[server]
port = 8080
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.region, Some("eastus".to_string()));
        assert_eq!(config.subscription_key, Some("secret".to_string()));
        assert_eq!(config.poll_interval_or_default().as_secs(), 10);
        assert_eq!(config.server_port_or_default(), 8080);
        assert_eq!(config.server_host_or_default(), "127.0.0.1");
    }

    #[test]
    fn parse_toml_rejects_garbage() {
        let err = XdgConfigStore::parse_toml("region = [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn blank_values_read_as_unset() {
        let content = r#"
region = "  westus2 "
subscription_key = ""
job_retention = "   "

[server]
host = ""
port = 9000
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.region.as_deref(), Some("westus2"));
        assert_eq!(config.subscription_key, None);
        assert_eq!(config.job_retention, None);
        assert_eq!(config.server_host_or_default(), "127.0.0.1");
        assert_eq!(config.server_port_or_default(), 9000);
        assert!(stored_credentials(&config).is_none());
    }

    #[test]
    fn stored_credentials_need_region_and_key() {
        let mut config = AppConfig {
            region: Some("eastus".to_string()),
            ..Default::default()
        };
        assert!(stored_credentials(&config).is_none());

        config.subscription_key = Some("abcdefghijklmnop".to_string());
        let credentials = stored_credentials(&config).unwrap();
        assert_eq!(credentials.region(), "eastus");
        assert!(!format!("{:?}", credentials).contains("abcdefghijklmnop"));
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        assert!(!store.exists());
        assert_eq!(store.load().await.unwrap(), AppConfig::empty());
    }

    #[tokio::test]
    async fn init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("nested").join("config.toml"));

        store.init().await.unwrap();
        assert_eq!(store.load().await.unwrap(), AppConfig::defaults());

        let err = store.init().await.unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let config = AppConfig {
            region: Some("westus2".to_string()),
            max_wait: Some("2h".to_string()),
            download_dir: Some(" ".to_string()),
            ..Default::default()
        };

        store.save(&config).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.region.as_deref(), Some("westus2"));
        assert_eq!(loaded.max_wait.as_deref(), Some("2h"));
        assert_eq!(loaded.download_dir, None);
    }

    #[test]
    fn invalid_durations_are_reported_by_key() {
        let config = AppConfig {
            poll_interval: Some("5s".to_string()),
            max_wait: Some("forever".to_string()),
            job_retention: Some("24hrs".to_string()),
            ..Default::default()
        };

        let keys: Vec<&str> = invalid_settings(&config).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["max_wait", "job_retention"]);
        assert!(invalid_settings(&AppConfig::defaults()).is_empty());
    }

    #[tokio::test]
    async fn invalid_values_still_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "job_retention = \"24hrs\"\n").unwrap();

        let config = XdgConfigStore::with_path(&path).load().await.unwrap();
        assert_eq!(config.job_retention.as_deref(), Some("24hrs"));
    }
}
