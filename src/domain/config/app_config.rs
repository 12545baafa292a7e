//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::duration::Duration;
use crate::domain::error::DurationParseError;

/// Default service API version
pub const DEFAULT_API_VERSION: &str = "2026-01-01-preview";

/// Default directory for downloaded podcasts
pub const DEFAULT_DOWNLOAD_DIR: &str = "./podcasts";

/// Default directory the interactive server offers input files from
pub const DEFAULT_INPUT_DIR: &str = "./input_files";

pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Interactive server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub region: Option<String>,
    pub subscription_key: Option<String>,
    pub api_version: Option<String>,
    pub poll_interval: Option<String>,
    pub max_wait: Option<String>,
    pub download_dir: Option<String>,
    pub input_dir: Option<String>,
    pub job_retention: Option<String>,
    pub server: Option<ServerConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            region: None,
            subscription_key: None,
            api_version: Some(DEFAULT_API_VERSION.to_string()),
            poll_interval: Some(Duration::default_poll_interval().to_string()),
            max_wait: None,
            download_dir: Some(DEFAULT_DOWNLOAD_DIR.to_string()),
            input_dir: Some(DEFAULT_INPUT_DIR.to_string()),
            job_retention: Some(Duration::default_job_retention().to_string()),
            server: Some(ServerConfig {
                host: Some(DEFAULT_SERVER_HOST.to_string()),
                port: Some(DEFAULT_SERVER_PORT),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            region: other.region.or(self.region),
            subscription_key: other.subscription_key.or(self.subscription_key),
            api_version: other.api_version.or(self.api_version),
            poll_interval: other.poll_interval.or(self.poll_interval),
            max_wait: other.max_wait.or(self.max_wait),
            download_dir: other.download_dir.or(self.download_dir),
            input_dir: other.input_dir.or(self.input_dir),
            job_retention: other.job_retention.or(self.job_retention),
            server: Self::merge_server_config(self.server, other.server),
        }
    }

    fn merge_server_config(
        base: Option<ServerConfig>,
        other: Option<ServerConfig>,
    ) -> Option<ServerConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(ServerConfig {
                host: o.host.or(b.host),
                port: o.port.or(b.port),
            }),
        }
    }

    /// Get api_version, or the default if not set
    pub fn api_version_or_default(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }

    /// Get poll_interval as parsed Duration, or default if not set/invalid
    pub fn poll_interval_or_default(&self) -> Duration {
        self.poll_interval
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_poll_interval)
    }

    /// Get max_wait as parsed Duration. Unset or invalid means no limit.
    pub fn max_wait(&self) -> Option<Duration> {
        self.max_wait.as_ref().and_then(|s| s.parse().ok())
    }

    /// Get job retention, or 24h if not set. `0` or `never` disables eviction.
    pub fn job_retention_or_default(&self) -> Result<Option<Duration>, DurationParseError> {
        match self.job_retention.as_deref().map(str::trim) {
            Some("0") | Some("never") => Ok(None),
            Some(s) => s.parse().map(Some),
            None => Ok(Some(Duration::default_job_retention())),
        }
    }

    pub fn download_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.download_dir.as_deref().unwrap_or(DEFAULT_DOWNLOAD_DIR))
    }

    pub fn input_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.input_dir.as_deref().unwrap_or(DEFAULT_INPUT_DIR))
    }

    /// Get server host, or "127.0.0.1" if not set
    pub fn server_host_or_default(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.host.as_deref())
            .unwrap_or(DEFAULT_SERVER_HOST)
    }

    /// Get server port, or 5000 if not set
    pub fn server_port_or_default(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }
}
