//! Remote service credentials

use std::fmt;

use crate::domain::error::ConfigError;

use super::app_config::{AppConfig, DEFAULT_API_VERSION};

/// Region, subscription key and API version used to reach the service.
///
/// Jobs keep their own copy so cleanup can run with the same identity that
/// created the remote resource.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredentials {
    region: String,
    subscription_key: String,
    api_version: String,
}

impl ServiceCredentials {
    /// Validate and build credentials. A blank API version falls back to the default.
    pub fn new(
        region: impl Into<String>,
        subscription_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let region = region.into().trim().to_string();
        let subscription_key = subscription_key.into().trim().to_string();
        let mut api_version = api_version.into().trim().to_string();

        if region.is_empty() {
            return Err(ConfigError::Missing {
                key: "region",
                hint: "Pass --region, set SPEECH_REGION or run 'podcast-gen config set region <region>'",
            });
        }
        if subscription_key.is_empty() {
            return Err(ConfigError::Missing {
                key: "subscription_key",
                hint: "Pass --sub-key, set SPEECH_SUBSCRIPTION_KEY or run 'podcast-gen config set subscription_key <key>'",
            });
        }
        if api_version.is_empty() {
            api_version = DEFAULT_API_VERSION.to_string();
        }

        Ok(Self {
            region,
            subscription_key,
            api_version,
        })
    }

    /// Build credentials from a merged config
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Self::new(
            config.region.clone().unwrap_or_default(),
            config.subscription_key.clone().unwrap_or_default(),
            config.api_version_or_default(),
        )
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn subscription_key(&self) -> &str {
        &self.subscription_key
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("region", &self.region)
            .field("subscription_key", &mask_secret(&self.subscription_key))
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Mask a secret for display, keeping four characters at each end of long values
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
