//! Provider configuration

use std::time::Duration;

use serde::Deserialize;

use crate::error::AzureError;

/// Public Azure Resource Manager endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Azure provider configuration
///
/// The bearer token is obtained elsewhere (e.g., `az account get-access-token`);
/// this crate never acquires credentials itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub subscription_id: String,

    /// Resource Manager endpoint, without trailing slash
    pub endpoint: String,

    pub access_token: Option<String>,

    /// Delay between long-running operation status checks
    #[serde(with = "seconds")]
    pub poll_interval: Duration,

    /// Status checks before a long-running operation is reported as timed out
    pub max_poll_attempts: u32,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            subscription_id: String::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: None,
            poll_interval: Duration::from_secs(10),
            max_poll_attempts: 180,
        }
    }
}

impl AzureConfig {
    /// Build configuration from `ARM_SUBSCRIPTION_ID`, `ARM_ACCESS_TOKEN` and `ARM_ENDPOINT`
    pub fn from_env() -> Result<Self, AzureError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AzureError> {
        let mut config = Self::default();
        if let Some(endpoint) = lookup("ARM_ENDPOINT").filter(|e| !e.is_empty()) {
            config.endpoint = endpoint;
        }
        config.access_token = lookup("ARM_ACCESS_TOKEN").filter(|t| !t.is_empty());
        config.subscription_id = lookup("ARM_SUBSCRIPTION_ID").unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn with_subscription(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = subscription_id.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> Result<(), AzureError> {
        if self.subscription_id.trim().is_empty() {
            return Err(AzureError::Config(
                "subscription_id is required (set ARM_SUBSCRIPTION_ID)".to_string(),
            ));
        }
        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(AzureError::Config(format!(
                "endpoint '{}' must be an http(s) URL",
                self.endpoint
            )));
        }
        if self.max_poll_attempts == 0 {
            return Err(AzureError::Config(
                "max_poll_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Endpoint with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
