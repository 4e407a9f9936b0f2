//! Action Network provider configuration.

use std::time::Duration;

use crate::http::validate_base_url;

/// Default API base.
pub const DEFAULT_API_BASE: &str = "https://actionnetwork.org/api/v2";

/// Configuration for the Action Network provider.
#[derive(Clone)]
pub struct ActionNetworkConfig {
    /// Group API key, sent as `OSDI-API-Token`.
    pub api_key: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ActionNetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionNetworkConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ActionNetworkConfig {
    /// Creates a configuration against the public API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builder method to point at a different API base.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.trim().is_empty() {
            return Err("actionnetwork api_key is required".to_string());
        }
        validate_base_url("actionnetwork api_base", &self.api_base)
    }
}
