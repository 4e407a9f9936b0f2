//! Zoom provider configuration.

use std::time::Duration;

use crate::http::validate_base_url;
use crate::token::ClientCredentials;

/// Default REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.zoom.us/v2";

/// Default OAuth token endpoint.
pub const DEFAULT_OAUTH_URL: &str = "https://zoom.us/oauth/token";

/// Configuration for the Zoom provider.
#[derive(Debug, Clone)]
pub struct ZoomConfig {
    /// The Zoom account the Server-to-Server OAuth app belongs to.
    pub account_id: String,
    /// OAuth app credentials.
    pub credentials: ClientCredentials,
    /// REST API base URL.
    pub api_base: String,
    /// OAuth token endpoint.
    pub oauth_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl ZoomConfig {
    /// Creates a configuration against the public Zoom endpoints.
    pub fn new(account_id: impl Into<String>, credentials: ClientCredentials) -> Self {
        Self {
            account_id: account_id.into(),
            credentials,
            api_base: DEFAULT_API_BASE.to_string(),
            oauth_url: DEFAULT_OAUTH_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builder method to point at a different API base.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Builder method to point at a different token endpoint.
    pub fn with_oauth_url(mut self, oauth_url: impl Into<String>) -> Self {
        self.oauth_url = oauth_url.into();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.account_id.trim().is_empty() {
            return Err("zoom account_id is required".to_string());
        }
        self.credentials
            .validate()
            .map_err(|e| format!("zoom {}", e))?;
        validate_base_url("zoom api_base", &self.api_base)?;
        validate_base_url("zoom oauth_url", &self.oauth_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_zoom() {
        let config = ZoomConfig::new("acct", ClientCredentials::new("id", "secret"));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.oauth_url, DEFAULT_OAUTH_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_failures() {
        let config = ZoomConfig::new("", ClientCredentials::new("id", "secret"));
        assert_eq!(config.validate().unwrap_err(), "zoom account_id is required");

        let config = ZoomConfig::new("acct", ClientCredentials::new("id", ""));
        assert_eq!(config.validate().unwrap_err(), "zoom client_secret is required");

        let config = ZoomConfig::new("acct", ClientCredentials::new("id", "secret"))
            .with_api_base("zoom.us");
        assert!(config.validate().is_err());
    }
}
