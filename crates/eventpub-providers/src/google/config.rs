//! Google Calendar provider configuration.

use std::time::Duration;

use crate::http::validate_base_url;
use crate::token::ClientCredentials;

/// Default Calendar API base.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Configuration for the Google Calendar provider.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// OAuth client credentials.
    pub credentials: ClientCredentials,
    /// Refresh token with the calendar scope.
    pub refresh_token: String,
    /// The shared calendar, e.g. `events@group.calendar.google.com`.
    pub calendar_id: String,
    pub api_base: String,
    pub token_url: String,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl GoogleConfig {
    /// Creates a configuration against the public Google endpoints.
    pub fn new(
        credentials: ClientCredentials,
        refresh_token: impl Into<String>,
        calendar_id: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            refresh_token: refresh_token.into(),
            calendar_id: calendar_id.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Builder method to point at a different API base.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Builder method to point at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("google {}", e))?;
        if self.refresh_token.trim().is_empty() {
            return Err("google refresh_token is required".to_string());
        }
        if self.calendar_id.trim().is_empty() {
            return Err("google calendar_id is required".to_string());
        }
        validate_base_url("google api_base", &self.api_base)?;
        validate_base_url("google token_url", &self.token_url)
    }
}
