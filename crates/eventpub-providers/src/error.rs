//! Error types for provider operations.
//!
//! Every call to Zoom, Google Calendar or Action Network reports failures as
//! a [`ProviderError`]. The publish pipeline treats all of them as hard
//! failures: an account whose calendar could not be read is never assumed
//! to be free.

use std::fmt;
use thiserror::Error;

/// The category of a provider error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorCode {
    /// Credentials are missing, invalid or expired (401, rejected token grant).
    AuthenticationFailed,
    /// The credentials lack permission for the resource (403).
    AuthorizationFailed,
    /// Connection failed, timed out, or the body could not be read.
    NetworkError,
    /// Too many requests (429).
    RateLimited,
    /// The server failed (5xx).
    ServerError,
    /// The response did not have the expected shape.
    InvalidResponse,
    /// Resource not found (404).
    NotFound,
    /// The request was rejected (other 4xx).
    BadRequest,
    /// The provider is missing required settings.
    ConfigurationError,
}

impl ProviderErrorCode {
    /// Returns true if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServerError
        )
    }

    /// Maps an HTTP status code to an error category.
    ///
    /// Returns `None` for non-error statuses.
    pub fn from_http_status(status: u16) -> Option<Self> {
        match status {
            200..=399 => None,
            401 => Some(Self::AuthenticationFailed),
            403 => Some(Self::AuthorizationFailed),
            404 => Some(Self::NotFound),
            429 => Some(Self::RateLimited),
            500..=599 => Some(Self::ServerError),
            _ => Some(Self::BadRequest),
        }
    }

    /// Returns a stable snake_case name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::NetworkError => "network_error",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::InvalidResponse => "invalid_response",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ConfigurationError => "configuration_error",
        }
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while talking to an external provider.
#[derive(Debug, Error)]
pub struct ProviderError {
    code: ProviderErrorCode,
    message: String,
    /// The provider that generated this error (e.g. "zoom", "google").
    provider: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    /// Creates a new provider error with the given code and message.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider: None,
            source: None,
        }
    }

    /// Creates an error from a non-success HTTP response.
    ///
    /// `retry_after` is the parsed `Retry-After` header, in seconds.
    pub fn from_http_status(status: u16, body: &str, retry_after: Option<u64>) -> Self {
        let code =
            ProviderErrorCode::from_http_status(status).unwrap_or(ProviderErrorCode::InvalidResponse);
        let mut message = format!("HTTP {}", status);
        if let Some(seconds) = retry_after {
            message.push_str(&format!(", retry after {} seconds", seconds));
        }
        let body = body.trim();
        if !body.is_empty() {
            message.push_str(": ");
            message.push_str(body);
        }
        Self::new(code, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Creates an invalid response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InvalidResponse, message)
    }

    /// Creates a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NotFound, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ConfigurationError, message)
    }

    /// Sets the provider name for this error, keeping an existing one.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        if self.provider.is_none() {
            self.provider = Some(provider.into());
        }
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Reclassifies a rejected token request as an authentication failure.
    ///
    /// Token endpoints answer bad credentials with 400 or 403; those are
    /// not request bugs from the caller's point of view.
    pub fn into_auth_failure(self) -> Self {
        match self.code {
            ProviderErrorCode::BadRequest | ProviderErrorCode::AuthorizationFailed => Self {
                code: ProviderErrorCode::AuthenticationFailed,
                message: format!("token request rejected ({})", self.message),
                ..self
            },
            _ => self,
        }
    }

    /// Returns the error code.
    pub fn code(&self) -> ProviderErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the provider name, if set.
    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref provider) = self.provider {
            write!(f, "[{}] ", provider)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
