//! Client error types.

use std::fmt;

use eventpub_providers::ProviderError;
use eventpub_publish::PublishError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that stop a command before it produces an outcome.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration is missing, unreadable or invalid.
    Config(String),
    /// A provider could not be set up or queried.
    Provider(String),
    /// IO error.
    Io(std::io::Error),
    /// The command line or event file is unusable.
    Usage(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Provider(msg) => write!(f, "provider error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Usage(msg) => write!(f, "usage error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err.to_string())
    }
}

impl From<PublishError> for ClientError {
    fn from(err: PublishError) -> Self {
        let message = err.chain().join(": ");
        match err {
            PublishError::Validation { .. } | PublishError::EmptyAccountPool => Self::Config(message),
            _ => Self::Provider(message),
        }
    }
}
