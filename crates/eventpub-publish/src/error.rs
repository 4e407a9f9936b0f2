//! Publish error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use eventpub_core::TimeWindowError;
use eventpub_providers::ProviderError;

/// Why a publish attempt failed.
///
/// Conflicts are not errors; they are reported as outcomes.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event itself is unusable: bad times, start in the past, or an
    /// account pool that does not match the video provider.
    #[error("{message}")]
    Validation {
        message: String,
        #[source]
        source: Option<TimeWindowError>,
    },

    /// An external call failed.
    #[error("provider call failed")]
    Transport(#[from] ProviderError),

    /// No video accounts to choose from.
    #[error("the video account pool is empty")]
    EmptyAccountPool,

    /// Anything else.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl PublishError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Returns the failure category.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Validation { .. } => FailureKind::Validation,
            Self::Transport(_) => FailureKind::Transport,
            Self::EmptyAccountPool => FailureKind::EmptyAccountPool,
            Self::Unexpected(_) => FailureKind::Unexpected,
        }
    }

    /// Returns true if the same attempt may succeed later: the provider
    /// failed in a transient way (network, rate limit, server error).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_retryable())
    }

    /// Renders this error and its sources, outermost first.
    pub fn chain(&self) -> Vec<String> {
        let mut chain = vec![self.to_string()];
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain
    }
}

impl From<TimeWindowError> for PublishError {
    fn from(err: TimeWindowError) -> Self {
        Self::Validation {
            message: "invalid event times".to_string(),
            source: Some(err),
        }
    }
}

/// Category of a failed attempt, as reported in a [`FailureReport`](crate::FailureReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    Transport,
    EmptyAccountPool,
    Unexpected,
}

impl FailureKind {
    /// Returns a short name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Transport => "transport",
            Self::EmptyAccountPool => "empty_account_pool",
            Self::Unexpected => "unexpected",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventpub_core::EventTimestamp;

    #[test]
    fn kinds() {
        assert_eq!(PublishError::validation("x").kind(), FailureKind::Validation);
        assert_eq!(PublishError::EmptyAccountPool.kind(), FailureKind::EmptyAccountPool);
        assert_eq!(
            PublishError::from(ProviderError::network("reset")).kind(),
            FailureKind::Transport
        );
        assert_eq!(PublishError::Unexpected("?".into()).kind(), FailureKind::Unexpected);
    }

    #[test]
    fn only_transient_transport_errors_are_retryable() {
        assert!(PublishError::from(ProviderError::network("connection reset")).is_retryable());
        assert!(!PublishError::from(ProviderError::authentication("bad secret")).is_retryable());
        assert!(!PublishError::validation("bad times").is_retryable());
        assert!(!PublishError::EmptyAccountPool.is_retryable());
    }

    #[test]
    fn chain_walks_sources() {
        let err = PublishError::from(ProviderError::network("connection reset").with_provider("zoom"));
        assert_eq!(
            err.chain(),
            vec![
                "provider call failed".to_string(),
                "[zoom] network_error: connection reset".to_string(),
            ]
        );
    }

    #[test]
    fn window_errors_keep_their_cause() {
        let start = EventTimestamp::parse("2025-03-01T10:00").unwrap();
        let end = EventTimestamp::parse("2025-03-01T12:00:00Z").unwrap();
        let err = PublishError::from(eventpub_core::TimeWindow::from_timestamps(&start, &end).unwrap_err());

        let chain = err.chain();
        assert_eq!(chain[0], "invalid event times");
        assert_eq!(chain.len(), 2);
        assert!(chain[1].contains("start"));
    }

    #[test]
    fn kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&FailureKind::EmptyAccountPool).unwrap(),
            "\"empty_account_pool\""
        );
    }
}
