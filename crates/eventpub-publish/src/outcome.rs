//! Outcomes of publish and check attempts.

use serde::{Deserialize, Serialize};

use eventpub_core::{AccountRef, Conflict};

use crate::error::{FailureKind, PublishError};

/// Links produced by a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedLinks {
    pub meeting_join_url: String,
    pub listing_manage_url: String,
    pub listing_share_url: String,
    pub calendar_url: String,
}

/// Links that already existed when an attempt failed.
///
/// Nothing is rolled back; these resources must be cleaned up by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_join_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_manage_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_share_url: Option<String>,
}

impl PartialLinks {
    /// Returns true if no resource was created.
    pub fn is_empty(&self) -> bool {
        self.meeting_join_url.is_none()
            && self.listing_manage_url.is_none()
            && self.listing_share_url.is_none()
    }
}

/// Details of a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: FailureKind,
    /// The error and its causes, outermost first.
    pub chain: Vec<String>,
    /// The provider failed transiently; retrying later may succeed.
    #[serde(default)]
    pub retryable: bool,
    #[serde(default)]
    pub partial: PartialLinks,
}

impl FailureReport {
    /// Builds a report from an error and whatever was created before it.
    pub fn new(error: &PublishError, partial: PartialLinks) -> Self {
        Self {
            kind: error.kind(),
            chain: error.chain(),
            retryable: error.is_retryable(),
            partial,
        }
    }

    /// The error chain joined into one line.
    pub fn message(&self) -> String {
        self.chain.join(": ")
    }
}

/// Result of [`Publisher::publish`](crate::Publisher::publish).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublishOutcome {
    /// All three resources were created.
    Published(PublishedLinks),
    /// Every video account is busy. Never overridable.
    UnresolvableConflict(Vec<Conflict>),
    /// The shared calendar has clashing entries; a human may override.
    ResolvableConflict(Vec<Conflict>),
    Failed(FailureReport),
}

impl PublishOutcome {
    /// Returns the stable discriminant name, e.g. `PUBLISHED`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published(_) => "PUBLISHED",
            Self::UnresolvableConflict(_) => "UNRESOLVABLE_CONFLICT",
            Self::ResolvableConflict(_) => "RESOLVABLE_CONFLICT",
            Self::Failed(_) => "FAILED",
        }
    }

    /// Returns true for [`PublishOutcome::Published`].
    pub fn is_published(&self) -> bool {
        matches!(self, Self::Published(_))
    }

    /// Conflicts carried by a conflict outcome; empty otherwise.
    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            Self::UnresolvableConflict(conflicts) | Self::ResolvableConflict(conflicts) => conflicts.as_slice(),
            _ => &[],
        }
    }
}

/// Result of [`Publisher::check`](crate::Publisher::check), a dry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckOutcome {
    /// Publishing would go ahead on `account`.
    Clear {
        account: AccountRef,
        /// Calendar conflicts that publishing would override.
        calendar_conflicts_overridden: Vec<Conflict>,
    },
    UnresolvableConflict(Vec<Conflict>),
    ResolvableConflict(Vec<Conflict>),
    Failed(FailureReport),
}

impl CheckOutcome {
    /// Returns the stable discriminant name, e.g. `CLEAR`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear { .. } => "CLEAR",
            Self::UnresolvableConflict(_) => "UNRESOLVABLE_CONFLICT",
            Self::ResolvableConflict(_) => "RESOLVABLE_CONFLICT",
            Self::Failed(_) => "FAILED",
        }
    }

    /// Conflicts carried by a conflict outcome; empty otherwise.
    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            Self::UnresolvableConflict(conflicts) | Self::ResolvableConflict(conflicts) => conflicts.as_slice(),
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::window;
    use eventpub_core::Booking;
    use eventpub_providers::ProviderError;

    #[test]
    fn outcome_json_shape() {
        let outcome = PublishOutcome::ResolvableConflict(vec![Conflict::calendar(Booking::new(
            "Rent strike",
            window(10, 0, 11, 0),
        ))]);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "RESOLVABLE_CONFLICT");
        assert_eq!(json["detail"][0]["kind"], "calendar");
        assert_eq!(json["detail"][0]["booking"]["title"], "Rent strike");
        assert_eq!(outcome.as_str(), "RESOLVABLE_CONFLICT");
        assert_eq!(outcome.conflicts().len(), 1);
    }

    #[test]
    fn failure_report_carries_partial_links() {
        let err = PublishError::from(ProviderError::network("reset").with_provider("actionnetwork"));
        let partial = PartialLinks {
            meeting_join_url: Some("https://zoom.us/j/1".into()),
            ..Default::default()
        };
        let outcome = PublishOutcome::Failed(FailureReport::new(&err, partial));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "FAILED");
        assert_eq!(json["detail"]["kind"], "transport");
        assert_eq!(json["detail"]["partial"]["meeting_join_url"], "https://zoom.us/j/1");
        assert!(json["detail"]["partial"].get("listing_share_url").is_none());

        let PublishOutcome::Failed(report) = outcome else {
            unreachable!()
        };
        assert_eq!(
            report.message(),
            "provider call failed: [actionnetwork] network_error: reset"
        );
    }

    #[test]
    fn clear_round_trips() {
        let outcome = CheckOutcome::Clear {
            account: AccountRef::new("u1", "a@example.org"),
            calendar_conflicts_overridden: vec![],
        };
        let json = serde_json::to_string(&outcome).unwrap();
        let back: CheckOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
        assert_eq!(back.as_str(), "CLEAR");
    }
}
