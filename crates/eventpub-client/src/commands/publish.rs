//! `publish` and `check` commands.

use tracing::debug;

use eventpub_core::CandidateEvent;
use eventpub_publish::{CheckOutcome, PublishOutcome};

use crate::cli::EventArgs;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::output;

use super::{Providers, not_started, prepare_publisher};

/// Publishes an event and prints the outcome.
pub async fn publish(
    config: &ClientConfig,
    event: &EventArgs,
    ignore_resolvable_conflicts: bool,
    json: bool,
) -> ClientResult<u8> {
    let event = event.to_event()?;
    debug!(title = %event.title, "publishing event");

    let outcome = publish_outcome(config, &event, ignore_resolvable_conflicts).await?;

    if json {
        println!("{}", output::to_json(&outcome)?);
    } else {
        print!("{}", output::render_publish(&outcome));
    }
    Ok(output::publish_exit_code(&outcome))
}

/// Runs every check without writing and prints the outcome.
pub async fn check(
    config: &ClientConfig,
    event: &EventArgs,
    ignore_resolvable_conflicts: bool,
    json: bool,
) -> ClientResult<u8> {
    let event = event.to_event()?;
    debug!(title = %event.title, "checking event");

    let outcome = check_outcome(config, &event, ignore_resolvable_conflicts).await?;

    if json {
        println!("{}", output::to_json(&outcome)?);
    } else {
        print!("{}", output::render_check(&outcome));
    }
    Ok(output::check_exit_code(&outcome))
}

async fn publish_outcome(
    config: &ClientConfig,
    event: &CandidateEvent,
    ignore_resolvable_conflicts: bool,
) -> ClientResult<PublishOutcome> {
    let providers = Providers::from_config(config)?;
    Ok(match prepare_publisher(config, providers, event, ignore_resolvable_conflicts).await {
        Ok(publisher) => publisher.publish(event).await,
        Err(err) => PublishOutcome::Failed(not_started(&err)),
    })
}

async fn check_outcome(
    config: &ClientConfig,
    event: &CandidateEvent,
    ignore_resolvable_conflicts: bool,
) -> ClientResult<CheckOutcome> {
    let providers = Providers::from_config(config)?;
    Ok(match prepare_publisher(config, providers, event, ignore_resolvable_conflicts).await {
        Ok(publisher) => publisher.check(event).await,
        Err(err) => CheckOutcome::Failed(not_started(&err)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventpub_core::{EventLocation, EventTimestamp};
    use eventpub_publish::FailureKind;

    use crate::error::ClientError;

    fn config() -> ClientConfig {
        ClientConfig::parse(
            r#"
[zoom]
account_id = "acct"
client_id = "id"
client_secret = "secret"

[google]
client_id = "id"
client_secret = "secret"
refresh_token = "refresh"
calendar_id = "primary"

[actionnetwork]
api_key = "key"
"#,
        )
        .unwrap()
    }

    fn naive_event() -> CandidateEvent {
        CandidateEvent::new(
            "Canvass",
            EventTimestamp::parse("2099-03-01 10:00").unwrap(),
            EventTimestamp::parse("2099-03-01T12:00:00-06:00").unwrap(),
            EventLocation::new("Library", "1 Main St", "Austin", "TX", "78701"),
        )
    }

    #[tokio::test]
    async fn naive_event_is_a_failed_publish_outcome() {
        let outcome = publish_outcome(&config(), &naive_event(), false).await.unwrap();

        let PublishOutcome::Failed(report) = &outcome else {
            panic!("expected FAILED, got {}", outcome.as_str());
        };
        assert_eq!(report.kind, FailureKind::Validation);
        assert!(!report.retryable);
        assert!(report.partial.is_empty());
        assert_eq!(output::publish_exit_code(&outcome), output::EXIT_FAILURE);

        let json = output::to_json(&outcome).unwrap();
        assert!(json.contains("\"FAILED\""), "{json}");
    }

    #[tokio::test]
    async fn naive_event_is_a_failed_check_outcome() {
        let outcome = check_outcome(&config(), &naive_event(), false).await.unwrap();

        let CheckOutcome::Failed(report) = &outcome else {
            panic!("expected FAILED, got {}", outcome.as_str());
        };
        assert_eq!(report.kind, FailureKind::Validation);
    }

    #[tokio::test]
    async fn missing_section_is_still_a_config_error() {
        let err = publish_outcome(&ClientConfig::default(), &naive_event(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
