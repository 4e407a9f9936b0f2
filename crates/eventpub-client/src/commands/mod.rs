//! Command implementations.
//!
//! Each command returns the process exit code on success.

pub mod accounts;
pub mod auth;
pub mod config;
pub mod publish;

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use eventpub_core::CandidateEvent;
use eventpub_providers::actionnetwork::ActionNetworkProvider;
use eventpub_providers::google::GoogleProvider;
use eventpub_providers::zoom::ZoomProvider;
use eventpub_publish::{
    FailureReport, PartialLinks, PublishError, Publisher, resolve_account_pool, validate_event,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Builds the Zoom provider from the `[zoom]` section.
pub(crate) fn zoom_provider(config: &ClientConfig) -> ClientResult<ZoomProvider> {
    let settings = config.zoom().map_err(ClientError::Config)?;
    let provider_config = settings
        .to_provider_config(config.publish.timeout())
        .map_err(ClientError::Config)?;
    Ok(ZoomProvider::new(provider_config)?)
}

/// Builds the Google Calendar provider from the `[google]` section.
pub(crate) fn google_provider(config: &ClientConfig) -> ClientResult<GoogleProvider> {
    let settings = config.google().map_err(ClientError::Config)?;
    let provider_config = settings
        .to_provider_config(config.publish.timeout())
        .map_err(ClientError::Config)?;
    Ok(GoogleProvider::new(provider_config)?)
}

/// Builds the Action Network provider from the `[actionnetwork]` section.
pub(crate) fn actionnetwork_provider(config: &ClientConfig) -> ClientResult<ActionNetworkProvider> {
    let settings = config.actionnetwork().map_err(ClientError::Config)?;
    let provider_config = settings
        .to_provider_config(config.publish.timeout())
        .map_err(ClientError::Config)?;
    Ok(ActionNetworkProvider::new(provider_config)?)
}

/// Every provider a publish attempt needs.
///
/// Building them only reads configuration; no request is sent.
pub(crate) struct Providers {
    video: Arc<ZoomProvider>,
    calendar: Arc<GoogleProvider>,
    listing: Arc<ActionNetworkProvider>,
}

impl Providers {
    /// Builds all providers, failing on the first configuration problem.
    pub(crate) fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        config.publish.validate().map_err(ClientError::Config)?;
        Ok(Self {
            video: Arc::new(zoom_provider(config)?),
            calendar: Arc::new(google_provider(config)?),
            listing: Arc::new(actionnetwork_provider(config)?),
        })
    }
}

/// Validates the event, then resolves the account pool and builds the
/// publisher.
///
/// Nothing is sent to a provider until the event's times are known to be
/// usable. Errors are attempt failures and are reported as outcomes.
pub(crate) async fn prepare_publisher(
    config: &ClientConfig,
    providers: Providers,
    event: &CandidateEvent,
    ignore_resolvable_conflicts: bool,
) -> Result<Publisher, PublishError> {
    validate_event(event, Utc::now())?;

    let preferred = config.zoom.as_ref().map(|z| z.accounts.as_slice()).unwrap_or(&[]);
    let pool = resolve_account_pool(providers.video.as_ref(), preferred).await?;

    let publish_config = config
        .publish
        .to_publish_config(pool)
        .with_ignore_resolvable_conflicts(ignore_resolvable_conflicts);

    Ok(Publisher::new(
        providers.video,
        providers.calendar,
        providers.listing,
        publish_config,
    ))
}

/// Report for an attempt that failed before the publisher could run.
pub(crate) fn not_started(err: &PublishError) -> FailureReport {
    let report = FailureReport::new(err, PartialLinks::default());
    warn!(kind = %report.kind, error = %report.message(), "publish attempt could not start");
    report
}
