//! Action Network provider implementation.

use tracing::{info, instrument};

use super::api::{CreatedEvent, OsdiEvent};
use super::config::ActionNetworkConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{build_client, endpoint, read_json, send_error};
use crate::provider::{BoxFuture, ListingLinks, ListingProvider, NewListing};

const PROVIDER_NAME: &str = "actionnetwork";

/// Header carrying the group API key.
const API_KEY_HEADER: &str = "OSDI-API-Token";

/// Listing platform backed by one Action Network group.
#[derive(Debug)]
pub struct ActionNetworkProvider {
    config: ActionNetworkConfig,
    http: reqwest::Client,
}

impl ActionNetworkProvider {
    /// Creates a new Action Network provider.
    pub fn new(config: ActionNetworkConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|e| ProviderError::configuration(e).with_provider(PROVIDER_NAME))?;
        let http = build_client(config.timeout).map_err(|e| e.with_provider(PROVIDER_NAME))?;
        Ok(Self { config, http })
    }

    #[instrument(skip(self, listing), fields(provider = PROVIDER_NAME, title = %listing.title))]
    async fn create_listing_impl(&self, listing: &NewListing) -> ProviderResult<ListingLinks> {
        let body = OsdiEvent::from_listing(listing);
        let response = self
            .http
            .post(endpoint(&self.config.api_base, "events"))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let created: CreatedEvent = read_json(response).await?;
        let links = created.into_links()?;
        info!(share_url = %links.share_url, "created listing");
        Ok(links)
    }
}

impl ListingProvider for ActionNetworkProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn create_listing<'a>(&'a self, listing: &'a NewListing) -> BoxFuture<'a, ProviderResult<ListingLinks>> {
        Box::pin(async move {
            self.create_listing_impl(listing)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }
}
