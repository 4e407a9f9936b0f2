//! Google Calendar provider implementation.

use chrono::{SecondsFormat, Utc};
use tracing::{debug, info, instrument};

use eventpub_core::TimeWindow;

use super::api::{EventListResponse, InsertEventRequest, InsertEventResponse};
use super::config::GoogleConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{build_client, endpoint, read_json, send_error};
use crate::provider::{BookingPage, BoxFuture, CalendarProvider, NewCalendarEvent};
use crate::token::{AccessToken, TokenCache, TokenResponse};

const PROVIDER_NAME: &str = "google";

/// Largest page the events list accepts.
const MAX_RESULTS: &str = "2500";

/// Shared calendar backed by one Google Calendar.
#[derive(Debug)]
pub struct GoogleProvider {
    config: GoogleConfig,
    http: reqwest::Client,
    token: TokenCache,
}

impl GoogleProvider {
    /// Creates a new Google Calendar provider.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config
            .validate()
            .map_err(|e| ProviderError::configuration(e).with_provider(PROVIDER_NAME))?;
        let http = build_client(config.timeout).map_err(|e| e.with_provider(PROVIDER_NAME))?;

        Ok(Self {
            config,
            http,
            token: TokenCache::default(),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    async fn request_token(&self) -> ProviderResult<AccessToken> {
        info!("refreshing google access token");
        let params = [
            ("client_id", self.config.credentials.client_id.as_str()),
            ("client_secret", self.config.credentials.client_secret.as_str()),
            ("refresh_token", self.config.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(send_error)?;

        let token: TokenResponse = read_json(response)
            .await
            .map_err(ProviderError::into_auth_failure)?;
        AccessToken::from_response(token, Utc::now())
    }

    async fn access_token(&self) -> ProviderResult<String> {
        self.token.get_or_refresh(|| self.request_token()).await
    }

    fn events_path(&self) -> String {
        format!(
            "calendars/{}/events",
            urlencoding::encode(&self.config.calendar_id)
        )
    }

    async fn list_bookings_page_impl(
        &self,
        window: TimeWindow,
        page_token: Option<String>,
    ) -> ProviderResult<BookingPage> {
        let token = self.access_token().await?;
        let time_min = window.start().to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = window.end().to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut query = vec![
            ("timeMin", time_min.as_str()),
            ("timeMax", time_max.as_str()),
            ("singleEvents", "true"),
            ("orderBy", "startTime"),
            ("maxResults", MAX_RESULTS),
        ];
        if let Some(ref page_token) = page_token {
            query.push(("pageToken", page_token.as_str()));
        }

        let response = self
            .http
            .get(endpoint(&self.config.api_base, &self.events_path()))
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(send_error)?;

        let page: EventListResponse = read_json(response).await?;
        let mut bookings = Vec::with_capacity(page.items.len());
        for event in page.items {
            if let Some(booking) = event.into_booking(window.offset())? {
                bookings.push(booking);
            }
        }

        debug!(
            count = bookings.len(),
            has_more = page.next_page_token.is_some(),
            "fetched calendar events page"
        );

        Ok(BookingPage {
            bookings,
            next_page_token: page.next_page_token,
        })
    }

    #[instrument(skip(self, event), fields(provider = PROVIDER_NAME, title = %event.title))]
    async fn create_event_impl(&self, event: &NewCalendarEvent) -> ProviderResult<String> {
        let token = self.access_token().await?;
        let body = InsertEventRequest::from_event(event);

        let response = self
            .http
            .post(endpoint(&self.config.api_base, &self.events_path()))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let created: InsertEventResponse = read_json(response).await?;
        info!("created calendar event");
        Ok(created.html_link)
    }
}

impl CalendarProvider for GoogleProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn list_bookings_page(
        &self,
        window: TimeWindow,
        page_token: Option<String>,
    ) -> BoxFuture<'_, ProviderResult<BookingPage>> {
        Box::pin(async move {
            self.list_bookings_page_impl(window, page_token)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn create_event<'a>(&'a self, event: &'a NewCalendarEvent) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.create_event_impl(event)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use crate::token::ClientCredentials;

    fn test_config() -> GoogleConfig {
        GoogleConfig::new(
            ClientCredentials::new("id", "secret"),
            "refresh",
            "events@group.calendar.google.com",
        )
    }

    #[test]
    fn provider_creation() {
        let provider = GoogleProvider::new(test_config()).unwrap();
        assert_eq!(provider.name(), "google");
    }

    #[test]
    fn calendar_id_is_encoded_in_path() {
        let provider = GoogleProvider::new(test_config()).unwrap();
        assert_eq!(
            provider.events_path(),
            "calendars/events%40group.calendar.google.com/events"
        );
    }

    #[test]
    fn provider_rejects_missing_refresh_token() {
        let config = GoogleConfig::new(ClientCredentials::new("id", "secret"), "", "primary");
        let err = GoogleProvider::new(config).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
        assert!(err.message().contains("refresh_token"));
    }
}
