//! Zoom provider implementation.

use chrono::Utc;
use tracing::{debug, info, instrument};

use eventpub_core::{AccountRef, TimeWindow};

use super::api::{
    ApiUser, CreateMeetingRequest, CreateMeetingResponse, MAX_PAGE_SIZE, MeetingListResponse,
    UserListResponse,
};
use super::config::ZoomConfig;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{build_client, endpoint, read_json, send_error};
use crate::provider::{BookingPage, BoxFuture, VideoProvider, collect_pages};
use crate::token::{AccessToken, TokenCache, TokenResponse};

const PROVIDER_NAME: &str = "zoom";

/// Video-account pool backed by one Zoom account.
#[derive(Debug)]
pub struct ZoomProvider {
    config: ZoomConfig,
    http: reqwest::Client,
    token: TokenCache,
}

impl ZoomProvider {
    /// Creates a new Zoom provider.
    ///
    /// No request is made until the first API call.
    pub fn new(config: ZoomConfig) -> ProviderResult<Self> {
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
    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    async fn request_token(&self) -> ProviderResult<AccessToken> {
        info!("requesting zoom access token");
        let response = self
            .http
            .post(&self.config.oauth_url)
            .basic_auth(
                &self.config.credentials.client_id,
                Some(&self.config.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.config.account_id.as_str()),
            ])
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

    /// Sends an authorized GET and parses the JSON body.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> ProviderResult<T> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(endpoint(&self.config.api_base, path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(send_error)?;
        read_json(response).await
    }

    fn users_page(&self, page_token: Option<String>) -> BoxFuture<'_, ProviderResult<UserListResponse>> {
        Box::pin(async move {
            let mut query = vec![("status", "active"), ("page_size", MAX_PAGE_SIZE)];
            if let Some(ref token) = page_token {
                query.push(("next_page_token", token.as_str()));
            }
            self.get("users", &query).await
        })
    }

    #[instrument(skip(self), fields(provider = PROVIDER_NAME))]
    async fn list_accounts_impl(&self) -> ProviderResult<Vec<AccountRef>> {
        let users = collect_pages(|token| self.users_page(token)).await?;
        let accounts: Vec<AccountRef> = users.into_iter().filter_map(ApiUser::into_account).collect();

        debug!(count = accounts.len(), "listed zoom accounts");
        Ok(accounts)
    }

    async fn list_bookings_page_impl(
        &self,
        account: &AccountRef,
        window: TimeWindow,
        page_token: Option<String>,
    ) -> ProviderResult<BookingPage> {
        let from = window.start().format("%Y-%m-%d").to_string();
        let to = window.end().format("%Y-%m-%d").to_string();
        let path = format!("users/{}/meetings", urlencoding::encode(&account.id));

        let mut query = vec![
            ("type", "upcoming"),
            ("from", from.as_str()),
            ("to", to.as_str()),
            ("page_size", MAX_PAGE_SIZE),
        ];
        if let Some(ref token) = page_token {
            query.push(("next_page_token", token.as_str()));
        }

        let page: MeetingListResponse = self.get(&path, &query).await?;
        let mut bookings = Vec::with_capacity(page.meetings.len());
        for meeting in page.meetings {
            if let Some(booking) = meeting.into_booking(&account.email)?
                && booking.overlaps(&window)
            {
                bookings.push(booking);
            }
        }

        debug!(
            account = %account.email,
            count = bookings.len(),
            has_more = page.next_page_token.as_deref().is_some_and(|t| !t.is_empty()),
            "fetched zoom meetings page"
        );

        Ok(BookingPage {
            bookings,
            next_page_token: page.next_page_token,
        })
    }

    #[instrument(skip(self, window), fields(provider = PROVIDER_NAME, account = %account.email))]
    async fn create_meeting_impl(
        &self,
        account: &AccountRef,
        title: &str,
        window: TimeWindow,
    ) -> ProviderResult<String> {
        let token = self.access_token().await?;
        let path = format!("users/{}/meetings", urlencoding::encode(&account.id));
        let body = CreateMeetingRequest::scheduled(title, &window);

        let response = self
            .http
            .post(endpoint(&self.config.api_base, &path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(send_error)?;

        let created: CreateMeetingResponse = read_json(response).await?;
        if created.join_url.trim().is_empty() {
            return Err(ProviderError::invalid_response("meeting was created without a join URL"));
        }
        info!("created zoom meeting");
        Ok(created.join_url)
    }
}

impl VideoProvider for ZoomProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn list_accounts(&self) -> BoxFuture<'_, ProviderResult<Vec<AccountRef>>> {
        Box::pin(async move {
            self.list_accounts_impl()
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn list_bookings_page<'a>(
        &'a self,
        account: &'a AccountRef,
        window: TimeWindow,
        page_token: Option<String>,
    ) -> BoxFuture<'a, ProviderResult<BookingPage>> {
        Box::pin(async move {
            self.list_bookings_page_impl(account, window, page_token)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }

    fn create_meeting<'a>(
        &'a self,
        account: &'a AccountRef,
        title: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.create_meeting_impl(account, title, window)
                .await
                .map_err(|e| e.with_provider(PROVIDER_NAME))
        })
    }
}
