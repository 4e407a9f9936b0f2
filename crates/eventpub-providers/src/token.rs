//! OAuth client credentials and access-token caching.

use std::future::Future;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{ProviderError, ProviderResult};

/// Tokens are refreshed this long before they expire, so a token never
/// lapses halfway through a publish attempt.
const EXPIRY_MARGIN_MINUTES: i64 = 2;

/// OAuth client identifier and secret.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    /// Creates new client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Checks that both values are present.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.trim().is_empty() {
            return Err("client_id is required");
        }
        if self.client_secret.trim().is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Token endpoint response (RFC 6749 §5.1, the fields we use).
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// A bearer token and when it stops being valid.
#[derive(Debug, Clone)]
pub(crate) struct AccessToken {
    pub value: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Builds a token from an endpoint response received at `now`.
    ///
    /// # Errors
    ///
    /// An `expires_in` too large to represent is an invalid response.
    pub fn from_response(response: TokenResponse, now: DateTime<Utc>) -> ProviderResult<Self> {
        let expires_at = match response.expires_in {
            Some(secs) => Some(
                Duration::try_seconds(secs)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .ok_or_else(|| {
                        ProviderError::invalid_response(format!("token expires_in {} is out of range", secs))
                    })?,
            ),
            None => None,
        };
        Ok(Self {
            value: response.access_token,
            expires_at,
        })
    }

    /// Returns true if the token can still be used at `now`.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at - Duration::minutes(EXPIRY_MARGIN_MINUTES),
            None => true,
        }
    }
}

/// Holds the current access token, refreshing it on demand.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    /// Returns a usable token, calling `refresh` when none is cached or the
    /// cached one is about to expire.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> ProviderResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ProviderResult<AccessToken>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref()
            && token.is_usable_at(Utc::now())
        {
            return Ok(token.value.clone());
        }

        let token = refresh().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }
}
