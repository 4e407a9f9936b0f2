//! Shared HTTP plumbing for the REST bindings.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Builds a `reqwest` client with the given request timeout.
pub(crate) fn build_client(timeout: Duration) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::configuration(format!("failed to create HTTP client: {}", e)).with_source(e))
}

/// Classifies a failed `send()`.
pub(crate) fn send_error(e: reqwest::Error) -> ProviderError {
    let err = if e.is_timeout() {
        ProviderError::network("request timeout")
    } else if e.is_connect() {
        ProviderError::network(format!("connection failed: {}", e))
    } else {
        ProviderError::network(format!("request failed: {}", e))
    };
    err.with_source(e)
}

/// Reads a response body, mapping error statuses and parsing JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ProviderResult<T> {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::network(format!("failed to read response: {}", e)).with_source(e))?;

    if !status.is_success() {
        debug!(status = status.as_u16(), "request failed");
        return Err(ProviderError::from_http_status(status.as_u16(), &body, retry_after));
    }

    parse_json(&body)
}

/// Parses a JSON body into `T`.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &str) -> ProviderResult<T> {
    serde_json::from_str(body)
        .map_err(|e| ProviderError::invalid_response(format!("failed to parse response: {}", e)).with_source(e))
}

/// Checks that a configured base URL is an absolute http(s) URL.
pub(crate) fn validate_base_url(name: &str, value: &str) -> Result<(), String> {
    let parsed = url::Url::parse(value).map_err(|e| format!("{} `{}` is not a valid URL: {}", name, value, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("{} must use http or https, not `{}`", name, other)),
    }
}

/// Joins a base URL and a path without doubling slashes.
pub(crate) fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
