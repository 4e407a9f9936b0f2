//! Resolving the configured account pool against the video provider.

use tracing::{debug, instrument};

use eventpub_core::AccountRef;
use eventpub_providers::VideoProvider;

use crate::error::PublishError;

/// Builds the ordered account pool.
///
/// With no `preferred` emails, every active account is used in the order
/// the provider lists them. Otherwise the pool follows `preferred` exactly;
/// emails match case-insensitively.
///
/// # Errors
///
/// Returns [`PublishError::Validation`] if a preferred email is not an
/// active account, or [`PublishError::Transport`] if listing fails.
#[instrument(skip_all, fields(provider = provider.name(), preferred = preferred.len()))]
pub async fn resolve_account_pool(
    provider: &dyn VideoProvider,
    preferred: &[String],
) -> Result<Vec<AccountRef>, PublishError> {
    let accounts = provider.list_accounts().await?;
    debug!(available = accounts.len(), "listed video accounts");

    if preferred.is_empty() {
        return Ok(accounts);
    }

    preferred
        .iter()
        .map(|email| {
            accounts
                .iter()
                .find(|account| account.email.eq_ignore_ascii_case(email.trim()))
                .cloned()
                .ok_or_else(|| {
                    PublishError::validation(format!(
                        "video account `{}` is not an active {} user",
                        email,
                        provider.name()
                    ))
                })
        })
        .collect()
}
