//! Zoom video-account pool.
//!
//! [`ZoomProvider`] implements [`VideoProvider`](crate::VideoProvider) on top
//! of the Zoom REST API v2 using a Server-to-Server OAuth app:
//!
//! 1. An access token is requested with the `account_credentials` grant
//!    (client id/secret as basic auth, plus the account id)
//! 2. Active users of the account form the default account pool
//! 3. Each user's upcoming scheduled meetings are listed to find conflicts
//! 4. The chosen user gets a new scheduled meeting; its join URL is returned
//!
//! # Example
//!
//! ```ignore
//! use eventpub_providers::zoom::{ZoomConfig, ZoomProvider};
//! use eventpub_providers::ClientCredentials;
//!
//! let config = ZoomConfig::new("account-id", ClientCredentials::new("id", "secret"));
//! let zoom = ZoomProvider::new(config)?;
//! let accounts = zoom.list_accounts().await?;
//! ```

mod api;
mod config;
mod provider;

pub use config::ZoomConfig;
pub use provider::ZoomProvider;
