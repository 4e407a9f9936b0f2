//! Action Network event listings.
//!
//! [`ActionNetworkProvider`] implements
//! [`ListingProvider`](crate::ListingProvider) by posting an OSDI event to
//! the group's API endpoint. The group is implied by the API key.

mod api;
mod config;
mod provider;

pub use config::ActionNetworkConfig;
pub use provider::ActionNetworkProvider;
