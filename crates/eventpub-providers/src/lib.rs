//! Provider abstractions and HTTP bindings for eventpub.
//!
//! The [`provider`] module defines the three seams the publish pipeline
//! talks to: [`VideoProvider`], [`CalendarProvider`] and
//! [`ListingProvider`]. Concrete bindings live behind cargo features:
//!
//! - `zoom`: Zoom video-account pool
//! - `google`: Google Calendar shared calendar
//! - `actionnetwork`: Action Network listings
//!
//! All provider failures are reported as [`ProviderError`].

pub mod error;
pub mod provider;

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
mod token;

#[cfg(feature = "actionnetwork")]
pub mod actionnetwork;
#[cfg(feature = "google")]
pub mod google;
#[cfg(feature = "zoom")]
pub mod zoom;

pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use provider::{
    BookingPage, BoxFuture, CalendarProvider, ListingLinks, ListingProvider, NewCalendarEvent,
    NewListing, Paged, VideoProvider, collect_pages,
};
#[cfg(feature = "http")]
pub use token::ClientCredentials;
