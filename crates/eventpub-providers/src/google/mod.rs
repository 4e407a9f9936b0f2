//! Google Calendar shared calendar.
//!
//! [`GoogleProvider`] implements [`CalendarProvider`](crate::CalendarProvider)
//! against the Calendar API v3 for a single calendar id. Access tokens come
//! from a long-lived refresh token; [`ConsentFlow`] obtains one once,
//! interactively.

mod api;
mod config;
mod oauth;
mod provider;

pub use config::GoogleConfig;
pub use oauth::{CALENDAR_SCOPE, ConsentFlow, DEFAULT_PORT_RANGE, Pkce};
pub use provider::GoogleProvider;
