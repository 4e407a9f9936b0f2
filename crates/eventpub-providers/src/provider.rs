//! Provider trait definitions.
//!
//! Three external systems take part in publishing an event:
//!
//! - [`VideoProvider`]: a pool of video-conferencing accounts
//! - [`CalendarProvider`]: one shared calendar
//! - [`ListingProvider`]: the public listing / registration platform
//!
//! Authentication and session setup belong to the implementations; callers
//! only see bookings, links and [`ProviderError`]s.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use eventpub_core::{AccountRef, Booking, EventLocation, TimeWindow};

use crate::error::{ProviderError, ProviderResult};

/// A boxed future for async trait methods.
///
/// Boxed futures keep the traits object safe so the publisher can hold
/// `Arc<dyn VideoProvider>` and friends.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One page of bookings from a paginated listing call.
#[derive(Debug, Clone, Default)]
pub struct BookingPage {
    /// Bookings on this page.
    pub bookings: Vec<Booking>,
    /// Continuation token; `None` (or empty) when this is the last page.
    pub next_page_token: Option<String>,
}

impl BookingPage {
    /// Creates a final page.
    pub fn last(bookings: Vec<Booking>) -> Self {
        Self {
            bookings,
            next_page_token: None,
        }
    }

    /// Builder method to set the continuation token.
    pub fn with_next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }
}

/// One page of a paginated listing call.
pub trait Paged {
    /// What the page lists.
    type Item;

    /// Splits the page into its items and continuation token.
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

impl Paged for BookingPage {
    type Item = Booking;

    fn into_parts(self) -> (Vec<Booking>, Option<String>) {
        (self.bookings, self.next_page_token)
    }
}

/// Drains a paginated listing call.
///
/// `fetch` is invoked with `None` for the first page and with each returned
/// continuation token afterwards, until a page comes back without one.
/// Results are never truncated; a token that was already followed is
/// reported as an invalid response instead of looping forever.
pub async fn collect_pages<'a, P, F>(mut fetch: F) -> ProviderResult<Vec<P::Item>>
where
    P: Paged,
    F: FnMut(Option<String>) -> BoxFuture<'a, ProviderResult<P>>,
{
    let mut items = Vec::new();
    let mut seen = HashSet::new();
    let mut page_token: Option<String> = None;

    loop {
        let (page, next) = fetch(page_token.take()).await?.into_parts();
        items.extend(page);

        match next.filter(|token| !token.is_empty()) {
            Some(next) if !seen.insert(next.clone()) => {
                return Err(ProviderError::invalid_response(format!(
                    "page token `{}` was returned twice",
                    next
                )));
            }
            Some(next) => page_token = Some(next),
            None => break,
        }
    }

    Ok(items)
}

/// A calendar entry to create on the shared calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCalendarEvent {
    pub title: String,
    pub window: TimeWindow,
    pub description: String,
    /// Single-line address.
    pub location: String,
}

/// A listing to create on the registration platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub title: String,
    pub window: TimeWindow,
    pub location: EventLocation,
    pub description: String,
    /// Instructions shown to people who register.
    pub instructions: String,
}

/// Links returned after a listing is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLinks {
    /// Link organizers use to manage the listing.
    pub manage_url: String,
    /// Public link people use to register.
    pub share_url: String,
}

/// A pool of video-conferencing accounts.
pub trait VideoProvider: Send + Sync {
    /// Returns the name of this provider (e.g. "zoom").
    fn name(&self) -> &str;

    /// Lists the accounts that can host meetings, in provider order.
    ///
    /// Implementations drain pagination and drop inactive accounts.
    fn list_accounts(&self) -> BoxFuture<'_, ProviderResult<Vec<AccountRef>>>;

    /// Fetches one page of meetings on `account` that overlap `window`.
    fn list_bookings_page<'a>(
        &'a self,
        account: &'a AccountRef,
        window: TimeWindow,
        page_token: Option<String>,
    ) -> BoxFuture<'a, ProviderResult<BookingPage>>;

    /// Schedules a meeting on `account` and returns its join link.
    fn create_meeting<'a>(
        &'a self,
        account: &'a AccountRef,
        title: &'a str,
        window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<String>>;
}

/// A single shared calendar.
pub trait CalendarProvider: Send + Sync {
    /// Returns the name of this provider (e.g. "google").
    fn name(&self) -> &str;

    /// Fetches one page of entries that overlap `window`.
    fn list_bookings_page(
        &self,
        window: TimeWindow,
        page_token: Option<String>,
    ) -> BoxFuture<'_, ProviderResult<BookingPage>>;

    /// Creates a calendar entry and returns its public link.
    fn create_event<'a>(&'a self, event: &'a NewCalendarEvent) -> BoxFuture<'a, ProviderResult<String>>;
}

/// The listing / registration platform.
pub trait ListingProvider: Send + Sync {
    /// Returns the name of this provider (e.g. "actionnetwork").
    fn name(&self) -> &str;

    /// Creates a public listing.
    fn create_listing<'a>(&'a self, listing: &'a NewListing) -> BoxFuture<'a, ProviderResult<ListingLinks>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn booking(title: &str) -> Booking {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        Booking::new(
            title,
            TimeWindow::from_duration(start, chrono::Duration::hours(1)).unwrap(),
        )
    }

    #[tokio::test]
    async fn collect_pages_follows_tokens_until_exhausted() {
        let seen = Mutex::new(Vec::new());
        let bookings = collect_pages::<BookingPage, _>(|token| {
            seen.lock().unwrap().push(token.clone());
            Box::pin(async move {
                Ok(match token.as_deref() {
                    None => BookingPage::last(vec![booking("a"), booking("b")]).with_next_page_token("p2"),
                    Some("p2") => BookingPage::last(vec![booking("c")]).with_next_page_token("p3"),
                    _ => BookingPage::last(vec![booking("d")]),
                })
            })
        })
        .await
        .unwrap();

        let titles: Vec<_> = bookings.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c", "d"]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn collect_pages_treats_empty_token_as_last_page() {
        let bookings = collect_pages::<BookingPage, _>(|_| {
            Box::pin(async { Ok(BookingPage::last(vec![booking("only")]).with_next_page_token("")) })
        })
        .await
        .unwrap();
        assert_eq!(bookings.len(), 1);
    }

    #[tokio::test]
    async fn collect_pages_rejects_repeated_token() {
        let err = collect_pages::<BookingPage, _>(|_| {
            Box::pin(async { Ok(BookingPage::last(vec![]).with_next_page_token("same")) })
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn collect_pages_rejects_token_cycle() {
        let calls = Mutex::new(0);
        let err = collect_pages::<BookingPage, _>(|token| {
            *calls.lock().unwrap() += 1;
            Box::pin(async move {
                let next = match token.as_deref() {
                    None | Some("b") => "a",
                    _ => "b",
                };
                Ok(BookingPage::last(vec![booking("x")]).with_next_page_token(next))
            })
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        assert_eq!(*calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn collect_pages_returns_no_partial_results_on_error() {
        let result = collect_pages::<BookingPage, _>(|token| {
            Box::pin(async move {
                match token {
                    None => Ok(BookingPage::last(vec![booking("a")]).with_next_page_token("p2")),
                    Some(_) => Err(ProviderError::network("connection reset")),
                }
            })
        })
        .await;
        assert_eq!(result.unwrap_err().code(), ProviderErrorCode::NetworkError);
    }
}
