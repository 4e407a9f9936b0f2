//! In-memory providers that record every call.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use eventpub_core::{AccountRef, Booking, TimeWindow};
use eventpub_providers::{
    BookingPage, BoxFuture, CalendarProvider, ListingLinks, ListingProvider, NewCalendarEvent,
    NewListing, ProviderError, ProviderErrorCode, ProviderResult, VideoProvider,
};

/// 2025-03-01 at `h:m` UTC.
pub(crate) fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, h, m, 0).unwrap()
}

/// A window on 2025-03-01, UTC.
pub(crate) fn window(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeWindow {
    TimeWindow::try_new(at(h1, m1), at(h2, m2)).unwrap()
}

/// Serves one page of `bookings` that overlap `window`.
fn page_of(bookings: &[Booking], window: &TimeWindow, page_size: usize, token: Option<String>) -> BookingPage {
    let matching: Vec<&Booking> = bookings.iter().filter(|b| b.overlaps(window)).collect();
    let offset = token
        .and_then(|t| t.strip_prefix("page-").and_then(|n| n.parse::<usize>().ok()))
        .unwrap_or(0);
    let end = (offset + page_size).min(matching.len());
    let page = BookingPage::last(matching[offset.min(end)..end].iter().map(|b| (*b).clone()).collect());
    if end < matching.len() {
        page.with_next_page_token(format!("page-{}", end))
    } else {
        page
    }
}

fn failure(code: ProviderErrorCode, provider: &str) -> ProviderError {
    ProviderError::new(code, "injected failure").with_provider(provider)
}

/// Video provider keyed by account id.
pub(crate) struct FakeVideo {
    accounts: Vec<AccountRef>,
    bookings: HashMap<String, Vec<Booking>>,
    page_size: usize,
    fail_list: HashMap<String, ProviderErrorCode>,
    fail_create: Option<ProviderErrorCode>,
    pub calls: Mutex<Vec<String>>,
    searched: Mutex<Vec<TimeWindow>>,
}

impl FakeVideo {
    pub fn new() -> Self {
        Self {
            accounts: Vec::new(),
            bookings: HashMap::new(),
            page_size: 50,
            fail_list: HashMap::new(),
            fail_create: None,
            calls: Mutex::new(Vec::new()),
            searched: Mutex::new(Vec::new()),
        }
    }

    pub fn with_accounts(mut self, accounts: Vec<AccountRef>) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_booking(mut self, account_id: &str, booking: Booking) -> Self {
        self.bookings.entry(account_id.to_string()).or_default().push(booking);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn failing_list_for(mut self, account_id: &str, code: ProviderErrorCode) -> Self {
        self.fail_list.insert(account_id.to_string(), code);
        self
    }

    pub fn failing_create(mut self, code: ProviderErrorCode) -> Self {
        self.fail_create = Some(code);
        self
    }

    /// Account ids passed to `list_bookings_page`, one entry per page.
    pub fn listed_accounts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| c.strip_prefix("list:").map(str::to_string))
            .collect()
    }

    pub fn searched_windows(&self) -> Vec<TimeWindow> {
        self.searched.lock().unwrap().clone()
    }

    pub fn created_meetings(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| c.strip_prefix("create:").map(str::to_string))
            .collect()
    }
}

impl VideoProvider for FakeVideo {
    fn name(&self) -> &str {
        "fake-video"
    }

    fn list_accounts(&self) -> BoxFuture<'_, ProviderResult<Vec<AccountRef>>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push("accounts".to_string());
            Ok(self.accounts.clone())
        })
    }

    fn list_bookings_page<'a>(
        &'a self,
        account: &'a AccountRef,
        window: TimeWindow,
        page_token: Option<String>,
    ) -> BoxFuture<'a, ProviderResult<BookingPage>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(format!("list:{}", account.id));
            self.searched.lock().unwrap().push(window);
            if let Some(code) = self.fail_list.get(&account.id) {
                return Err(failure(*code, "fake-video"));
            }
            let bookings = self.bookings.get(&account.id).cloned().unwrap_or_default();
            Ok(page_of(&bookings, &window, self.page_size, page_token))
        })
    }

    fn create_meeting<'a>(
        &'a self,
        account: &'a AccountRef,
        title: &'a str,
        _window: TimeWindow,
    ) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(format!("create:{}", account.id));
            if let Some(code) = self.fail_create {
                return Err(failure(code, "fake-video"));
            }
            Ok(format!("https://zoom.example/j/{}-{}", account.id, title.len()))
        })
    }
}

/// Calendar provider over a fixed list of entries.
pub(crate) struct FakeCalendar {
    bookings: Vec<Booking>,
    page_size: usize,
    fail_list: Option<ProviderErrorCode>,
    fail_create: Option<ProviderErrorCode>,
    searched: Mutex<Vec<TimeWindow>>,
    pub created: Mutex<Vec<NewCalendarEvent>>,
}

impl FakeCalendar {
    pub fn new() -> Self {
        Self {
            bookings: Vec::new(),
            page_size: 50,
            fail_list: None,
            fail_create: None,
            searched: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn with_booking(mut self, booking: Booking) -> Self {
        self.bookings.push(booking);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn failing_list(mut self, code: ProviderErrorCode) -> Self {
        self.fail_list = Some(code);
        self
    }

    pub fn failing_create(mut self, code: ProviderErrorCode) -> Self {
        self.fail_create = Some(code);
        self
    }

    pub fn searched_windows(&self) -> Vec<TimeWindow> {
        self.searched.lock().unwrap().clone()
    }

    pub fn created_events(&self) -> Vec<NewCalendarEvent> {
        self.created.lock().unwrap().clone()
    }
}

impl CalendarProvider for FakeCalendar {
    fn name(&self) -> &str {
        "fake-calendar"
    }

    fn list_bookings_page(
        &self,
        window: TimeWindow,
        page_token: Option<String>,
    ) -> BoxFuture<'_, ProviderResult<BookingPage>> {
        Box::pin(async move {
            self.searched.lock().unwrap().push(window);
            if let Some(code) = self.fail_list {
                return Err(failure(code, "fake-calendar"));
            }
            Ok(page_of(&self.bookings, &window, self.page_size, page_token))
        })
    }

    fn create_event<'a>(&'a self, event: &'a NewCalendarEvent) -> BoxFuture<'a, ProviderResult<String>> {
        Box::pin(async move {
            if let Some(code) = self.fail_create {
                return Err(failure(code, "fake-calendar"));
            }
            self.created.lock().unwrap().push(event.clone());
            Ok("https://calendar.example/event/1".to_string())
        })
    }
}

/// Listing provider that hands out fixed links.
pub(crate) struct FakeListing {
    fail: Option<ProviderErrorCode>,
    pub created: Mutex<Vec<NewListing>>,
}

impl FakeListing {
    pub fn new() -> Self {
        Self {
            fail: None,
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, code: ProviderErrorCode) -> Self {
        self.fail = Some(code);
        self
    }

    pub fn created_listings(&self) -> Vec<NewListing> {
        self.created.lock().unwrap().clone()
    }
}

impl ListingProvider for FakeListing {
    fn name(&self) -> &str {
        "fake-listing"
    }

    fn create_listing<'a>(&'a self, listing: &'a NewListing) -> BoxFuture<'a, ProviderResult<ListingLinks>> {
        Box::pin(async move {
            if let Some(code) = self.fail {
                return Err(failure(code, "fake-listing"));
            }
            self.created.lock().unwrap().push(listing.clone());
            Ok(ListingLinks {
                manage_url: "https://listing.example/manage/1".to_string(),
                share_url: "https://listing.example/events/1".to_string(),
            })
        })
    }
}
