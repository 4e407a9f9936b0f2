//! Calendar API v3 wire types.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use eventpub_core::{Booking, TimeWindow};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::NewCalendarEvent;

/// Response from `GET /calendars/{calendarId}/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventListResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// An event resource, reduced to what conflict detection needs.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub start: Option<ApiEventTime>,
    #[serde(default)]
    pub end: Option<ApiEventTime>,
}

/// Start or end of an event: `dateTime` for timed events, `date` for all-day.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ApiEvent {
    /// Converts a non-cancelled event into a booking.
    ///
    /// All-day events cover their whole date range, read in `all_day_offset`
    /// because the API gives them no offset of their own. A zero-length
    /// timed event still occupies one minute.
    ///
    /// # Errors
    ///
    /// An event whose times are missing, mixed or unparseable is an invalid
    /// response. It is never dropped, so a busy slot cannot look free.
    pub fn into_booking(self, all_day_offset: FixedOffset) -> ProviderResult<Option<Booking>> {
        let title = self.summary.unwrap_or_else(|| "(no title)".to_string());

        if self.status.as_deref() == Some("cancelled") {
            debug!("skipping cancelled event {:?}", self.id);
            return Ok(None);
        }

        let (Some(start), Some(end)) = (self.start, self.end) else {
            return Err(ProviderError::invalid_response(format!(
                "calendar event {:?} is missing its start or end",
                title
            )));
        };

        let window = match (start, end) {
            (
                ApiEventTime {
                    date_time: Some(start),
                    ..
                },
                ApiEventTime {
                    date_time: Some(end), ..
                },
            ) => timed_window(&title, &start, &end)?,
            (
                ApiEventTime { date: Some(start), .. },
                ApiEventTime { date: Some(end), .. },
            ) => all_day_window(&title, &start, &end, all_day_offset)?,
            _ => {
                return Err(ProviderError::invalid_response(format!(
                    "calendar event {:?} has no matching dateTime or date bounds",
                    title
                )));
            }
        };

        Ok(Some(Booking::new(title, window)))
    }
}

fn timed_window(title: &str, start: &str, end: &str) -> ProviderResult<TimeWindow> {
    let start = parse_date_time(title, start)?;
    let mut end = parse_date_time(title, end)?;
    if end == start {
        end = start + Duration::minutes(1);
    }
    TimeWindow::try_new(start, end).map_err(|e| {
        ProviderError::invalid_response(format!("calendar event {:?} has an invalid time window", title))
            .with_source(e)
    })
}

fn parse_date_time(title: &str, value: &str) -> ProviderResult<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value).map_err(|e| {
        ProviderError::invalid_response(format!(
            "calendar event {:?} has an unparseable dateTime {:?}",
            title, value
        ))
        .with_source(e)
    })
}

fn all_day_window(title: &str, start: &str, end: &str, offset: FixedOffset) -> ProviderResult<TimeWindow> {
    let start = midnight(title, start, offset)?;
    let end = midnight(title, end, offset)?;
    TimeWindow::try_new(start, end).map_err(|e| {
        ProviderError::invalid_response(format!("all-day event {:?} has an invalid date range", title))
            .with_source(e)
    })
}

fn midnight(title: &str, value: &str, offset: FixedOffset) -> ProviderResult<DateTime<FixedOffset>> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(offset).single())
        .ok_or_else(|| {
            ProviderError::invalid_response(format!("all-day event {:?} has an unparseable date {:?}", title, value))
        })
}

/// Body of `POST /calendars/{calendarId}/events`.
#[derive(Debug, Serialize)]
pub(crate) struct InsertEventRequest<'a> {
    pub summary: &'a str,
    pub description: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    pub location: &'a str,
    pub start: ApiEventTime,
    pub end: ApiEventTime,
}

impl<'a> InsertEventRequest<'a> {
    /// Builds the request; times keep the event's own UTC offset.
    pub fn from_event(event: &'a NewCalendarEvent) -> Self {
        let stamp = |dt: DateTime<chrono::FixedOffset>| ApiEventTime {
            date_time: Some(dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            date: None,
        };
        Self {
            summary: &event.title,
            description: &event.description,
            location: &event.location,
            start: stamp(event.window.local_start()),
            end: stamp(event.window.local_end()),
        }
    }
}

fn is_blank(value: &&str) -> bool {
    value.trim().is_empty()
}

/// Response from event insertion.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InsertEventResponse {
    pub html_link: String,
}
