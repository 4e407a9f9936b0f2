//! Zoom REST API wire types.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use eventpub_core::{AccountRef, Booking, TimeWindow};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::Paged;

/// Meeting types that have no fixed time and can never conflict.
const MEETING_TYPE_INSTANT: u8 = 1;
const MEETING_TYPE_RECURRING_NO_FIXED_TIME: u8 = 3;

/// Meeting type used for everything this tool creates.
pub(crate) const MEETING_TYPE_SCHEDULED: u8 = 2;

/// Largest page the list endpoints accept.
pub(crate) const MAX_PAGE_SIZE: &str = "300";

/// Response from `GET /users`.
#[derive(Debug, Deserialize)]
pub(crate) struct UserListResponse {
    #[serde(default)]
    pub users: Vec<ApiUser>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl Paged for UserListResponse {
    type Item = ApiUser;

    fn into_parts(self) -> (Vec<ApiUser>, Option<String>) {
        (self.users, self.next_page_token)
    }
}

/// A user from the users list.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiUser {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl ApiUser {
    /// Converts active users into account references.
    pub fn into_account(self) -> Option<AccountRef> {
        match self.status.as_deref() {
            Some("active") | None => Some(AccountRef::new(self.id, self.email)),
            Some(other) => {
                debug!("skipping zoom user {} with status {}", self.email, other);
                None
            }
        }
    }
}

/// Response from `GET /users/{userId}/meetings`.
#[derive(Debug, Deserialize)]
pub(crate) struct MeetingListResponse {
    #[serde(default)]
    pub meetings: Vec<ApiMeeting>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A meeting from the meetings list.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiMeeting {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(rename = "type")]
    pub meeting_type: u8,
    #[serde(default)]
    pub start_time: Option<String>,
    /// Scheduled length in minutes.
    #[serde(default)]
    pub duration: Option<i64>,
}

impl ApiMeeting {
    /// Converts a scheduled meeting into a booking owned by `owner`.
    ///
    /// Instant meetings and recurring meetings without a fixed time are
    /// skipped. A zero-length meeting still occupies one minute.
    ///
    /// # Errors
    ///
    /// A scheduled meeting whose start is missing or unparseable, or whose
    /// duration is out of range, is an invalid response. It is never
    /// dropped, so a busy account cannot look free.
    pub fn into_booking(self, owner: &str) -> ProviderResult<Option<Booking>> {
        let topic = self.topic.unwrap_or_default();

        if matches!(
            self.meeting_type,
            MEETING_TYPE_INSTANT | MEETING_TYPE_RECURRING_NO_FIXED_TIME
        ) {
            debug!("skipping zoom meeting {:?} of type {} with no scheduled time", topic, self.meeting_type);
            return Ok(None);
        }

        let raw_start = self.start_time.ok_or_else(|| {
            ProviderError::invalid_response(format!(
                "zoom meeting {:?} of type {} has no start_time",
                topic, self.meeting_type
            ))
        })?;
        let start = DateTime::parse_from_rfc3339(&raw_start).map_err(|e| {
            ProviderError::invalid_response(format!(
                "zoom meeting {:?} has an unparseable start_time {:?}",
                topic, raw_start
            ))
            .with_source(e)
        })?;

        let minutes = self.duration.unwrap_or(0).max(1);
        let length = Duration::try_minutes(minutes).ok_or_else(|| {
            ProviderError::invalid_response(format!(
                "zoom meeting {:?} has an out-of-range duration of {} minutes",
                topic, minutes
            ))
        })?;
        let window = TimeWindow::from_duration(start, length).map_err(|e| {
            ProviderError::invalid_response(format!("zoom meeting {:?} has an invalid time window", topic))
                .with_source(e)
        })?;
        Ok(Some(Booking::new(topic, window).with_owner(owner)))
    }
}

/// Body of `POST /users/{userId}/meetings`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateMeetingRequest<'a> {
    pub topic: &'a str,
    #[serde(rename = "type")]
    pub meeting_type: u8,
    /// GMT start time (`yyyy-MM-ddTHH:mm:ssZ`).
    pub start_time: String,
    /// Length in whole minutes.
    pub duration: i64,
}

impl<'a> CreateMeetingRequest<'a> {
    /// Builds a scheduled-meeting request covering `window`.
    pub fn scheduled(topic: &'a str, window: &TimeWindow) -> Self {
        Self {
            topic,
            meeting_type: MEETING_TYPE_SCHEDULED,
            start_time: window
                .start()
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            duration: duration_minutes(window),
        }
    }
}

/// Response from meeting creation.
#[derive(Debug, Deserialize)]
pub(crate) struct CreateMeetingResponse {
    pub join_url: String,
}

/// Window length in minutes, rounded up.
pub(crate) fn duration_minutes(window: &TimeWindow) -> i64 {
    let seconds = window.duration().num_seconds();
    (seconds + 59) / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::TimeZone;

    #[test]
    fn parse_user_list_and_filter_inactive() {
        let json = r#"{
            "page_size": 2,
            "next_page_token": "tok",
            "users": [
                {"id": "u1", "email": "events@example.org", "status": "active"},
                {"id": "u2", "email": "old@example.org", "status": "inactive"}
            ]
        }"#;

        let response: UserListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.next_page_token.as_deref(), Some("tok"));
        let accounts: Vec<_> = response
            .users
            .into_iter()
            .filter_map(ApiUser::into_account)
            .collect();
        assert_eq!(accounts, vec![AccountRef::new("u1", "events@example.org")]);
    }

    #[test]
    fn parse_meetings_skips_unscheduled_types() {
        let json = r#"{
            "next_page_token": "",
            "meetings": [
                {"id": 1, "topic": "Steering", "type": 2, "start_time": "2025-02-17T18:30:00Z", "duration": 60},
                {"id": 2, "topic": "Instant", "type": 1, "start_time": "2025-02-17T18:30:00Z", "duration": 60},
                {"id": 3, "topic": "Standing room", "type": 3, "duration": 60},
                {"id": 4, "topic": "Series", "type": 8, "start_time": "2025-02-18T01:00:00Z", "duration": 90}
            ]
        }"#;

        let response: MeetingListResponse = serde_json::from_str(json).unwrap();
        let bookings: Vec<Booking> = response
            .meetings
            .into_iter()
            .map(|m| m.into_booking("events@example.org"))
            .collect::<ProviderResult<Vec<_>>>()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].title, "Steering");
        assert_eq!(
            bookings[0].window.start(),
            Utc.with_ymd_and_hms(2025, 2, 17, 18, 30, 0).unwrap()
        );
        assert_eq!(bookings[0].window.duration(), Duration::minutes(60));
        assert_eq!(bookings[0].owner.as_deref(), Some("events@example.org"));
        assert_eq!(bookings[1].title, "Series");
    }

    #[test]
    fn zero_length_meeting_occupies_a_minute() {
        let meeting = ApiMeeting {
            topic: Some("Blink".into()),
            meeting_type: 2,
            start_time: Some("2025-02-17T18:30:00Z".into()),
            duration: Some(0),
        };
        let booking = meeting.into_booking("a@example.org").unwrap().unwrap();
        assert_eq!(booking.window.duration(), Duration::minutes(1));
    }

    #[test]
    fn unparseable_start_is_an_error() {
        let meeting: ApiMeeting = serde_json::from_str(
            r#"{"topic": "Steering", "type": 2, "start_time": "2025-03-01 10:00", "duration": 60}"#,
        )
        .unwrap();
        let err = meeting.into_booking("a@example.org").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        assert!(err.message().contains("Steering"));
    }

    #[test]
    fn scheduled_meeting_without_start_is_an_error() {
        let meeting: ApiMeeting =
            serde_json::from_str(r#"{"topic": "Series", "type": 8, "duration": 90}"#).unwrap();
        let err = meeting.into_booking("a@example.org").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[test]
    fn out_of_range_duration_is_an_error() {
        let meeting = ApiMeeting {
            topic: Some("Forever".into()),
            meeting_type: 2,
            start_time: Some("2025-02-17T18:30:00Z".into()),
            duration: Some(i64::MAX),
        };
        let err = meeting.into_booking("a@example.org").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }

    #[test]
    fn create_request_uses_gmt_and_rounds_up() {
        let start = chrono::FixedOffset::west_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 2, 17, 12, 30, 0)
            .unwrap();
        let window = TimeWindow::from_duration(start, Duration::seconds(90 * 60 + 10)).unwrap();

        let request = CreateMeetingRequest::scheduled("Teach-in", &window);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topic"], "Teach-in");
        assert_eq!(json["type"], 2);
        assert_eq!(json["start_time"], "2025-02-17T18:30:00Z");
        assert_eq!(json["duration"], 91);
    }
}
