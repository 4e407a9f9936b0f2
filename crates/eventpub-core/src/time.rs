//! Time types for event scheduling.
//!
//! This module provides [`EventTimestamp`] for timestamps as they arrive
//! from callers (which may or may not carry a UTC offset), and
//! [`TimeWindow`], the validated half-open interval every availability
//! check works on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Formats accepted for timestamps without an offset.
///
/// These parse successfully only so that they can be rejected with a
/// precise error instead of a generic parse failure.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Errors produced while building a [`TimeWindow`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeWindowError {
    /// The timestamp has no UTC offset.
    #[error("the {field} time `{value}` has no UTC offset; timestamps must be timezone aware")]
    NaiveTimestamp {
        /// Which bound was naive (`start` or `end`).
        field: &'static str,
        /// The offending value.
        value: String,
    },

    /// The window is empty or inverted.
    #[error("the end time {end} must be after the start time {start}")]
    EndNotAfterStart {
        /// Start of the rejected window.
        start: String,
        /// End of the rejected window.
        end: String,
    },

    /// Adding the duration to the start leaves the representable range.
    #[error("a duration of {duration} from {start} is out of range")]
    OutOfRange {
        /// Start of the rejected window.
        start: String,
        /// The rejected duration.
        duration: String,
    },

    /// The input could not be parsed as a timestamp at all.
    #[error("`{0}` is not a recognizable timestamp (expected RFC 3339, e.g. 2025-02-17T12:30:00-06:00)")]
    Unparseable(String),
}

/// A timestamp as supplied at the boundary of the system.
///
/// - **Zoned**: a point in time with an explicit UTC offset
/// - **Naive**: a wall-clock reading without offset; never accepted into a
///   [`TimeWindow`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EventTimestamp {
    /// A timezone-aware timestamp.
    Zoned(DateTime<FixedOffset>),
    /// A timestamp without any offset information.
    Naive(NaiveDateTime),
}

impl EventTimestamp {
    /// Creates a zoned timestamp from a datetime in any timezone.
    pub fn from_zoned<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        Self::Zoned(dt.fixed_offset())
    }

    /// Parses an RFC 3339 timestamp, falling back to the naive formats.
    pub fn parse(input: &str) -> Result<Self, TimeWindowError> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(Self::Zoned(dt));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .map(Self::Naive)
            .ok_or_else(|| TimeWindowError::Unparseable(input.to_string()))
    }

    /// Returns `true` if this timestamp carries no offset.
    pub fn is_naive(&self) -> bool {
        matches!(self, Self::Naive(_))
    }

    /// Returns the zoned datetime, if any.
    pub fn as_zoned(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Zoned(dt) => Some(dt),
            Self::Naive(_) => None,
        }
    }

    fn require_zoned(&self, field: &'static str) -> Result<DateTime<FixedOffset>, TimeWindowError> {
        match self {
            Self::Zoned(dt) => Ok(*dt),
            Self::Naive(naive) => Err(TimeWindowError::NaiveTimestamp {
                field,
                value: naive.to_string(),
            }),
        }
    }
}

impl fmt::Display for EventTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl FromStr for EventTimestamp {
    type Err = TimeWindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for EventTimestamp {
    type Error = TimeWindowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EventTimestamp> for String {
    fn from(value: EventTimestamp) -> Self {
        value.to_string()
    }
}

/// A validated, non-empty time interval.
///
/// Represents the half-open interval `[start, end)`. Instants are stored in
/// UTC so comparisons never depend on the caller's timezone; the offset of
/// the original start time is kept for rendering local wall-clock times.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "WindowRepr", try_from = "WindowRepr")]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    offset: FixedOffset,
}

impl TimeWindow {
    /// Creates a window from two timezone-aware datetimes.
    ///
    /// # Errors
    ///
    /// Returns [`TimeWindowError::EndNotAfterStart`] unless `end > start`.
    pub fn try_new<Tz: TimeZone>(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self, TimeWindowError> {
        let offset = *start.fixed_offset().offset();
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end <= start {
            return Err(TimeWindowError::EndNotAfterStart {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end, offset })
    }

    /// Creates a window from boundary timestamps, rejecting naive values.
    pub fn from_timestamps(start: &EventTimestamp, end: &EventTimestamp) -> Result<Self, TimeWindowError> {
        let start = start.require_zoned("start")?;
        let end = end.require_zoned("end")?;
        Self::try_new(start, end)
    }

    /// Creates a window from a start time and a duration.
    pub fn from_duration<Tz: TimeZone>(start: DateTime<Tz>, duration: Duration) -> Result<Self, TimeWindowError> {
        let end = start
            .clone()
            .checked_add_signed(duration)
            .ok_or_else(|| TimeWindowError::OutOfRange {
                start: start.fixed_offset().to_rfc3339(),
                duration: duration.to_string(),
            })?;
        Self::try_new(start, end)
    }

    /// Start of the window (inclusive), in UTC.
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the window (exclusive), in UTC.
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// The UTC offset the window was created with.
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Start of the window in its original offset.
    pub fn local_start(&self) -> DateTime<FixedOffset> {
        self.start.with_timezone(&self.offset)
    }

    /// End of the window in its original offset.
    pub fn local_end(&self) -> DateTime<FixedOffset> {
        self.end.with_timezone(&self.offset)
    }

    /// Returns the duration of this window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Checks if an instant falls within `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks whether two windows share any instant.
    ///
    /// Windows that merely touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns `true` if the window starts before `now`.
    pub fn starts_before(&self, now: DateTime<Utc>) -> bool {
        self.start < now
    }

    /// Widens the window by `before` at the start and `after` at the end.
    ///
    /// Negative paddings are treated as zero, so the result is never
    /// narrower than `self`.
    pub fn padded(&self, before: Duration, after: Duration) -> Self {
        Self {
            start: self.start - before.max(Duration::zero()),
            end: self.end + after.max(Duration::zero()),
            offset: self.offset,
        }
    }
}

impl PartialEq for TimeWindow {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl Eq for TimeWindow {}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.local_start().format("%Y-%m-%d %H:%M %:z"),
            self.local_end().format("%Y-%m-%d %H:%M %:z")
        )
    }
}

/// Serialized form of a [`TimeWindow`]: local RFC 3339 bounds.
#[derive(Serialize, Deserialize)]
struct WindowRepr {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl From<TimeWindow> for WindowRepr {
    fn from(window: TimeWindow) -> Self {
        Self {
            start: window.local_start(),
            end: window.local_end(),
        }
    }
}

impl TryFrom<WindowRepr> for TimeWindow {
    type Error = TimeWindowError;

    fn try_from(repr: WindowRepr) -> Result<Self, Self::Error> {
        TimeWindow::try_new(repr.start, repr.end)
    }
}

/// Free-function form of [`TimeWindow::overlaps`].
pub fn overlaps(a: &TimeWindow, b: &TimeWindow) -> bool {
    a.overlaps(b)
}
