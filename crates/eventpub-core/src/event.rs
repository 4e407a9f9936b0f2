//! Bookings, conflicts and the events being published.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::time::{EventTimestamp, TimeWindow};

/// An existing reservation on some resource.
///
/// Bookings are read-only snapshots of what an external system reported at
/// query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Title of the reservation as reported by the provider.
    pub title: String,
    /// When the reservation takes place.
    pub window: TimeWindow,
    /// The resource owner: the video account's email for meetings, `None`
    /// for calendar entries.
    pub owner: Option<String>,
}

impl Booking {
    /// Creates a booking without an owner.
    pub fn new(title: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            title: title.into(),
            window,
            owner: None,
        }
    }

    /// Builder method to set the owner.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Checks whether this booking overlaps the given window.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        self.window.overlaps(window)
    }
}

/// Returns the bookings that overlap `window`, in their original order.
pub fn overlapping<'a>(
    window: &'a TimeWindow,
    bookings: &'a [Booking],
) -> impl Iterator<Item = &'a Booking> + 'a {
    bookings.iter().filter(move |booking| booking.overlaps(window))
}

/// Where a conflict was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// A meeting on a video account: can never be overridden.
    Video,
    /// An entry on the shared calendar: may be overridden by a human.
    Calendar,
}

impl ConflictKind {
    /// Returns `true` if a caller may choose to publish despite this conflict.
    pub fn is_resolvable(&self) -> bool {
        matches!(self, Self::Calendar)
    }

    /// Returns a short name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Calendar => "calendar",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booking that blocks publication of a candidate event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Which system reported the booking.
    pub kind: ConflictKind,
    /// The blocking booking.
    pub booking: Booking,
}

impl Conflict {
    /// Creates a video conflict.
    pub fn video(booking: Booking) -> Self {
        Self {
            kind: ConflictKind::Video,
            booking,
        }
    }

    /// Creates a calendar conflict.
    pub fn calendar(booking: Booking) -> Self {
        Self {
            kind: ConflictKind::Calendar,
            booking,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.kind, self.booking.title, self.booking.window)?;
        if let Some(ref owner) = self.booking.owner {
            write!(f, " on {}", owner)?;
        }
        Ok(())
    }
}

/// Identity of one video-conferencing account in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    /// Provider-side user identifier.
    pub id: String,
    /// Login email; used to label conflicts.
    pub email: String,
}

impl AccountRef {
    /// Creates a new account reference.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for AccountRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Physical location of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLocation {
    /// Venue name, e.g. "Radio Coffee".
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_country() -> String {
    "US".to_string()
}

impl EventLocation {
    /// Creates a location in the default country.
    pub fn new(
        name: impl Into<String>,
        street_address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            street_address: street_address.into(),
            city: city.into(),
            state: state.into(),
            postal_code: postal_code.into(),
            country: default_country(),
        }
    }

    /// Builder method to set the country code.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Renders the address on one line: `street, city, state zip`.
    pub fn one_line(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street_address, self.city, self.state, self.postal_code
        )
    }
}

/// An event a caller wants to publish.
///
/// Timestamps are kept as supplied; validation into a [`TimeWindow`]
/// happens when the event is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEvent {
    pub title: String,
    pub start: EventTimestamp,
    pub end: EventTimestamp,
    pub location: EventLocation,
    #[serde(default)]
    pub description: String,
    /// Attendee instructions; the meeting join link is prepended on publish.
    #[serde(default)]
    pub instructions: String,
}

impl CandidateEvent {
    /// Creates a candidate event with empty description and instructions.
    pub fn new(
        title: impl Into<String>,
        start: EventTimestamp,
        end: EventTimestamp,
        location: EventLocation,
    ) -> Self {
        Self {
            title: title.into(),
            start,
            end,
            location,
            description: String::new(),
            instructions: String::new(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder method to set the instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Validates the timestamps into a window.
    pub fn window(&self) -> Result<TimeWindow, crate::time::TimeWindowError> {
        TimeWindow::from_timestamps(&self.start, &self.end)
    }
}
