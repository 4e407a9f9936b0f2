//! Core types: time windows, bookings, conflicts, candidate events, tracing

pub mod event;
pub mod time;
pub mod tracing;

pub use event::{
    AccountRef, Booking, CandidateEvent, Conflict, ConflictKind, EventLocation, overlapping,
};
pub use time::{EventTimestamp, TimeWindow, TimeWindowError, overlaps};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
