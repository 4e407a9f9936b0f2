//! The eventpub publish pipeline.
//!
//! Given a [`CandidateEvent`](eventpub_core::CandidateEvent), the
//! [`Publisher`] picks a free video account, scans the shared calendar for
//! clashes, and, when clear, creates the meeting, the public listing and
//! the calendar entry in that order. Every attempt ends in exactly one
//! [`PublishOutcome`].

pub mod config;
pub mod error;
pub mod outcome;
pub mod pool;
pub mod publisher;
pub mod scanner;
pub mod selector;

#[cfg(test)]
mod fakes;

pub use config::PublishConfig;
pub use error::{FailureKind, PublishError};
pub use outcome::{CheckOutcome, FailureReport, PartialLinks, PublishOutcome, PublishedLinks};
pub use pool::resolve_account_pool;
pub use publisher::{PublishState, Publisher, validate_event};
pub use scanner::find_calendar_conflicts;
pub use selector::{AccountSelection, select_available_account};
