//! The publish orchestrator.
//!
//! One attempt moves through these states, strictly in order:
//!
//! ```text
//! Validating -> CheckingVideo -> CheckingCalendar -> Publishing -> Published
//!      |              |                 |                  |
//!      v              v                 v                  v
//!    Failed     Unresolvable     ResolvableBlocked       Failed
//! ```
//!
//! Every external call is awaited before the next one starts. Nothing is
//! retried and nothing is rolled back: if a write fails after an earlier
//! write succeeded, the earlier links are reported in the failure.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{Instrument, debug, info, info_span, warn};

use eventpub_core::{AccountRef, CandidateEvent, Conflict, TimeWindow};
use eventpub_providers::{CalendarProvider, ListingProvider, NewCalendarEvent, NewListing, VideoProvider};

use crate::config::PublishConfig;
use crate::error::PublishError;
use crate::outcome::{CheckOutcome, FailureReport, PartialLinks, PublishOutcome, PublishedLinks};
use crate::scanner::find_calendar_conflicts;
use crate::selector::{ensure_not_past, select_available_account};

/// Stages of one publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Validating,
    CheckingVideo,
    CheckingCalendar,
    Publishing,
    Published,
    Unresolvable,
    ResolvableBlocked,
    Failed,
}

impl PublishState {
    /// Returns the state name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::CheckingVideo => "checking_video",
            Self::CheckingCalendar => "checking_calendar",
            Self::Publishing => "publishing",
            Self::Published => "published",
            Self::Unresolvable => "unresolvable",
            Self::ResolvableBlocked => "resolvable_blocked",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Result of the read-only part of an attempt.
enum Preflight {
    Clear {
        account: AccountRef,
        window: TimeWindow,
        overridden: Vec<Conflict>,
    },
    Unresolvable(Vec<Conflict>),
    Resolvable(Vec<Conflict>),
}

impl Preflight {
    /// Blocks on `conflicts`; a single conflict that cannot be overridden
    /// makes the whole set unresolvable.
    fn blocked(conflicts: Vec<Conflict>) -> Self {
        if conflicts.iter().all(|c| c.kind.is_resolvable()) {
            Self::Resolvable(conflicts)
        } else {
            Self::Unresolvable(conflicts)
        }
    }
}

/// Publishes candidate events across the video, listing and calendar
/// providers.
pub struct Publisher {
    video: Arc<dyn VideoProvider>,
    calendar: Arc<dyn CalendarProvider>,
    listing: Arc<dyn ListingProvider>,
    config: PublishConfig,
    clock: Clock,
}

impl Publisher {
    /// Creates a publisher using the system clock.
    pub fn new(
        video: Arc<dyn VideoProvider>,
        calendar: Arc<dyn CalendarProvider>,
        listing: Arc<dyn ListingProvider>,
        config: PublishConfig,
    ) -> Self {
        Self {
            video,
            calendar,
            listing,
            config,
            clock: Box::new(Utc::now),
        }
    }

    /// Builder: replace the clock used to reject events in the past.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Runs one full publish attempt.
    pub async fn publish(&self, event: &CandidateEvent) -> PublishOutcome {
        let span = info_span!("publish", title = %event.title);
        async move {
            let (account, window) = match self.preflight(event).await {
                Ok(Preflight::Clear { account, window, .. }) => (account, window),
                Ok(Preflight::Unresolvable(conflicts)) => {
                    return PublishOutcome::UnresolvableConflict(conflicts);
                }
                Ok(Preflight::Resolvable(conflicts)) => {
                    return PublishOutcome::ResolvableConflict(conflicts);
                }
                Err(err) => {
                    return PublishOutcome::Failed(failed(&err, PartialLinks::default()));
                }
            };

            transition(PublishState::Publishing);
            let mut partial = PartialLinks::default();
            match self.write(event, &account, window, &mut partial).await {
                Ok(links) => {
                    info!(
                        state = %PublishState::Published,
                        account = %account,
                        share_url = %links.listing_share_url,
                        "event published"
                    );
                    PublishOutcome::Published(links)
                }
                Err(err) => PublishOutcome::Failed(failed(&err, partial)),
            }
        }
        .instrument(span)
        .await
    }

    /// Runs every check of [`publish`](Self::publish) without writing.
    pub async fn check(&self, event: &CandidateEvent) -> CheckOutcome {
        let span = info_span!("check", title = %event.title);
        async move {
            match self.preflight(event).await {
                Ok(Preflight::Clear {
                    account, overridden, ..
                }) => {
                    info!(account = %account, "event can be published");
                    CheckOutcome::Clear {
                        account,
                        calendar_conflicts_overridden: overridden,
                    }
                }
                Ok(Preflight::Unresolvable(conflicts)) => CheckOutcome::UnresolvableConflict(conflicts),
                Ok(Preflight::Resolvable(conflicts)) => CheckOutcome::ResolvableConflict(conflicts),
                Err(err) => CheckOutcome::Failed(failed(&err, PartialLinks::default())),
            }
        }
        .instrument(span)
        .await
    }

    async fn preflight(&self, event: &CandidateEvent) -> Result<Preflight, PublishError> {
        transition(PublishState::Validating);
        let window = validate_event(event, (self.clock)())?;

        transition(PublishState::CheckingVideo);
        let selection = select_available_account(
            self.video.as_ref(),
            &self.config.account_pool,
            window,
            (self.clock)(),
            self.config.video_search_margin,
        )
        .await?;

        let account = match selection.selected {
            Some(account) => account,
            None if self.config.account_pool.is_empty() => return Err(PublishError::EmptyAccountPool),
            None => {
                warn!(
                    state = %PublishState::Unresolvable,
                    conflicts = selection.conflicts.len(),
                    "every video account is busy"
                );
                return Ok(Preflight::blocked(selection.conflicts));
            }
        };
        debug!(account = %account, "selected video account");

        transition(PublishState::CheckingCalendar);
        let conflicts = find_calendar_conflicts(
            self.calendar.as_ref(),
            window,
            self.config.calendar_buffer_before,
            self.config.calendar_buffer_after,
        )
        .await?;

        if !conflicts.is_empty() {
            let overridable = conflicts.iter().all(|c| c.kind.is_resolvable());
            if !self.config.ignore_resolvable_conflicts || !overridable {
                warn!(
                    state = %PublishState::ResolvableBlocked,
                    conflicts = conflicts.len(),
                    "shared calendar has conflicting entries"
                );
                return Ok(Preflight::blocked(conflicts));
            }
            warn!(conflicts = conflicts.len(), "overriding calendar conflicts");
        }

        Ok(Preflight::Clear {
            account,
            window,
            overridden: conflicts,
        })
    }

    /// Creates the meeting, the listing and the calendar entry, in that
    /// order, recording each link in `partial` as soon as it exists.
    async fn write(
        &self,
        event: &CandidateEvent,
        account: &AccountRef,
        window: TimeWindow,
        partial: &mut PartialLinks,
    ) -> Result<PublishedLinks, PublishError> {
        let join_url = self.video.create_meeting(account, &event.title, window).await?;
        debug!(join_url = %join_url, "meeting created");
        partial.meeting_join_url = Some(join_url.clone());

        let listing = NewListing {
            title: event.title.clone(),
            window,
            location: event.location.clone(),
            description: event.description.clone(),
            instructions: prepend_link("Zoom", &join_url, &event.instructions),
        };
        let links = self.listing.create_listing(&listing).await?;
        debug!(share_url = %links.share_url, "listing created");
        partial.listing_manage_url = Some(links.manage_url.clone());
        partial.listing_share_url = Some(links.share_url.clone());

        let calendar_event = NewCalendarEvent {
            title: event.title.clone(),
            window,
            description: prepend_link("RSVP", &links.share_url, &event.description),
            location: event.location.one_line(),
        };
        let calendar_url = self.calendar.create_event(&calendar_event).await?;

        Ok(PublishedLinks {
            meeting_join_url: join_url,
            listing_manage_url: links.manage_url,
            listing_share_url: links.share_url,
            calendar_url,
        })
    }
}

/// Checks an event's times without contacting any provider.
///
/// Both bounds must carry a UTC offset, the end must come after the start
/// and the start must not be before `now`. Callers that have to do network
/// work before a [`Publisher`] exists run this first.
pub fn validate_event(event: &CandidateEvent, now: DateTime<Utc>) -> Result<TimeWindow, PublishError> {
    let window = event.window()?;
    ensure_not_past(&window, now)?;
    Ok(window)
}

fn transition(state: PublishState) {
    debug!(state = %state, "publish state");
}

fn failed(err: &PublishError, partial: PartialLinks) -> FailureReport {
    let report = FailureReport::new(err, partial);
    if report.partial.is_empty() {
        warn!(state = %PublishState::Failed, kind = %report.kind, error = %report.message(), "publish failed");
    } else {
        warn!(
            state = %PublishState::Failed,
            kind = %report.kind,
            error = %report.message(),
            partial = ?report.partial,
            "publish failed after creating resources"
        );
    }
    report
}

/// `"<label>: <url>\n\n<text>"`
fn prepend_link(label: &str, url: &str, text: &str) -> String {
    format!("{}: {}\n\n{}", label, url, text)
}
