//! Video-account selection.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument};

use eventpub_core::{AccountRef, Conflict, TimeWindow, overlapping};
use eventpub_providers::{VideoProvider, collect_pages};

use crate::error::PublishError;

/// Result of scanning the account pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSelection {
    /// The first account without conflicts, if any.
    pub selected: Option<AccountRef>,
    /// Conflicts found on accounts checked before the selected one. Empty
    /// when an account was selected.
    pub conflicts: Vec<Conflict>,
}

/// Picks the first account in `pool` with no meeting overlapping `window`.
///
/// Meetings are fetched over `window` widened by `margin` on both sides,
/// then filtered against the unwidened window. Accounts are checked one at
/// a time in pool order and the scan stops at the first free account.
///
/// An empty pool yields no selection and no conflicts.
///
/// # Errors
///
/// - [`PublishError::Validation`] if `window` starts before `now`; no
///   provider call is made
/// - [`PublishError::Transport`] if any listing call fails. An account
///   whose meetings cannot be read is never treated as free.
#[instrument(skip_all, fields(pool = pool.len(), window = %window))]
pub async fn select_available_account(
    provider: &dyn VideoProvider,
    pool: &[AccountRef],
    window: TimeWindow,
    now: DateTime<Utc>,
    margin: Duration,
) -> Result<AccountSelection, PublishError> {
    ensure_not_past(&window, now)?;

    let search = window.padded(margin, margin);
    let mut conflicts = Vec::new();

    for account in pool {
        let bookings = collect_pages(|token| provider.list_bookings_page(account, search, token)).await?;

        let found: Vec<Conflict> = overlapping(&window, &bookings)
            .map(|booking| Conflict::video(booking.clone().with_owner(account.email.clone())))
            .collect();

        if found.is_empty() {
            debug!(account = %account, "account is free");
            return Ok(AccountSelection {
                selected: Some(account.clone()),
                conflicts: Vec::new(),
            });
        }

        debug!(account = %account, conflicts = found.len(), "account is busy");
        conflicts.extend(found);
    }

    Ok(AccountSelection {
        selected: None,
        conflicts,
    })
}

/// Rejects a window that starts before `now`.
pub(crate) fn ensure_not_past(window: &TimeWindow, now: DateTime<Utc>) -> Result<(), PublishError> {
    if window.starts_before(now) {
        return Err(PublishError::validation(format!(
            "event starts in the past ({} is before {})",
            window.local_start().to_rfc3339(),
            now.to_rfc3339()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::fakes::{FakeVideo, at, window};
    use eventpub_core::Booking;
    use eventpub_providers::ProviderErrorCode;

    fn pool() -> Vec<AccountRef> {
        vec![
            AccountRef::new("ua", "a@example.org"),
            AccountRef::new("ub", "b@example.org"),
            AccountRef::new("uc", "c@example.org"),
        ]
    }

    fn margin() -> Duration {
        Duration::hours(3)
    }

    #[tokio::test]
    async fn first_free_account_wins_and_discards_earlier_conflicts() {
        let video = FakeVideo::new()
            .with_booking("ua", Booking::new("Steering", window(10, 30, 11, 30)))
            .with_booking("uc", Booking::new("Other", window(8, 0, 9, 0)));

        let selection = select_available_account(&video, &pool(), window(10, 0, 12, 0), at(0, 0), margin())
            .await
            .unwrap();

        assert_eq!(selection.selected, Some(AccountRef::new("ub", "b@example.org")));
        assert!(selection.conflicts.is_empty());
        assert_eq!(video.listed_accounts(), vec!["ua", "ub"]);
    }

    #[tokio::test]
    async fn all_accounts_busy_reports_every_conflict() {
        let video = FakeVideo::new()
            .with_booking("ua", Booking::new("A1", window(10, 0, 10, 30)))
            .with_booking("ua", Booking::new("A2", window(11, 0, 11, 30)))
            .with_booking("ub", Booking::new("B1", window(9, 0, 13, 0)))
            .with_booking("uc", Booking::new("C1", window(11, 59, 12, 30)));

        let selection = select_available_account(&video, &pool(), window(10, 0, 12, 0), at(0, 0), margin())
            .await
            .unwrap();

        assert!(selection.selected.is_none());
        let owners: Vec<_> = selection
            .conflicts
            .iter()
            .map(|c| (c.booking.title.as_str(), c.booking.owner.as_deref().unwrap()))
            .collect();
        assert_eq!(
            owners,
            vec![
                ("A1", "a@example.org"),
                ("A2", "a@example.org"),
                ("B1", "b@example.org"),
                ("C1", "c@example.org"),
            ]
        );
        assert!(selection.conflicts.iter().all(|c| c.kind == eventpub_core::ConflictKind::Video));
    }

    #[tokio::test]
    async fn meetings_inside_the_margin_do_not_conflict() {
        let video = FakeVideo::new()
            .with_booking("ua", Booking::new("Before", window(8, 0, 10, 0)))
            .with_booking("ua", Booking::new("After", window(12, 0, 13, 0)));

        let selection = select_available_account(&video, &pool(), window(10, 0, 12, 0), at(0, 0), margin())
            .await
            .unwrap();

        assert_eq!(selection.selected.unwrap().id, "ua");
        // The search itself still covered the padded window.
        assert_eq!(video.searched_windows()[0], window(7, 0, 15, 0));
    }

    #[tokio::test]
    async fn pagination_is_drained_before_deciding() {
        let video = FakeVideo::new()
            .with_page_size(1)
            .with_booking("ua", Booking::new("p1", window(7, 0, 7, 30)))
            .with_booking("ua", Booking::new("p2", window(8, 0, 8, 30)))
            .with_booking("ua", Booking::new("p3", window(11, 0, 11, 30)));

        let selection = select_available_account(&video, &pool(), window(10, 0, 12, 0), at(0, 0), margin())
            .await
            .unwrap();

        assert_eq!(selection.selected.unwrap().id, "ub");
        assert_eq!(video.listed_accounts(), vec!["ua", "ua", "ua", "ub"]);
    }

    #[tokio::test]
    async fn empty_pool_selects_nothing() {
        let video = FakeVideo::new();
        let selection = select_available_account(&video, &[], window(10, 0, 12, 0), at(0, 0), margin())
            .await
            .unwrap();
        assert!(selection.selected.is_none());
        assert!(selection.conflicts.is_empty());
    }

    #[tokio::test]
    async fn start_in_the_past_is_rejected_before_any_call() {
        let video = FakeVideo::new();
        let err = select_available_account(&video, &pool(), window(10, 0, 12, 0), at(10, 1), margin())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Validation);
        assert!(err.to_string().contains("in the past"));
        assert!(video.listed_accounts().is_empty());
    }

    #[tokio::test]
    async fn listing_failure_fails_closed() {
        let video = FakeVideo::new().failing_list_for("ub", ProviderErrorCode::ServerError);

        let selection = select_available_account(&video, &pool(), window(10, 0, 12, 0), at(0, 0), margin())
            .await
            .unwrap();
        // ua is free, so ub is never asked.
        assert_eq!(selection.selected.unwrap().id, "ua");

        let video = FakeVideo::new()
            .with_booking("ua", Booking::new("busy", window(10, 0, 11, 0)))
            .failing_list_for("ub", ProviderErrorCode::ServerError);
        let err = select_available_account(&video, &pool(), window(10, 0, 12, 0), at(0, 0), margin())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(video.listed_accounts(), vec!["ua", "ub"]);
    }
}
