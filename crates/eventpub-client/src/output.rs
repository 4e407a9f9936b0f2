//! Human and JSON rendering of command results.

use std::fmt::Write as _;

use serde::Serialize;

use eventpub_core::{AccountRef, Conflict};
use eventpub_publish::{CheckOutcome, FailureReport, PublishOutcome};

use crate::error::{ClientError, ClientResult};

/// Exit code for a conflict outcome.
pub const EXIT_CONFLICT: u8 = 2;
/// Exit code for a failed attempt.
pub const EXIT_FAILURE: u8 = 1;

/// Maps a publish outcome to the process exit code.
pub fn publish_exit_code(outcome: &PublishOutcome) -> u8 {
    match outcome {
        PublishOutcome::Published(_) => 0,
        PublishOutcome::UnresolvableConflict(_) | PublishOutcome::ResolvableConflict(_) => EXIT_CONFLICT,
        PublishOutcome::Failed(_) => EXIT_FAILURE,
    }
}

/// Maps a check outcome to the process exit code.
pub fn check_exit_code(outcome: &CheckOutcome) -> u8 {
    match outcome {
        CheckOutcome::Clear { .. } => 0,
        CheckOutcome::UnresolvableConflict(_) | CheckOutcome::ResolvableConflict(_) => EXIT_CONFLICT,
        CheckOutcome::Failed(_) => EXIT_FAILURE,
    }
}

/// Serializes any result as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> ClientResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::Usage(format!("failed to serialize output: {}", e)))
}

/// Renders a publish outcome for a terminal.
pub fn render_publish(outcome: &PublishOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", outcome.as_str());
    match outcome {
        PublishOutcome::Published(links) => {
            let _ = writeln!(out, "  meeting:  {}", links.meeting_join_url);
            let _ = writeln!(out, "  rsvp:     {}", links.listing_share_url);
            let _ = writeln!(out, "  manage:   {}", links.listing_manage_url);
            let _ = writeln!(out, "  calendar: {}", links.calendar_url);
        }
        PublishOutcome::UnresolvableConflict(conflicts) => {
            render_conflicts(&mut out, conflicts);
            let _ = writeln!(out, "every video account is busy; pick another time");
        }
        PublishOutcome::ResolvableConflict(conflicts) => {
            render_conflicts(&mut out, conflicts);
            let _ = writeln!(out, "re-run with --ignore-resolvable-conflicts to publish anyway");
        }
        PublishOutcome::Failed(report) => render_failure(&mut out, report),
    }
    out
}

/// Renders a check outcome for a terminal.
pub fn render_check(outcome: &CheckOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", outcome.as_str());
    match outcome {
        CheckOutcome::Clear {
            account,
            calendar_conflicts_overridden,
        } => {
            let _ = writeln!(out, "  account:  {}", account);
            if !calendar_conflicts_overridden.is_empty() {
                let _ = writeln!(out, "overriding calendar conflicts:");
                render_conflicts(&mut out, calendar_conflicts_overridden);
            }
        }
        CheckOutcome::UnresolvableConflict(conflicts) => render_conflicts(&mut out, conflicts),
        CheckOutcome::ResolvableConflict(conflicts) => render_conflicts(&mut out, conflicts),
        CheckOutcome::Failed(report) => render_failure(&mut out, report),
    }
    out
}

/// Renders the account pool, one account per line.
pub fn render_accounts(accounts: &[AccountRef]) -> String {
    if accounts.is_empty() {
        return "no active video accounts\n".to_string();
    }
    let mut out = String::new();
    for (i, account) in accounts.iter().enumerate() {
        let _ = writeln!(out, "{}. {} ({})", i + 1, account.email, account.id);
    }
    out
}

fn render_conflicts(out: &mut String, conflicts: &[Conflict]) {
    for conflict in conflicts {
        let _ = writeln!(out, "  {}", conflict);
    }
}

fn render_failure(out: &mut String, report: &FailureReport) {
    let mut chain = report.chain.iter();
    if let Some(first) = chain.next() {
        let _ = writeln!(out, "  error: {} ({})", first, report.kind);
    }
    for cause in chain {
        let _ = writeln!(out, "  caused by: {}", cause);
    }
    if report.retryable {
        let _ = writeln!(out, "  the failure looks temporary; retrying later may succeed");
    }
    if !report.partial.is_empty() {
        let _ = writeln!(out, "already created (not rolled back):");
        if let Some(ref url) = report.partial.meeting_join_url {
            let _ = writeln!(out, "  meeting:  {}", url);
        }
        if let Some(ref url) = report.partial.listing_share_url {
            let _ = writeln!(out, "  rsvp:     {}", url);
        }
        if let Some(ref url) = report.partial.listing_manage_url {
            let _ = writeln!(out, "  manage:   {}", url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use eventpub_core::{Booking, TimeWindow};
    use eventpub_providers::ProviderError;
    use eventpub_publish::{PartialLinks, PublishError, PublishedLinks};

    fn window(h1: u32, h2: u32) -> TimeWindow {
        TimeWindow::try_new(
            Utc.with_ymd_and_hms(2025, 3, 1, h1, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 1, h2, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn links() -> PublishedLinks {
        PublishedLinks {
            meeting_join_url: "https://zoom.us/j/123".into(),
            listing_manage_url: "https://actionnetwork.org/api/v2/events/abc".into(),
            listing_share_url: "https://actionnetwork.org/events/canvass".into(),
            calendar_url: "https://www.google.com/calendar/event?eid=xyz".into(),
        }
    }

    #[test]
    fn published() {
        let outcome = PublishOutcome::Published(links());
        insta::assert_snapshot!(render_publish(&outcome), @r"
        PUBLISHED
          meeting:  https://zoom.us/j/123
          rsvp:     https://actionnetwork.org/events/canvass
          manage:   https://actionnetwork.org/api/v2/events/abc
          calendar: https://www.google.com/calendar/event?eid=xyz
        ");
        assert_eq!(publish_exit_code(&outcome), 0);
    }

    #[test]
    fn unresolvable() {
        let outcome = PublishOutcome::UnresolvableConflict(vec![
            Conflict::video(Booking::new("Steering", window(10, 11)).with_owner("a@example.org")),
            Conflict::video(Booking::new("Training", window(9, 12)).with_owner("b@example.org")),
        ]);
        insta::assert_snapshot!(render_publish(&outcome), @r"
        UNRESOLVABLE_CONFLICT
          [video] Steering (2025-03-01 10:00 +00:00 to 2025-03-01 11:00 +00:00) on a@example.org
          [video] Training (2025-03-01 09:00 +00:00 to 2025-03-01 12:00 +00:00) on b@example.org
        every video account is busy; pick another time
        ");
        assert_eq!(publish_exit_code(&outcome), EXIT_CONFLICT);
    }

    #[test]
    fn resolvable() {
        let outcome = PublishOutcome::ResolvableConflict(vec![Conflict::calendar(Booking::new(
            "Phone bank",
            window(11, 13),
        ))]);
        insta::assert_snapshot!(render_publish(&outcome), @r"
        RESOLVABLE_CONFLICT
          [calendar] Phone bank (2025-03-01 11:00 +00:00 to 2025-03-01 13:00 +00:00)
        re-run with --ignore-resolvable-conflicts to publish anyway
        ");
        assert_eq!(publish_exit_code(&outcome), EXIT_CONFLICT);
    }

    #[test]
    fn failed_with_partial_links() {
        let err = PublishError::from(ProviderError::from_http_status(503, "", None).with_provider("actionnetwork"));
        let partial = PartialLinks {
            meeting_join_url: Some("https://zoom.us/j/123".into()),
            ..Default::default()
        };
        let outcome = PublishOutcome::Failed(FailureReport::new(&err, partial));
        insta::assert_snapshot!(render_publish(&outcome), @r"
        FAILED
          error: provider call failed (transport)
          caused by: [actionnetwork] server_error: HTTP 503
          the failure looks temporary; retrying later may succeed
        already created (not rolled back):
          meeting:  https://zoom.us/j/123
        ");
        assert_eq!(publish_exit_code(&outcome), EXIT_FAILURE);
    }

    #[test]
    fn check_clear_with_overrides() {
        let outcome = CheckOutcome::Clear {
            account: AccountRef::new("u2", "b@example.org"),
            calendar_conflicts_overridden: vec![Conflict::calendar(Booking::new("Setup", window(9, 10)))],
        };
        insta::assert_snapshot!(render_check(&outcome), @r"
        CLEAR
          account:  b@example.org
        overriding calendar conflicts:
          [calendar] Setup (2025-03-01 09:00 +00:00 to 2025-03-01 10:00 +00:00)
        ");
        assert_eq!(check_exit_code(&outcome), 0);
    }

    #[test]
    fn accounts() {
        let accounts = vec![
            AccountRef::new("u1", "events@example.org"),
            AccountRef::new("u2", "events2@example.org"),
        ];
        insta::assert_snapshot!(render_accounts(&accounts), @r"
        1. events@example.org (u1)
        2. events2@example.org (u2)
        ");
        assert_eq!(render_accounts(&[]), "no active video accounts\n");
    }

    #[test]
    fn json_output() {
        let json = to_json(&PublishOutcome::Published(links())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["outcome"], "PUBLISHED");
        assert_eq!(value["detail"]["meeting_join_url"], "https://zoom.us/j/123");
    }
}
