//! Publish pipeline settings.

use chrono::Duration;

use eventpub_core::AccountRef;

/// How far either side of the event a video account is searched, in minutes.
pub const DEFAULT_VIDEO_SEARCH_MARGIN_MINUTES: i64 = 180;

/// Gap kept free on the shared calendar around an event, in minutes.
pub const DEFAULT_CALENDAR_BUFFER_MINUTES: i64 = 15;

/// Settings for one [`Publisher`](crate::Publisher).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    /// Video accounts in priority order. The first free one is used.
    pub account_pool: Vec<AccountRef>,
    /// Padding applied to the video search window. Only meetings that
    /// overlap the event itself count as conflicts.
    pub video_search_margin: Duration,
    pub calendar_buffer_before: Duration,
    pub calendar_buffer_after: Duration,
    /// Publish even when the shared calendar has clashing entries.
    pub ignore_resolvable_conflicts: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            account_pool: Vec::new(),
            video_search_margin: Duration::minutes(DEFAULT_VIDEO_SEARCH_MARGIN_MINUTES),
            calendar_buffer_before: Duration::minutes(DEFAULT_CALENDAR_BUFFER_MINUTES),
            calendar_buffer_after: Duration::minutes(DEFAULT_CALENDAR_BUFFER_MINUTES),
            ignore_resolvable_conflicts: false,
        }
    }
}

impl PublishConfig {
    /// Creates a config with default margins for the given pool.
    pub fn new(account_pool: Vec<AccountRef>) -> Self {
        Self {
            account_pool,
            ..Default::default()
        }
    }

    /// Builder: set the video search margin.
    pub fn with_video_search_margin(mut self, margin: Duration) -> Self {
        self.video_search_margin = margin;
        self
    }

    /// Builder: set the calendar buffers.
    pub fn with_calendar_buffers(mut self, before: Duration, after: Duration) -> Self {
        self.calendar_buffer_before = before;
        self.calendar_buffer_after = after;
        self
    }

    /// Builder: publish despite calendar conflicts.
    pub fn with_ignore_resolvable_conflicts(mut self, ignore: bool) -> Self {
        self.ignore_resolvable_conflicts = ignore;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PublishConfig::new(vec![AccountRef::new("u1", "a@example.org")]);
        assert_eq!(config.account_pool.len(), 1);
        assert_eq!(config.video_search_margin, Duration::hours(3));
        assert_eq!(config.calendar_buffer_before, Duration::minutes(15));
        assert_eq!(config.calendar_buffer_after, Duration::minutes(15));
        assert!(!config.ignore_resolvable_conflicts);
    }

    #[test]
    fn builders() {
        let config = PublishConfig::default()
            .with_video_search_margin(Duration::hours(1))
            .with_calendar_buffers(Duration::zero(), Duration::minutes(30))
            .with_ignore_resolvable_conflicts(true);
        assert_eq!(config.video_search_margin, Duration::hours(1));
        assert_eq!(config.calendar_buffer_before, Duration::zero());
        assert_eq!(config.calendar_buffer_after, Duration::minutes(30));
        assert!(config.ignore_resolvable_conflicts);
    }
}
