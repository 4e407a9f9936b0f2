//! Shared-calendar conflict scanning.

use chrono::Duration;
use tracing::{debug, instrument};

use eventpub_core::{Conflict, TimeWindow};
use eventpub_providers::{CalendarProvider, collect_pages};

use crate::error::PublishError;

/// Returns every calendar entry within the buffered window as a conflict.
///
/// The window is widened by `buffer_before` and `buffer_after`, so an
/// entry that ends ten minutes before the event still counts. Results are
/// not re-filtered against the unbuffered window.
///
/// # Errors
///
/// Returns [`PublishError::Transport`] if any page fails; no partial
/// results are returned.
#[instrument(skip_all, fields(window = %window))]
pub async fn find_calendar_conflicts(
    provider: &dyn CalendarProvider,
    window: TimeWindow,
    buffer_before: Duration,
    buffer_after: Duration,
) -> Result<Vec<Conflict>, PublishError> {
    let search = window.padded(buffer_before, buffer_after);
    let bookings = collect_pages(|token| provider.list_bookings_page(search, token)).await?;

    debug!(count = bookings.len(), "calendar entries in buffered window");
    Ok(bookings.into_iter().map(Conflict::calendar).collect())
}
