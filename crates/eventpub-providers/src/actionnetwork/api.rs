//! OSDI event wire types.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{ListingLinks, NewListing};

/// Body of `POST /events`.
#[derive(Debug, Serialize)]
pub(crate) struct OsdiEvent<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub instructions: &'a str,
    pub start_date: String,
    pub end_date: String,
    pub location: OsdiLocation<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OsdiLocation<'a> {
    pub venue: &'a str,
    pub address_lines: Vec<&'a str>,
    pub locality: &'a str,
    pub region: &'a str,
    pub postal_code: &'a str,
    pub country: &'a str,
}

impl<'a> OsdiEvent<'a> {
    /// Builds the request body; dates keep the event's own UTC offset.
    pub fn from_listing(listing: &'a NewListing) -> Self {
        let location = &listing.location;
        Self {
            title: &listing.title,
            description: &listing.description,
            instructions: &listing.instructions,
            start_date: listing
                .window
                .local_start()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            end_date: listing
                .window
                .local_end()
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            location: OsdiLocation {
                venue: &location.name,
                address_lines: vec![location.street_address.as_str()],
                locality: &location.city,
                region: &location.state,
                postal_code: &location.postal_code,
                country: &location.country,
            },
        }
    }
}

/// Response from event creation.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedEvent {
    #[serde(default)]
    pub browser_url: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Links {
    #[serde(rename = "self")]
    pub self_link: Option<Href>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Href {
    pub href: String,
}

impl CreatedEvent {
    /// Extracts the manage and share links; both must be present.
    pub fn into_links(self) -> ProviderResult<ListingLinks> {
        let share_url = self
            .browser_url
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ProviderError::invalid_response("created event has no browser_url"))?;
        let manage_url = self
            .links
            .and_then(|l| l.self_link)
            .map(|h| h.href)
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ProviderError::invalid_response("created event has no self link"))?;
        Ok(ListingLinks {
            manage_url,
            share_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use chrono::{FixedOffset, TimeZone};
    use eventpub_core::{EventLocation, TimeWindow};

    #[test]
    fn request_body_shape() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let listing = NewListing {
            title: "Tenant union meeting".into(),
            window: TimeWindow::try_new(
                tz.with_ymd_and_hms(2025, 6, 10, 18, 30, 0).unwrap(),
                tz.with_ymd_and_hms(2025, 6, 10, 20, 0, 0).unwrap(),
            )
            .unwrap(),
            location: EventLocation::new("Library", "710 W Cesar Chavez St", "Austin", "TX", "78701"),
            description: "Monthly meeting".into(),
            instructions: "Zoom: https://zoom.us/j/1\n\nBring a friend".into(),
        };

        let json = serde_json::to_value(OsdiEvent::from_listing(&listing)).unwrap();
        assert_eq!(json["title"], "Tenant union meeting");
        assert_eq!(json["start_date"], "2025-06-10T18:30:00-05:00");
        assert_eq!(json["end_date"], "2025-06-10T20:00:00-05:00");
        assert_eq!(json["instructions"], "Zoom: https://zoom.us/j/1\n\nBring a friend");
        assert_eq!(json["location"]["venue"], "Library");
        assert_eq!(json["location"]["address_lines"][0], "710 W Cesar Chavez St");
        assert_eq!(json["location"]["region"], "TX");
        assert_eq!(json["location"]["country"], "US");
    }

    #[test]
    fn parse_created_event() {
        let json = r#"{
            "identifiers": ["action_network:1efc3644-af25-4253-90b8-a0baf12dbd1e"],
            "title": "Tenant union meeting",
            "browser_url": "https://actionnetwork.org/events/tenant-union-meeting",
            "_links": {
                "self": {"href": "https://actionnetwork.org/api/v2/events/1efc3644-af25-4253-90b8-a0baf12dbd1e"}
            }
        }"#;
        let links = serde_json::from_str::<CreatedEvent>(json).unwrap().into_links().unwrap();
        assert_eq!(links.share_url, "https://actionnetwork.org/events/tenant-union-meeting");
        assert!(links.manage_url.ends_with("/events/1efc3644-af25-4253-90b8-a0baf12dbd1e"));
    }

    #[test]
    fn missing_links_are_invalid() {
        let created: CreatedEvent = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(created.into_links().unwrap_err().code(), ProviderErrorCode::InvalidResponse);
    }
}
