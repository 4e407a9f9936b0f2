//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use eventpub_core::{CandidateEvent, EventLocation, EventTimestamp};

use crate::error::{ClientError, ClientResult};

/// eventpub - publish events without double-booking
#[derive(Debug, Parser)]
#[command(name = "eventpub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "EVENTPUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Write logs as JSON lines at info level, for scheduled runs
    #[arg(long, global = true, conflicts_with = "debug")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check for conflicts, then create the meeting, listing and calendar entry
    Publish {
        #[command(flatten)]
        event: EventArgs,

        /// Publish even if the shared calendar has conflicting entries
        #[arg(long)]
        ignore_resolvable_conflicts: bool,
    },

    /// Run every conflict check without creating anything
    Check {
        #[command(flatten)]
        event: EventArgs,

        /// Report calendar conflicts as overridable instead of blocking
        #[arg(long)]
        ignore_resolvable_conflicts: bool,
    },

    /// List the video account pool in priority order
    Accounts,

    /// Obtain provider credentials interactively
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Providers with an interactive sign-in.
#[derive(Debug, Subcommand)]
pub enum AuthProvider {
    /// Grant calendar access in a browser and print the refresh token
    Google {
        /// Loopback port for the consent redirect (default: first free in 8085-8095)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration and resolve every secret
    Validate,

    /// Show configuration file path
    Path,
}

/// The event to publish, from flags or from a TOML file.
#[derive(Debug, Clone, Default, Args)]
pub struct EventArgs {
    /// Read the event from a TOML file instead of flags
    #[arg(long, conflicts_with_all = ["title", "start", "end"])]
    pub event_file: Option<PathBuf>,

    /// Event title
    #[arg(long)]
    pub title: Option<String>,

    /// Start time with UTC offset, e.g. 2025-03-01T10:00:00-06:00
    #[arg(long)]
    pub start: Option<String>,

    /// End time with UTC offset
    #[arg(long)]
    pub end: Option<String>,

    /// Venue name
    #[arg(long)]
    pub location_name: Option<String>,

    /// Street address
    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    /// State or region code
    #[arg(long)]
    pub state: Option<String>,

    /// Postal code
    #[arg(long)]
    pub zip: Option<String>,

    /// Country code
    #[arg(long, default_value = "US")]
    pub country: String,

    /// Event description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Instructions for attendees; the meeting link is added in front
    #[arg(long, default_value = "")]
    pub instructions: String,
}

impl EventArgs {
    /// Builds the candidate event.
    pub fn to_event(&self) -> ClientResult<CandidateEvent> {
        if let Some(ref path) = self.event_file {
            let content = std::fs::read_to_string(path).map_err(|e| {
                ClientError::Usage(format!("failed to read event file {}: {}", path.display(), e))
            })?;
            return parse_event_file(&content);
        }

        let location = EventLocation::new(
            required(&self.location_name, "--location-name")?,
            required(&self.street, "--street")?,
            required(&self.city, "--city")?,
            required(&self.state, "--state")?,
            required(&self.zip, "--zip")?,
        )
        .with_country(self.country.clone());

        Ok(CandidateEvent::new(
            required(&self.title, "--title")?,
            timestamp(&required(&self.start, "--start")?)?,
            timestamp(&required(&self.end, "--end")?)?,
            location,
        )
        .with_description(self.description.clone())
        .with_instructions(self.instructions.clone()))
    }
}

/// Parses an event file.
///
/// ```toml
/// title = "Tenant union meeting"
/// start = "2025-03-01T18:30:00-06:00"
/// end = "2025-03-01T20:00:00-06:00"
/// description = "Monthly meeting"
///
/// [location]
/// name = "Library"
/// street_address = "710 W Cesar Chavez St"
/// city = "Austin"
/// state = "TX"
/// postal_code = "78701"
/// ```
pub fn parse_event_file(content: &str) -> ClientResult<CandidateEvent> {
    toml::from_str(content).map_err(|e| ClientError::Usage(format!("invalid event file: {}", e)))
}

fn required(value: &Option<String>, flag: &str) -> ClientResult<String> {
    value
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ClientError::Usage(format!("{} is required unless --event-file is given", flag)))
}

fn timestamp(value: &str) -> ClientResult<EventTimestamp> {
    EventTimestamp::parse(value).map_err(|e| ClientError::Usage(e.to_string()))
}
