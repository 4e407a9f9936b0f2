//! Client configuration.
//!
//! All settings live in a single `config.toml`, by default
//! `~/.config/eventpub/config.toml`. Credential values support secret
//! references (see [`crate::secret`]).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use eventpub_core::AccountRef;
use eventpub_providers::ClientCredentials;
use eventpub_providers::actionnetwork::ActionNetworkConfig;
use eventpub_providers::google::GoogleConfig;
use eventpub_providers::zoom::ZoomConfig;
use eventpub_publish::PublishConfig;
use eventpub_publish::config::{DEFAULT_CALENDAR_BUFFER_MINUTES, DEFAULT_VIDEO_SEARCH_MARGIN_MINUTES};

use crate::secret;

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the eventpub client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub zoom: Option<ZoomSettings>,
    pub google: Option<GoogleSettings>,
    pub actionnetwork: Option<ActionNetworkSettings>,
    pub publish: PublishSettings,
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if there is
    /// no file.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eventpub")
            .join("config.toml")
    }

    /// Returns the `[zoom]` section.
    pub fn zoom(&self) -> Result<&ZoomSettings, String> {
        self.zoom.as_ref().ok_or_else(|| missing_section("zoom"))
    }

    /// Returns the `[google]` section.
    pub fn google(&self) -> Result<&GoogleSettings, String> {
        self.google.as_ref().ok_or_else(|| missing_section("google"))
    }

    /// Returns the `[actionnetwork]` section.
    pub fn actionnetwork(&self) -> Result<&ActionNetworkSettings, String> {
        self.actionnetwork
            .as_ref()
            .ok_or_else(|| missing_section("actionnetwork"))
    }
}

fn missing_section(name: &str) -> String {
    format!(
        "the [{}] section is missing from {}",
        name,
        ClientConfig::default_path().display()
    )
}

/// Resolves one credential field, naming it in the error.
fn resolve_field(section: &str, field: &str, value: &str) -> Result<String, String> {
    secret::resolve(value).map_err(|e| format!("failed to resolve {} {}: {}", section, field, e))
}

// ---------------------------------------------------------------------------
// [zoom]
// ---------------------------------------------------------------------------

/// Zoom Server-to-Server OAuth app settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
    /// Preferred accounts by email, in priority order. Empty means every
    /// active user in the order Zoom lists them.
    pub accounts: Vec<String>,
}

impl ZoomSettings {
    /// Resolves secrets and builds the provider configuration.
    pub fn to_provider_config(&self, timeout: Duration) -> Result<ZoomConfig, String> {
        let credentials = ClientCredentials::new(
            resolve_field("zoom", "client_id", &self.client_id)?,
            resolve_field("zoom", "client_secret", &self.client_secret)?,
        );
        let config = ZoomConfig::new(resolve_field("zoom", "account_id", &self.account_id)?, credentials)
            .with_timeout(timeout);
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// [google]
// ---------------------------------------------------------------------------

/// Google Calendar settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    /// Long-lived refresh token with the calendar scope.
    pub refresh_token: String,
    /// The shared calendar conflicts are checked against.
    pub calendar_id: String,
}

impl GoogleSettings {
    /// Resolves the OAuth client id and secret only.
    ///
    /// This is all the consent flow needs, before a refresh token exists.
    pub fn credentials(&self) -> Result<ClientCredentials, String> {
        let credentials = ClientCredentials::new(
            resolve_field("google", "client_id", &self.client_id)?,
            resolve_field("google", "client_secret", &self.client_secret)?,
        );
        credentials.validate().map_err(|e| format!("google {}", e))?;
        Ok(credentials)
    }

    /// Resolves secrets and builds the provider configuration.
    pub fn to_provider_config(&self, timeout: Duration) -> Result<GoogleConfig, String> {
        let config = GoogleConfig::new(
            self.credentials()?,
            resolve_field("google", "refresh_token", &self.refresh_token)?,
            self.calendar_id.clone(),
        )
        .with_timeout(timeout);
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// [actionnetwork]
// ---------------------------------------------------------------------------

/// Action Network settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionNetworkSettings {
    pub api_key: String,
}

impl ActionNetworkSettings {
    /// Resolves secrets and builds the provider configuration.
    pub fn to_provider_config(&self, timeout: Duration) -> Result<ActionNetworkConfig, String> {
        let config = ActionNetworkConfig::new(resolve_field("actionnetwork", "api_key", &self.api_key)?)
            .with_timeout(timeout);
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// [publish]
// ---------------------------------------------------------------------------

/// Conflict-detection margins and request timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    pub video_search_margin_minutes: i64,
    pub calendar_buffer_before_minutes: i64,
    pub calendar_buffer_after_minutes: i64,
    /// HTTP request timeout for every provider.
    pub timeout_seconds: u64,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            video_search_margin_minutes: DEFAULT_VIDEO_SEARCH_MARGIN_MINUTES,
            calendar_buffer_before_minutes: DEFAULT_CALENDAR_BUFFER_MINUTES,
            calendar_buffer_after_minutes: DEFAULT_CALENDAR_BUFFER_MINUTES,
            timeout_seconds: 30,
        }
    }
}

impl PublishSettings {
    /// Returns the HTTP request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Checks that margins are non-negative and the timeout is set.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("video_search_margin_minutes", self.video_search_margin_minutes),
            ("calendar_buffer_before_minutes", self.calendar_buffer_before_minutes),
            ("calendar_buffer_after_minutes", self.calendar_buffer_after_minutes),
        ] {
            if value < 0 {
                return Err(format!("publish {} must not be negative (got {})", name, value));
            }
        }
        if self.timeout_seconds == 0 {
            return Err("publish timeout_seconds must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Builds the pipeline configuration for the given account pool.
    pub fn to_publish_config(&self, account_pool: Vec<AccountRef>) -> PublishConfig {
        PublishConfig::new(account_pool)
            .with_video_search_margin(chrono::Duration::minutes(self.video_search_margin_minutes))
            .with_calendar_buffers(
                chrono::Duration::minutes(self.calendar_buffer_before_minutes),
                chrono::Duration::minutes(self.calendar_buffer_after_minutes),
            )
    }
}
