//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Dumps the current configuration to stdout.
///
/// Secret references are printed as written, never resolved.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<u8> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);
    Ok(0)
}

/// Validates the configuration, resolving every secret reference.
pub fn validate(config: &ClientConfig) -> ClientResult<u8> {
    let report = check_all(config);
    for (section, result) in &report {
        match result {
            Ok(()) => println!("{}: ok", section),
            Err(e) => println!("{}: {}", section, e),
        }
    }

    let failures = report.iter().filter(|(_, r)| r.is_err()).count();
    if failures > 0 {
        return Err(ClientError::Config(format!(
            "{} section(s) failed validation",
            failures
        )));
    }
    for field in plaintext_secrets(config) {
        println!("note: {} is stored in plain text; consider a pass:: or env:: reference", field);
    }
    println!("Configuration is valid.");
    Ok(0)
}

/// Shows the configuration file path.
pub fn path(path: &Path) -> ClientResult<u8> {
    println!("config: {}", path.display());
    Ok(0)
}

/// Checks each section independently so every problem is reported.
fn check_all(config: &ClientConfig) -> Vec<(&'static str, Result<(), String>)> {
    let timeout = config.publish.timeout();
    vec![
        (
            "zoom",
            config
                .zoom()
                .and_then(|s| s.to_provider_config(timeout).map(|_| ())),
        ),
        (
            "google",
            config
                .google()
                .and_then(|s| s.to_provider_config(timeout).map(|_| ())),
        ),
        (
            "actionnetwork",
            config
                .actionnetwork()
                .and_then(|s| s.to_provider_config(timeout).map(|_| ())),
        ),
        ("publish", config.publish.validate()),
    ]
}

/// Lists credential fields written inline instead of as references.
fn plaintext_secrets(config: &ClientConfig) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if let Some(ref zoom) = config.zoom
        && !secret::is_reference(&zoom.client_secret)
    {
        fields.push("zoom.client_secret");
    }
    if let Some(ref google) = config.google {
        if !secret::is_reference(&google.client_secret) {
            fields.push("google.client_secret");
        }
        if !secret::is_reference(&google.refresh_token) {
            fields.push("google.refresh_token");
        }
    }
    if let Some(ref actionnetwork) = config.actionnetwork
        && !secret::is_reference(&actionnetwork.api_key)
    {
        fields.push("actionnetwork.api_key");
    }
    fields
}
