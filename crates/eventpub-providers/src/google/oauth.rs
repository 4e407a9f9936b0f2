//! Interactive consent for the Google refresh token.
//!
//! The provider itself only ever refreshes. The refresh token comes from a
//! one-time Authorization Code flow with PKCE (RFC 7636) and a loopback
//! redirect, run by an operator from a desktop session:
//!
//! 1. Generate a code verifier, its SHA-256 challenge and a random state
//! 2. Bind a local listener on the first free port in a range
//! 3. Open the consent page in the browser
//! 4. Wait for Google to redirect back with an authorization code
//! 5. Exchange the code and verifier for tokens, keeping the refresh token

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::config::DEFAULT_TOKEN_URL;
use crate::error::{ProviderError, ProviderResult};
use crate::http::{build_client, read_json, send_error};
use crate::token::ClientCredentials;

const PROVIDER_NAME: &str = "google";

/// Google's consent page.
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Read and write access to calendar events, nothing else.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

/// Ports tried for the loopback redirect.
pub const DEFAULT_PORT_RANGE: (u16, u16) = (8085, 8095);

/// Verifier length in bytes, before encoding.
const CODE_VERIFIER_LENGTH: usize = 32;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Runs the consent flow for one OAuth client.
#[derive(Debug)]
pub struct ConsentFlow {
    credentials: ClientCredentials,
    http: reqwest::Client,
}

impl ConsentFlow {
    /// Creates a flow against the public Google endpoints.
    pub fn new(credentials: ClientCredentials, timeout: Duration) -> ProviderResult<Self> {
        credentials.validate().map_err(|e| {
            ProviderError::configuration(format!("google {}", e)).with_provider(PROVIDER_NAME)
        })?;
        let http = build_client(timeout).map_err(|e| e.with_provider(PROVIDER_NAME))?;
        Ok(Self {
            credentials,
            http,
        })
    }

    /// Asks the operator for consent and returns the refresh token.
    ///
    /// Blocks the calling thread while waiting for the browser redirect,
    /// at most five minutes.
    ///
    /// # Errors
    ///
    /// Fails if no port in `port_range` is free, the operator denies
    /// access, the callback state does not match, or the token endpoint
    /// rejects the code or returns no refresh token.
    pub async fn authorize(&self, port_range: (u16, u16)) -> ProviderResult<String> {
        let pkce = Pkce::new();
        let (listener, port) = bind_loopback(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let consent_url = pkce.consent_url(DEFAULT_AUTH_URL, &self.credentials.client_id, &redirect_uri);

        info!(port, "waiting for google consent");
        debug!(url = %consent_url, "consent url");
        if let Err(e) = open::that(&consent_url) {
            warn!(error = %e, "failed to open browser");
            eprintln!("\nOpen this URL in a browser:\n\n{}\n", consent_url);
        }

        let callback = wait_for_callback(listener, CALLBACK_TIMEOUT)?;
        if callback.state != pkce.state {
            return Err(ProviderError::authentication("consent callback state does not match")
                .with_provider(PROVIDER_NAME));
        }

        self.exchange_code(&callback.code, &pkce.verifier, &redirect_uri).await
    }

    async fn exchange_code(&self, code: &str, verifier: &str, redirect_uri: &str) -> ProviderResult<String> {
        info!("exchanging google authorization code");
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .http
            .post(DEFAULT_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| send_error(e).with_provider(PROVIDER_NAME))?;

        let tokens: CodeResponse = read_json(response)
            .await
            .map_err(|e| e.into_auth_failure().with_provider(PROVIDER_NAME))?;
        tokens.into_refresh_token()
    }
}

/// Token endpoint answer to an authorization code.
#[derive(Debug, Deserialize)]
struct CodeResponse {
    #[serde(default)]
    refresh_token: Option<String>,
}

impl CodeResponse {
    fn into_refresh_token(self) -> ProviderResult<String> {
        // Google omits the refresh token when the client already holds one
        // and consent was not forced.
        self.refresh_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::authentication(
                    "google returned no refresh token; revoke the app's access and try again",
                )
                .with_provider(PROVIDER_NAME)
            })
    }
}

/// PKCE verifier, challenge and CSRF state for one consent attempt.
#[derive(Debug)]
pub struct Pkce {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
}

impl Pkce {
    /// Generates a fresh verifier and state.
    pub fn new() -> Self {
        let verifier_bytes: [u8; CODE_VERIFIER_LENGTH] = rand::random();
        let state_bytes: [u8; 16] = rand::random();
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);
        Self {
            challenge: challenge_for(&verifier),
            verifier,
            state: URL_SAFE_NO_PAD.encode(state_bytes),
        }
    }

    /// Builds the consent page URL.
    ///
    /// `access_type=offline` with `prompt=consent` makes Google issue a
    /// refresh token on every run.
    pub fn consent_url(&self, auth_url: &str, client_id: &str, redirect_uri: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            auth_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(CALENDAR_SCOPE),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for Pkce {
    fn default() -> Self {
        Self::new()
    }
}

/// S256 code challenge for a verifier.
fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Authorization code and state from the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Callback {
    code: String,
    state: String,
}

fn bind_loopback(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
            debug!(port, "bound loopback listener");
            return Ok((listener, port));
        }
    }
    Err(ProviderError::configuration(format!(
        "no free port in {}-{} for the consent redirect",
        port_range.0, port_range.1
    ))
    .with_provider(PROVIDER_NAME))
}

fn wait_for_callback(listener: TcpListener, timeout: Duration) -> ProviderResult<Callback> {
    let (tx, rx) = mpsc::channel();

    let _listener = thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = answer_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "failed to accept consent callback"),
            }
        }
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(ProviderError::authentication(
            "timed out waiting for the consent callback",
        )
        .with_provider(PROVIDER_NAME)),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(ProviderError::authentication(
            "consent callback listener stopped",
        )
        .with_provider(PROVIDER_NAME)),
    }
}

/// Reads one request, answers the browser, and returns the parsed callback.
///
/// Requests for any other path (favicons) yield `None`.
fn answer_callback(mut stream: TcpStream) -> Option<ProviderResult<Callback>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;
    let result = parse_callback(&request_line)?;

    let response = if result.is_ok() {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
        <html><body><h1>Authorized</h1><p>You can close this window.</p></body></html>"
    } else {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
        <html><body><h1>Authorization failed</h1><p>Check the terminal.</p></body></html>"
    };
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
    Some(result)
}

/// Parses `GET /callback?code=..&state=.. HTTP/1.1`.
fn parse_callback(request_line: &str) -> Option<ProviderResult<Callback>> {
    let mut parts = request_line.split_whitespace();
    if parts.next() != Some("GET") {
        return None;
    }
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path != "/callback" {
        return None;
    }

    let mut code = None;
    let mut state = None;
    let mut denied = None;
    for pair in query.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let value = match urlencoding::decode(&value.replace('+', " ")) {
            Ok(value) => value.into_owned(),
            Err(e) => {
                return Some(Err(ProviderError::authentication(format!(
                    "consent callback parameter `{}` is not UTF-8",
                    key
                ))
                .with_provider(PROVIDER_NAME)
                .with_source(e)));
            }
        };
        match key {
            "code" => code = Some(value),
            "state" => state = Some(value),
            "error" => denied = Some(value),
            _ => {}
        }
    }

    let result = match (denied, code) {
        (Some(reason), _) => Err(ProviderError::authentication(format!("consent was denied: {}", reason))),
        (None, Some(code)) => Ok(Callback {
            code,
            state: state.unwrap_or_default(),
        }),
        (None, None) => Err(ProviderError::authentication("consent callback has no authorization code")),
    };
    Some(result.map_err(|e| e.with_provider(PROVIDER_NAME)))
}
