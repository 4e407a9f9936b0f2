//! Authentication commands.

use tracing::info;

use eventpub_providers::google::{ConsentFlow, DEFAULT_PORT_RANGE};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Where the printed refresh token is suggested to live.
const PASS_ENTRY: &str = "eventpub/google-refresh-token";

/// Runs the Google consent flow and prints the refresh token.
///
/// Needs `client_id` and `client_secret` in `[google]`; the refresh token is
/// the one value this command produces. It is printed rather than written
/// back so it can go straight into a password store.
pub async fn google(config: &ClientConfig, port: Option<u16>) -> ClientResult<u8> {
    let settings = config.google().map_err(ClientError::Config)?;
    let credentials = settings.credentials().map_err(ClientError::Config)?;
    let flow = ConsentFlow::new(credentials, config.publish.timeout())?;

    println!("A browser window will open to grant access to Google Calendar.");
    println!("If it does not, open the URL printed below instead.");
    println!();

    let port_range = port.map_or(DEFAULT_PORT_RANGE, |p| (p, p));
    let refresh_token = flow.authorize(port_range).await?;
    info!("google consent granted");

    println!();
    print!("{}", render_refresh_token(&refresh_token));
    Ok(0)
}

fn render_refresh_token(refresh_token: &str) -> String {
    format!(
        "Refresh token:\n\n  {token}\n\n\
        Store it, for example with\n\n  \
        pass insert {entry}\n\n\
        and reference it from config.toml:\n\n  \
        [google]\n  \
        refresh_token = \"pass::{entry}\"\n",
        token = refresh_token,
        entry = PASS_ENTRY,
    )
}
