//! `accounts` command.

use eventpub_publish::resolve_account_pool;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::output;

use super::zoom_provider;

/// Prints the resolved video account pool in priority order.
pub async fn list(config: &ClientConfig, json: bool) -> ClientResult<u8> {
    let provider = zoom_provider(config)?;
    let preferred = &config.zoom().map_err(ClientError::Config)?.accounts;
    let pool = resolve_account_pool(&provider, preferred).await?;

    if json {
        println!("{}", output::to_json(&pool)?);
    } else {
        print!("{}", output::render_accounts(&pool));
    }
    Ok(0)
}
