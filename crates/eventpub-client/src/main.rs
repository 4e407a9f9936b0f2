//! eventpub CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use eventpub_client::cli::{AuthProvider, Cli, Command, ConfigAction};
use eventpub_client::commands;
use eventpub_client::config::ClientConfig;
use eventpub_client::error::{ClientError, ClientResult};
use eventpub_core::tracing::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = if cli.log_json {
        TracingConfig::automation()
    } else if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<u8> {
    let (config, path) = load_config(cli.config)?;

    match cli.command {
        Command::Publish {
            event,
            ignore_resolvable_conflicts,
        } => commands::publish::publish(&config, &event, ignore_resolvable_conflicts, cli.json).await,
        Command::Check {
            event,
            ignore_resolvable_conflicts,
        } => commands::publish::check(&config, &event, ignore_resolvable_conflicts, cli.json).await,
        Command::Accounts => commands::accounts::list(&config, cli.json).await,
        Command::Auth { provider } => match provider {
            AuthProvider::Google { port } => commands::auth::google(&config, port).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => commands::config::dump(&config, &path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&path),
        },
    }
}

/// Loads the explicit config file, or the default one if it exists.
fn load_config(explicit: Option<PathBuf>) -> ClientResult<(ClientConfig, PathBuf)> {
    match explicit {
        Some(path) => {
            let config = ClientConfig::load_from(&path).map_err(ClientError::Config)?;
            Ok((config, path))
        }
        None => {
            let config = ClientConfig::load().map_err(ClientError::Config)?;
            Ok((config, ClientConfig::default_path()))
        }
    }
}
