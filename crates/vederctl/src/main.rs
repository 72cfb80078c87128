//! Veder control - command-line front end for the research engine.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use veder_common::Config;
use veder_shared::VederError;
use vederctl::cli::{Cli, Commands};
use vederctl::commands;

/// Exit status for model output that could not be repaired
const EXIT_MALFORMED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:#}", e);
            match e.downcast_ref::<VederError>() {
                Some(VederError::MalformedResponse { .. }) => ExitCode::from(EXIT_MALFORMED),
                // Query failures were already reported by the command
                Some(VederError::EmptyResponse) | Some(VederError::Service(_)) => ExitCode::FAILURE,
                _ => {
                    eprintln!("Error: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// Logs go to stderr so stdout stays clean JSON
fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let default_language = config.output.language;

    match cli.command {
        Commands::Report { query, lang, json } => {
            commands::report(config, &query, lang.unwrap_or(default_language), json).await
        }
        Commands::Market { lang } => commands::market(config, lang.unwrap_or(default_language)).await,
        Commands::Repair { file, lang } => {
            commands::repair(file.as_deref(), lang.unwrap_or(default_language))
        }
    }
}
