//! Hubmail CLI entrypoint: export GitHub threads as an mbox stream.

use std::io::{self, Write};
use std::process::ExitCode;

use hubmail::config::expand_bare_wrap;
use hubmail::{HubmailConfig, HubmailError};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            writeln!(io::stderr().lock(), "hubmail: {error}").ok();
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), HubmailError> {
    let config = load_config()?;
    cli::export::run(&config).await
}

/// Logs go to stderr so stdout carries nothing but mbox data.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`HubmailError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<HubmailConfig, HubmailError> {
    let args = expand_bare_wrap(std::env::args_os());
    HubmailConfig::load_from_iter(args).map_err(|error| HubmailError::Configuration {
        message: error.to_string(),
    })
}
