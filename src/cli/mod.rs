//! CLI module
//!
//! Provides:
//! - Argument parsing
//! - Command dispatch (tail, models, providers)
//! - The interactive tail loop

pub mod args;
pub mod tail;

// Re-exports
pub use args::{parse_args, Args, Command};
pub use tail::{parse_control, run_tail, spawn_control_reader, Control, TailOutcome};

use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::catalog::{CatalogClient, Fetched};
use crate::config::Config;
use crate::session::LogStreamSession;
use crate::stream::HttpTransport;

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Apply command-line overrides on top of the loaded config
pub fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(ref level) = args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.json = true;
    }
    match args.command {
        Some(Command::Tail {
            ref endpoint,
            capacity,
        }) => {
            if let Some(endpoint) = endpoint {
                config.stream.endpoint = endpoint.clone();
            }
            if capacity.is_some() {
                config.stream.capacity = capacity;
            }
        }
        Some(Command::Models { ref base_url }) | Some(Command::Providers { ref base_url }) => {
            if let Some(base_url) = base_url {
                config.catalog.base_url = base_url.clone();
            }
        }
        None => {}
    }
}

/// Run the selected command; returns the process exit code
pub fn run(args: &Args, config: &Config) -> Result<i32> {
    match args.command_or_default() {
        Command::Tail { .. } => run_tail_command(config),
        Command::Models { .. } => {
            let client = catalog_client(config);
            info!(base_url = client.base_url(), "fetching models");
            print_fetched(&client.models())
        }
        Command::Providers { .. } => {
            let client = catalog_client(config);
            info!(base_url = client.base_url(), "fetching providers");
            print_fetched(&client.providers())
        }
    }
}

fn run_tail_command(config: &Config) -> Result<i32> {
    let transport = HttpTransport::with_timeouts(config.http_timeouts());
    let mut session = LogStreamSession::new(config.stream.endpoint.clone(), transport)
        .with_capacity(config.stream.capacity);

    info!(endpoint = %session.endpoint(), "following log stream");
    if let Err(e) = session.open() {
        eprintln!("Error: {}", e);
        session.close();
        return Ok(EXIT_FAILURE);
    }

    let controls = spawn_control_reader();
    let stdout = io::stdout();
    let stderr = io::stderr();
    let outcome = run_tail(
        &mut session,
        &controls,
        &mut stdout.lock(),
        &mut stderr.lock(),
        tail::POLL_INTERVAL,
    )
    .context("writing log lines")?;

    info!(
        status = %outcome.final_status,
        lines = outcome.lines_printed,
        "log stream session finished"
    );
    Ok(outcome.exit_code())
}

fn catalog_client(config: &Config) -> CatalogClient {
    let transport = HttpTransport::with_timeouts(config.http_timeouts());
    CatalogClient::new(config.catalog.base_url.clone(), transport)
}

fn print_fetched(fetched: &Fetched) -> Result<i32> {
    if let Some(ref err) = fetched.error {
        eprintln!("Error: {}", err);
        return Ok(EXIT_FAILURE);
    }
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &fetched.data).context("writing JSON")?;
    writeln!(stdout)?;
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_for_tail() {
        let args = parse_args([
            "logstream",
            "--log-level",
            "debug",
            "tail",
            "http://h/stream",
            "--capacity",
            "10",
        ])
        .unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.stream.endpoint, "http://h/stream");
        assert_eq!(config.stream.capacity, Some(10));
    }

    #[test]
    fn test_overrides_keep_config_when_flags_absent() {
        let args = parse_args(["logstream", "tail"]).unwrap();
        let mut config = Config::default();
        config.stream.capacity = Some(42);
        apply_overrides(&mut config, &args);
        assert_eq!(config.stream.capacity, Some(42));
        assert_eq!(config.stream.endpoint, Config::default().stream.endpoint);
    }

    #[test]
    fn test_overrides_for_catalog() {
        let args = parse_args(["logstream", "providers", "--base-url", "http://cat"]).unwrap();
        let mut config = Config::default();
        apply_overrides(&mut config, &args);
        assert_eq!(config.catalog.base_url, "http://cat");
    }
}
