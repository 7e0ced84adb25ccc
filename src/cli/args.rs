//! CLI argument parsing
//!
//! ```text
//! logstream [--config <path>] [--log-level <filter>] [--json-logs] <command>
//!
//! COMMANDS:
//!   tail [ENDPOINT] [--capacity N]   Follow a log stream (default endpoint from config)
//!   models                           Print the model list
//!   providers                        Print the provider list
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parsed CLI arguments
#[derive(Debug, Clone, PartialEq, Parser)]
#[command(name = "logstream", version, about = "Follow a live log stream")]
pub struct Args {
    /// Config file (overrides $LOGSTREAM_CONFIG and ./logstream.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter for diagnostics, e.g. "debug" or "logstream=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit diagnostics as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI commands
#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Follow a log stream, printing each line to stdout
    Tail {
        /// Push endpoint URL (defaults to stream.endpoint)
        endpoint: Option<String>,

        /// Keep at most N lines in the session buffer
        #[arg(long)]
        capacity: Option<usize>,
    },

    /// Print the model list (GET /api/models)
    Models {
        /// Catalog base URL (defaults to catalog.base_url)
        #[arg(long)]
        base_url: Option<String>,
    },

    /// Print the provider list (GET /api/providers)
    Providers {
        /// Catalog base URL (defaults to catalog.base_url)
        #[arg(long)]
        base_url: Option<String>,
    },
}

impl Args {
    /// Command to run; `tail` with config defaults when none was given
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tail {
            endpoint: None,
            capacity: None,
        })
    }
}

/// Parse CLI arguments
pub fn parse_args<I, T>(args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Args::try_parse_from(args)
}
