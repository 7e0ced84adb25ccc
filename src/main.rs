//! logstream CLI
//!
//! Follows a live log stream and prints each line to stdout.
//! While tailing, type `p` (pause/resume), `c` (clear), `s` (status) or
//! `q` (quit) followed by Enter.

use logstream::cli::{self, apply_overrides, parse_args, EXIT_CONFIG_ERROR, EXIT_FAILURE};
use logstream::config::Config;
use logstream::logging;

fn main() {
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };
    apply_overrides(&mut config, &args);
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(EXIT_CONFIG_ERROR);
    }

    // Guard must outlive the run so buffered file records get flushed
    let log_guard = match logging::init(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_CONFIG_ERROR);
        }
    };

    let code = match cli::run(&args, &config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            EXIT_FAILURE
        }
    };
    drop(log_guard);
    std::process::exit(code);
}
