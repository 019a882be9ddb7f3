//! cwrap command line interface
//!
//! Generates C++ wrapper classes from a class table:
//!
//! ```text
//! cwrap generate <table.json> [--config <file.toml>] [--no-exceptions]
//!                             [--no-extensions] [--output <file>]
//! cwrap check <table.json>
//! cwrap help
//! ```

mod check;
mod generate;

use anyhow::{bail, Result};
use std::env;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
cwrap - C++ wrapper generator for handle-based C libraries

USAGE:
    cwrap generate <table.json> [OPTIONS]
    cwrap check <table.json>
    cwrap help

GENERATE OPTIONS:
    -c, --config <file.toml>   Load generation settings
    -o, --output <file>        Write to a file instead of stdout
        --no-exceptions        Report failures through result values
        --no-extensions        Disable extended conveniences

ENVIRONMENT:
    CWRAP_LOG                  Log filter (default: warn)
";

fn main() {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so the generated stream on stdout stays clean
fn init_logging() {
    let filter = EnvFilter::try_from_env("CWRAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &[String]) -> Result<()> {
    let Some((command, rest)) = args.split_first() else {
        print!("{}", USAGE);
        bail!("missing command");
    };

    match command.as_str() {
        "generate" | "gen" => generate::run(rest),
        "check" => check::run(rest),
        "help" | "--help" | "-h" => {
            print!("{}", USAGE);
            Ok(())
        }
        other => bail!("Unknown command: {} (see `cwrap help`)", other),
    }
}
