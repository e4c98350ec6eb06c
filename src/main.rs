//! artifact-io CLI entry point.
//!
//! ## Subcommands
//!
//! - `inspect <location>` - Load a model and print a summary
//! - `copy <source> <destination>` - Copy a model between locations
//! - `config show|defaults` - Print configuration
//! - `help`, `version`

use std::process::ExitCode;

use artifact_io::cli::{config_cmd, copy_cmd, inspect_cmd, EXIT_FAILURE, EXIT_USAGE};
use artifact_io::config as io_config;
use artifact_io::io;
use artifact_io::telemetry;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    let config = io_config::load();
    if let Err(e) = telemetry::init_logging(&config.log) {
        eprintln!("Logging disabled: {}", e);
    }

    let code = match command {
        "inspect" => match args.get(2) {
            Some(location) => match io::init_global(&config) {
                Ok(registry) => inspect_cmd::run(registry, location).await,
                Err(e) => config_error(&e),
            },
            None => usage_error("inspect requires a <location>"),
        },
        "copy" => match (args.get(2), args.get(3)) {
            (Some(source), Some(destination)) => match io::init_global(&config) {
                Ok(registry) => copy_cmd::run(registry, source, destination).await,
                Err(e) => config_error(&e),
            },
            _ => usage_error("copy requires <source> and <destination>"),
        },
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    config_cmd::run_show();
                    0
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    0
                }
                _ => usage_error(&format!("Unknown config subcommand: {}", subcommand)),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            0
        }
        "version" | "--version" | "-V" => {
            println!("artifact-io {}", env!("CARGO_PKG_VERSION"));
            0
        }
        _ => usage_error(&format!("Unknown command: {}", command)),
    };

    ExitCode::from(code as u8)
}

fn config_error(error: &io::IoError) -> i32 {
    eprintln!("Invalid configuration: {}", error);
    EXIT_FAILURE
}

fn usage_error(message: &str) -> i32 {
    eprintln!("{}", message);
    print_usage();
    EXIT_USAGE
}

fn print_usage() {
    eprintln!(
        "artifact-io v{}

USAGE:
    artifact-io-cli <COMMAND> [ARGS]

COMMANDS:
    inspect <location>             Load a model and print its weights
    copy <source> <destination>    Copy a model between locations
    config show                    Show effective configuration
    config defaults                Show default configuration
    version                        Show version information
    help                           Show this help message

LOCATIONS:
    path/to/model.json             Local manifest (load)
    path/to/dir                    Local directory (save)
    file://...                     Explicit local path
    http://... | https://...       Remote manifest (load only)

ENVIRONMENT:
    ARTIFACT_IO_HTTP_TIMEOUT       Per-request timeout in seconds (0 = none)
    ARTIFACT_IO_USER_AGENT         HTTP user agent
    ARTIFACT_IO_SERVER_RUNTIME     Enable the HTTP backend (default: true)
    ARTIFACT_IO_LOG_LEVEL          Log filter (default: info)
    ARTIFACT_IO_LOG_FORMAT         json | pretty

EXIT CODES:
    0  Success
    1  Operation failed
    2  Usage error
",
        env!("CARGO_PKG_VERSION")
    );
}
