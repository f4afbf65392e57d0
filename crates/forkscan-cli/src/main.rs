//! CLI entry point.
//!
//! One binary, two roles: without a subcommand it is the coordinator; the
//! hidden `worker` subcommand is what the coordinator spawns per partition.

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use forkscan_cli::{Cli, Commands, handlers};

fn init_tracing() {
    // Stdout carries results (and the worker pipe protocol), so logs go to stderr.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env first so RUST_LOG and FORKSCAN_OUTPUT_DIR can come from it
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            print!("{}", e.render());
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    if let Some(Commands::Worker { index, output }) = &cli.command {
        return match handlers::worker::execute(*index, output.as_deref()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e:#}");
                ExitCode::FAILURE
            }
        };
    }

    match handlers::run::execute(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.shows_usage() => {
            println!("{e}");
            print!("{}", Cli::command().render_usage());
            println!();
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
