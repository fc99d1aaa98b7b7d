//! fieldsync CLI - keep an offline mirror of a health information server
//!
//! Applies server payloads to the local store, reports pending local work and
//! signs users in.

mod cli;
mod commands;
mod config;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::login::run_login;
use crate::commands::mark::run_mark;
use crate::commands::pending::run_pending;
use crate::commands::reconcile::run_reconcile;
use crate::commands::status::run_status;
use crate::config::load_settings;
use crate::error::CliError;

const DEFAULT_LOG_FILTER: &str = "fieldsync=info,fieldsync_core=info";

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), cli.db_path)?;

    match cli.command {
        Commands::Reconcile {
            payload,
            isolate,
            json,
        } => run_reconcile(&payload, isolate, json, &settings),
        Commands::Status { json } => run_status(json, &settings),
        Commands::Pending { json } => run_pending(json, &settings),
        Commands::Mark {
            table,
            uid,
            outcome,
        } => run_mark(table, &uid, outcome, &settings),
        Commands::Login { username, server } => {
            run_login(&username, server.as_deref(), &settings)
        }
    }
}
