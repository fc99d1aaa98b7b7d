use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "fieldsync")]
#[command(about = "Keep an offline mirror of a health information server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Optional path to the JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a server payload to the local store
    Reconcile {
        /// JSON payload file, `-` for stdin
        payload: PathBuf,
        /// Commit the entities that succeeded even if others fail
        #[arg(long)]
        isolate: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show row counts per table
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List locally authored rows waiting for a push
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record a push outcome or a local edit for one row
    Mark {
        #[arg(value_enum)]
        table: StatefulTable,
        /// Row UID
        uid: String,
        #[arg(value_enum)]
        outcome: MarkOutcome,
    },
    /// Sign in and store the user profile
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,
        /// Server base URL, overrides the configured one
        #[arg(long, value_name = "URL")]
        server: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StatefulTable {
    TrackedEntityInstance,
    Enrollment,
    Event,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum MarkOutcome {
    /// Push succeeded
    Pushed,
    /// Push failed
    Failed,
    /// Edited on this device
    Edited,
}
