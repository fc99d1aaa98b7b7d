use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] fieldsync_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("No password provided. Set FIELDSYNC_PASSWORD or pipe it on stdin.")]
    MissingPassword,
    #[error("Server rejected the credentials ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("{0} entity failure(s) during reconciliation")]
    EntityFailures(usize),
}
