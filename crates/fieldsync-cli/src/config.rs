//! Resolves where the CLI keeps its config file and database.

use std::path::{Path, PathBuf};

use fieldsync_core::EngineConfig;

use crate::error::CliError;

const APP_DIR: &str = "fieldsync";
const CONFIG_FILE_NAME: &str = "config.json";
const DB_FILE_NAME: &str = "fieldsync.db";

/// Effective settings for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_path: PathBuf,
    pub engine: EngineConfig,
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
        .ok_or_else(|| CliError::Config("failed to resolve CLI config directory".to_string()))
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR).join(DB_FILE_NAME))
        .ok_or_else(|| CliError::Config("failed to resolve CLI data directory".to_string()))
}

/// `--config` must exist when given; the platform default may be absent.
pub fn load_engine_config(explicit: Option<&Path>) -> Result<EngineConfig, CliError> {
    let config = match explicit {
        Some(path) if !path.exists() => {
            return Err(CliError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Some(path) => EngineConfig::load_from_path(path)?,
        None => EngineConfig::load_from_path(&default_config_path()?)?,
    };
    Ok(config.from_env()?)
}

/// `--db-path` wins over the config file, which wins over the platform default.
pub fn resolve_db_path(
    cli_db_path: Option<PathBuf>,
    config: &EngineConfig,
) -> Result<PathBuf, CliError> {
    match cli_db_path.or_else(|| config.db_path.clone()) {
        Some(path) => Ok(path),
        None => default_db_path(),
    }
}

pub fn load_settings(
    config_path: Option<&Path>,
    cli_db_path: Option<PathBuf>,
) -> Result<Settings, CliError> {
    let engine = load_engine_config(config_path)?;
    let db_path = resolve_db_path(cli_db_path, &engine)?;
    Ok(Settings { db_path, engine })
}
