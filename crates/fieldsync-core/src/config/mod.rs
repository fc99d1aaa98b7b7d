//! Engine configuration.
//!
//! Read from a JSON file, then overlaid with `FIELDSYNC_*` environment
//! variables. Passwords never live here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::normalize_server_url;
use crate::error::{Error, Result};
use crate::sync::FailurePolicy;

pub const DB_PATH_ENV: &str = "FIELDSYNC_DB_PATH";
pub const SERVER_URL_ENV: &str = "FIELDSYNC_SERVER_URL";
pub const FAILURE_POLICY_ENV: &str = "FIELDSYNC_FAILURE_POLICY";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Local database file; callers pick a platform default when unset
    #[serde(default)]
    pub db_path: Option<PathBuf>,
    /// Server base URL, without the `/api` suffix
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl EngineConfig {
    /// Parse a JSON config file. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
            .map_err(|error| Error::Config(format!("{}: {error}", path.display())))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|error| Error::Config(format!("invalid config JSON: {error}")))?;
        config.validated()
    }

    /// Overlay values from the process environment.
    pub fn from_env(self) -> Result<Self> {
        self.overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; blank values are ignored.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(path) = non_blank(lookup(DB_PATH_ENV)) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(url) = non_blank(lookup(SERVER_URL_ENV)) {
            self.server_url = Some(url);
        }
        if let Some(policy) = non_blank(lookup(FAILURE_POLICY_ENV)) {
            self.failure_policy = policy.parse()?;
        }
        self.validated()
    }

    /// Server URL, normalized; `Error::Config` when none is configured.
    pub fn require_server_url(&self) -> Result<String> {
        let url = self
            .server_url
            .as_deref()
            .ok_or_else(|| Error::Config(format!("no server URL configured (set {SERVER_URL_ENV})")))?;
        normalize_server_url(url)
    }

    fn validated(mut self) -> Result<Self> {
        self.server_url = non_blank(self.server_url)
            .map(|url| normalize_server_url(&url))
            .transpose()?;
        Ok(self)
    }
}

/// Trimmed text, or `None` when blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn parse_normalizes_server_url() {
        let config = EngineConfig::parse(
            r#"{"server_url": "https://play.dhis2.org/demo/", "failure_policy": "isolate"}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            EngineConfig {
                db_path: None,
                server_url: Some("https://play.dhis2.org/demo".to_string()),
                failure_policy: FailurePolicy::Isolate,
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_fields() {
        let error = EngineConfig::parse(r#"{"server": "https://play.dhis2.org"}"#).unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn parse_rejects_url_without_scheme() {
        assert!(matches!(
            EngineConfig::parse(r#"{"server_url": "play.dhis2.org"}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_from_path(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn file_values_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"db_path": "/var/lib/fieldsync/store.db"}"#).unwrap();

        let config = EngineConfig::load_from_path(&path).unwrap();
        assert_eq!(
            config.db_path,
            Some(PathBuf::from("/var/lib/fieldsync/store.db"))
        );
        assert_eq!(config.failure_policy, FailurePolicy::Atomic);
    }

    #[test]
    fn overlay_replaces_file_values() {
        let env = HashMap::from([
            (DB_PATH_ENV, " /tmp/store.db "),
            (SERVER_URL_ENV, "http://localhost:8080/"),
            (FAILURE_POLICY_ENV, "ISOLATE"),
        ]);
        let config = EngineConfig {
            server_url: Some("https://play.dhis2.org".to_string()),
            ..Default::default()
        }
        .overlay(|key| env.get(key).map(ToString::to_string))
        .unwrap();

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/store.db")));
        assert_eq!(config.server_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
    }

    #[test]
    fn overlay_ignores_blank_values() {
        let config = EngineConfig {
            server_url: Some("https://play.dhis2.org".to_string()),
            ..Default::default()
        }
        .overlay(|_| Some("  ".to_string()))
        .unwrap();
        assert_eq!(config.server_url.as_deref(), Some("https://play.dhis2.org"));
    }

    #[test]
    fn overlay_rejects_unknown_policy() {
        let result = EngineConfig::default().overlay(|key| {
            (key == FAILURE_POLICY_ENV).then(|| "sometimes".to_string())
        });
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn require_server_url_reports_missing_value() {
        assert!(matches!(
            EngineConfig::default().require_server_url(),
            Err(Error::Config(_))
        ));
    }
}
