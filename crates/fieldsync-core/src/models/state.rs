//! Per-row synchronization state

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::ToSql;
use serde::{Deserialize, Serialize};

/// Synchronization state of a row that can carry local, not-yet-pushed changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    /// Matches the server, nothing pending
    #[default]
    Synced,
    /// Modified locally after the last sync
    ToUpdate,
    /// Created locally, never sent
    ToPost,
    /// Last push attempt failed
    Error,
    /// Edited again after a failed push
    Relapsed,
}

impl State {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synced => "SYNCED",
            Self::ToUpdate => "TO_UPDATE",
            Self::ToPost => "TO_POST",
            Self::Error => "ERROR",
            Self::Relapsed => "RELAPSED",
        }
    }

    /// Whether the row holds changes the server has not accepted yet.
    pub const fn is_pending(self) -> bool {
        !matches!(self, Self::Synced)
    }

    /// State after the user edits the row locally.
    ///
    /// A row that was never posted stays `TO_POST`.
    #[must_use]
    pub const fn after_local_edit(self) -> Self {
        match self {
            Self::Synced => Self::ToUpdate,
            Self::Error => Self::Relapsed,
            other => other,
        }
    }

    /// State after the server accepted a push.
    #[must_use]
    pub const fn after_push_success(self) -> Self {
        Self::Synced
    }

    /// State after a push was rejected or failed in transit.
    #[must_use]
    pub const fn after_push_failure(self) -> Self {
        match self {
            Self::Synced => Self::Synced,
            _ => Self::Error,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SYNCED" => Ok(Self::Synced),
            "TO_UPDATE" => Ok(Self::ToUpdate),
            "TO_POST" => Ok(Self::ToPost),
            "ERROR" => Ok(Self::Error),
            "RELAPSED" => Ok(Self::Relapsed),
            other => Err(format!("unknown state '{other}'")),
        }
    }
}

impl ToSql for State {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for State {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: String| FromSqlError::Other(error.into()))
    }
}

impl From<State> for Value {
    fn from(state: State) -> Self {
        Self::Text(state.as_str().to_string())
    }
}
