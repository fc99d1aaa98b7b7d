//! Row models persisted in the local store
//!
//! Every table is described by a [`Table`] implementation: its name, the
//! columns written by inserts (in bind order), and how to read a row back.
//! Tables keyed by a server UID implement [`Identifiable`]; association
//! tables keyed by a pair implement [`LinkRow`].

mod metadata;
mod state;
mod tracker;
mod user;

use rusqlite::ToSql;

use crate::error::{Error, Result};

pub use metadata::{
    DataElementRow, OptionRow, OptionSetRow, OrganisationUnitRow, ProgramIndicatorRow, ProgramRow,
    ProgramStageRow, ProgramStageSectionDataElementRow, ProgramStageSectionRow,
    TrackedEntityAttributeRow, TrackedEntityRow,
};
pub use state::State;
pub use tracker::{
    EnrollmentRow, EventRow, TrackedEntityAttributeValueRow, TrackedEntityDataValueRow,
    TrackedEntityInstanceRow,
};
pub use user::{
    AuthenticatedUserRow, UserCredentialsRow, UserOrganisationUnitRow, UserRoleRow, UserRow,
};

/// A persisted table and the mapping between a row struct and its columns.
pub trait Table: Sized {
    /// Table name
    const TABLE: &'static str;

    /// Columns written on insert, in the order returned by [`Table::values`]
    const COLUMNS: &'static [&'static str];

    /// Columns an update must leave untouched
    const PRESERVED_ON_UPDATE: &'static [&'static str] = &[];

    /// Check required fields before any statement runs
    fn validate(&self) -> Result<()>;

    /// Bind values aligned with [`Table::COLUMNS`]
    fn values(&self) -> Vec<&dyn ToSql>;

    /// Read a row selected with [`Table::COLUMNS`]
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

/// A table keyed by a single server-assigned identifier.
pub trait Identifiable: Table {
    /// Column holding the identifier
    const UID_COLUMN: &'static str = "uid";

    fn uid(&self) -> &str;
}

/// An association table keyed by an ordered pair.
pub trait LinkRow: Table {
    /// The two key columns; the first one is the owning side
    const KEY: [&'static str; 2];

    fn key(&self) -> LinkKey<'_>;
}

/// A table carrying a per-row [`State`] in its `state` column.
pub trait Stateful: Table {
    fn state(&self) -> State;

    fn set_state(&mut self, state: State);
}

/// Composite key of a [`LinkRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkKey<'k> {
    pub first: &'k str,
    pub second: &'k str,
}

impl<'k> LinkKey<'k> {
    pub const fn new(first: &'k str, second: &'k str) -> Self {
        Self { first, second }
    }
}

impl std::fmt::Display for LinkKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.first, self.second)
    }
}

/// Fail with [`Error::Validation`] when a mandatory text value is empty.
pub(crate) fn require(table: &'static str, field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation { table, field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_rejects_blank_values() {
        assert!(require("programs", "uid", "abc").is_ok());
        let error = require("programs", "uid", "  ").unwrap_err();
        assert!(matches!(
            error,
            Error::Validation {
                table: "programs",
                field: "uid"
            }
        ));
    }

    #[test]
    fn link_key_display_joins_both_sides() {
        assert_eq!(LinkKey::new("a", "b").to_string(), "a/b");
    }
}
