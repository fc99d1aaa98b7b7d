//! Entity handlers: apply server entities to the local stores
//!
//! Each handler owns one entity type. For every entity, in input order, it
//! either deletes the row (deletion marker) or writes it with an update that
//! falls back to an insert when no row matched, then hands the entity's
//! children to the child handlers with the entity's UID as their parent.
//!
//! Validation and constraint failures stay with the entity that caused them:
//! they are recorded in the [`ReconcileReport`] and the next sibling is
//! processed. An entity whose own write failed never has its children
//! attempted. Any other error aborts the pass.

mod metadata;
mod tracker;
mod user;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::db::{Insertable, Updatable};
use crate::error::{Error, Result};
use crate::payload::Syncable;

pub use metadata::{
    DataElementHandler, OptionHandler, OptionSetHandler, OrganisationUnitHandler, ProgramHandler,
    ProgramIndicatorHandler, ProgramStageHandler, ProgramStageSectionHandler,
    SectionDataElementHandler, TrackedEntityAttributeHandler, TrackedEntityHandler,
};
pub use tracker::{
    AttributeValueHandler, DataValueHandler, EnrollmentHandler, EventHandler,
    TrackedEntityInstanceHandler,
};
pub use user::{
    UserCredentialsHandler, UserHandler, UserOrganisationUnitHandler, UserRoleHandler,
};

/// Every entity type the engine persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    OrganisationUnit,
    OptionSet,
    OptionItem,
    DataElement,
    TrackedEntity,
    TrackedEntityAttribute,
    Program,
    ProgramStage,
    ProgramStageSection,
    ProgramStageSectionDataElement,
    ProgramIndicator,
    User,
    UserCredentials,
    UserRole,
    UserOrganisationUnit,
    TrackedEntityInstance,
    TrackedEntityAttributeValue,
    Enrollment,
    Event,
    TrackedEntityDataValue,
}

impl EntityKind {
    /// Root handlers in dependency order: every type appears after the
    /// types its rows reference. New root types must be placed here by hand.
    pub const ROOT_ORDER: [Self; 9] = [
        Self::OrganisationUnit,
        Self::OptionSet,
        Self::DataElement,
        Self::TrackedEntity,
        Self::TrackedEntityAttribute,
        Self::Program,
        Self::User,
        Self::TrackedEntityInstance,
        Self::Event,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrganisationUnit => "organisation unit",
            Self::OptionSet => "option set",
            Self::OptionItem => "option",
            Self::DataElement => "data element",
            Self::TrackedEntity => "tracked entity",
            Self::TrackedEntityAttribute => "tracked entity attribute",
            Self::Program => "program",
            Self::ProgramStage => "program stage",
            Self::ProgramStageSection => "program stage section",
            Self::ProgramStageSectionDataElement => "section data element",
            Self::ProgramIndicator => "program indicator",
            Self::User => "user",
            Self::UserCredentials => "user credentials",
            Self::UserRole => "user role",
            Self::UserOrganisationUnit => "user organisation unit",
            Self::TrackedEntityInstance => "tracked entity instance",
            Self::TrackedEntityAttributeValue => "attribute value",
            Self::Enrollment => "enrollment",
            Self::Event => "event",
            Self::TrackedEntityDataValue => "data value",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single entity write did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Inserted,
    Updated,
    Deleted,
}

/// Per-type tally of a pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub inserted: usize,
    pub updated: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// An entity whose write was rejected; its siblings were still processed.
#[derive(Debug)]
pub struct EntityFailure {
    pub kind: EntityKind,
    pub uid: String,
    pub error: Error,
}

impl fmt::Display for EntityFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.uid, self.error)
    }
}

/// Outcome of a pass: counts per entity type plus isolated failures.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    counts: BTreeMap<EntityKind, Counts>,
    failures: Vec<EntityFailure>,
}

impl ReconcileReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: EntityKind, applied: Applied) {
        let counts = self.counts.entry(kind).or_default();
        match applied {
            Applied::Inserted => counts.inserted += 1,
            Applied::Updated => counts.updated += 1,
            Applied::Deleted => counts.deleted += 1,
        }
    }

    pub fn fail(&mut self, failure: EntityFailure) {
        self.counts.entry(failure.kind).or_default().failed += 1;
        self.failures.push(failure);
    }

    pub fn counts(&self, kind: EntityKind) -> Counts {
        self.counts.get(&kind).copied().unwrap_or_default()
    }

    /// Types touched by the pass, in [`EntityKind`] order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, Counts)> + '_ {
        self.counts.iter().map(|(kind, counts)| (*kind, *counts))
    }

    pub fn failures(&self) -> &[EntityFailure] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<EntityFailure> {
        self.failures
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Rows written (inserted, updated or deleted) across all types.
    pub fn applied(&self) -> usize {
        self.counts
            .values()
            .map(|counts| counts.inserted + counts.updated + counts.deleted)
            .sum()
    }
}

/// Keep an entity-scoped failure in the report; pass every other error up.
pub(crate) fn isolate<T>(
    kind: EntityKind,
    uid: &str,
    outcome: Result<T>,
    report: &mut ReconcileReport,
) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(error) if error.is_entity_scoped() => {
            tracing::warn!("Skipping {kind} {uid}: {error}");
            report.fail(EntityFailure {
                kind,
                uid: uid.to_string(),
                error,
            });
            Ok(None)
        }
        Err(error) => Err(error),
    }
}

/// Update the row selected by `key`; insert it when nothing matched.
pub(crate) fn upsert<M, K, S>(store: &S, row: &M, key: K) -> Result<Applied>
where
    S: Updatable<M, K> + Insertable<M>,
{
    if store.update(row, key)? > 0 {
        Ok(Applied::Updated)
    } else {
        store.insert(row)?;
        Ok(Applied::Inserted)
    }
}

/// Applies one entity type, then its children.
pub trait EntityHandler {
    type Entity: Syncable;

    const KIND: EntityKind;

    /// Remove the local row; returns the number of rows removed.
    fn delete(&self, parent: Option<&str>, entity: &Self::Entity) -> Result<usize>;

    /// Upsert the entity's own row.
    fn write(&self, parent: Option<&str>, entity: &Self::Entity) -> Result<Applied>;

    /// Dispatch nested collections; runs only after the entity's own write succeeded.
    fn handle_children(&self, _entity: &Self::Entity, _report: &mut ReconcileReport) -> Result<()> {
        Ok(())
    }

    fn handle(
        &self,
        parent: Option<&str>,
        entities: &[Self::Entity],
        report: &mut ReconcileReport,
    ) -> Result<()> {
        for entity in entities {
            let uid = entity.uid();

            if entity.is_deleted() {
                let removed = isolate(Self::KIND, uid, self.delete(parent, entity), report)?;
                if removed.is_some_and(|removed| removed > 0) {
                    tracing::debug!("Deleted {} {uid}", Self::KIND);
                    report.record(Self::KIND, Applied::Deleted);
                }
                continue;
            }

            let Some(applied) = isolate(Self::KIND, uid, self.write(parent, entity), report)? else {
                continue;
            };
            tracing::debug!("{applied:?} {} {uid}", Self::KIND);
            report.record(Self::KIND, applied);

            self.handle_children(entity, report)?;
        }
        Ok(())
    }
}

/// Parent UID for a nested handler; blank when called as a root, which the
/// row validation then rejects.
pub(crate) fn parent_uid(parent: Option<&str>) -> String {
    parent.unwrap_or_default().to_string()
}
