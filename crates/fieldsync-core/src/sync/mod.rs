//! Reconciliation driver: one pass applies a [`Batch`] inside one transaction.
//!
//! A pass moves `Idle -> Running -> Committed | RolledBack`. Root handlers run
//! in [`EntityKind::ROOT_ORDER`]; every handler writes a parent before
//! descending into its children. The transaction commits only when the pass
//! finished without an unhandled error and, unless the caller opted into
//! [`FailurePolicy::Isolate`], without any entity failure. Every other exit
//! drops the transaction, which rolls it back.

use std::fmt;
use std::str::FromStr;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{Database, SharedDatabase, Stores};
use crate::error::{Error, Result};
use crate::handler::{
    DataElementHandler, EntityHandler, EntityKind, EventHandler, OptionSetHandler,
    OrganisationUnitHandler, ProgramHandler, ReconcileReport, TrackedEntityAttributeHandler,
    TrackedEntityHandler, TrackedEntityInstanceHandler, UserHandler,
};
use crate::payload::Batch;

/// What a pass does with entity-level failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Roll the whole pass back if any entity failed
    #[default]
    Atomic,
    /// Commit what succeeded; report the failures
    Isolate,
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Isolate => "isolate",
            Self::Atomic => "atomic",
        })
    }
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "atomic" => Ok(Self::Atomic),
            other => Err(Error::Config(format!(
                "unknown failure policy '{other}' (expected isolate or atomic)"
            ))),
        }
    }
}

/// State of the most recent pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PassState {
    #[default]
    Idle,
    Running,
    Committed,
    RolledBack,
}

/// Applies batches to one connection, one pass at a time.
///
/// Holding the connection mutably serializes passes.
pub struct Reconciler<'db> {
    conn: &'db mut Connection,
    policy: FailurePolicy,
    state: PassState,
}

impl<'db> Reconciler<'db> {
    pub fn new(conn: &'db mut Connection) -> Self {
        Self {
            conn,
            policy: FailurePolicy::default(),
            state: PassState::Idle,
        }
    }

    pub fn for_database(database: &'db mut Database) -> Self {
        Self::new(database.connection_mut())
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub const fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub const fn state(&self) -> PassState {
        self.state
    }

    /// Run one pass over `batch`.
    ///
    /// Under [`FailurePolicy::Atomic`] a pass with entity failures returns
    /// [`Error::RolledBack`] carrying them and leaves the store untouched.
    pub fn reconcile(&mut self, batch: &Batch) -> Result<ReconcileReport> {
        self.state = PassState::Running;
        tracing::info!(
            "Reconciling {} root entities ({} policy)",
            batch.len(),
            self.policy
        );

        match self.run(batch) {
            Ok(report) => {
                self.state = PassState::Committed;
                tracing::info!(
                    "Reconciliation committed: {} rows applied, {} failures",
                    report.applied(),
                    report.failures().len()
                );
                Ok(report)
            }
            Err(error) => {
                self.state = PassState::RolledBack;
                tracing::warn!("Reconciliation rolled back: {error}");
                Err(error)
            }
        }
    }

    fn run(&mut self, batch: &Batch) -> Result<ReconcileReport> {
        let tx = self.conn.transaction()?;

        let report = {
            let stores = Stores::new(&tx);
            let mut report = ReconcileReport::new();
            for kind in EntityKind::ROOT_ORDER {
                dispatch(&stores, kind, batch, &mut report)?;
            }
            report
        };

        if self.policy == FailurePolicy::Atomic && report.has_failures() {
            drop(tx);
            return Err(Error::RolledBack {
                failures: report.into_failures(),
            });
        }

        tx.commit()?;
        Ok(report)
    }
}

fn dispatch(
    stores: &Stores<'_>,
    kind: EntityKind,
    batch: &Batch,
    report: &mut ReconcileReport,
) -> Result<()> {
    match kind {
        EntityKind::OrganisationUnit => {
            OrganisationUnitHandler::new(stores).handle(None, &batch.organisation_units, report)
        }
        EntityKind::OptionSet => OptionSetHandler::new(stores).handle(None, &batch.option_sets, report),
        EntityKind::DataElement => {
            DataElementHandler::new(stores).handle(None, &batch.data_elements, report)
        }
        EntityKind::TrackedEntity => {
            TrackedEntityHandler::new(stores).handle(None, &batch.tracked_entities, report)
        }
        EntityKind::TrackedEntityAttribute => TrackedEntityAttributeHandler::new(stores).handle(
            None,
            &batch.tracked_entity_attributes,
            report,
        ),
        EntityKind::Program => ProgramHandler::new(stores).handle(None, &batch.programs, report),
        EntityKind::User => UserHandler::new(stores).handle(None, &batch.users, report),
        EntityKind::TrackedEntityInstance => TrackedEntityInstanceHandler::new(stores).handle(
            None,
            &batch.tracked_entity_instances,
            report,
        ),
        EntityKind::Event => EventHandler::new(stores).handle(None, &batch.events, report),
        other => Err(Error::UnsupportedOperation(other.as_str())),
    }
}

/// Run one pass against a shared database, holding its lock for the whole pass.
pub fn reconcile_shared(
    database: &SharedDatabase,
    batch: &Batch,
    policy: FailurePolicy,
) -> Result<ReconcileReport> {
    let mut database = database.lock();
    Reconciler::for_database(&mut database)
        .with_policy(policy)
        .reconcile(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Counts;
    use crate::payload::{Identity, OrganisationUnit, Program, ProgramStage};
    use pretty_assertions::assert_eq;

    fn unit(uid: &str) -> OrganisationUnit {
        OrganisationUnit {
            identity: Identity::new(uid),
            ..Default::default()
        }
    }

    fn broken_batch() -> Batch {
        Batch {
            organisation_units: vec![unit("DiszpKrYNg8")],
            programs: vec![Program {
                identity: Identity::new("IpHINAT79UW"),
                program_stages: vec![ProgramStage {
                    identity: Identity::new(""),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn successful_pass_commits() {
        let mut db = Database::open_in_memory().unwrap();
        let mut reconciler = Reconciler::for_database(&mut db);
        assert_eq!(reconciler.state(), PassState::Idle);

        let batch = Batch {
            organisation_units: vec![unit("DiszpKrYNg8"), unit("ImspTQPwCqd")],
            ..Default::default()
        };
        let report = reconciler.reconcile(&batch).unwrap();

        assert_eq!(reconciler.state(), PassState::Committed);
        assert_eq!(
            report.counts(EntityKind::OrganisationUnit),
            Counts {
                inserted: 2,
                ..Default::default()
            }
        );
        let stores = Stores::new(db.connection());
        assert_eq!(stores.organisation_units.count().unwrap(), 2);
    }

    #[test]
    fn default_pass_rolls_back_on_an_entity_failure() {
        let mut db = Database::open_in_memory().unwrap();
        let mut reconciler = Reconciler::for_database(&mut db);
        assert_eq!(reconciler.policy(), FailurePolicy::Atomic);

        let error = reconciler.reconcile(&broken_batch()).unwrap_err();
        assert!(matches!(error, Error::RolledBack { .. }));
        assert_eq!(reconciler.state(), PassState::RolledBack);

        let stores = Stores::new(db.connection());
        assert_eq!(stores.organisation_units.count().unwrap(), 0);
        assert_eq!(stores.programs.count().unwrap(), 0);
        assert_eq!(stores.program_stages.count().unwrap(), 0);
    }

    #[test]
    fn isolate_policy_commits_successful_entities() {
        let mut db = Database::open_in_memory().unwrap();
        let report = Reconciler::for_database(&mut db)
            .with_policy(FailurePolicy::Isolate)
            .reconcile(&broken_batch())
            .unwrap();

        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].kind, EntityKind::ProgramStage);
        let stores = Stores::new(db.connection());
        assert_eq!(stores.organisation_units.count().unwrap(), 1);
        assert_eq!(stores.programs.count().unwrap(), 1);
    }

    #[test]
    fn atomic_policy_rolls_back_everything() {
        let mut db = Database::open_in_memory().unwrap();
        let mut reconciler =
            Reconciler::for_database(&mut db).with_policy(FailurePolicy::Atomic);

        let error = reconciler.reconcile(&broken_batch()).unwrap_err();
        assert_eq!(reconciler.state(), PassState::RolledBack);
        match error {
            Error::RolledBack { failures } => assert_eq!(failures.len(), 1),
            other => panic!("unexpected error: {other:?}"),
        }

        let stores = Stores::new(db.connection());
        assert_eq!(stores.organisation_units.count().unwrap(), 0);
        assert_eq!(stores.programs.count().unwrap(), 0);
    }

    #[test]
    fn reconciler_can_run_again_after_a_pass() {
        let mut db = Database::open_in_memory().unwrap();
        let mut reconciler = Reconciler::for_database(&mut db);

        assert!(reconciler.reconcile(&broken_batch()).is_err());
        let batch = Batch {
            organisation_units: vec![unit("DiszpKrYNg8")],
            ..Default::default()
        };
        reconciler.reconcile(&batch).unwrap();
        assert_eq!(reconciler.state(), PassState::Committed);
    }

    #[test]
    fn failure_policy_parses_case_insensitively() {
        assert_eq!("Atomic".parse::<FailurePolicy>().unwrap(), FailurePolicy::Atomic);
        assert_eq!(" isolate ".parse::<FailurePolicy>().unwrap(), FailurePolicy::Isolate);
        assert!(matches!(
            "strict".parse::<FailurePolicy>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn shared_database_pass_runs_under_the_lock() {
        let shared = Database::open_in_memory().unwrap().into_shared();
        let batch = Batch {
            organisation_units: vec![unit("DiszpKrYNg8")],
            ..Default::default()
        };

        let report = reconcile_shared(&shared, &batch, FailurePolicy::Isolate).unwrap();
        assert_eq!(report.applied(), 1);
    }
}
