use fieldsync_core::{State, StatusTracker, Stores};

use crate::cli::{MarkOutcome, StatefulTable};
use crate::commands::common::open_database;
use crate::config::Settings;
use crate::error::CliError;

pub fn run_mark(
    table: StatefulTable,
    uid: &str,
    outcome: MarkOutcome,
    settings: &Settings,
) -> Result<(), CliError> {
    let db = open_database(&settings.db_path)?;
    let stores = Stores::new(db.connection());

    let state = match table {
        StatefulTable::TrackedEntityInstance => {
            apply(&stores.tracked_entity_instances.status(), uid, outcome)?
        }
        StatefulTable::Enrollment => apply(&stores.enrollments.status(), uid, outcome)?,
        StatefulTable::Event => apply(&stores.events.status(), uid, outcome)?,
    };

    println!("{uid} is now {state}");
    Ok(())
}

fn apply<'k>(
    tracker: &impl StatusTracker<&'k str>,
    uid: &'k str,
    outcome: MarkOutcome,
) -> Result<State, CliError> {
    let state = match outcome {
        MarkOutcome::Pushed => tracker.record_push_success(uid)?,
        MarkOutcome::Failed => tracker.record_push_failure(uid)?,
        MarkOutcome::Edited => tracker.record_local_edit(uid)?,
    };
    Ok(state)
}
