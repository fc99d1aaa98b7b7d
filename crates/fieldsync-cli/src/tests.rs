use std::io::Write;
use std::path::{Path, PathBuf};

use fieldsync_core::db::Insertable;
use fieldsync_core::models::{EventRow, OrganisationUnitRow, ProgramRow, ProgramStageRow};
use fieldsync_core::{
    Batch, Database, EngineConfig, FailurePolicy, LocalWriter, ReconcileReport, Reconciler,
    State, StatusTracker, Stores,
};
use pretty_assertions::assert_eq;

use crate::cli::{MarkOutcome, StatefulTable};
use crate::commands::common::{format_report_lines, read_payload, report_to_item};
use crate::commands::mark::run_mark;
use crate::commands::pending::{pending_items, PendingItem};
use crate::commands::reconcile::run_reconcile;
use crate::commands::status::format_count_lines;
use crate::config::{load_engine_config, resolve_db_path, Settings};
use crate::error::CliError;

const PAYLOAD: &str = r#"{
  "organisationUnits": [{"id": "DiszpKrYNg8", "name": "Ngelehun CHC"}],
  "programs": [{"id": "IpHINAT79UW", "programStages": [{"id": "A03MvHHogjR"}]}]
}"#;

fn settings(db_path: &Path) -> Settings {
    Settings {
        db_path: db_path.to_path_buf(),
        engine: EngineConfig::default(),
    }
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn seed_event(db: &Database, uid: &str) {
    let stores = Stores::new(db.connection());
    stores
        .organisation_units
        .insert(&OrganisationUnitRow {
            uid: "DiszpKrYNg8".to_string(),
            ..Default::default()
        })
        .unwrap();
    stores
        .programs
        .insert(&ProgramRow {
            uid: "IpHINAT79UW".to_string(),
            ..Default::default()
        })
        .unwrap();
    stores
        .program_stages
        .insert(&ProgramStageRow {
            uid: "A03MvHHogjR".to_string(),
            program: "IpHINAT79UW".to_string(),
            ..Default::default()
        })
        .unwrap();
    LocalWriter::new(stores.events)
        .create(&mut EventRow {
            uid: uid.to_string(),
            program: "IpHINAT79UW".to_string(),
            program_stage: "A03MvHHogjR".to_string(),
            organisation_unit: "DiszpKrYNg8".to_string(),
            ..Default::default()
        })
        .unwrap();
}

#[test]
fn db_path_prefers_cli_argument_over_config() {
    let config = EngineConfig {
        db_path: Some(PathBuf::from("/from/config.db")),
        ..Default::default()
    };

    assert_eq!(
        resolve_db_path(Some(PathBuf::from("/from/cli.db")), &config).unwrap(),
        PathBuf::from("/from/cli.db")
    );
    assert_eq!(
        resolve_db_path(None, &config).unwrap(),
        PathBuf::from("/from/config.db")
    );
}

#[test]
fn explicit_config_file_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let error = load_engine_config(Some(&dir.path().join("missing.json"))).unwrap_err();
    assert!(matches!(error, CliError::Config(_)));
}

#[test]
fn explicit_config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "config.json",
        r#"{"server_url": "https://play.dhis2.org/demo/", "failure_policy": "atomic"}"#,
    );

    let config = EngineConfig::load_from_path(&path).unwrap();
    assert_eq!(config.server_url.as_deref(), Some("https://play.dhis2.org/demo"));
    assert_eq!(config.failure_policy, FailurePolicy::Atomic);
}

#[test]
fn payload_is_read_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(dir.path(), "payload.json", PAYLOAD);

    let batch = read_payload(&path).unwrap();
    assert_eq!(batch.organisation_units.len(), 1);
    assert_eq!(batch.programs[0].program_stages.len(), 1);
}

#[test]
fn report_lines_show_counts_and_failures() {
    let mut db = Database::open_in_memory().unwrap();
    let mut batch = Batch::from_json(PAYLOAD).unwrap();
    batch.programs[0].program_stages[0].identity.uid = String::new();
    let report: ReconcileReport = Reconciler::for_database(&mut db)
        .with_policy(FailurePolicy::Isolate)
        .reconcile(&batch)
        .unwrap();

    let lines = format_report_lines(&report);
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("organisation unit"));
    assert!(lines[0].ends_with("+1 ~0 -0"));
    assert!(lines[2].ends_with("!1"));
    assert!(lines[3].starts_with("failed: program stage"));

    let item = report_to_item(&report);
    assert!(item.committed);
    assert_eq!(item.failures.len(), 1);
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["counts"][0]["kind"], "organisationUnit");
    assert_eq!(json["counts"][0]["inserted"], 1);
}

#[test]
fn reconcile_command_writes_to_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let payload = write_file(dir.path(), "payload.json", PAYLOAD);
    let settings = settings(&dir.path().join("store").join("fieldsync.db"));

    run_reconcile(&payload, false, true, &settings).unwrap();

    let db = Database::open(&settings.db_path).unwrap();
    let stores = Stores::new(db.connection());
    assert_eq!(stores.organisation_units.count().unwrap(), 1);
    assert_eq!(stores.program_stages.count().unwrap(), 1);
}

#[test]
fn reconcile_command_rolls_back_on_failures_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let payload = write_file(
        dir.path(),
        "payload.json",
        r#"{
          "organisationUnits": [{"id": "DiszpKrYNg8"}],
          "events": [{"event": "V1CerIi3sdL", "program": "unknownPrg1", "programStage": "unknownStg1", "orgUnit": "DiszpKrYNg8"}]
        }"#,
    );
    let settings = settings(&dir.path().join("fieldsync.db"));

    let error = run_reconcile(&payload, false, false, &settings).unwrap_err();
    assert!(matches!(error, CliError::EntityFailures(1)));
    {
        let db = Database::open(&settings.db_path).unwrap();
        assert_eq!(
            Stores::new(db.connection()).organisation_units.count().unwrap(),
            0
        );
    }

    let error = run_reconcile(&payload, true, false, &settings).unwrap_err();
    assert!(matches!(error, CliError::EntityFailures(1)));
    let db = Database::open(&settings.db_path).unwrap();
    assert_eq!(
        Stores::new(db.connection()).organisation_units.count().unwrap(),
        1
    );
}

#[test]
fn count_lines_align_table_names() {
    let lines = format_count_lines(&[("events", 2), ("organisation_units", 10)]);
    assert_eq!(lines[0], format!("{:<36} 2", "events"));
    assert_eq!(lines[1], format!("{:<36} 10", "organisation_units"));
}

#[test]
fn pending_items_list_local_rows() {
    let db = Database::open_in_memory().unwrap();
    seed_event(&db, "lOcAlEvt001");

    let pending = Stores::new(db.connection()).pending().unwrap();
    assert_eq!(
        pending_items(&pending),
        vec![PendingItem {
            table: "events",
            key: "lOcAlEvt001".to_string(),
            state: "TO_POST",
        }]
    );
}

#[test]
fn mark_command_moves_the_row_state() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(&dir.path().join("fieldsync.db"));
    {
        let db = Database::open(&settings.db_path).unwrap();
        seed_event(&db, "lOcAlEvt001");
    }

    run_mark(StatefulTable::Event, "lOcAlEvt001", MarkOutcome::Pushed, &settings).unwrap();
    run_mark(StatefulTable::Event, "lOcAlEvt001", MarkOutcome::Edited, &settings).unwrap();

    let db = Database::open(&settings.db_path).unwrap();
    let status = Stores::new(db.connection()).events.status();
    assert_eq!(status.get("lOcAlEvt001").unwrap(), State::ToUpdate);

    let error = run_mark(StatefulTable::Event, "missingEvt1", MarkOutcome::Pushed, &settings)
        .unwrap_err();
    assert!(matches!(
        error,
        CliError::Core(fieldsync_core::Error::NotFound(_))
    ));
}
