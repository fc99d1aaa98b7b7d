use std::path::Path;

use fieldsync_core::{Error, FailurePolicy, Reconciler};

use crate::commands::common::{
    failure_to_item, format_failure_lines, format_report_lines, open_database, read_payload,
    report_to_item, ReportItem,
};
use crate::config::Settings;
use crate::error::CliError;

pub fn run_reconcile(
    payload: &Path,
    isolate: bool,
    as_json: bool,
    settings: &Settings,
) -> Result<(), CliError> {
    let batch = read_payload(payload)?;
    let policy = if isolate {
        FailurePolicy::Isolate
    } else {
        settings.engine.failure_policy
    };

    let mut db = open_database(&settings.db_path)?;
    let outcome = Reconciler::for_database(&mut db)
        .with_policy(policy)
        .reconcile(&batch);

    match outcome {
        Ok(report) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&report_to_item(&report))?);
            } else if report.applied() == 0 && !report.has_failures() {
                println!("Nothing to apply.");
            } else {
                for line in format_report_lines(&report) {
                    println!("{line}");
                }
            }

            if report.has_failures() {
                return Err(CliError::EntityFailures(report.failures().len()));
            }
            Ok(())
        }
        Err(Error::RolledBack { failures }) => {
            if as_json {
                let item = ReportItem {
                    committed: false,
                    counts: Vec::new(),
                    failures: failures.iter().map(failure_to_item).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                println!("Rolled back, nothing was written.");
                for line in format_failure_lines(&failures) {
                    println!("{line}");
                }
            }
            Err(CliError::EntityFailures(failures.len()))
        }
        Err(error) => Err(error.into()),
    }
}
