use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use fieldsync_core::{Batch, Counts, Database, EntityFailure, EntityKind, ReconcileReport};
use serde::Serialize;

use crate::error::CliError;

pub fn open_database(db_path: &Path) -> Result<Database, CliError> {
    tracing::debug!("Opening database at {}", db_path.display());
    Ok(Database::open(db_path)?)
}

/// Read a batch from a file, or from stdin when the path is `-`.
pub fn read_payload(path: &Path) -> Result<Batch, CliError> {
    if path.as_os_str() == "-" {
        return Ok(Batch::from_reader(io::stdin().lock())?);
    }
    let file = File::open(path)?;
    Ok(Batch::from_reader(BufReader::new(file))?)
}

#[derive(Debug, Serialize)]
pub struct CountsItem {
    pub kind: EntityKind,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Serialize)]
pub struct FailureItem {
    pub kind: EntityKind,
    pub uid: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct ReportItem {
    pub committed: bool,
    pub counts: Vec<CountsItem>,
    pub failures: Vec<FailureItem>,
}

pub fn failure_to_item(failure: &EntityFailure) -> FailureItem {
    FailureItem {
        kind: failure.kind,
        uid: failure.uid.clone(),
        error: failure.error.to_string(),
    }
}

pub fn report_to_item(report: &ReconcileReport) -> ReportItem {
    ReportItem {
        committed: true,
        counts: report
            .iter()
            .map(|(kind, counts)| CountsItem { kind, counts })
            .collect(),
        failures: report.failures().iter().map(failure_to_item).collect(),
    }
}

pub fn format_report_lines(report: &ReconcileReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .iter()
        .map(|(kind, counts)| {
            format!(
                "{:<34} +{} ~{} -{}{}",
                kind.as_str(),
                counts.inserted,
                counts.updated,
                counts.deleted,
                if counts.failed > 0 {
                    format!(" !{}", counts.failed)
                } else {
                    String::new()
                }
            )
        })
        .collect();
    lines.extend(format_failure_lines(report.failures()));
    lines
}

pub fn format_failure_lines(failures: &[EntityFailure]) -> Vec<String> {
    failures
        .iter()
        .map(|failure| format!("failed: {failure}"))
        .collect()
}
