use std::collections::BTreeMap;

use fieldsync_core::Stores;

use crate::commands::common::open_database;
use crate::config::Settings;
use crate::error::CliError;

pub fn run_status(as_json: bool, settings: &Settings) -> Result<(), CliError> {
    let db = open_database(&settings.db_path)?;
    let counts = Stores::new(db.connection()).row_counts()?;

    if as_json {
        let by_table: BTreeMap<&str, i64> = counts.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&by_table)?);
        return Ok(());
    }

    println!("Database: {}", settings.db_path.display());
    for line in format_count_lines(&counts) {
        println!("{line}");
    }
    Ok(())
}

pub fn format_count_lines(counts: &[(&str, i64)]) -> Vec<String> {
    counts
        .iter()
        .map(|(table, count)| format!("{table:<36} {count}"))
        .collect()
}
