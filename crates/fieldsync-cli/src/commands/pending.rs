use fieldsync_core::db::PendingRows;
use fieldsync_core::models::{LinkRow, Stateful};
use fieldsync_core::{State, Stores};
use serde::Serialize;

use crate::commands::common::open_database;
use crate::config::Settings;
use crate::error::CliError;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PendingItem {
    pub table: &'static str,
    pub key: String,
    pub state: &'static str,
}

pub fn run_pending(as_json: bool, settings: &Settings) -> Result<(), CliError> {
    let db = open_database(&settings.db_path)?;
    let items = pending_items(&Stores::new(db.connection()).pending()?);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Nothing waiting for a push.");
        return Ok(());
    }
    for item in &items {
        println!("{:<10} {:<32} {}", item.state, item.table, item.key);
    }
    Ok(())
}

pub fn pending_items(pending: &PendingRows) -> Vec<PendingItem> {
    let item = |table: &'static str, key: String, state: State| PendingItem {
        table,
        key,
        state: state.as_str(),
    };

    let mut items = Vec::with_capacity(pending.len());
    items.extend(pending.tracked_entity_instances.iter().map(|row| {
        item("tracked_entity_instances", row.uid.clone(), row.state())
    }));
    items.extend(
        pending
            .enrollments
            .iter()
            .map(|row| item("enrollments", row.uid.clone(), row.state())),
    );
    items.extend(
        pending
            .events
            .iter()
            .map(|row| item("events", row.uid.clone(), row.state())),
    );
    items.extend(pending.attribute_values.iter().map(|row| {
        item("tracked_entity_attribute_values", row.key().to_string(), row.state())
    }));
    items.extend(pending.data_values.iter().map(|row| {
        item("tracked_entity_data_values", row.key().to_string(), row.state())
    }));
    items
}
