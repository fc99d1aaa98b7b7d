//! Database migrations

use crate::error::Result;
use rusqlite::{Connection, OptionalExtension};

/// Current schema version
pub const CURRENT_VERSION: i32 = 3;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }
    if version < 3 {
        migrate_v3(conn)?;
    }

    Ok(())
}

/// Get the current schema version
pub fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .optional()?
        .unwrap_or(0);

    Ok(version)
}

/// Migration to version 1: metadata and user tables
fn migrate_v1(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );

        CREATE TABLE IF NOT EXISTS organisation_units (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            short_name TEXT,
            path TEXT,
            level INTEGER,
            opening_date TEXT,
            closed_date TEXT,
            parent TEXT REFERENCES organisation_units(uid)
                ON DELETE CASCADE DEFERRABLE INITIALLY DEFERRED
        );
        CREATE INDEX IF NOT EXISTS idx_organisation_units_parent ON organisation_units(parent);

        CREATE TABLE IF NOT EXISTS option_sets (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            version INTEGER,
            value_type TEXT
        );

        CREATE TABLE IF NOT EXISTS options (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            sort_order INTEGER,
            option_set TEXT NOT NULL REFERENCES option_sets(uid) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_options_option_set ON options(option_set);

        CREATE TABLE IF NOT EXISTS data_elements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            short_name TEXT,
            value_type TEXT,
            zero_is_significant INTEGER NOT NULL DEFAULT 0,
            aggregation_type TEXT,
            form_name TEXT,
            domain_type TEXT,
            option_set TEXT REFERENCES option_sets(uid) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS tracked_entities (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS tracked_entity_attributes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            short_name TEXT,
            value_type TEXT,
            option_set TEXT REFERENCES option_sets(uid) ON DELETE SET NULL,
            pattern TEXT,
            expression TEXT,
            search_scope TEXT,
            is_generated INTEGER NOT NULL DEFAULT 0,
            is_unique INTEGER NOT NULL DEFAULT 0,
            inherit INTEGER NOT NULL DEFAULT 0,
            program_scope INTEGER NOT NULL DEFAULT 0,
            orgunit_scope INTEGER NOT NULL DEFAULT 0,
            display_in_list_no_program INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS programs (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            short_name TEXT,
            version INTEGER,
            program_type TEXT,
            only_enroll_once INTEGER NOT NULL DEFAULT 0,
            tracked_entity TEXT REFERENCES tracked_entities(uid) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS program_stages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            sort_order INTEGER,
            repeatable INTEGER NOT NULL DEFAULT 0,
            execution_date_label TEXT,
            min_days_from_start INTEGER,
            program TEXT NOT NULL REFERENCES programs(uid) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_program_stages_program ON program_stages(program);

        CREATE TABLE IF NOT EXISTS program_stage_sections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            sort_order INTEGER,
            program_stage TEXT NOT NULL REFERENCES program_stages(uid) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_program_stage_sections_stage
            ON program_stage_sections(program_stage);

        CREATE TABLE IF NOT EXISTS program_stage_section_data_elements (
            program_stage_section TEXT NOT NULL
                REFERENCES program_stage_sections(uid) ON DELETE CASCADE,
            data_element TEXT NOT NULL REFERENCES data_elements(uid) ON DELETE CASCADE,
            UNIQUE (program_stage_section, data_element)
        );
        CREATE INDEX IF NOT EXISTS idx_section_data_elements_data_element
            ON program_stage_section_data_elements(data_element);

        CREATE TABLE IF NOT EXISTS program_indicators (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            expression TEXT,
            filter_expression TEXT,
            decimals INTEGER,
            display_in_form INTEGER NOT NULL DEFAULT 0,
            program_stage_section TEXT NOT NULL
                REFERENCES program_stage_sections(uid) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            birthday TEXT,
            education TEXT,
            gender TEXT,
            job_title TEXT,
            surname TEXT,
            first_name TEXT,
            introduction TEXT,
            employer TEXT,
            interests TEXT,
            languages TEXT,
            email TEXT,
            phone_number TEXT,
            nationality TEXT
        );

        CREATE TABLE IF NOT EXISTS user_credentials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT,
            username TEXT,
            user TEXT NOT NULL REFERENCES users(uid) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS user_organisation_units (
            user TEXT NOT NULL REFERENCES users(uid) ON DELETE CASCADE,
            organisation_unit TEXT NOT NULL REFERENCES organisation_units(uid) ON DELETE CASCADE,
            UNIQUE (user, organisation_unit)
        );

        CREATE TABLE IF NOT EXISTS authenticated_users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user TEXT NOT NULL UNIQUE REFERENCES users(uid) ON DELETE CASCADE,
            credentials TEXT NOT NULL
        );

        INSERT INTO schema_version (version) VALUES (1);",
    )?;

    tx.commit()?;
    tracing::info!("Migrated database to version 1");
    Ok(())
}

/// Migration to version 2: tracker data tables with per-row sync state
fn migrate_v2(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS tracked_entity_instances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            created TEXT,
            last_updated TEXT,
            organisation_unit TEXT NOT NULL
                REFERENCES organisation_units(uid) ON DELETE CASCADE,
            tracked_entity TEXT NOT NULL REFERENCES tracked_entities(uid) ON DELETE CASCADE,
            state TEXT NOT NULL DEFAULT 'SYNCED'
        );
        CREATE INDEX IF NOT EXISTS idx_tracked_entity_instances_state
            ON tracked_entity_instances(state);

        CREATE TABLE IF NOT EXISTS tracked_entity_attribute_values (
            tracked_entity_instance TEXT NOT NULL
                REFERENCES tracked_entity_instances(uid) ON DELETE CASCADE,
            tracked_entity_attribute TEXT NOT NULL
                REFERENCES tracked_entity_attributes(uid) ON DELETE CASCADE,
            value TEXT,
            created TEXT,
            last_updated TEXT,
            state TEXT NOT NULL DEFAULT 'SYNCED',
            UNIQUE (tracked_entity_instance, tracked_entity_attribute)
        );

        CREATE TABLE IF NOT EXISTS enrollments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            created TEXT,
            last_updated TEXT,
            organisation_unit TEXT NOT NULL
                REFERENCES organisation_units(uid) ON DELETE CASCADE,
            program TEXT NOT NULL REFERENCES programs(uid) ON DELETE CASCADE,
            enrollment_date TEXT,
            incident_date TEXT,
            follow_up INTEGER NOT NULL DEFAULT 0,
            status TEXT,
            tracked_entity_instance TEXT NOT NULL
                REFERENCES tracked_entity_instances(uid) ON DELETE CASCADE,
            latitude REAL,
            longitude REAL,
            state TEXT NOT NULL DEFAULT 'SYNCED'
        );
        CREATE INDEX IF NOT EXISTS idx_enrollments_instance
            ON enrollments(tracked_entity_instance);

        CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            created TEXT,
            last_updated TEXT,
            status TEXT,
            latitude REAL,
            longitude REAL,
            program TEXT NOT NULL REFERENCES programs(uid) ON DELETE CASCADE,
            program_stage TEXT NOT NULL REFERENCES program_stages(uid) ON DELETE CASCADE,
            organisation_unit TEXT NOT NULL
                REFERENCES organisation_units(uid) ON DELETE CASCADE,
            enrollment TEXT REFERENCES enrollments(uid) ON DELETE CASCADE,
            event_date TEXT,
            completed_date TEXT,
            due_date TEXT,
            state TEXT NOT NULL DEFAULT 'SYNCED'
        );
        CREATE INDEX IF NOT EXISTS idx_events_enrollment ON events(enrollment);

        CREATE TABLE IF NOT EXISTS tracked_entity_data_values (
            event TEXT NOT NULL REFERENCES events(uid) ON DELETE CASCADE,
            data_element TEXT NOT NULL REFERENCES data_elements(uid) ON DELETE CASCADE,
            value TEXT,
            stored_by TEXT,
            provided_elsewhere INTEGER NOT NULL DEFAULT 0,
            created TEXT,
            last_updated TEXT,
            state TEXT NOT NULL DEFAULT 'SYNCED',
            UNIQUE (event, data_element)
        );

        INSERT INTO schema_version (version) VALUES (2);",
    )?;

    tx.commit()?;
    tracing::info!("Migrated database to version 2");
    Ok(())
}

/// Migration to version 3: user roles
fn migrate_v3(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS user_roles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            code TEXT,
            name TEXT,
            display_name TEXT,
            created TEXT,
            last_updated TEXT
        );

        INSERT INTO schema_version (version) VALUES (3);",
    )?;

    tx.commit()?;
    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
