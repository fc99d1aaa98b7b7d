//! Tracker data rows; these can be authored locally and carry a [`State`]

use chrono::{DateTime, Utc};
use rusqlite::{params, ToSql};

use super::{require, Identifiable, LinkKey, LinkRow, State, Stateful, Table};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedEntityInstanceRow {
    pub uid: String,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub organisation_unit: String,
    pub tracked_entity: String,
    pub state: State,
}

impl Table for TrackedEntityInstanceRow {
    const TABLE: &'static str = "tracked_entity_instances";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "created",
        "last_updated",
        "organisation_unit",
        "tracked_entity",
        "state",
    ];
    const PRESERVED_ON_UPDATE: &'static [&'static str] = &["state"];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)?;
        require(Self::TABLE, "organisation_unit", &self.organisation_unit)?;
        require(Self::TABLE, "tracked_entity", &self.tracked_entity)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.created,
            self.last_updated,
            self.organisation_unit,
            self.tracked_entity,
            self.state,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            created: row.get(1)?,
            last_updated: row.get(2)?,
            organisation_unit: row.get(3)?,
            tracked_entity: row.get(4)?,
            state: row.get(5)?,
        })
    }
}

impl Identifiable for TrackedEntityInstanceRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

impl Stateful for TrackedEntityInstanceRow {
    fn state(&self) -> State {
        self.state
    }

    fn set_state(&mut self, state: State) {
        self.state = state;
    }
}

/// Attribute value of a tracked entity instance, keyed by (instance, attribute).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedEntityAttributeValueRow {
    pub tracked_entity_instance: String,
    pub tracked_entity_attribute: String,
    pub value: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub state: State,
}

impl Table for TrackedEntityAttributeValueRow {
    const TABLE: &'static str = "tracked_entity_attribute_values";
    const COLUMNS: &'static [&'static str] = &[
        "tracked_entity_instance",
        "tracked_entity_attribute",
        "value",
        "created",
        "last_updated",
        "state",
    ];
    const PRESERVED_ON_UPDATE: &'static [&'static str] = &["state"];

    fn validate(&self) -> Result<()> {
        require(
            Self::TABLE,
            "tracked_entity_instance",
            &self.tracked_entity_instance,
        )?;
        require(
            Self::TABLE,
            "tracked_entity_attribute",
            &self.tracked_entity_attribute,
        )
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.tracked_entity_instance,
            self.tracked_entity_attribute,
            self.value,
            self.created,
            self.last_updated,
            self.state,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            tracked_entity_instance: row.get(0)?,
            tracked_entity_attribute: row.get(1)?,
            value: row.get(2)?,
            created: row.get(3)?,
            last_updated: row.get(4)?,
            state: row.get(5)?,
        })
    }
}

impl LinkRow for TrackedEntityAttributeValueRow {
    const KEY: [&'static str; 2] = ["tracked_entity_instance", "tracked_entity_attribute"];

    fn key(&self) -> LinkKey<'_> {
        LinkKey::new(&self.tracked_entity_instance, &self.tracked_entity_attribute)
    }
}

impl Stateful for TrackedEntityAttributeValueRow {
    fn state(&self) -> State {
        self.state
    }

    fn set_state(&mut self, state: State) {
        self.state = state;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrollmentRow {
    pub uid: String,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub organisation_unit: String,
    pub program: String,
    pub enrollment_date: Option<DateTime<Utc>>,
    pub incident_date: Option<DateTime<Utc>>,
    pub follow_up: bool,
    pub status: Option<String>,
    pub tracked_entity_instance: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub state: State,
}

impl Table for EnrollmentRow {
    const TABLE: &'static str = "enrollments";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "created",
        "last_updated",
        "organisation_unit",
        "program",
        "enrollment_date",
        "incident_date",
        "follow_up",
        "status",
        "tracked_entity_instance",
        "latitude",
        "longitude",
        "state",
    ];
    const PRESERVED_ON_UPDATE: &'static [&'static str] = &["state"];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)?;
        require(Self::TABLE, "organisation_unit", &self.organisation_unit)?;
        require(Self::TABLE, "program", &self.program)?;
        require(
            Self::TABLE,
            "tracked_entity_instance",
            &self.tracked_entity_instance,
        )
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.created,
            self.last_updated,
            self.organisation_unit,
            self.program,
            self.enrollment_date,
            self.incident_date,
            self.follow_up,
            self.status,
            self.tracked_entity_instance,
            self.latitude,
            self.longitude,
            self.state,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            created: row.get(1)?,
            last_updated: row.get(2)?,
            organisation_unit: row.get(3)?,
            program: row.get(4)?,
            enrollment_date: row.get(5)?,
            incident_date: row.get(6)?,
            follow_up: row.get(7)?,
            status: row.get(8)?,
            tracked_entity_instance: row.get(9)?,
            latitude: row.get(10)?,
            longitude: row.get(11)?,
            state: row.get(12)?,
        })
    }
}

impl Identifiable for EnrollmentRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

impl Stateful for EnrollmentRow {
    fn state(&self) -> State {
        self.state
    }

    fn set_state(&mut self, state: State) {
        self.state = state;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRow {
    pub uid: String,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub program: String,
    pub program_stage: String,
    pub organisation_unit: String,
    /// Absent for events of programs without registration
    pub enrollment: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub state: State,
}

impl Table for EventRow {
    const TABLE: &'static str = "events";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "created",
        "last_updated",
        "status",
        "latitude",
        "longitude",
        "program",
        "program_stage",
        "organisation_unit",
        "enrollment",
        "event_date",
        "completed_date",
        "due_date",
        "state",
    ];
    const PRESERVED_ON_UPDATE: &'static [&'static str] = &["state"];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)?;
        require(Self::TABLE, "program", &self.program)?;
        require(Self::TABLE, "program_stage", &self.program_stage)?;
        require(Self::TABLE, "organisation_unit", &self.organisation_unit)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.created,
            self.last_updated,
            self.status,
            self.latitude,
            self.longitude,
            self.program,
            self.program_stage,
            self.organisation_unit,
            self.enrollment,
            self.event_date,
            self.completed_date,
            self.due_date,
            self.state,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            created: row.get(1)?,
            last_updated: row.get(2)?,
            status: row.get(3)?,
            latitude: row.get(4)?,
            longitude: row.get(5)?,
            program: row.get(6)?,
            program_stage: row.get(7)?,
            organisation_unit: row.get(8)?,
            enrollment: row.get(9)?,
            event_date: row.get(10)?,
            completed_date: row.get(11)?,
            due_date: row.get(12)?,
            state: row.get(13)?,
        })
    }
}

impl Identifiable for EventRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

impl Stateful for EventRow {
    fn state(&self) -> State {
        self.state
    }

    fn set_state(&mut self, state: State) {
        self.state = state;
    }
}

/// Data value captured in an event, keyed by (event, data element).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedEntityDataValueRow {
    pub event: String,
    pub data_element: String,
    pub value: Option<String>,
    pub stored_by: Option<String>,
    pub provided_elsewhere: bool,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub state: State,
}

impl Table for TrackedEntityDataValueRow {
    const TABLE: &'static str = "tracked_entity_data_values";
    const COLUMNS: &'static [&'static str] = &[
        "event",
        "data_element",
        "value",
        "stored_by",
        "provided_elsewhere",
        "created",
        "last_updated",
        "state",
    ];
    const PRESERVED_ON_UPDATE: &'static [&'static str] = &["state"];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "event", &self.event)?;
        require(Self::TABLE, "data_element", &self.data_element)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.event,
            self.data_element,
            self.value,
            self.stored_by,
            self.provided_elsewhere,
            self.created,
            self.last_updated,
            self.state,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            event: row.get(0)?,
            data_element: row.get(1)?,
            value: row.get(2)?,
            stored_by: row.get(3)?,
            provided_elsewhere: row.get(4)?,
            created: row.get(5)?,
            last_updated: row.get(6)?,
            state: row.get(7)?,
        })
    }
}

impl LinkRow for TrackedEntityDataValueRow {
    const KEY: [&'static str; 2] = ["event", "data_element"];

    fn key(&self) -> LinkKey<'_> {
        LinkKey::new(&self.event, &self.data_element)
    }
}

impl Stateful for TrackedEntityDataValueRow {
    fn state(&self) -> State {
        self.state
    }

    fn set_state(&mut self, state: State) {
        self.state = state;
    }
}
