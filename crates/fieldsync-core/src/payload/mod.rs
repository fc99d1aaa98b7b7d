//! Decoded server payloads
//!
//! A [`Batch`] is the entity graph one reconciliation pass applies. Field
//! names follow the server's JSON: `id` for the UID, camelCase elsewhere,
//! nested child collections, and an optional `deleted` marker.

pub mod date;
mod metadata;
mod tracker;
mod user;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use metadata::{
    DataElement, OptionItem, OptionSet, OrganisationUnit, Program, ProgramIndicator,
    ProgramStage, ProgramStageSection, TrackedEntity, TrackedEntityAttribute,
};
pub use tracker::{AttributeValue, Coordinate, DataValue, Enrollment, Event, TrackedEntityInstance};
pub use user::{User, UserCredentials, UserRole};

/// Anything the server sends with an identity and a deletion marker.
pub trait Syncable {
    fn uid(&self) -> &str;

    fn is_deleted(&self) -> bool;
}

/// Attributes shared by every metadata object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "id")]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, with = "date", skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "date", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }
}

/// Reference to another object by UID, `{"id": "..."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
}

impl ObjectRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

pub(crate) fn ref_uid(reference: Option<&ObjectRef>) -> Option<String> {
    reference
        .map(|reference| reference.id.clone())
        .filter(|uid| !uid.is_empty())
}

macro_rules! identified {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl Syncable for $entity {
                fn uid(&self) -> &str {
                    &self.identity.uid
                }

                fn is_deleted(&self) -> bool {
                    self.identity.deleted
                }
            }
        )+
    };
}

pub(crate) use identified;

/// One pass worth of server entities, by root type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Batch {
    pub organisation_units: Vec<OrganisationUnit>,
    pub option_sets: Vec<OptionSet>,
    pub data_elements: Vec<DataElement>,
    pub tracked_entities: Vec<TrackedEntity>,
    pub tracked_entity_attributes: Vec<TrackedEntityAttribute>,
    pub programs: Vec<Program>,
    pub users: Vec<User>,
    pub tracked_entity_instances: Vec<TrackedEntityInstance>,
    /// Events outside any enrollment
    pub events: Vec<Event>,
}

impl Batch {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Number of root entities.
    pub fn len(&self) -> usize {
        self.organisation_units.len()
            + self.option_sets.len()
            + self.data_elements.len()
            + self.tracked_entities.len()
            + self.tracked_entity_attributes.len()
            + self.programs.len()
            + self.users.len()
            + self.tracked_entity_instances.len()
            + self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
