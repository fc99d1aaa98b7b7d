//! Tracker payloads
//!
//! Tracker objects name their identifier after their type
//! (`trackedEntityInstance`, `enrollment`, `event`) rather than `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Syncable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntityInstance {
    #[serde(rename = "trackedEntityInstance")]
    pub uid: String,
    #[serde(default, with = "crate::payload::date")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub org_unit: String,
    #[serde(default)]
    pub tracked_entity: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub attributes: Vec<AttributeValue>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    pub attribute: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, with = "crate::payload::date")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    #[serde(rename = "enrollment")]
    pub uid: String,
    #[serde(default, with = "crate::payload::date")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub org_unit: String,
    #[serde(default)]
    pub program: String,
    #[serde(default, with = "crate::payload::date")]
    pub enrollment_date: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub incident_date: Option<DateTime<Utc>>,
    #[serde(default, rename = "followup")]
    pub follow_up: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "event")]
    pub uid: String,
    #[serde(default, with = "crate::payload::date")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(default)]
    pub program: String,
    #[serde(default)]
    pub program_stage: String,
    #[serde(default)]
    pub org_unit: String,
    /// Set for events inside an enrollment; nested events inherit it from their parent
    #[serde(default)]
    pub enrollment: Option<String>,
    #[serde(default, with = "crate::payload::date")]
    pub event_date: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub data_values: Vec<DataValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataValue {
    pub data_element: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub stored_by: Option<String>,
    #[serde(default)]
    pub provided_elsewhere: bool,
    #[serde(default, with = "crate::payload::date")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted: bool,
}

macro_rules! tracked {
    ($($entity:ty => $key:ident),+ $(,)?) => {
        $(
            impl Syncable for $entity {
                fn uid(&self) -> &str {
                    &self.$key
                }

                fn is_deleted(&self) -> bool {
                    self.deleted
                }
            }
        )+
    };
}

tracked!(
    TrackedEntityInstance => uid,
    Enrollment => uid,
    Event => uid,
    AttributeValue => attribute,
    DataValue => data_element,
);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_instance_with_enrollment_and_events() {
        let json = r#"{
            "trackedEntityInstance": "PQfMcpmXeFE",
            "orgUnit": "DiszpKrYNg8",
            "trackedEntity": "nEenWmSyUEp",
            "lastUpdated": "2017-01-20T10:44:03.222",
            "attributes": [{"attribute": "w75KJ2mc4zz", "value": "Joe"}],
            "enrollments": [{
                "enrollment": "JMgRZyeLWOo",
                "orgUnit": "DiszpKrYNg8",
                "program": "IpHINAT79UW",
                "followup": true,
                "coordinate": {"latitude": 8.0, "longitude": -11.5},
                "events": [{
                    "event": "Zq6Y7gy8vEL",
                    "program": "IpHINAT79UW",
                    "programStage": "A03MvHHogjR",
                    "orgUnit": "DiszpKrYNg8",
                    "dataValues": [{"dataElement": "a3kGcGDCuk6", "value": "12"}]
                }]
            }]
        }"#;

        let instance: TrackedEntityInstance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.uid(), "PQfMcpmXeFE");
        assert_eq!(instance.attributes[0].uid(), "w75KJ2mc4zz");

        let enrollment = &instance.enrollments[0];
        assert!(enrollment.follow_up);
        assert_eq!(
            enrollment.coordinate,
            Some(Coordinate {
                latitude: 8.0,
                longitude: -11.5
            })
        );

        let event = &enrollment.events[0];
        assert_eq!(event.enrollment, None);
        assert_eq!(event.data_values[0].uid(), "a3kGcGDCuk6");
        assert!(!event.is_deleted());
    }
}
