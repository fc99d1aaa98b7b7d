#![allow(dead_code)]

use fieldsync_core::{Batch, Database, Stores};

pub const UNIT: &str = "DiszpKrYNg8";
pub const COUNTRY: &str = "ImspTQPwCqd";
pub const TRACKED_ENTITY: &str = "nEenWmSyUEp";
pub const PROGRAM: &str = "IpHINAT79UW";
pub const STAGE: &str = "A03MvHHogjR";
pub const INSTANCE: &str = "PQfMcpmXeFE";
pub const ENROLLMENT: &str = "JMgRZyeLWOo";
pub const EVENT: &str = "Zq4jYGx5nA9";
pub const SINGLE_EVENT: &str = "V1CerIi3sdL";

/// Metadata plus one enrolled person with one event, and one event without enrollment.
pub const FULL_PAYLOAD: &str = r##"{
  "organisationUnits": [
    {"id": "ImspTQPwCqd", "name": "Sierra Leone", "level": 1, "path": "/ImspTQPwCqd"},
    {"id": "DiszpKrYNg8", "name": "Ngelehun CHC", "level": 4, "parent": {"id": "ImspTQPwCqd"},
     "openingDate": "1970-01-01T00:00:00.000"}
  ],
  "optionSets": [
    {"id": "pC3N9N77UmT", "name": "Gender", "valueType": "TEXT", "options": [
      {"id": "rBvjJYbMCVx", "code": "Male", "name": "Male", "sortOrder": 1},
      {"id": "Mnp3oXrpAbK", "code": "Female", "name": "Female", "sortOrder": 2}
    ]}
  ],
  "dataElements": [
    {"id": "a3kGcGDCuk6", "name": "MCH Apgar Score", "valueType": "NUMBER"}
  ],
  "trackedEntities": [
    {"id": "nEenWmSyUEp", "name": "Person"}
  ],
  "trackedEntityAttributes": [
    {"id": "w75KJ2mc4zz", "name": "First name", "valueType": "TEXT"},
    {"id": "cejWyOfXge6", "name": "Gender", "valueType": "TEXT", "optionSet": {"id": "pC3N9N77UmT"}}
  ],
  "programs": [
    {"id": "IpHINAT79UW", "name": "Child Programme", "programType": "WITH_REGISTRATION",
     "trackedEntity": {"id": "nEenWmSyUEp"},
     "programStages": [
       {"id": "A03MvHHogjR", "name": "Birth", "sortOrder": 1,
        "programStageSections": [
          {"id": "d7ZILSbPgYh", "name": "Vitals",
           "dataElements": [{"id": "a3kGcGDCuk6"}],
           "programIndicators": [
             {"id": "x7PaHGvgWY2", "name": "Apgar", "expression": "#{A03MvHHogjR.a3kGcGDCuk6}"}
           ]}
        ]}
     ]}
  ],
  "trackedEntityInstances": [
    {"trackedEntityInstance": "PQfMcpmXeFE", "orgUnit": "DiszpKrYNg8", "trackedEntity": "nEenWmSyUEp",
     "attributes": [
       {"attribute": "w75KJ2mc4zz", "value": "John"},
       {"attribute": "cejWyOfXge6", "value": "Male"}
     ],
     "enrollments": [
       {"enrollment": "JMgRZyeLWOo", "orgUnit": "DiszpKrYNg8", "program": "IpHINAT79UW",
        "enrollmentDate": "2017-01-20", "status": "ACTIVE",
        "events": [
          {"event": "Zq4jYGx5nA9", "program": "IpHINAT79UW", "programStage": "A03MvHHogjR",
           "orgUnit": "DiszpKrYNg8", "status": "COMPLETED", "eventDate": "2017-01-20T00:00:00.000",
           "dataValues": [{"dataElement": "a3kGcGDCuk6", "value": "8", "storedBy": "admin"}]}
        ]}
     ]}
  ],
  "events": [
    {"event": "V1CerIi3sdL", "program": "IpHINAT79UW", "programStage": "A03MvHHogjR",
     "orgUnit": "DiszpKrYNg8", "eventDate": "2017-02-03"}
  ]
}"##;

pub fn full_batch() -> Batch {
    Batch::from_json(FULL_PAYLOAD).unwrap()
}

pub fn counts(db: &Database) -> Vec<(&'static str, i64)> {
    Stores::new(db.connection()).row_counts().unwrap()
}

pub fn count_of(db: &Database, table: &str) -> i64 {
    counts(db)
        .into_iter()
        .find(|(name, _)| *name == table)
        .map(|(_, count)| count)
        .unwrap()
}
