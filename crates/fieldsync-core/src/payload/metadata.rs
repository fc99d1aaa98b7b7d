use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{identified, Identity, ObjectRef, Syncable};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationUnit {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default, with = "crate::payload::date")]
    pub opening_date: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::payload::date")]
    pub closed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent: Option<ObjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionSet {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub value_type: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionItem>,
}

/// One choice of an [`OptionSet`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataElement {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub value_type: Option<String>,
    #[serde(default)]
    pub zero_is_significant: bool,
    #[serde(default)]
    pub aggregation_type: Option<String>,
    #[serde(default)]
    pub form_name: Option<String>,
    #[serde(default)]
    pub domain_type: Option<String>,
    #[serde(default)]
    pub option_set: Option<ObjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntity {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedEntityAttribute {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub value_type: Option<String>,
    #[serde(default)]
    pub option_set: Option<ObjectRef>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub search_scope: Option<String>,
    #[serde(default)]
    pub generated: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub inherit: bool,
    #[serde(default)]
    pub program_scope: bool,
    #[serde(default)]
    pub orgunit_scope: bool,
    #[serde(default)]
    pub display_in_list_no_program: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Program {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
    #[serde(default)]
    pub program_type: Option<String>,
    #[serde(default)]
    pub only_enroll_once: bool,
    #[serde(default)]
    pub tracked_entity: Option<ObjectRef>,
    #[serde(default)]
    pub program_stages: Vec<ProgramStage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramStage {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub execution_date_label: Option<String>,
    #[serde(default)]
    pub min_days_from_start: Option<i32>,
    #[serde(default)]
    pub program_stage_sections: Vec<ProgramStageSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramStageSection {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub sort_order: Option<i32>,
    /// Linked, not owned: the data elements themselves arrive as roots
    #[serde(default)]
    pub data_elements: Vec<ObjectRef>,
    #[serde(default)]
    pub program_indicators: Vec<ProgramIndicator>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramIndicator {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub decimals: Option<i32>,
    #[serde(default)]
    pub display_in_form: bool,
}

identified!(
    OrganisationUnit,
    OptionSet,
    OptionItem,
    DataElement,
    TrackedEntity,
    TrackedEntityAttribute,
    Program,
    ProgramStage,
    ProgramStageSection,
    ProgramIndicator,
);

impl Syncable for ObjectRef {
    fn uid(&self) -> &str {
        &self.id
    }

    fn is_deleted(&self) -> bool {
        false
    }
}
