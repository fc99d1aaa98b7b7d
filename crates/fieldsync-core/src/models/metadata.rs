//! Metadata rows: organisation units, option sets, data elements, programs

use chrono::{DateTime, Utc};
use rusqlite::{params, ToSql};

use super::{require, Identifiable, LinkKey, LinkRow, Table};
use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganisationUnitRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub short_name: Option<String>,
    pub path: Option<String>,
    pub level: Option<i32>,
    pub opening_date: Option<DateTime<Utc>>,
    pub closed_date: Option<DateTime<Utc>>,
    /// Parent unit UID; not a foreign key since the parent may be outside the user's scope
    pub parent: Option<String>,
}

impl Table for OrganisationUnitRow {
    const TABLE: &'static str = "organisation_units";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "short_name",
        "path",
        "level",
        "opening_date",
        "closed_date",
        "parent",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.short_name,
            self.path,
            self.level,
            self.opening_date,
            self.closed_date,
            self.parent,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            short_name: row.get(6)?,
            path: row.get(7)?,
            level: row.get(8)?,
            opening_date: row.get(9)?,
            closed_date: row.get(10)?,
            parent: row.get(11)?,
        })
    }
}

impl Identifiable for OrganisationUnitRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSetRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub version: Option<i32>,
    pub value_type: Option<String>,
}

impl Table for OptionSetRow {
    const TABLE: &'static str = "option_sets";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "version",
        "value_type",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.version,
            self.value_type,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            version: row.get(6)?,
            value_type: row.get(7)?,
        })
    }
}

impl Identifiable for OptionSetRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub sort_order: Option<i32>,
    pub option_set: String,
}

impl Table for OptionRow {
    const TABLE: &'static str = "options";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "sort_order",
        "option_set",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)?;
        require(Self::TABLE, "option_set", &self.option_set)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.sort_order,
            self.option_set,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            sort_order: row.get(6)?,
            option_set: row.get(7)?,
        })
    }
}

impl Identifiable for OptionRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataElementRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub short_name: Option<String>,
    pub value_type: Option<String>,
    pub zero_is_significant: bool,
    pub aggregation_type: Option<String>,
    pub form_name: Option<String>,
    pub domain_type: Option<String>,
    pub option_set: Option<String>,
}

impl Table for DataElementRow {
    const TABLE: &'static str = "data_elements";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "short_name",
        "value_type",
        "zero_is_significant",
        "aggregation_type",
        "form_name",
        "domain_type",
        "option_set",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.short_name,
            self.value_type,
            self.zero_is_significant,
            self.aggregation_type,
            self.form_name,
            self.domain_type,
            self.option_set,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            short_name: row.get(6)?,
            value_type: row.get(7)?,
            zero_is_significant: row.get(8)?,
            aggregation_type: row.get(9)?,
            form_name: row.get(10)?,
            domain_type: row.get(11)?,
            option_set: row.get(12)?,
        })
    }
}

impl Identifiable for DataElementRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedEntityRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl Table for TrackedEntityRow {
    const TABLE: &'static str = "tracked_entities";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "description",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.description,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            description: row.get(6)?,
        })
    }
}

impl Identifiable for TrackedEntityRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct TrackedEntityAttributeRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub short_name: Option<String>,
    pub value_type: Option<String>,
    pub option_set: Option<String>,
    pub pattern: Option<String>,
    pub expression: Option<String>,
    pub search_scope: Option<String>,
    pub generated: bool,
    pub is_unique: bool,
    pub inherit: bool,
    pub program_scope: bool,
    pub orgunit_scope: bool,
    pub display_in_list_no_program: bool,
}

impl Table for TrackedEntityAttributeRow {
    const TABLE: &'static str = "tracked_entity_attributes";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "short_name",
        "value_type",
        "option_set",
        "pattern",
        "expression",
        "search_scope",
        "is_generated",
        "is_unique",
        "inherit",
        "program_scope",
        "orgunit_scope",
        "display_in_list_no_program",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.short_name,
            self.value_type,
            self.option_set,
            self.pattern,
            self.expression,
            self.search_scope,
            self.generated,
            self.is_unique,
            self.inherit,
            self.program_scope,
            self.orgunit_scope,
            self.display_in_list_no_program,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            short_name: row.get(6)?,
            value_type: row.get(7)?,
            option_set: row.get(8)?,
            pattern: row.get(9)?,
            expression: row.get(10)?,
            search_scope: row.get(11)?,
            generated: row.get(12)?,
            is_unique: row.get(13)?,
            inherit: row.get(14)?,
            program_scope: row.get(15)?,
            orgunit_scope: row.get(16)?,
            display_in_list_no_program: row.get(17)?,
        })
    }
}

impl Identifiable for TrackedEntityAttributeRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub short_name: Option<String>,
    pub version: Option<i32>,
    pub program_type: Option<String>,
    pub only_enroll_once: bool,
    pub tracked_entity: Option<String>,
}

impl Table for ProgramRow {
    const TABLE: &'static str = "programs";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "short_name",
        "version",
        "program_type",
        "only_enroll_once",
        "tracked_entity",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.short_name,
            self.version,
            self.program_type,
            self.only_enroll_once,
            self.tracked_entity,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            short_name: row.get(6)?,
            version: row.get(7)?,
            program_type: row.get(8)?,
            only_enroll_once: row.get(9)?,
            tracked_entity: row.get(10)?,
        })
    }
}

impl Identifiable for ProgramRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramStageRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub sort_order: Option<i32>,
    pub repeatable: bool,
    pub execution_date_label: Option<String>,
    pub min_days_from_start: Option<i32>,
    pub program: String,
}

impl Table for ProgramStageRow {
    const TABLE: &'static str = "program_stages";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "sort_order",
        "repeatable",
        "execution_date_label",
        "min_days_from_start",
        "program",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)?;
        require(Self::TABLE, "program", &self.program)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.sort_order,
            self.repeatable,
            self.execution_date_label,
            self.min_days_from_start,
            self.program,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            sort_order: row.get(6)?,
            repeatable: row.get(7)?,
            execution_date_label: row.get(8)?,
            min_days_from_start: row.get(9)?,
            program: row.get(10)?,
        })
    }
}

impl Identifiable for ProgramStageRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramStageSectionRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub sort_order: Option<i32>,
    pub program_stage: String,
}

impl Table for ProgramStageSectionRow {
    const TABLE: &'static str = "program_stage_sections";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "sort_order",
        "program_stage",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)?;
        require(Self::TABLE, "program_stage", &self.program_stage)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.sort_order,
            self.program_stage,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            sort_order: row.get(6)?,
            program_stage: row.get(7)?,
        })
    }
}

impl Identifiable for ProgramStageSectionRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}

/// Section ↔ data element association.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramStageSectionDataElementRow {
    pub program_stage_section: String,
    pub data_element: String,
}

impl Table for ProgramStageSectionDataElementRow {
    const TABLE: &'static str = "program_stage_section_data_elements";
    const COLUMNS: &'static [&'static str] = &["program_stage_section", "data_element"];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "program_stage_section", &self.program_stage_section)?;
        require(Self::TABLE, "data_element", &self.data_element)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![self.program_stage_section, self.data_element].to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            program_stage_section: row.get(0)?,
            data_element: row.get(1)?,
        })
    }
}

impl LinkRow for ProgramStageSectionDataElementRow {
    const KEY: [&'static str; 2] = ["program_stage_section", "data_element"];

    fn key(&self) -> LinkKey<'_> {
        LinkKey::new(&self.program_stage_section, &self.data_element)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramIndicatorRow {
    pub uid: String,
    pub code: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub expression: Option<String>,
    pub filter: Option<String>,
    pub decimals: Option<i32>,
    pub display_in_form: bool,
    pub program_stage_section: String,
}

impl Table for ProgramIndicatorRow {
    const TABLE: &'static str = "program_indicators";
    const COLUMNS: &'static [&'static str] = &[
        "uid",
        "code",
        "name",
        "display_name",
        "created",
        "last_updated",
        "expression",
        "filter_expression",
        "decimals",
        "display_in_form",
        "program_stage_section",
    ];

    fn validate(&self) -> Result<()> {
        require(Self::TABLE, "uid", &self.uid)?;
        require(Self::TABLE, "program_stage_section", &self.program_stage_section)
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        params![
            self.uid,
            self.code,
            self.name,
            self.display_name,
            self.created,
            self.last_updated,
            self.expression,
            self.filter,
            self.decimals,
            self.display_in_form,
            self.program_stage_section,
        ]
        .to_vec()
    }

    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            uid: row.get(0)?,
            code: row.get(1)?,
            name: row.get(2)?,
            display_name: row.get(3)?,
            created: row.get(4)?,
            last_updated: row.get(5)?,
            expression: row.get(6)?,
            filter: row.get(7)?,
            decimals: row.get(8)?,
            display_in_form: row.get(9)?,
            program_stage_section: row.get(10)?,
        })
    }
}

impl Identifiable for ProgramIndicatorRow {
    fn uid(&self) -> &str {
        &self.uid
    }
}
