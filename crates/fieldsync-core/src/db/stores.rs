//! Every store of the local mirror, bound to one connection

use rusqlite::Connection;

use super::{Filter, LinkStore, Queryable, RowStore};
use crate::error::Result;
use crate::models::{
    AuthenticatedUserRow, DataElementRow, EnrollmentRow, EventRow, OptionRow, OptionSetRow,
    OrganisationUnitRow, ProgramIndicatorRow, ProgramRow, ProgramStageRow,
    ProgramStageSectionDataElementRow, ProgramStageSectionRow, State, Stateful, Table,
    TrackedEntityAttributeRow, TrackedEntityAttributeValueRow, TrackedEntityDataValueRow,
    TrackedEntityInstanceRow, TrackedEntityRow, UserCredentialsRow, UserOrganisationUnitRow,
    UserRoleRow, UserRow,
};

/// Store handles for one connection or transaction.
///
/// Built per pass and passed by reference to the handlers that need it.
#[derive(Debug, Clone, Copy)]
pub struct Stores<'c> {
    pub organisation_units: RowStore<'c, OrganisationUnitRow>,
    pub option_sets: RowStore<'c, OptionSetRow>,
    pub options: RowStore<'c, OptionRow>,
    pub data_elements: RowStore<'c, DataElementRow>,
    pub tracked_entities: RowStore<'c, TrackedEntityRow>,
    pub tracked_entity_attributes: RowStore<'c, TrackedEntityAttributeRow>,
    pub programs: RowStore<'c, ProgramRow>,
    pub program_stages: RowStore<'c, ProgramStageRow>,
    pub program_stage_sections: RowStore<'c, ProgramStageSectionRow>,
    pub section_data_elements: LinkStore<'c, ProgramStageSectionDataElementRow>,
    pub program_indicators: RowStore<'c, ProgramIndicatorRow>,
    pub users: RowStore<'c, UserRow>,
    pub user_credentials: RowStore<'c, UserCredentialsRow>,
    pub user_roles: RowStore<'c, UserRoleRow>,
    pub user_organisation_units: LinkStore<'c, UserOrganisationUnitRow>,
    pub authenticated_users: RowStore<'c, AuthenticatedUserRow>,
    pub tracked_entity_instances: RowStore<'c, TrackedEntityInstanceRow>,
    pub attribute_values: LinkStore<'c, TrackedEntityAttributeValueRow>,
    pub enrollments: RowStore<'c, EnrollmentRow>,
    pub events: RowStore<'c, EventRow>,
    pub data_values: LinkStore<'c, TrackedEntityDataValueRow>,
}

/// Locally authored rows the server has not accepted yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingRows {
    pub tracked_entity_instances: Vec<TrackedEntityInstanceRow>,
    pub attribute_values: Vec<TrackedEntityAttributeValueRow>,
    pub enrollments: Vec<EnrollmentRow>,
    pub events: Vec<EventRow>,
    pub data_values: Vec<TrackedEntityDataValueRow>,
}

impl PendingRows {
    pub fn len(&self) -> usize {
        self.tracked_entity_instances.len()
            + self.attribute_values.len()
            + self.enrollments.len()
            + self.events.len()
            + self.data_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn pending<M: Stateful>(store: &impl Queryable<M>) -> Result<Vec<M>> {
    store.query(&Filter::new().ne("state", State::Synced))
}

impl<'c> Stores<'c> {
    pub const fn new(conn: &'c Connection) -> Self {
        Self {
            organisation_units: RowStore::new(conn),
            option_sets: RowStore::new(conn),
            options: RowStore::new(conn),
            data_elements: RowStore::new(conn),
            tracked_entities: RowStore::new(conn),
            tracked_entity_attributes: RowStore::new(conn),
            programs: RowStore::new(conn),
            program_stages: RowStore::new(conn),
            program_stage_sections: RowStore::new(conn),
            section_data_elements: LinkStore::new(conn),
            program_indicators: RowStore::new(conn),
            users: RowStore::new(conn),
            user_credentials: RowStore::new(conn),
            user_roles: RowStore::new(conn),
            user_organisation_units: LinkStore::new(conn),
            authenticated_users: RowStore::new(conn),
            tracked_entity_instances: RowStore::new(conn),
            attribute_values: LinkStore::new(conn),
            enrollments: RowStore::new(conn),
            events: RowStore::new(conn),
            data_values: LinkStore::new(conn),
        }
    }

    /// Row count of every table, in schema order.
    pub fn row_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        Ok(vec![
            (OrganisationUnitRow::TABLE, self.organisation_units.count()?),
            (OptionSetRow::TABLE, self.option_sets.count()?),
            (OptionRow::TABLE, self.options.count()?),
            (DataElementRow::TABLE, self.data_elements.count()?),
            (TrackedEntityRow::TABLE, self.tracked_entities.count()?),
            (
                TrackedEntityAttributeRow::TABLE,
                self.tracked_entity_attributes.count()?,
            ),
            (ProgramRow::TABLE, self.programs.count()?),
            (ProgramStageRow::TABLE, self.program_stages.count()?),
            (
                ProgramStageSectionRow::TABLE,
                self.program_stage_sections.count()?,
            ),
            (
                ProgramStageSectionDataElementRow::TABLE,
                self.section_data_elements.count()?,
            ),
            (ProgramIndicatorRow::TABLE, self.program_indicators.count()?),
            (UserRow::TABLE, self.users.count()?),
            (UserCredentialsRow::TABLE, self.user_credentials.count()?),
            (UserRoleRow::TABLE, self.user_roles.count()?),
            (
                UserOrganisationUnitRow::TABLE,
                self.user_organisation_units.count()?,
            ),
            (AuthenticatedUserRow::TABLE, self.authenticated_users.count()?),
            (
                TrackedEntityInstanceRow::TABLE,
                self.tracked_entity_instances.count()?,
            ),
            (
                TrackedEntityAttributeValueRow::TABLE,
                self.attribute_values.count()?,
            ),
            (EnrollmentRow::TABLE, self.enrollments.count()?),
            (EventRow::TABLE, self.events.count()?),
            (TrackedEntityDataValueRow::TABLE, self.data_values.count()?),
        ])
    }

    /// Rows whose state is anything but `SYNCED`.
    pub fn pending(&self) -> Result<PendingRows> {
        Ok(PendingRows {
            tracked_entity_instances: pending(&self.tracked_entity_instances)?,
            attribute_values: pending(&self.attribute_values)?,
            enrollments: pending(&self.enrollments)?,
            events: pending(&self.events)?,
            data_values: pending(&self.data_values)?,
        })
    }
}
