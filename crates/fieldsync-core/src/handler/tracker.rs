//! Tracker handlers
//!
//! Server writes land as `SYNCED` on insert. Updates never touch the `state`
//! column, so a row with local pending changes keeps its state while its
//! fields take the server's values.

use super::{parent_uid, upsert, Applied, EntityHandler, EntityKind, ReconcileReport};
use crate::db::{Deletable, LinkStore, RowStore, Stores};
use crate::error::Result;
use crate::models::{
    EnrollmentRow, EventRow, LinkKey, LinkRow, State, TrackedEntityAttributeValueRow,
    TrackedEntityDataValueRow, TrackedEntityInstanceRow,
};
use crate::payload::{
    AttributeValue, DataValue, Enrollment, Event, Syncable, TrackedEntityInstance,
};

#[derive(Debug, Clone, Copy)]
pub struct TrackedEntityInstanceHandler<'c> {
    instances: RowStore<'c, TrackedEntityInstanceRow>,
    attributes: AttributeValueHandler<'c>,
    enrollments: EnrollmentHandler<'c>,
}

impl<'c> TrackedEntityInstanceHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            instances: stores.tracked_entity_instances,
            attributes: AttributeValueHandler::new(stores),
            enrollments: EnrollmentHandler::new(stores),
        }
    }
}

impl EntityHandler for TrackedEntityInstanceHandler<'_> {
    type Entity = TrackedEntityInstance;
    const KIND: EntityKind = EntityKind::TrackedEntityInstance;

    fn delete(&self, _parent: Option<&str>, instance: &TrackedEntityInstance) -> Result<usize> {
        self.instances.delete(instance.uid())
    }

    fn write(&self, _parent: Option<&str>, instance: &TrackedEntityInstance) -> Result<Applied> {
        let row = TrackedEntityInstanceRow {
            uid: instance.uid.clone(),
            created: instance.created,
            last_updated: instance.last_updated,
            organisation_unit: instance.org_unit.clone(),
            tracked_entity: instance.tracked_entity.clone(),
            state: State::Synced,
        };
        upsert(&self.instances, &row, instance.uid())
    }

    fn handle_children(
        &self,
        instance: &TrackedEntityInstance,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let uid = Some(instance.uid());
        self.attributes.handle(uid, &instance.attributes, report)?;
        self.enrollments.handle(uid, &instance.enrollments, report)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeValueHandler<'c> {
    values: LinkStore<'c, TrackedEntityAttributeValueRow>,
}

impl<'c> AttributeValueHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            values: stores.attribute_values,
        }
    }
}

impl EntityHandler for AttributeValueHandler<'_> {
    type Entity = AttributeValue;
    const KIND: EntityKind = EntityKind::TrackedEntityAttributeValue;

    fn delete(&self, parent: Option<&str>, value: &AttributeValue) -> Result<usize> {
        self.values
            .delete(LinkKey::new(parent.unwrap_or_default(), &value.attribute))
    }

    fn write(&self, parent: Option<&str>, value: &AttributeValue) -> Result<Applied> {
        let row = TrackedEntityAttributeValueRow {
            tracked_entity_instance: parent_uid(parent),
            tracked_entity_attribute: value.attribute.clone(),
            value: value.value.clone(),
            created: value.created,
            last_updated: value.last_updated,
            state: State::Synced,
        };
        upsert(&self.values, &row, row.key())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnrollmentHandler<'c> {
    enrollments: RowStore<'c, EnrollmentRow>,
    events: EventHandler<'c>,
}

impl<'c> EnrollmentHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            enrollments: stores.enrollments,
            events: EventHandler::new(stores),
        }
    }
}

impl EntityHandler for EnrollmentHandler<'_> {
    type Entity = Enrollment;
    const KIND: EntityKind = EntityKind::Enrollment;

    fn delete(&self, _parent: Option<&str>, enrollment: &Enrollment) -> Result<usize> {
        self.enrollments.delete(enrollment.uid())
    }

    fn write(&self, parent: Option<&str>, enrollment: &Enrollment) -> Result<Applied> {
        let row = EnrollmentRow {
            uid: enrollment.uid.clone(),
            created: enrollment.created,
            last_updated: enrollment.last_updated,
            organisation_unit: enrollment.org_unit.clone(),
            program: enrollment.program.clone(),
            enrollment_date: enrollment.enrollment_date,
            incident_date: enrollment.incident_date,
            follow_up: enrollment.follow_up,
            status: enrollment.status.clone(),
            tracked_entity_instance: parent_uid(parent),
            latitude: enrollment.coordinate.map(|coordinate| coordinate.latitude),
            longitude: enrollment.coordinate.map(|coordinate| coordinate.longitude),
            state: State::Synced,
        };
        upsert(&self.enrollments, &row, enrollment.uid())
    }

    fn handle_children(&self, enrollment: &Enrollment, report: &mut ReconcileReport) -> Result<()> {
        self.events
            .handle(Some(enrollment.uid()), &enrollment.events, report)
    }
}

/// Events, either nested in an enrollment or sent as roots for programs
/// without registration.
#[derive(Debug, Clone, Copy)]
pub struct EventHandler<'c> {
    events: RowStore<'c, EventRow>,
    data_values: DataValueHandler<'c>,
}

impl<'c> EventHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            events: stores.events,
            data_values: DataValueHandler::new(stores),
        }
    }
}

impl EntityHandler for EventHandler<'_> {
    type Entity = Event;
    const KIND: EntityKind = EntityKind::Event;

    fn delete(&self, _parent: Option<&str>, event: &Event) -> Result<usize> {
        self.events.delete(event.uid())
    }

    fn write(&self, parent: Option<&str>, event: &Event) -> Result<Applied> {
        let enrollment = parent
            .map(str::to_string)
            .or_else(|| event.enrollment.clone())
            .filter(|uid| !uid.is_empty());
        let row = EventRow {
            uid: event.uid.clone(),
            created: event.created,
            last_updated: event.last_updated,
            status: event.status.clone(),
            latitude: event.coordinate.map(|coordinate| coordinate.latitude),
            longitude: event.coordinate.map(|coordinate| coordinate.longitude),
            program: event.program.clone(),
            program_stage: event.program_stage.clone(),
            organisation_unit: event.org_unit.clone(),
            enrollment,
            event_date: event.event_date,
            completed_date: event.completed_date,
            due_date: event.due_date,
            state: State::Synced,
        };
        upsert(&self.events, &row, event.uid())
    }

    fn handle_children(&self, event: &Event, report: &mut ReconcileReport) -> Result<()> {
        self.data_values
            .handle(Some(event.uid()), &event.data_values, report)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DataValueHandler<'c> {
    values: LinkStore<'c, TrackedEntityDataValueRow>,
}

impl<'c> DataValueHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            values: stores.data_values,
        }
    }
}

impl EntityHandler for DataValueHandler<'_> {
    type Entity = DataValue;
    const KIND: EntityKind = EntityKind::TrackedEntityDataValue;

    fn delete(&self, parent: Option<&str>, value: &DataValue) -> Result<usize> {
        self.values
            .delete(LinkKey::new(parent.unwrap_or_default(), &value.data_element))
    }

    fn write(&self, parent: Option<&str>, value: &DataValue) -> Result<Applied> {
        let row = TrackedEntityDataValueRow {
            event: parent_uid(parent),
            data_element: value.data_element.clone(),
            value: value.value.clone(),
            stored_by: value.stored_by.clone(),
            provided_elsewhere: value.provided_elsewhere,
            created: value.created,
            last_updated: value.last_updated,
            state: State::Synced,
        };
        upsert(&self.values, &row, row.key())
    }
}
