use super::{parent_uid, upsert, Applied, EntityHandler, EntityKind, ReconcileReport};
use crate::db::{Deletable, LinkStore, RowStore, Stores};
use crate::error::Result;
use crate::models::{
    DataElementRow, LinkKey, LinkRow, OptionRow, OptionSetRow, OrganisationUnitRow,
    ProgramIndicatorRow, ProgramRow, ProgramStageRow, ProgramStageSectionDataElementRow,
    ProgramStageSectionRow, TrackedEntityAttributeRow, TrackedEntityRow,
};
use crate::payload::{
    ref_uid, DataElement, ObjectRef, OptionItem, OptionSet, OrganisationUnit, Program,
    ProgramIndicator, ProgramStage, ProgramStageSection, Syncable, TrackedEntity,
    TrackedEntityAttribute,
};

#[derive(Debug, Clone, Copy)]
pub struct OrganisationUnitHandler<'c> {
    units: RowStore<'c, OrganisationUnitRow>,
}

impl<'c> OrganisationUnitHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            units: stores.organisation_units,
        }
    }
}

impl EntityHandler for OrganisationUnitHandler<'_> {
    type Entity = OrganisationUnit;
    const KIND: EntityKind = EntityKind::OrganisationUnit;

    fn delete(&self, _parent: Option<&str>, unit: &OrganisationUnit) -> Result<usize> {
        self.units.delete(unit.uid())
    }

    fn write(&self, _parent: Option<&str>, unit: &OrganisationUnit) -> Result<Applied> {
        let identity = &unit.identity;
        let row = OrganisationUnitRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            short_name: unit.short_name.clone(),
            path: unit.path.clone(),
            level: unit.level,
            opening_date: unit.opening_date,
            closed_date: unit.closed_date,
            parent: ref_uid(unit.parent.as_ref()),
        };
        upsert(&self.units, &row, unit.uid())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OptionSetHandler<'c> {
    option_sets: RowStore<'c, OptionSetRow>,
    options: OptionHandler<'c>,
}

impl<'c> OptionSetHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            option_sets: stores.option_sets,
            options: OptionHandler::new(stores),
        }
    }
}

impl EntityHandler for OptionSetHandler<'_> {
    type Entity = OptionSet;
    const KIND: EntityKind = EntityKind::OptionSet;

    fn delete(&self, _parent: Option<&str>, set: &OptionSet) -> Result<usize> {
        self.option_sets.delete(set.uid())
    }

    fn write(&self, _parent: Option<&str>, set: &OptionSet) -> Result<Applied> {
        let identity = &set.identity;
        let row = OptionSetRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            version: set.version,
            value_type: set.value_type.clone(),
        };
        upsert(&self.option_sets, &row, set.uid())
    }

    fn handle_children(&self, set: &OptionSet, report: &mut ReconcileReport) -> Result<()> {
        self.options.handle(Some(set.uid()), &set.options, report)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OptionHandler<'c> {
    options: RowStore<'c, OptionRow>,
}

impl<'c> OptionHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            options: stores.options,
        }
    }
}

impl EntityHandler for OptionHandler<'_> {
    type Entity = OptionItem;
    const KIND: EntityKind = EntityKind::OptionItem;

    fn delete(&self, _parent: Option<&str>, option: &OptionItem) -> Result<usize> {
        self.options.delete(option.uid())
    }

    fn write(&self, parent: Option<&str>, option: &OptionItem) -> Result<Applied> {
        let identity = &option.identity;
        let row = OptionRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            sort_order: option.sort_order,
            option_set: parent_uid(parent),
        };
        upsert(&self.options, &row, option.uid())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DataElementHandler<'c> {
    data_elements: RowStore<'c, DataElementRow>,
}

impl<'c> DataElementHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            data_elements: stores.data_elements,
        }
    }
}

impl EntityHandler for DataElementHandler<'_> {
    type Entity = DataElement;
    const KIND: EntityKind = EntityKind::DataElement;

    fn delete(&self, _parent: Option<&str>, element: &DataElement) -> Result<usize> {
        self.data_elements.delete(element.uid())
    }

    fn write(&self, _parent: Option<&str>, element: &DataElement) -> Result<Applied> {
        let identity = &element.identity;
        let row = DataElementRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            short_name: element.short_name.clone(),
            value_type: element.value_type.clone(),
            zero_is_significant: element.zero_is_significant,
            aggregation_type: element.aggregation_type.clone(),
            form_name: element.form_name.clone(),
            domain_type: element.domain_type.clone(),
            option_set: ref_uid(element.option_set.as_ref()),
        };
        upsert(&self.data_elements, &row, element.uid())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackedEntityHandler<'c> {
    tracked_entities: RowStore<'c, TrackedEntityRow>,
}

impl<'c> TrackedEntityHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            tracked_entities: stores.tracked_entities,
        }
    }
}

impl EntityHandler for TrackedEntityHandler<'_> {
    type Entity = TrackedEntity;
    const KIND: EntityKind = EntityKind::TrackedEntity;

    fn delete(&self, _parent: Option<&str>, entity: &TrackedEntity) -> Result<usize> {
        self.tracked_entities.delete(entity.uid())
    }

    fn write(&self, _parent: Option<&str>, entity: &TrackedEntity) -> Result<Applied> {
        let identity = &entity.identity;
        let row = TrackedEntityRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            description: entity.description.clone(),
        };
        upsert(&self.tracked_entities, &row, entity.uid())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrackedEntityAttributeHandler<'c> {
    attributes: RowStore<'c, TrackedEntityAttributeRow>,
}

impl<'c> TrackedEntityAttributeHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            attributes: stores.tracked_entity_attributes,
        }
    }
}

impl EntityHandler for TrackedEntityAttributeHandler<'_> {
    type Entity = TrackedEntityAttribute;
    const KIND: EntityKind = EntityKind::TrackedEntityAttribute;

    fn delete(&self, _parent: Option<&str>, attribute: &TrackedEntityAttribute) -> Result<usize> {
        self.attributes.delete(attribute.uid())
    }

    fn write(&self, _parent: Option<&str>, attribute: &TrackedEntityAttribute) -> Result<Applied> {
        let identity = &attribute.identity;
        let row = TrackedEntityAttributeRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            short_name: attribute.short_name.clone(),
            value_type: attribute.value_type.clone(),
            option_set: ref_uid(attribute.option_set.as_ref()),
            pattern: attribute.pattern.clone(),
            expression: attribute.expression.clone(),
            search_scope: attribute.search_scope.clone(),
            generated: attribute.generated,
            is_unique: attribute.unique,
            inherit: attribute.inherit,
            program_scope: attribute.program_scope,
            orgunit_scope: attribute.orgunit_scope,
            display_in_list_no_program: attribute.display_in_list_no_program,
        };
        upsert(&self.attributes, &row, attribute.uid())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgramHandler<'c> {
    programs: RowStore<'c, ProgramRow>,
    stages: ProgramStageHandler<'c>,
}

impl<'c> ProgramHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            programs: stores.programs,
            stages: ProgramStageHandler::new(stores),
        }
    }
}

impl EntityHandler for ProgramHandler<'_> {
    type Entity = Program;
    const KIND: EntityKind = EntityKind::Program;

    fn delete(&self, _parent: Option<&str>, program: &Program) -> Result<usize> {
        self.programs.delete(program.uid())
    }

    fn write(&self, _parent: Option<&str>, program: &Program) -> Result<Applied> {
        let identity = &program.identity;
        let row = ProgramRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            short_name: program.short_name.clone(),
            version: program.version,
            program_type: program.program_type.clone(),
            only_enroll_once: program.only_enroll_once,
            tracked_entity: ref_uid(program.tracked_entity.as_ref()),
        };
        upsert(&self.programs, &row, program.uid())
    }

    fn handle_children(&self, program: &Program, report: &mut ReconcileReport) -> Result<()> {
        self.stages
            .handle(Some(program.uid()), &program.program_stages, report)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgramStageHandler<'c> {
    stages: RowStore<'c, ProgramStageRow>,
    sections: ProgramStageSectionHandler<'c>,
}

impl<'c> ProgramStageHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            stages: stores.program_stages,
            sections: ProgramStageSectionHandler::new(stores),
        }
    }
}

impl EntityHandler for ProgramStageHandler<'_> {
    type Entity = ProgramStage;
    const KIND: EntityKind = EntityKind::ProgramStage;

    fn delete(&self, _parent: Option<&str>, stage: &ProgramStage) -> Result<usize> {
        self.stages.delete(stage.uid())
    }

    fn write(&self, parent: Option<&str>, stage: &ProgramStage) -> Result<Applied> {
        let identity = &stage.identity;
        let row = ProgramStageRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            sort_order: stage.sort_order,
            repeatable: stage.repeatable,
            execution_date_label: stage.execution_date_label.clone(),
            min_days_from_start: stage.min_days_from_start,
            program: parent_uid(parent),
        };
        upsert(&self.stages, &row, stage.uid())
    }

    fn handle_children(&self, stage: &ProgramStage, report: &mut ReconcileReport) -> Result<()> {
        self.sections
            .handle(Some(stage.uid()), &stage.program_stage_sections, report)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgramStageSectionHandler<'c> {
    sections: RowStore<'c, ProgramStageSectionRow>,
    data_elements: SectionDataElementHandler<'c>,
    indicators: ProgramIndicatorHandler<'c>,
}

impl<'c> ProgramStageSectionHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            sections: stores.program_stage_sections,
            data_elements: SectionDataElementHandler::new(stores),
            indicators: ProgramIndicatorHandler::new(stores),
        }
    }
}

impl EntityHandler for ProgramStageSectionHandler<'_> {
    type Entity = ProgramStageSection;
    const KIND: EntityKind = EntityKind::ProgramStageSection;

    fn delete(&self, _parent: Option<&str>, section: &ProgramStageSection) -> Result<usize> {
        self.sections.delete(section.uid())
    }

    fn write(&self, parent: Option<&str>, section: &ProgramStageSection) -> Result<Applied> {
        let identity = &section.identity;
        let row = ProgramStageSectionRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            sort_order: section.sort_order,
            program_stage: parent_uid(parent),
        };
        upsert(&self.sections, &row, section.uid())
    }

    fn handle_children(
        &self,
        section: &ProgramStageSection,
        report: &mut ReconcileReport,
    ) -> Result<()> {
        let uid = Some(section.uid());
        self.data_elements
            .handle(uid, &section.data_elements, report)?;
        self.indicators
            .handle(uid, &section.program_indicators, report)
    }
}

/// Links a section to the data elements it shows.
#[derive(Debug, Clone, Copy)]
pub struct SectionDataElementHandler<'c> {
    links: LinkStore<'c, ProgramStageSectionDataElementRow>,
}

impl<'c> SectionDataElementHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            links: stores.section_data_elements,
        }
    }
}

impl EntityHandler for SectionDataElementHandler<'_> {
    type Entity = ObjectRef;
    const KIND: EntityKind = EntityKind::ProgramStageSectionDataElement;

    fn delete(&self, parent: Option<&str>, element: &ObjectRef) -> Result<usize> {
        self.links
            .delete(LinkKey::new(parent.unwrap_or_default(), &element.id))
    }

    fn write(&self, parent: Option<&str>, element: &ObjectRef) -> Result<Applied> {
        let row = ProgramStageSectionDataElementRow {
            program_stage_section: parent_uid(parent),
            data_element: element.id.clone(),
        };
        upsert(&self.links, &row, row.key())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ProgramIndicatorHandler<'c> {
    indicators: RowStore<'c, ProgramIndicatorRow>,
}

impl<'c> ProgramIndicatorHandler<'c> {
    pub const fn new(stores: &Stores<'c>) -> Self {
        Self {
            indicators: stores.program_indicators,
        }
    }
}

impl EntityHandler for ProgramIndicatorHandler<'_> {
    type Entity = ProgramIndicator;
    const KIND: EntityKind = EntityKind::ProgramIndicator;

    fn delete(&self, _parent: Option<&str>, indicator: &ProgramIndicator) -> Result<usize> {
        self.indicators.delete(indicator.uid())
    }

    fn write(&self, parent: Option<&str>, indicator: &ProgramIndicator) -> Result<Applied> {
        let identity = &indicator.identity;
        let row = ProgramIndicatorRow {
            uid: identity.uid.clone(),
            code: identity.code.clone(),
            name: identity.name.clone(),
            display_name: identity.display_name.clone(),
            created: identity.created,
            last_updated: identity.last_updated,
            expression: indicator.expression.clone(),
            filter: indicator.filter.clone(),
            decimals: indicator.decimals,
            display_in_form: indicator.display_in_form,
            program_stage_section: parent_uid(parent),
        };
        upsert(&self.indicators, &row, indicator.uid())
    }
}
