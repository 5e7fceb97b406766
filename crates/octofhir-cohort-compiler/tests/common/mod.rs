//! Common test utilities for compiler testing
//!
//! This module provides shared testing infrastructure including:
//! - Mock entity and population resolvers
//! - Sample criteria trees and populations
//! - Compiler construction

#![allow(dead_code)]

pub mod mocks;

pub use mocks::*;

use chrono::NaiveDate;
use octofhir_cohort_compiler::{CompilerOptions, PopulationRecord, PopulationSource, QueryCompiler};
use octofhir_cohort_model::{
    Comparator, CriteriaGroup, CriteriaTree, CriterionId, CriterionKind, DataValue, DateRange, GroupId, GroupKind,
    LabelItem, OCCURRENCE_FIELD, TemporalConstraint, TemporalConstraintType, TemporalIdList,
};
use std::sync::Arc;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn open_population() -> PopulationRecord {
    PopulationRecord::new("100", PopulationSource::CareSite).with_name("Hospital A")
}

pub fn restricted_population() -> PopulationRecord {
    PopulationRecord::new("200", PopulationSource::Provider)
        .with_name("Research cohort")
        .with_access_restricted(true)
}

/// Resolver knowing the codes and care sites used by `sample_tree`
pub fn entities() -> MockEntityResolver {
    let entities = MockEntityResolver::new();
    entities.add_code("I10", "Essential hypertension", true);
    entities.add_code("I1", "Hypertensive diseases", false);
    entities.add_entity("8312002244", "Cardiology");
    entities
}

pub fn compiler_with(populations: Vec<PopulationRecord>, options: CompilerOptions) -> QueryCompiler {
    QueryCompiler::builder()
        .options(options)
        .population_resolver(Arc::new(MockPopulationResolver::new(populations)))
        .entity_resolver(Arc::new(entities()))
        .build()
}

pub fn compiler() -> QueryCompiler {
    compiler_with(vec![open_population(), restricted_population()], CompilerOptions::default())
}

/// Tree with ids already in decompile order:
///
/// ```text
/// root (and)
/// ├── 1 Condition I10, at least twice
/// └── group 1 (or)
///     ├── 2 Patient, male
///     └── 3 Encounter in 2020, cardiology
/// ```
///
/// with a same-encounter constraint between 1 and 3.
pub fn sample_tree() -> CriteriaTree {
    let compiler = QueryCompiler::new();
    let definition = |kind| compiler.definition(kind).unwrap();

    let condition = definition(CriterionKind::Condition)
        .new_criterion(CriterionId(1))
        .with_field(
            "code",
            DataValue::Labels(vec![LabelItem::new("I10", "Essential hypertension").with_leaf(true)]),
        )
        .with_field(OCCURRENCE_FIELD, DataValue::comparison(Comparator::GreaterOrEqual, 2));
    let patient = definition(CriterionKind::Patient)
        .new_criterion(CriterionId(2))
        .with_field("genders", DataValue::labels([("male", "Male")]));
    let encounter = definition(CriterionKind::Encounter)
        .new_criterion(CriterionId(3))
        .with_inclusive(false)
        .with_field(
            "startDate",
            DataValue::DateRange(DateRange::new(Some(date(2020, 1, 1)), Some(date(2020, 12, 31)))),
        )
        .with_field("encounterService", DataValue::labels([("8312002244", "Cardiology")]));

    CriteriaTree {
        criteria: vec![condition, patient, encounter],
        criteria_groups: vec![
            CriteriaGroup::root().with_member(CriterionId(1)).with_member(GroupId(1)),
            CriteriaGroup::new(GroupId(1), GroupKind::OrGroup)
                .with_member(CriterionId(2))
                .with_member(CriterionId(3)),
        ],
        temporal_constraints: vec![TemporalConstraint::new(
            TemporalConstraintType::SameEncounter,
            TemporalIdList::Ids(vec![CriterionId(1).into(), CriterionId(3).into()]),
        )],
    }
}
