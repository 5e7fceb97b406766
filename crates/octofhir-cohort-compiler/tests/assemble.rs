//! Filter Assembly Tests
//!
//! Tests of single-criterion filters:
//! - Assembly of plain, composite and questionnaire fragments
//! - Disassembly back into field values
//! - Per-field degradation on malformed input

mod common;

use common::*;
use octofhir_cohort_catalog::{Catalog, CriterionDefinition, FieldDefinition};
use octofhir_cohort_compiler::{assemble_filter, disassemble_filter};
use octofhir_cohort_mapper::{FhirKey, FieldKind, MapperError, MapperRegistry, NoOpEntityResolver};
use octofhir_cohort_model::{
    CalendarDuration, Comparator, CriterionId, CriterionKind, DataValue, DateRange, DurationRange, NumericComparison,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// Test Helpers
// ============================================================================

/// A definition with a single numeric field under key `count`
fn count_definition() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Condition, "Counts").with_section(
        "Counts",
        vec![FieldDefinition::new("count", "Count", FieldKind::Number).with_key(FhirKey::plain("count"))],
    )
}

fn definition(kind: CriterionKind) -> CriterionDefinition {
    Catalog::standard().get(kind).unwrap().clone()
}

// ============================================================================
// Assembly
// ============================================================================

#[rstest]
#[case(NumericComparison::new(Comparator::GreaterOrEqual, 2), "count=ge2")]
#[case(NumericComparison::new(Comparator::Less, 5), "count=lt5")]
#[case(NumericComparison::between(1, 3), "count=ge1&count=le3")]
fn test_count_fragments(#[case] comparison: NumericComparison, #[case] expected: &str) {
    let registry = MapperRegistry::with_standard_mappers();
    let definition = count_definition();
    let criterion = definition
        .new_criterion(CriterionId(1))
        .with_field("count", DataValue::Comparison(comparison));
    assert_eq!(assemble_filter(&definition, &criterion, false, &registry).unwrap(), expected);
}

#[test]
fn test_patient_empty_fields_omitted() {
    let registry = MapperRegistry::with_standard_mappers();
    let patient = definition(CriterionKind::Patient);
    let criterion = patient
        .new_criterion(CriterionId(1))
        .with_field("genders", DataValue::labels([("male", "Male")]))
        .with_field("birthdates", DataValue::Null);
    assert_eq!(assemble_filter(&patient, &criterion, false, &registry).unwrap(), "gender=male");
}

#[test]
fn test_age_ignored_when_birthdates_set() {
    let registry = MapperRegistry::with_standard_mappers();
    let patient = definition(CriterionKind::Patient);
    let criterion = patient
        .new_criterion(CriterionId(1))
        .with_field(
            "birthdates",
            DataValue::DateRange(DateRange::new(Some(date(1990, 1, 1)), None)),
        )
        .with_field(
            "age",
            DataValue::DurationRange(DurationRange::new(Some(CalendarDuration::new(18, 0, 0)), None)),
        );
    assert_eq!(
        assemble_filter(&patient, &criterion, false, &registry).unwrap(),
        "birthdate=ge1990-01-01"
    );
}

#[rstest]
#[case(false, "age-day=ge")]
#[case(true, "age-month=ge216")]
fn test_deidentified_key_routing(#[case] deidentified: bool, #[case] expected_prefix: &str) {
    let registry = MapperRegistry::with_standard_mappers();
    let patient = definition(CriterionKind::Patient);
    let criterion = patient.new_criterion(CriterionId(1)).with_field(
        "age",
        DataValue::DurationRange(DurationRange::new(Some(CalendarDuration::new(18, 0, 0)), None)),
    );
    let filter = assemble_filter(&patient, &criterion, deidentified, &registry).unwrap();
    assert!(filter.starts_with(expected_prefix), "{}", filter);
    let unused = if deidentified { "age-day" } else { "age-month" };
    assert!(!filter.contains(unused));
}

#[test]
fn test_null_accepting_date_range() {
    let registry = MapperRegistry::with_standard_mappers();
    let condition = definition(CriterionKind::Condition);
    let criterion = condition.new_criterion(CriterionId(1)).with_field(
        "recordedDate",
        DataValue::DateRange(DateRange::new(Some(date(2021, 3, 1)), None).with_include_null(true)),
    );
    assert_eq!(
        assemble_filter(&condition, &criterion, false, &registry).unwrap(),
        "subject.active=true&_filter=(recorded-date ge 2021-03-01) or recorded-date pr false"
    );
}

#[test]
fn test_question_answers() {
    let registry = MapperRegistry::with_standard_mappers();
    let pregnancy = definition(CriterionKind::Pregnancy);
    let criterion = pregnancy
        .new_criterion(CriterionId(1))
        .with_field("foetus", DataValue::comparison(Comparator::GreaterOrEqual, 2));
    let filter = assemble_filter(&pregnancy, &criterion, false, &registry).unwrap();

    assert!(filter.starts_with(&pregnancy.default_filter));
    assert!(filter.ends_with("&_filter=(item.linkId eq F_MATER_009 and item.answer.valueInteger ge 2)"));
}

// ============================================================================
// Disassembly
// ============================================================================

#[tokio::test]
async fn test_patient_gender_restored_with_defaults() {
    let registry = MapperRegistry::with_standard_mappers();
    let patient = definition(CriterionKind::Patient);
    let fields = disassemble_filter(&patient, "gender=male", false, &registry, &NoOpEntityResolver)
        .await
        .unwrap();

    let mut expected = patient.initial_fields();
    expected.insert("genders".to_string(), DataValue::labels([("male", "Male")]));
    assert_eq!(fields, expected);
}

#[tokio::test]
async fn test_count_bounds_merge() {
    let registry = MapperRegistry::with_standard_mappers();
    let definition = count_definition();
    let fields = disassemble_filter(&definition, "count=ge1&count=le3", false, &registry, &NoOpEntityResolver)
        .await
        .unwrap();
    assert_eq!(
        fields.get("count"),
        Some(&DataValue::Comparison(NumericComparison::between(1, 3)))
    );
}

#[tokio::test]
async fn test_repeated_fragment_is_idempotent() {
    let registry = MapperRegistry::with_standard_mappers();
    let condition = definition(CriterionKind::Condition);
    let once = disassemble_filter(&condition, "recorded-date=ge2020-01-01", false, &registry, &NoOpEntityResolver)
        .await
        .unwrap();
    let twice = disassemble_filter(
        &condition,
        "recorded-date=ge2020-01-01&recorded-date=ge2020-01-01",
        false,
        &registry,
        &NoOpEntityResolver,
    )
    .await
    .unwrap();
    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_deid_key_restores_months() {
    let registry = MapperRegistry::with_standard_mappers();
    let patient = definition(CriterionKind::Patient);
    let fields = disassemble_filter(&patient, "age-month=ge216", true, &registry, &NoOpEntityResolver)
        .await
        .unwrap();
    assert_eq!(
        fields.get("age"),
        Some(&DataValue::DurationRange(DurationRange::new(
            Some(CalendarDuration::from_months(216)),
            None
        )))
    );
}

#[tokio::test]
async fn test_question_roundtrip() {
    let registry = MapperRegistry::with_standard_mappers();
    let pregnancy = definition(CriterionKind::Pregnancy);
    let criterion = pregnancy
        .new_criterion(CriterionId(1))
        .with_field("foetus", DataValue::comparison(Comparator::GreaterOrEqual, 2))
        .with_field(
            "pregnancyStartDate",
            DataValue::DateRange(DateRange::new(Some(date(2022, 1, 1)), Some(date(2022, 6, 30)))),
        );
    let filter = assemble_filter(&pregnancy, &criterion, false, &registry).unwrap();
    let fields = disassemble_filter(&pregnancy, &filter, false, &registry, &NoOpEntityResolver)
        .await
        .unwrap();
    assert_eq!(fields, criterion.fields);
}

#[tokio::test]
async fn test_malformed_value_keeps_field_empty() {
    let registry = MapperRegistry::with_standard_mappers();
    let condition = definition(CriterionKind::Condition);
    let fields = disassemble_filter(&condition, "recorded-date=ge2020-13-45", false, &registry, &NoOpEntityResolver)
        .await
        .unwrap();
    assert_eq!(fields.get("recordedDate"), Some(&DataValue::Null));
}

#[tokio::test]
async fn test_resolver_failure_is_reported() {
    let registry = MapperRegistry::with_standard_mappers();
    let condition = definition(CriterionKind::Condition);
    let resolver = entities();
    resolver.fail_on("I10");
    let result = disassemble_filter(&condition, "code=I10", false, &registry, &resolver).await;
    assert!(matches!(result, Err(MapperError::Resolver(_))));
}
