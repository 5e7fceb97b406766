//! Mapper Registry Tests
//!
//! End-to-end tests of the standard registry through its public tables:
//! - Build / Unbuild agreement per field kind
//! - De-identified key routing
//! - Code and entity resolution through a resolver

use async_trait::async_trait;
use indexmap::IndexMap;
use octofhir_cohort_mapper::{
    ArgSpec, BuildInput, EntityRecord, EntityResolver, FhirKey, FieldKind, FieldScope, Fragment,
    MapperRegistry, NoOpEntityResolver, ResolverError, UnbuildInput,
};
use octofhir_cohort_model::{
    CalendarDuration, Comparator, CriterionKind, DataValue, DurationRange, LabelItem, NumericComparison,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

// ============================================================================
// Test Helpers
// ============================================================================

struct TerminologyResolver;

#[async_trait]
impl EntityResolver for TerminologyResolver {
    async fn resolve_entities(&self, ids: &[String]) -> Result<Vec<EntityRecord>, ResolverError> {
        Ok(ids
            .iter()
            .filter(|id| id.as_str() != "unknown")
            .map(|id| EntityRecord::new(id, format!("Care site {}", id)))
            .collect())
    }

    async fn resolve_code(
        &self,
        _system: Option<&str>,
        code: &str,
    ) -> Result<Option<EntityRecord>, ResolverError> {
        match code {
            "I10" => Ok(Some(EntityRecord::new("I10", "Essential hypertension").with_leaf(true))),
            "I1" => Ok(Some(EntityRecord::new("I1", "Hypertensive diseases").with_leaf(false))),
            "FAIL" => Err(ResolverError::Service("terminology unavailable".to_string())),
            _ => Ok(None),
        }
    }
}

/// Build a value with the default build of a field kind, then unbuild every
/// fragment with the default unbuild.
async fn roundtrip(kind: FieldKind, value: DataValue, args: &[ArgSpec], resolver: &dyn EntityResolver) -> DataValue {
    let registry = MapperRegistry::with_standard_mappers();
    let fields = IndexMap::new();
    let scope = FieldScope::new(CriterionKind::Condition, &fields, false);
    let args = ArgSpec::resolve_all(args, &scope, &registry).unwrap();
    let key = FhirKey::plain("k").resolve(&scope);
    let (build, unbuild, _) = kind.default_methods();

    let build = registry.build(build).unwrap();
    let fragments = build(&BuildInput {
        value: &value,
        key: &key,
        deidentified: false,
        args: &args,
    });

    let unbuild = registry.unbuild(unbuild).unwrap();
    let mut acc = DataValue::Null;
    for fragment in fragments {
        let Fragment::Raw(raw) = fragment else {
            panic!("unexpected composite fragment");
        };
        acc = unbuild(UnbuildInput {
            raw: &raw,
            is_deid_key: false,
            existing: &acc,
            key: "k",
            args: &args,
            resolver,
        })
        .await
        .unwrap();
    }
    acc
}

// ============================================================================
// Round trips
// ============================================================================

#[rstest]
#[case::text(FieldKind::Text, DataValue::text("lung cancer"))]
#[case::list(FieldKind::TextList, DataValue::text("8000001,8000002"))]
#[case::boolean(FieldKind::Boolean, DataValue::Boolean(true))]
#[case::number(FieldKind::Number, DataValue::comparison(Comparator::Less, 3))]
#[case::between(FieldKind::Number, DataValue::Comparison(NumericComparison::between(1, 3)))]
#[case::duration(
    FieldKind::DurationRange,
    DataValue::DurationRange(DurationRange::new(Some(CalendarDuration::new(1, 2, 3)), None))
)]
#[tokio::test]
async fn test_default_mappers_roundtrip(#[case] kind: FieldKind, #[case] value: DataValue) {
    assert_eq!(roundtrip(kind, value.clone(), &[], &NoOpEntityResolver).await, value);
}

#[tokio::test]
async fn test_select_roundtrip_through_options() {
    let options = DataValue::labels([("m", "Male"), ("f", "Female")]);
    let value = DataValue::labels([("f", "Female")]);
    let args = [ArgSpec::Literal(options)];
    assert_eq!(
        roundtrip(FieldKind::Select, value.clone(), &args, &NoOpEntityResolver).await,
        value
    );
}

#[tokio::test]
async fn test_code_search_resolves_labels_and_leaves() {
    let value = DataValue::Labels(vec![
        LabelItem::new("I10", "I10").with_system("cim10"),
        LabelItem::new("I1", "I1").with_system("cim10"),
    ]);
    let restored = roundtrip(FieldKind::CodeSearch, value, &[], &TerminologyResolver).await;
    assert_eq!(
        restored,
        DataValue::Labels(vec![
            LabelItem::new("I10", "Essential hypertension")
                .with_system("cim10")
                .with_leaf(true),
            LabelItem::new("I1", "Hypertensive diseases")
                .with_system("cim10")
                .with_leaf(false),
        ])
    );
}

#[tokio::test]
async fn test_entity_picker_falls_back_to_ids() {
    let value = DataValue::labels([("42", "x"), ("unknown", "y")]);
    let restored = roundtrip(FieldKind::EntityPicker, value, &[], &TerminologyResolver).await;
    assert_eq!(
        restored,
        DataValue::labels([("42", "Care site 42"), ("unknown", "unknown")])
    );
}

#[tokio::test]
async fn test_resolver_failure_is_an_error() {
    let registry = MapperRegistry::with_standard_mappers();
    let unbuild = registry.unbuild(FieldKind::CodeSearch.default_methods().1).unwrap();
    let result = unbuild(UnbuildInput {
        raw: "cim10|FAIL",
        is_deid_key: false,
        existing: &DataValue::Null,
        key: "code",
        args: &[],
        resolver: &TerminologyResolver,
    })
    .await;
    assert!(result.is_err());
}

// ============================================================================
// De-identification routing
// ============================================================================

#[rstest]
#[case(false, "age-day", "ge3650")]
#[case(true, "age-month", "ge120")]
fn test_deid_key_and_units(#[case] deidentified: bool, #[case] expected_key: &str, #[case] expected_raw: &str) {
    let registry = MapperRegistry::with_standard_mappers();
    let fields = IndexMap::new();
    let scope = FieldScope::new(CriterionKind::Patient, &fields, deidentified);
    let key = FhirKey::deid("age-day", "age-month").resolve(&scope);
    assert_eq!(key.name(), expected_key);

    let value = DataValue::DurationRange(DurationRange::new(Some(CalendarDuration::new(10, 0, 0)), None));
    let build = registry.build(FieldKind::DurationRange.default_methods().0).unwrap();
    let fragments = build(&BuildInput {
        value: &value,
        key: &key,
        deidentified,
        args: &[],
    });
    assert_eq!(fragments.into_vec(), vec![Fragment::raw(expected_raw)]);
}
