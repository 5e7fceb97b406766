use super::{ACTIVE_SUBJECT, occurrence_section};
use crate::definition::{CriterionDefinition, FieldDefinition};
use crate::predicate::Predicate;
use octofhir_cohort_mapper::{ArgSpec, BuildMethod, FhirKey, FieldKind, MethodRef};
use octofhir_cohort_model::CriterionKind;

/// Status of validated results; sent on every filter, never restored as a value
const FINAL_STATUS: &str = "final";

pub(super) fn definition() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Observation, "Biology")
        .with_default_filter(ACTIVE_SUBJECT)
        .with_section(
            "Analysis",
            vec![
                FieldDefinition::new("code", "Analysis (LOINC / ANABIO)", FieldKind::CodeSearch)
                    .with_key(FhirKey::plain("code")),
                // Numeric search only makes sense for one leaf analysis
                FieldDefinition::new("value", "Result value", FieldKind::Number)
                    .with_key(FhirKey::plain("value-quantity"))
                    .with_build(
                        BuildMethod::Gated,
                        vec![
                            ArgSpec::Method(MethodRef::Build(BuildMethod::Comparator)),
                            ArgSpec::field("code"),
                        ],
                    )
                    .ignore_if(Predicate::negate(Predicate::single_leaf_code("code")))
                    .display_if(Predicate::single_leaf_code("code")),
                FieldDefinition::new("validatedStatus", "Validated results only", FieldKind::Boolean)
                    .with_key(FhirKey::plain("status"))
                    .with_default(true)
                    .with_build_args(vec![ArgSpec::literal(FINAL_STATUS)])
                    .with_unbuild_args(vec![ArgSpec::literal(FINAL_STATUS)])
                    .unbuild_ignore([FINAL_STATUS])
                    .disable_if(Predicate::Always),
                FieldDefinition::new("date", "Result date", FieldKind::DateRange).with_key(FhirKey::plain("date")),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}
