use crate::definition::{CriterionDefinition, ErrorCheck, FieldDefinition};
use crate::predicate::Predicate;
use octofhir_cohort_mapper::{FhirKey, FieldKind};
use octofhir_cohort_model::CriterionKind;

pub(super) fn definition() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Patient, "Demographics")
        .with_section(
            "Demographics",
            vec![
                FieldDefinition::select(
                    "genders",
                    "Gender",
                    [("female", "Female"), ("male", "Male"), ("other", "Other"), ("unknown", "Unknown")],
                )
                .with_key(FhirKey::plain("gender")),
                FieldDefinition::select("vitalStatus", "Vital status", [("false", "Alive"), ("true", "Deceased")])
                    .with_key(FhirKey::plain("deceased")),
            ],
        )
        .with_section(
            "Age",
            vec![
                FieldDefinition::new("birthdates", "Birth date", FieldKind::DateRange)
                    .with_key(FhirKey::plain("birthdate"))
                    .disable_if(Predicate::Deidentified),
                FieldDefinition::new("age", "Age", FieldKind::DurationRange)
                    .with_key(FhirKey::deid("age-day", "age-month"))
                    .ignore_if(Predicate::is_set("birthdates"))
                    .disable_if(Predicate::is_set("birthdates")),
            ],
        )
        .with_error_check(ErrorCheck::new(
            Predicate::All(vec![Predicate::is_set("birthdates"), Predicate::is_set("age")]),
            "Birth date and age cannot both be set",
        ))
}
