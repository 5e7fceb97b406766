use super::{ACTIVE_SUBJECT, care_site, occurrence_section};
use crate::definition::{CriterionDefinition, FieldDefinition};
use octofhir_cohort_mapper::{FhirKey, FieldKind};
use octofhir_cohort_model::CriterionKind;

pub(super) fn definition() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Encounter, "Hospital stay")
        .with_default_filter(ACTIVE_SUBJECT)
        .with_section(
            "Stay",
            vec![
                FieldDefinition::new("startDate", "Admission date", FieldKind::DateRange)
                    .with_key(FhirKey::plain("period-start")),
                FieldDefinition::new("endDate", "Discharge date", FieldKind::DateRange)
                    .with_key(FhirKey::plain("period-end")),
                FieldDefinition::new("duration", "Length of stay", FieldKind::DurationRange)
                    .with_key(FhirKey::plain("length")),
                FieldDefinition::select(
                    "admissionMode",
                    "Admission mode",
                    [("emergency", "Emergency"), ("scheduled", "Scheduled"), ("transfer", "Transfer")],
                )
                .with_key(FhirKey::plain("admission-mode")),
                FieldDefinition::select(
                    "discharge",
                    "Discharge disposition",
                    [("home", "Home"), ("transfer", "Transfer"), ("deceased", "Deceased")],
                )
                .with_key(FhirKey::plain("discharge-disposition")),
                FieldDefinition::select(
                    "status",
                    "Stay status",
                    [("in-progress", "In progress"), ("finished", "Finished"), ("cancelled", "Cancelled")],
                )
                .with_key(FhirKey::plain("status")),
                care_site("service-provider"),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}
