use super::{ACTIVE_SUBJECT, care_site, occurrence_section};
use crate::definition::{CriterionDefinition, FieldDefinition};
use octofhir_cohort_mapper::{FhirKey, FieldKind};
use octofhir_cohort_model::CriterionKind;

pub(super) fn definition() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::DocumentReference, "Clinical documents")
        .with_default_filter(format!("{}&contenttype=text/plain", ACTIVE_SUBJECT))
        .with_section(
            "Search",
            vec![
                FieldDefinition::new("search", "Search in documents", FieldKind::Text).with_key(FhirKey::plain("_text")),
                FieldDefinition::select(
                    "docType",
                    "Document type",
                    [
                        ("crh-hospi", "Hospitalization report"),
                        ("crh-consult", "Consultation report"),
                        ("ordo", "Prescription"),
                        ("lt", "Letter"),
                    ],
                )
                .with_key(FhirKey::plain("type")),
                FieldDefinition::new("date", "Document date", FieldKind::DateRange).with_key(FhirKey::plain("date")),
                care_site("encounter.encounter-care-site"),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}
