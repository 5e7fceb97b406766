use super::{ACTIVE_SUBJECT, occurrence_section};
use crate::definition::{CriterionDefinition, FieldDefinition};
use octofhir_cohort_mapper::{FhirKey, FieldKind};
use octofhir_cohort_model::CriterionKind;

pub(super) fn definition() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::ImagingStudy, "Imaging")
        .with_default_filter(ACTIVE_SUBJECT)
        .with_section(
            "Study",
            vec![
                FieldDefinition::select(
                    "modality",
                    "Modality",
                    [
                        ("CT", "Computed tomography"),
                        ("MR", "Magnetic resonance"),
                        ("US", "Ultrasound"),
                        ("CR", "Computed radiography"),
                        ("PT", "Positron emission tomography"),
                    ],
                )
                .with_key(FhirKey::plain("modality")),
                FieldDefinition::new("numberOfSeries", "Number of series", FieldKind::Number)
                    .with_key(FhirKey::plain("numberofseries")),
                FieldDefinition::new("numberOfInstances", "Number of instances", FieldKind::Number)
                    .with_key(FhirKey::plain("numberofinstances")),
                FieldDefinition::new("started", "Study date", FieldKind::DateRange).with_key(FhirKey::plain("started")),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}
