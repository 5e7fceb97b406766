//! Coded hospital activity: diagnoses, procedures and billing claims

use super::{ACTIVE_SUBJECT, care_site, occurrence_section};
use crate::definition::{CriterionDefinition, FieldDefinition};
use octofhir_cohort_mapper::{FhirKey, FieldKind};
use octofhir_cohort_model::CriterionKind;

pub(super) fn condition() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Condition, "Diagnosis (ICD-10)")
        .with_default_filter(ACTIVE_SUBJECT)
        .with_section(
            "Diagnosis",
            vec![
                FieldDefinition::new("code", "Diagnosis code", FieldKind::CodeSearch).with_key(FhirKey::plain("code")),
                FieldDefinition::select(
                    "diagnosticType",
                    "Diagnosis type",
                    [("dp", "Main diagnosis"), ("dr", "Related diagnosis"), ("das", "Associated diagnosis")],
                )
                .with_key(FhirKey::plain("orbis-status")),
                FieldDefinition::new("recordedDate", "Recorded date", FieldKind::DateRange)
                    .with_key(FhirKey::plain("recorded-date")),
            ],
        )
        .with_section(
            "Stay",
            vec![
                care_site("encounter.encounter-care-site"),
                FieldDefinition::new("encounterStartDate", "Admission date", FieldKind::DateRange)
                    .with_key(FhirKey::plain("encounter.period-start")),
                FieldDefinition::select(
                    "encounterStatus",
                    "Stay status",
                    [("in-progress", "In progress"), ("finished", "Finished")],
                )
                .with_key(FhirKey::plain("encounter.status")),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}

pub(super) fn procedure() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Procedure, "Procedure (CCAM)")
        .with_default_filter(ACTIVE_SUBJECT)
        .with_section(
            "Procedure",
            vec![
                FieldDefinition::new("code", "Procedure code", FieldKind::CodeSearch).with_key(FhirKey::plain("code")),
                FieldDefinition::select("source", "Source", [("AREM", "AREM"), ("ORBIS", "ORBIS")])
                    .with_key(FhirKey::plain("source")),
                FieldDefinition::new("date", "Procedure date", FieldKind::DateRange).with_key(FhirKey::plain("date")),
                care_site("encounter.encounter-care-site"),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}

pub(super) fn claim() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Claim, "DRG (GHM)")
        .with_default_filter(ACTIVE_SUBJECT)
        .with_section(
            "Claim",
            vec![
                FieldDefinition::new("code", "DRG code", FieldKind::CodeSearch).with_key(FhirKey::plain("diagnosis")),
                FieldDefinition::new("date", "Claim date", FieldKind::DateRange).with_key(FhirKey::plain("created")),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}
