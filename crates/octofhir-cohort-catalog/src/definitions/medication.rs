//! Prescriptions and administrations
//!
//! Both kinds share one form. The fields whose wire key differs between them
//! route on the criterion kind.

use super::{ACTIVE_SUBJECT, care_site, occurrence_section};
use crate::definition::{CriterionDefinition, FieldDefinition};
use crate::predicate::Predicate;
use octofhir_cohort_mapper::{ArgSpec, ChipMethod, FhirKey, FieldKind, ValueRef};
use octofhir_cohort_model::{CriterionKind, DataValue};

const PRESCRIPTION: &str = "MedicationRequest";

fn by_kind(prescription_key: &str, administration_key: &str) -> FhirKey {
    FhirKey::conditional(
        prescription_key,
        administration_key,
        ValueRef::Kind,
        ValueRef::literal(PRESCRIPTION),
    )
}

pub(super) fn definition(kind: CriterionKind) -> CriterionDefinition {
    let title = match kind {
        CriterionKind::MedicationAdministration => "Medication administration",
        _ => "Medication prescription",
    };
    CriterionDefinition::new(kind, title)
        .with_default_filter(ACTIVE_SUBJECT)
        .with_section(
            "Medication",
            vec![
                FieldDefinition::new("code", "Medication (ATC)", FieldKind::CodeSearch)
                    .with_key(FhirKey::plain("medication")),
                FieldDefinition::select(
                    "prescriptionType",
                    "Prescription type",
                    [("hospital", "Hospital"), ("discharge", "Discharge"), ("outpatient", "Outpatient")],
                )
                .with_key(FhirKey::plain("category"))
                .ignore_if(Predicate::KindIs(CriterionKind::MedicationAdministration))
                .display_if(Predicate::KindIs(CriterionKind::MedicationRequest)),
                FieldDefinition::select(
                    "administration",
                    "Administration route",
                    [("oral", "Oral"), ("iv", "Intravenous"), ("sc", "Subcutaneous"), ("im", "Intramuscular")],
                )
                .with_key(by_kind("dosage-instruction-route", "dosage-route")),
                FieldDefinition::new("startOccurrence", "Date", FieldKind::DateRange)
                    .with_key(by_kind("validity-period-start", "effective-time"))
                    .with_chip(
                        ChipMethod::Switch,
                        vec![
                            ArgSpec::MethodLiteral(ChipMethod::DateRange),
                            ArgSpec::Kind,
                            ArgSpec::literal(DataValue::text(PRESCRIPTION)),
                            ArgSpec::literal("Prescription start date"),
                            ArgSpec::literal("Administration date"),
                        ],
                    ),
                care_site("encounter.encounter-care-site"),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}
