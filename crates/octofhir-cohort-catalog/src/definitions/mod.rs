//! Standard criterion definitions

mod clinical;
mod document;
mod encounter;
mod imaging;
mod medication;
mod observation;
mod patient;
mod questionnaire;

use crate::definition::{CriterionDefinition, FieldDefinition};
use octofhir_cohort_mapper::{FhirKey, FieldKind};
use octofhir_cohort_model::CriterionKind;

/// Baseline fragment restricting results to active patients
pub(crate) const ACTIVE_SUBJECT: &str = "subject.active=true";

/// One definition per criterion kind, in catalog order
pub(crate) fn standard_definitions() -> Vec<CriterionDefinition> {
    CriterionKind::ALL
        .into_iter()
        .map(|kind| match kind {
            CriterionKind::IppList => ipp_list(),
            CriterionKind::Patient => patient::definition(),
            CriterionKind::Encounter => encounter::definition(),
            CriterionKind::DocumentReference => document::definition(),
            CriterionKind::Condition => clinical::condition(),
            CriterionKind::Procedure => clinical::procedure(),
            CriterionKind::Claim => clinical::claim(),
            CriterionKind::MedicationRequest | CriterionKind::MedicationAdministration => {
                medication::definition(kind)
            }
            CriterionKind::Observation => observation::definition(),
            CriterionKind::ImagingStudy => imaging::definition(),
            CriterionKind::Pregnancy => questionnaire::pregnancy(),
            CriterionKind::Hospit => questionnaire::hospit(),
        })
        .collect()
}

fn ipp_list() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::IppList, "Patient identifiers").with_section(
        "Identifiers",
        vec![
            FieldDefinition::new("search", "Patient identifiers (IPP)", FieldKind::TextList)
                .with_key(FhirKey::plain("identifier.value")),
        ],
    )
}

/// Occurrence section appended to occurrence-bearing kinds
fn occurrence_section() -> Vec<FieldDefinition> {
    vec![FieldDefinition::occurrence()]
}

/// Care site field shared by hospital-activity kinds
fn care_site(key: &str) -> FieldDefinition {
    FieldDefinition::new("encounterService", "Care site", FieldKind::EntityPicker).with_key(FhirKey::plain(key))
}
