//! Maternity questionnaire forms
//!
//! Both forms are stored as `QuestionnaireResponse` resources and are told
//! apart by the questionnaire name found in the filter. Their fields are
//! questionnaire answers keyed by link id.

use super::{ACTIVE_SUBJECT, care_site, occurrence_section};
use crate::definition::{CriterionDefinition, FieldDefinition, SubtypeDiscriminator};
use octofhir_cohort_mapper::{AnswerType, FhirKey, FieldKind};
use octofhir_cohort_model::CriterionKind;

const QUESTIONNAIRE_KEY: &str = "questionnaire.name";
const PREGNANCY_FORM: &str = "APHPEDSQuestionnaireFicheGrossesse";
const HOSPIT_FORM: &str = "APHPEDSQuestionnaireFicheHospitalisation";
const ANSWERED: &str = "status=in-progress,completed";

fn form_filter(form: &str) -> String {
    format!("{}&{}={}&{}", ACTIVE_SUBJECT, QUESTIONNAIRE_KEY, form, ANSWERED)
}

pub(super) fn pregnancy() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Pregnancy, "Pregnancy form")
        .with_default_filter(form_filter(PREGNANCY_FORM))
        .with_subtype(SubtypeDiscriminator::new(QUESTIONNAIRE_KEY, PREGNANCY_FORM))
        .with_section(
            "Pregnancy",
            vec![
                FieldDefinition::new("pregnancyStartDate", "Pregnancy start date", FieldKind::DateRange)
                    .with_key(FhirKey::question("F_MATER_001", AnswerType::Date)),
                FieldDefinition::new("pregnancyEndDate", "Pregnancy end date", FieldKind::DateRange)
                    .with_key(FhirKey::question("F_MATER_002", AnswerType::Date)),
                FieldDefinition::select(
                    "pregnancyMode",
                    "Conception",
                    [("spontaneous", "Spontaneous"), ("assisted", "Assisted reproduction")],
                )
                .with_key(FhirKey::question("F_MATER_008", AnswerType::String)),
                FieldDefinition::new("foetus", "Number of foetuses", FieldKind::Number)
                    .with_key(FhirKey::question("F_MATER_009", AnswerType::Integer)),
                FieldDefinition::new("parity", "Parity", FieldKind::Number)
                    .with_key(FhirKey::question("F_MATER_010", AnswerType::Integer)),
                FieldDefinition::new("maternalRisks", "Maternal risks", FieldKind::Text)
                    .with_key(FhirKey::question("F_MATER_015", AnswerType::String)),
                care_site("encounter.encounter-care-site"),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}

pub(super) fn hospit() -> CriterionDefinition {
    CriterionDefinition::new(CriterionKind::Hospit, "Maternity stay form")
        .with_default_filter(form_filter(HOSPIT_FORM))
        .with_subtype(SubtypeDiscriminator::new(QUESTIONNAIRE_KEY, HOSPIT_FORM))
        .with_section(
            "Stay",
            vec![
                FieldDefinition::new("hospitReason", "Reason for hospitalization", FieldKind::Text)
                    .with_key(FhirKey::question("F_MATER_004", AnswerType::String)),
                FieldDefinition::new("admissionDate", "Admission date", FieldKind::DateRange)
                    .with_key(FhirKey::question("F_MATER_005", AnswerType::Date)),
                FieldDefinition::select(
                    "inUteroTransfer",
                    "In utero transfer",
                    [("yes", "Yes"), ("no", "No")],
                )
                .with_key(FhirKey::question("F_MATER_006", AnswerType::String)),
                FieldDefinition::new("gestationalAge", "Gestational age (weeks)", FieldKind::Number)
                    .with_key(FhirKey::question("F_MATER_007", AnswerType::Integer)),
                care_site("encounter.encounter-care-site"),
            ],
        )
        .with_section("Occurrences", occurrence_section())
}
