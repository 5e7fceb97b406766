//! Criteria: leaf selection conditions of a cohort query

use crate::ids::CriterionId;
use crate::value::DataValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Name of the field holding a criterion's occurrence comparison
pub const OCCURRENCE_FIELD: &str = "occurrence";

/// Kind of a criterion, also its type tag in stored trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CriterionKind {
    Patient,
    Encounter,
    Condition,
    Procedure,
    Claim,
    MedicationRequest,
    MedicationAdministration,
    Observation,
    DocumentReference,
    ImagingStudy,
    #[serde(rename = "IPPList")]
    IppList,
    Pregnancy,
    Hospit,
}

impl CriterionKind {
    /// Every kind, in catalog order
    pub const ALL: [CriterionKind; 13] = [
        CriterionKind::IppList,
        CriterionKind::Patient,
        CriterionKind::Encounter,
        CriterionKind::DocumentReference,
        CriterionKind::Condition,
        CriterionKind::Procedure,
        CriterionKind::Claim,
        CriterionKind::MedicationRequest,
        CriterionKind::MedicationAdministration,
        CriterionKind::Observation,
        CriterionKind::ImagingStudy,
        CriterionKind::Pregnancy,
        CriterionKind::Hospit,
    ];

    /// Type tag
    pub const fn as_str(self) -> &'static str {
        match self {
            CriterionKind::Patient => "Patient",
            CriterionKind::Encounter => "Encounter",
            CriterionKind::Condition => "Condition",
            CriterionKind::Procedure => "Procedure",
            CriterionKind::Claim => "Claim",
            CriterionKind::MedicationRequest => "MedicationRequest",
            CriterionKind::MedicationAdministration => "MedicationAdministration",
            CriterionKind::Observation => "Observation",
            CriterionKind::DocumentReference => "DocumentReference",
            CriterionKind::ImagingStudy => "ImagingStudy",
            CriterionKind::IppList => "IPPList",
            CriterionKind::Pregnancy => "Pregnancy",
            CriterionKind::Hospit => "Hospit",
        }
    }

    /// Resource type sent to the query engine
    pub const fn resource_type(self) -> &'static str {
        match self {
            CriterionKind::Pregnancy | CriterionKind::Hospit => "QuestionnaireResponse",
            other => other.as_str(),
        }
    }

    /// Whether wire criteria of this kind carry an occurrence
    pub const fn is_occurrence_bearing(self) -> bool {
        !matches!(self, CriterionKind::Patient | CriterionKind::IppList)
    }
}

impl fmt::Display for CriterionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown criterion type tag
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown criterion kind: {0}")]
pub struct UnknownKindError(pub String);

impl FromStr for CriterionKind {
    type Err = UnknownKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CriterionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKindError(s.to_string()))
    }
}

/// A criterion of the tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Criterion {
    pub id: CriterionId,
    #[serde(rename = "type")]
    pub kind: CriterionKind,
    pub title: String,
    /// `false` negates the criterion
    pub is_inclusive: bool,
    /// Type-specific field values, keyed by field name
    #[serde(default)]
    pub fields: IndexMap<String, DataValue>,
    /// Set when the criterion could not be rebuilt from its stored filter
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl Criterion {
    pub fn new(id: CriterionId, kind: CriterionKind, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            title: title.into(),
            is_inclusive: true,
            fields: IndexMap::new(),
            error: false,
        }
    }

    /// Set a field value
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Set the inclusion flag
    pub fn with_inclusive(mut self, is_inclusive: bool) -> Self {
        self.is_inclusive = is_inclusive;
        self
    }

    /// Get a field value
    pub fn field(&self, name: &str) -> Option<&DataValue> {
        self.fields.get(name)
    }

    /// Occurrence comparison, when set
    pub fn occurrence(&self) -> Option<&crate::NumericComparison> {
        self.field(OCCURRENCE_FIELD).and_then(DataValue::as_comparison)
    }
}
