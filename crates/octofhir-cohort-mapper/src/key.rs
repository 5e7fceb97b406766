//! Wire keys and the values they are resolved against
//!
//! A field's wire key is not always a constant. It may depend on the
//! de-identification mode of the population (`Deid`), or on the comparison of
//! two values of the criterion (`Conditional`), e.g. the medication route key
//! differs between prescriptions and administrations.

use indexmap::IndexMap;
use octofhir_cohort_model::{CriterionKind, DataValue};
use serde::{Deserialize, Serialize};

/// Questionnaire item selector of `_filter` expressions
pub const LINK_ID: &str = "item.linkId";

/// Answer element prefix, followed by the answer type suffix
pub const ANSWER_PREFIX: &str = "item.answer.value";

/// Criterion state visible to key resolution, argument resolution and predicates
#[derive(Debug, Clone, Copy)]
pub struct FieldScope<'a> {
    pub kind: CriterionKind,
    pub fields: &'a IndexMap<String, DataValue>,
    pub deidentified: bool,
}

impl<'a> FieldScope<'a> {
    pub fn new(kind: CriterionKind, fields: &'a IndexMap<String, DataValue>, deidentified: bool) -> Self {
        Self {
            kind,
            fields,
            deidentified,
        }
    }

    /// Current value of a field, `Null` when unset
    pub fn field(&self, name: &str) -> &'a DataValue {
        static NULL: DataValue = DataValue::Null;
        self.fields.get(name).unwrap_or(&NULL)
    }
}

/// A value read from the criterion or given literally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ref", content = "value", rename_all = "camelCase")]
pub enum ValueRef {
    Literal(DataValue),
    Field(String),
    /// The criterion kind tag, as text
    Kind,
}

impl ValueRef {
    pub fn literal(value: impl Into<DataValue>) -> Self {
        ValueRef::Literal(value.into())
    }

    pub fn field(name: impl Into<String>) -> Self {
        ValueRef::Field(name.into())
    }

    pub fn resolve(&self, scope: &FieldScope<'_>) -> DataValue {
        match self {
            ValueRef::Literal(value) => value.clone(),
            ValueRef::Field(name) => scope.field(name).clone(),
            ValueRef::Kind => DataValue::text(scope.kind.as_str()),
        }
    }
}

/// Type of a questionnaire answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Coding,
}

impl AnswerType {
    /// Answer element suffix (`item.answer.value{suffix}`)
    pub const fn value_suffix(self) -> &'static str {
        match self {
            AnswerType::String => "String",
            AnswerType::Integer => "Integer",
            AnswerType::Decimal => "Decimal",
            AnswerType::Boolean => "Boolean",
            AnswerType::Date => "Date",
            AnswerType::DateTime => "DateTime",
            AnswerType::Coding => "Coding",
        }
    }

    /// Whether answers of this type take comparator prefixes
    pub const fn is_ordered(self) -> bool {
        matches!(
            self,
            AnswerType::Integer | AnswerType::Decimal | AnswerType::Date | AnswerType::DateTime
        )
    }
}

/// Wire key declaration of a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FhirKey {
    Plain(String),
    /// Questionnaire answer, rendered as a `_filter` sub-expression
    Question { id: String, answer_type: AnswerType },
    /// `deid` is used when the population is de-identified
    Deid { main: String, deid: String },
    /// `main` when both values resolve equal, `alt` otherwise
    Conditional {
        main: String,
        alt: String,
        value1: ValueRef,
        value2: ValueRef,
    },
}

impl FhirKey {
    pub fn plain(key: impl Into<String>) -> Self {
        FhirKey::Plain(key.into())
    }

    pub fn question(id: impl Into<String>, answer_type: AnswerType) -> Self {
        FhirKey::Question {
            id: id.into(),
            answer_type,
        }
    }

    pub fn deid(main: impl Into<String>, deid: impl Into<String>) -> Self {
        FhirKey::Deid {
            main: main.into(),
            deid: deid.into(),
        }
    }

    pub fn conditional(main: impl Into<String>, alt: impl Into<String>, value1: ValueRef, value2: ValueRef) -> Self {
        FhirKey::Conditional {
            main: main.into(),
            alt: alt.into(),
            value1,
            value2,
        }
    }

    /// Pick the concrete key for a criterion
    pub fn resolve(&self, scope: &FieldScope<'_>) -> ResolvedKey {
        match self {
            FhirKey::Plain(key) => ResolvedKey::Plain {
                key: key.clone(),
                deidentified: false,
            },
            FhirKey::Question { id, answer_type } => ResolvedKey::Question {
                id: id.clone(),
                answer_type: *answer_type,
            },
            FhirKey::Deid { main, deid } => ResolvedKey::Plain {
                key: if scope.deidentified { deid.clone() } else { main.clone() },
                deidentified: scope.deidentified,
            },
            FhirKey::Conditional {
                main,
                alt,
                value1,
                value2,
            } => {
                let key = if value1.resolve(scope) == value2.resolve(scope) {
                    main
                } else {
                    alt
                };
                ResolvedKey::Plain {
                    key: key.clone(),
                    deidentified: false,
                }
            }
        }
    }

    /// Match a raw filter key against the main or alternate form
    pub fn matches(&self, raw_key: &str) -> Option<KeyMatch> {
        match self {
            FhirKey::Plain(key) => (key == raw_key).then_some(KeyMatch { deid: false }),
            FhirKey::Question { id, .. } => (id == raw_key).then_some(KeyMatch { deid: false }),
            FhirKey::Deid { main, deid } => {
                if main == raw_key {
                    Some(KeyMatch { deid: false })
                } else if deid == raw_key {
                    Some(KeyMatch { deid: true })
                } else {
                    None
                }
            }
            FhirKey::Conditional { main, alt, .. } => {
                (main == raw_key || alt == raw_key).then_some(KeyMatch { deid: false })
            }
        }
    }
}

/// Outcome of `FhirKey::matches`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMatch {
    /// The de-identified form matched
    pub deid: bool,
}

/// Concrete key used to render a fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedKey {
    Plain { key: String, deidentified: bool },
    Question { id: String, answer_type: AnswerType },
}

impl ResolvedKey {
    /// Key name, or question link id
    pub fn name(&self) -> &str {
        match self {
            ResolvedKey::Plain { key, .. } => key,
            ResolvedKey::Question { id, .. } => id,
        }
    }

    /// Whether the de-identified form was chosen
    pub fn is_deid(&self) -> bool {
        matches!(self, ResolvedKey::Plain { deidentified: true, .. })
    }

    /// `_filter` sub-expression testing the key against every `(operator, value)`
    ///
    /// Question keys select the item by link id and test its typed answer.
    pub fn expression(&self, conditions: &[(&str, &str)]) -> String {
        let (head, subject) = match self {
            ResolvedKey::Plain { key, .. } => (None, key.clone()),
            ResolvedKey::Question { id, answer_type } => (
                Some(format!("{} eq {}", LINK_ID, id)),
                format!("{}{}", ANSWER_PREFIX, answer_type.value_suffix()),
            ),
        };
        head.into_iter()
            .chain(
                conditions
                    .iter()
                    .map(|(operator, value)| format!("{} {} {}", subject, operator, value)),
            )
            .collect::<Vec<_>>()
            .join(" and ")
    }
}
