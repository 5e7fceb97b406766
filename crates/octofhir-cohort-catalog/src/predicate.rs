//! Field predicates
//!
//! Display, disable, ignore and error conditions are closed expression trees
//! evaluated against a criterion's fields and the de-identification mode.

use octofhir_cohort_mapper::{FieldScope, ValueRef};
use octofhir_cohort_model::{CriterionKind, DataValue};
use serde::{Deserialize, Serialize};

/// Condition over a criterion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "camelCase")]
pub enum Predicate {
    Always,
    /// The population is access-restricted
    Deidentified,
    /// The named field has no value
    IsEmpty(String),
    Equals(ValueRef, ValueRef),
    KindIs(CriterionKind),
    /// The named field holds exactly one code, known to be a leaf
    SingleLeafCode(String),
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn is_empty(field: impl Into<String>) -> Self {
        Predicate::IsEmpty(field.into())
    }

    pub fn is_set(field: impl Into<String>) -> Self {
        Predicate::negate(Predicate::IsEmpty(field.into()))
    }

    pub fn single_leaf_code(field: impl Into<String>) -> Self {
        Predicate::SingleLeafCode(field.into())
    }

    pub fn negate(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }

    /// Evaluate against a criterion
    pub fn eval(&self, scope: &FieldScope<'_>) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Deidentified => scope.deidentified,
            Predicate::IsEmpty(field) => scope.field(field).is_empty(),
            Predicate::Equals(left, right) => left.resolve(scope) == right.resolve(scope),
            Predicate::KindIs(kind) => scope.kind == *kind,
            Predicate::SingleLeafCode(field) => match scope.field(field) {
                DataValue::Labels(items) => items.len() == 1 && items[0].is_leaf == Some(true),
                _ => false,
            },
            Predicate::Not(inner) => !inner.eval(scope),
            Predicate::All(predicates) => predicates.iter().all(|p| p.eval(scope)),
            Predicate::Any(predicates) => predicates.iter().any(|p| p.eval(scope)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use octofhir_cohort_model::LabelItem;

    fn fields(entries: &[(&str, DataValue)]) -> IndexMap<String, DataValue> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_single_leaf_code() {
        let leaf = fields(&[(
            "code",
            DataValue::Labels(vec![LabelItem::new("1234-5", "Glucose").with_leaf(true)]),
        )]);
        let branch = fields(&[(
            "code",
            DataValue::Labels(vec![LabelItem::new("LAB", "Laboratory").with_leaf(false)]),
        )]);
        let predicate = Predicate::single_leaf_code("code");
        assert!(predicate.eval(&FieldScope::new(CriterionKind::Observation, &leaf, false)));
        assert!(!predicate.eval(&FieldScope::new(CriterionKind::Observation, &branch, false)));
    }

    #[test]
    fn test_combinators() {
        let values = fields(&[("birthdates", DataValue::Null), ("mode", DataValue::text("a"))]);
        let scope = FieldScope::new(CriterionKind::Patient, &values, true);
        let predicate = Predicate::All(vec![
            Predicate::Deidentified,
            Predicate::is_empty("birthdates"),
            Predicate::Equals(ValueRef::field("mode"), ValueRef::literal("a")),
            Predicate::Any(vec![
                Predicate::KindIs(CriterionKind::Encounter),
                Predicate::KindIs(CriterionKind::Patient),
            ]),
        ]);
        assert!(predicate.eval(&scope));
        assert!(!Predicate::negate(predicate).eval(&scope));
        assert!(!Predicate::is_set("birthdates").eval(&scope));
    }

    #[test]
    fn test_tagged_json() {
        let predicate = Predicate::negate(Predicate::is_empty("birthdates"));
        let json = serde_json::to_value(&predicate).unwrap();
        assert_eq!(json["op"], "not");
        assert_eq!(json["args"]["op"], "isEmpty");
        assert_eq!(json["args"]["args"], "birthdates");
    }
}
