//! Identity-revealing criteria
//!
//! Some criteria can single out a patient: lists of patient identifiers,
//! exact birth dates, document searches on identifier-like numbers. They must
//! not be sent for de-identified populations.

use octofhir_cohort_model::{CriteriaTree, Criterion, CriterionId, CriterionKind, DataValue};
use once_cell::sync::Lazy;
use regex::Regex;

/// Long digit runs: patient or stay identifiers
static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{8,}").expect("valid identifier pattern"));

fn is_nominative(criterion: &Criterion) -> bool {
    let set = |name: &str| criterion.field(name).is_some_and(|value| !value.is_empty());
    match criterion.kind {
        CriterionKind::IppList => set("search"),
        CriterionKind::Patient => set("birthdates"),
        CriterionKind::DocumentReference => criterion
            .field("search")
            .and_then(DataValue::as_text)
            .is_some_and(|text| IDENTIFIER_PATTERN.is_match(text)),
        _ => false,
    }
}

/// Ids of nominative criteria, in tree order
pub fn check_nominative_criteria(tree: &CriteriaTree) -> Vec<CriterionId> {
    tree.criteria
        .iter()
        .filter(|criterion| is_nominative(criterion))
        .map(|criterion| criterion.id)
        .collect()
}

/// A copy of the tree without nominative criteria or references to them
pub fn clean_nominative_criteria(tree: &CriteriaTree) -> CriteriaTree {
    let mut cleaned = tree.clone();
    for id in check_nominative_criteria(tree) {
        log::debug!("Removing nominative criterion {}", id);
        cleaned.remove_criterion(id);
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use octofhir_cohort_model::{CriteriaGroup, DateRange, GroupId, GroupKind, TemporalConstraint, TemporalConstraintType, TemporalIdList};
    use pretty_assertions::assert_eq;

    fn tree() -> CriteriaTree {
        let mut tree = CriteriaTree::new();
        tree.criteria = vec![
            Criterion::new(CriterionId(1), CriterionKind::DocumentReference, "Notes")
                .with_field("search", DataValue::text("ipp 80012345678")),
            Criterion::new(CriterionId(2), CriterionKind::DocumentReference, "Notes")
                .with_field("search", DataValue::text("diabete")),
            Criterion::new(CriterionId(3), CriterionKind::Patient, "Patients").with_field(
                "birthdates",
                DataValue::DateRange(DateRange::new(chrono::NaiveDate::from_ymd_opt(1980, 5, 1), None)),
            ),
        ];
        tree.criteria_groups = vec![
            CriteriaGroup::root().with_member(CriterionId(1)).with_member(GroupId(1)),
            CriteriaGroup::new(GroupId(1), GroupKind::OrGroup)
                .with_member(CriterionId(2))
                .with_member(CriterionId(3)),
        ];
        tree.temporal_constraints = vec![TemporalConstraint::new(
            TemporalConstraintType::SameEncounter,
            TemporalIdList::Ids(vec![CriterionId(1).into(), CriterionId(2).into()]),
        )];
        tree
    }

    #[test]
    fn test_check_lists_identifying_criteria() {
        assert_eq!(check_nominative_criteria(&tree()), vec![CriterionId(1), CriterionId(3)]);
    }

    #[test]
    fn test_clean_removes_references() {
        let cleaned = clean_nominative_criteria(&tree());
        assert_eq!(cleaned.reachable_criteria(), vec![CriterionId(2)]);
        assert!(cleaned.temporal_constraints.is_empty());
        assert!(cleaned.dangling_references().is_empty());
    }
}
