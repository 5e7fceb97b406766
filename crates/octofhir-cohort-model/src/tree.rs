//! The in-memory criteria tree

use crate::criterion::Criterion;
use crate::group::CriteriaGroup;
use crate::ids::{CriteriaRef, CriterionId, GroupId};
use crate::temporal::TemporalConstraint;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Flat criteria and groups; groups reference their members by id
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaTree {
    #[serde(default)]
    pub criteria: Vec<Criterion>,
    #[serde(default, rename = "criteriaGroup")]
    pub criteria_groups: Vec<CriteriaGroup>,
    #[serde(default)]
    pub temporal_constraints: Vec<TemporalConstraint>,
}

impl CriteriaTree {
    /// A tree with only an empty AND root group
    pub fn new() -> Self {
        Self {
            criteria: Vec::new(),
            criteria_groups: vec![CriteriaGroup::root()],
            temporal_constraints: Vec::new(),
        }
    }

    pub fn criterion(&self, id: CriterionId) -> Option<&Criterion> {
        self.criteria.iter().find(|c| c.id == id)
    }

    pub fn group(&self, id: GroupId) -> Option<&CriteriaGroup> {
        self.criteria_groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut CriteriaGroup> {
        self.criteria_groups.iter_mut().find(|g| g.id == id)
    }

    pub fn root(&self) -> Option<&CriteriaGroup> {
        self.group(GroupId::ROOT)
    }

    /// Whether a reference resolves to exactly one criterion or group
    pub fn resolves(&self, member: CriteriaRef) -> bool {
        match member {
            CriteriaRef::Criterion(id) => self.criteria.iter().filter(|c| c.id == id).count() == 1,
            CriteriaRef::Group(id) => self.criteria_groups.iter().filter(|g| g.id == id).count() == 1,
        }
    }

    /// Every `(group, member)` pair whose member does not resolve
    pub fn dangling_references(&self) -> Vec<(GroupId, CriteriaRef)> {
        self.criteria_groups
            .iter()
            .flat_map(|group| {
                group
                    .criteria_ids
                    .iter()
                    .filter(|member| !self.resolves(**member))
                    .map(move |member| (group.id, *member))
            })
            .collect()
    }

    /// Remove a criterion and every reference to it
    pub fn remove_criterion(&mut self, id: CriterionId) {
        self.criteria.retain(|c| c.id != id);
        let member = CriteriaRef::Criterion(id);
        for group in &mut self.criteria_groups {
            group.criteria_ids.retain(|m| *m != member);
        }
        self.temporal_constraints
            .retain(|constraint| constraint.references().all(|r| r != member));
    }

    /// Ids of criteria reachable from the root, in traversal order
    pub fn reachable_criteria(&self) -> Vec<CriterionId> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        self.collect_reachable(GroupId::ROOT, &mut visited, &mut out);
        out
    }

    fn collect_reachable(&self, id: GroupId, visited: &mut HashSet<GroupId>, out: &mut Vec<CriterionId>) {
        if !visited.insert(id) {
            return;
        }
        let Some(group) = self.group(id) else {
            return;
        };
        for member in &group.criteria_ids {
            match member {
                CriteriaRef::Criterion(c) => out.push(*c),
                CriteriaRef::Group(g) => self.collect_reachable(*g, visited, out),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::CriterionKind;
    use crate::group::GroupKind;
    use crate::temporal::{TemporalConstraintType, TemporalIdList};

    fn sample() -> CriteriaTree {
        let mut tree = CriteriaTree::new();
        tree.criteria.push(Criterion::new(CriterionId(1), CriterionKind::Condition, "A"));
        tree.criteria.push(Criterion::new(CriterionId(2), CriterionKind::Procedure, "B"));
        tree.criteria_groups.push(
            CriteriaGroup::new(GroupId(1), GroupKind::OrGroup).with_member(CriterionId(2)),
        );
        if let Some(root) = tree.group_mut(GroupId::ROOT) {
            root.criteria_ids.push(CriterionId(1).into());
            root.criteria_ids.push(GroupId(1).into());
        }
        tree
    }

    #[test]
    fn test_reachable_order() {
        assert_eq!(sample().reachable_criteria(), vec![CriterionId(1), CriterionId(2)]);
    }

    #[test]
    fn test_remove_criterion_cleans_references() {
        let mut tree = sample();
        tree.temporal_constraints.push(TemporalConstraint::new(
            TemporalConstraintType::SameEncounter,
            TemporalIdList::Ids(vec![CriterionId(1).into(), CriterionId(2).into()]),
        ));
        tree.remove_criterion(CriterionId(2));
        assert!(tree.dangling_references().is_empty());
        assert!(tree.temporal_constraints.is_empty());
    }

    #[test]
    fn test_dangling_reference_detected() {
        let mut tree = sample();
        tree.criteria.retain(|c| c.id != CriterionId(1));
        assert_eq!(
            tree.dangling_references(),
            vec![(GroupId::ROOT, CriteriaRef::Criterion(CriterionId(1)))]
        );
    }
}
