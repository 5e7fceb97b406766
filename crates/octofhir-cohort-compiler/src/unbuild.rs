//! Wire document to criteria tree
//!
//! Wire ids are not trusted: independent saves may reuse or skip them. Every
//! node is renumbered in one pre-order walk, criteria `1..N` and groups
//! `0, 1, 2, ...`, and the substitution is returned with the tree.

use crate::disassembler::disassemble_filter;
use crate::error::{QueryError, QueryResult};
use crate::population::{PopulationRecord, is_deidentified, resolve_source_population};
use crate::request::QueryCompiler;
use indexmap::IndexMap;
use indexmap::map::Entry;
use octofhir_cohort_model::{
    Comparator, CriteriaGroup, CriteriaRef, CriteriaTree, Criterion, CriterionId, DataValue, GroupId, GroupKind,
    NAmongMOptions, NumericComparison, OCCURRENCE_FIELD, RequeteurCriteria, RequeteurGroup, RequeteurNode,
    RequeteurSearch, TemporalConstraint, TemporalConstraintType, WireGroupType, WireId, default_group_title,
};
use serde::{Deserialize, Serialize};

/// Wire id to tree id substitution
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IdRemap {
    pub criteria: IndexMap<WireId, CriterionId>,
    pub groups: IndexMap<WireId, GroupId>,
}

impl IdRemap {
    /// New reference for a wire reference, if the node was kept
    pub fn remap(&self, reference: CriteriaRef) -> Option<CriteriaRef> {
        let wire = reference.to_wire();
        if wire > 0 {
            self.criteria.get(&wire).copied().map(CriteriaRef::Criterion)
        } else {
            self.groups.get(&wire).copied().map(CriteriaRef::Group)
        }
    }
}

/// Result of decompiling a wire document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnbuiltRequest {
    pub populations: Vec<PopulationRecord>,
    pub tree: CriteriaTree,
    pub id_remap: IdRemap,
    pub deidentified: bool,
}

impl QueryCompiler {
    /// Decompile a wire document
    ///
    /// A document without `request` gives an empty tree. A criterion whose
    /// filter cannot be disassembled is kept with `error` set and default
    /// fields; a criterion that matches no catalog entry fails the call.
    pub async fn unbuild_request(&self, document: &RequeteurSearch) -> QueryResult<UnbuiltRequest> {
        let populations = resolve_source_population(self.populations.as_ref(), &document.source_population)
            .await
            .map_err(QueryError::Population)?;
        let deidentified = is_deidentified(&populations);

        let Some(root) = &document.request else {
            return Ok(UnbuiltRequest {
                populations,
                tree: CriteriaTree::new(),
                id_remap: IdRemap::default(),
                deidentified,
            });
        };
        if root.id != GroupId::ROOT.to_wire() {
            return Err(QueryError::MissingRoot);
        }

        let mut collected = Collected::default();
        collected.group(root);
        log::debug!(
            "Decompiling {} criteria, {} groups (deidentified: {})",
            collected.criteria.len(),
            collected.groups.len(),
            deidentified
        );

        let temporal_constraints = collected.temporal_constraints();

        let mut criteria = Vec::with_capacity(collected.criteria.len());
        for (id, wire) in &collected.criteria {
            criteria.push(self.unbuild_criterion(*id, wire, deidentified).await?);
        }

        let criteria_groups = collected
            .groups
            .iter()
            .map(|(id, wire, members)| unbuild_group(*id, wire, members.clone()))
            .collect();

        Ok(UnbuiltRequest {
            populations,
            tree: CriteriaTree {
                criteria,
                criteria_groups,
                temporal_constraints,
            },
            id_remap: collected.remap,
            deidentified,
        })
    }

    async fn unbuild_criterion(
        &self,
        id: CriterionId,
        wire: &RequeteurCriteria,
        deidentified: bool,
    ) -> QueryResult<Criterion> {
        let definition = self
            .catalog
            .resolve_wire_criterion(&wire.resource_type, &wire.filter_fhir)?;

        let disassembled = disassemble_filter(
            definition,
            &wire.filter_fhir,
            deidentified,
            &self.registry,
            self.entities.as_ref(),
        )
        .await;
        let (mut fields, error) = match disassembled {
            Ok(fields) => (fields, false),
            Err(err) => {
                log::warn!("Criterion {} ({}) could not be restored: {}", wire.id, wire.resource_type, err);
                (definition.initial_fields(), true)
            }
        };

        if let Some(occurrence) = wire.occurrence.filter(|_| definition.kind.is_occurrence_bearing()) {
            fields.insert(
                OCCURRENCE_FIELD.to_string(),
                DataValue::Comparison(NumericComparison::new(occurrence.operator, occurrence.n)),
            );
        }

        let title = if wire.name.is_empty() {
            definition.title.clone()
        } else {
            wire.name.clone()
        };
        Ok(Criterion {
            fields,
            error,
            ..Criterion::new(id, definition.kind, title).with_inclusive(wire.is_inclusive)
        })
    }
}

fn unbuild_group(id: GroupId, wire: &RequeteurGroup, criteria_ids: Vec<CriteriaRef>) -> CriteriaGroup {
    let kind = match (wire.group_type, &wire.n_among_m_options) {
        (WireGroupType::And, _) => GroupKind::AndGroup,
        (WireGroupType::Or, _) => GroupKind::OrGroup,
        (WireGroupType::NAmongM, Some(options)) => GroupKind::NAmongM(options.clone()),
        (WireGroupType::NAmongM, None) => {
            log::warn!("Group {} has no nAmongM options, using >= 1", wire.id);
            GroupKind::NAmongM(NAmongMOptions::new(1, Comparator::GreaterOrEqual))
        }
    };
    CriteriaGroup {
        id,
        title: default_group_title(id),
        kind,
        is_inclusive: wire.is_inclusive,
        criteria_ids,
    }
}

// ============================================================================
// Collection walk
// ============================================================================

/// Nodes of a wire document in pre-order, with their new ids
#[derive(Default)]
struct Collected<'a> {
    groups: Vec<(GroupId, &'a RequeteurGroup, Vec<CriteriaRef>)>,
    criteria: Vec<(CriterionId, &'a RequeteurCriteria)>,
    remap: IdRemap,
}

impl<'a> Collected<'a> {
    fn group(&mut self, wire: &'a RequeteurGroup) -> GroupId {
        let id = GroupId(self.groups.len() as u32);
        match self.remap.groups.entry(wire.id) {
            Entry::Vacant(entry) => {
                entry.insert(id);
            }
            Entry::Occupied(_) => log::warn!("Duplicate group id {} in request", wire.id),
        }
        let index = self.groups.len();
        self.groups.push((id, wire, Vec::with_capacity(wire.criteria.len())));

        for node in &wire.criteria {
            let member = match node {
                RequeteurNode::Group(group) => CriteriaRef::Group(self.group(group)),
                RequeteurNode::Criteria(criteria) => CriteriaRef::Criterion(self.criterion(criteria)),
            };
            self.groups[index].2.push(member);
        }
        id
    }

    fn criterion(&mut self, wire: &'a RequeteurCriteria) -> CriterionId {
        let id = CriterionId(self.criteria.len() as u32 + 1);
        match self.remap.criteria.entry(wire.id) {
            Entry::Vacant(entry) => {
                entry.insert(id);
            }
            Entry::Occupied(_) => log::warn!("Duplicate criterion id {} in request", wire.id),
        }
        self.criteria.push((id, wire));
        id
    }

    /// Constraints of every group, rewritten to new ids
    fn temporal_constraints(&self) -> Vec<TemporalConstraint> {
        self.groups
            .iter()
            .flat_map(|(_, wire, _)| wire.temporal_constraints.iter().flatten())
            .filter(|constraint| constraint.constraint_type != TemporalConstraintType::None)
            .filter_map(|constraint| {
                let remapped = constraint.try_map_refs(|reference| self.remap.remap(reference));
                if remapped.is_none() {
                    log::warn!(
                        "Dropping {:?} constraint on ids missing from the request",
                        constraint.constraint_type
                    );
                }
                remapped
            })
            .collect()
    }
}
