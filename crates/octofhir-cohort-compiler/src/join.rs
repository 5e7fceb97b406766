//! Splicing one wire document into another

use crate::error::{QueryError, QueryResult};
use crate::request::QueryCompiler;
use crate::unbuild::UnbuiltRequest;
use octofhir_cohort_model::{
    CriteriaRef, GroupId, RequeteurGroup, RequeteurNode, RequeteurSearch, WireGroupType, WireId,
};

impl QueryCompiler {
    /// Add `incoming` as a child group of `parent` in `host`, then decompile
    ///
    /// Incoming ids are moved past the host's id range before splicing;
    /// decompilation then renumbers the combined document.
    pub async fn join_request(
        &self,
        host: &RequeteurSearch,
        incoming: &RequeteurSearch,
        parent: GroupId,
    ) -> QueryResult<UnbuiltRequest> {
        let Some(incoming_root) = &incoming.request else {
            log::debug!("Nothing to join, decompiling host request");
            return self.unbuild_request(host).await;
        };

        let mut combined = host.clone();
        let host_root = combined.request.get_or_insert_with(empty_root);
        let offset = match self.options.join_offset {
            Some(offset) => u64::from(offset),
            None => max_abs_id(host_root) + 1,
        };
        // Shifted ids must stay addressable by criterion and group ids
        let highest = max_abs_id(incoming_root);
        if offset.checked_add(highest).is_none_or(|top| top > u64::from(u32::MAX)) {
            return Err(QueryError::IdOverflow { offset, highest });
        }
        let offset = offset as WireId;
        log::debug!("Joining request under group {} with id offset {}", parent, offset);

        let target = host_root
            .find_group_mut(parent.to_wire())
            .ok_or(QueryError::GroupNotFound(parent))?;
        target.criteria.push(RequeteurNode::Group(shift_group(incoming_root, offset)));

        self.unbuild_request(&combined).await
    }
}

fn empty_root() -> RequeteurGroup {
    RequeteurGroup {
        group_type: WireGroupType::And,
        id: GroupId::ROOT.to_wire(),
        is_inclusive: true,
        criteria: Vec::new(),
        temporal_constraints: None,
        n_among_m_options: None,
    }
}

fn max_abs_id(group: &RequeteurGroup) -> u64 {
    let mut max = 0;
    group.for_each_id(&mut |id| max = max.max(id.unsigned_abs()));
    max
}

/// Criteria move up by `offset`, groups (root included) move down
fn shift_id(id: WireId, offset: WireId) -> WireId {
    if id > 0 {
        id.saturating_add(offset)
    } else {
        id.saturating_sub(offset)
    }
}

fn shift_group(group: &RequeteurGroup, offset: WireId) -> RequeteurGroup {
    let criteria = group
        .criteria
        .iter()
        .map(|node| match node {
            RequeteurNode::Group(child) => RequeteurNode::Group(shift_group(child, offset)),
            RequeteurNode::Criteria(criteria) => {
                let mut criteria = criteria.clone();
                criteria.id = shift_id(criteria.id, offset);
                RequeteurNode::Criteria(criteria)
            }
        })
        .collect();
    let temporal_constraints = group.temporal_constraints.as_ref().map(|constraints| {
        constraints
            .iter()
            .filter_map(|constraint| {
                constraint.try_map_refs(|reference| {
                    Some(CriteriaRef::from_wire(shift_id(reference.to_wire(), offset)))
                })
            })
            .collect()
    });

    RequeteurGroup {
        group_type: group.group_type,
        id: shift_id(group.id, offset),
        is_inclusive: group.is_inclusive,
        criteria,
        temporal_constraints,
        n_among_m_options: group.n_among_m_options.clone(),
    }
}
