//! Logical groups of criteria

use crate::ids::{CriteriaRef, GroupId};
use crate::value::Comparator;
use serde::{Deserialize, Serialize};

/// Options of an "N among M" group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NAmongMOptions {
    /// Number of members that must match
    pub n: u32,
    /// How the match count is compared with `n`
    pub operator: Comparator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delay_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_delay_max: Option<u32>,
}

impl NAmongMOptions {
    pub fn new(n: u32, operator: Comparator) -> Self {
        Self {
            n,
            operator,
            time_delay_min: None,
            time_delay_max: None,
        }
    }
}

/// Group combinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GroupKind {
    AndGroup,
    OrGroup,
    #[serde(rename = "nAmongM")]
    NAmongM(NAmongMOptions),
}

impl GroupKind {
    /// Wire `_type` tag
    pub const fn as_str(&self) -> &'static str {
        match self {
            GroupKind::AndGroup => "andGroup",
            GroupKind::OrGroup => "orGroup",
            GroupKind::NAmongM(_) => "nAmongM",
        }
    }
}

/// A group of the criteria tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaGroup {
    pub id: GroupId,
    #[serde(default)]
    pub title: String,
    pub kind: GroupKind,
    pub is_inclusive: bool,
    /// Ordered members; the only record of the tree structure
    #[serde(default)]
    pub criteria_ids: Vec<CriteriaRef>,
}

impl CriteriaGroup {
    pub fn new(id: GroupId, kind: GroupKind) -> Self {
        Self {
            id,
            title: default_group_title(id),
            kind,
            is_inclusive: true,
            criteria_ids: Vec::new(),
        }
    }

    /// An empty AND root group
    pub fn root() -> Self {
        Self::new(GroupId::ROOT, GroupKind::AndGroup)
    }

    /// Append a member
    pub fn with_member(mut self, member: impl Into<CriteriaRef>) -> Self {
        self.criteria_ids.push(member.into());
        self
    }

    /// Set the inclusion flag
    pub fn with_inclusive(mut self, is_inclusive: bool) -> Self {
        self.is_inclusive = is_inclusive;
        self
    }
}

/// Title given to groups that do not carry one
pub fn default_group_title(id: GroupId) -> String {
    if id.is_root() {
        "Main group".to_string()
    } else {
        format!("Group {}", id.0)
    }
}
