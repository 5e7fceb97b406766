//! Criterion and group identifiers
//!
//! The query engine wire format encodes adjacency with signed integers: a
//! positive id references a criterion, a negative id references a group and
//! `0` is the root group. In memory the two are kept apart as distinct types;
//! the signed form only exists at the serialization boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed identifier as it appears in wire documents
pub type WireId = i64;

/// Identifier of a criterion (always `>= 1` in a normalized tree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CriterionId(pub u32);

impl CriterionId {
    /// Signed wire representation
    pub const fn to_wire(self) -> WireId {
        self.0 as WireId
    }
}

impl fmt::Display for CriterionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a criteria group; `GroupId::ROOT` is the tree root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub u32);

impl GroupId {
    /// The root group
    pub const ROOT: GroupId = GroupId(0);

    /// Whether this is the root group
    pub const fn is_root(self) -> bool {
        self.0 == 0
    }

    /// Signed wire representation (`0`, `-1`, `-2`, ...)
    pub const fn to_wire(self) -> WireId {
        -(self.0 as WireId)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

/// One entry of a group's member list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "WireId", from = "WireId")]
pub enum CriteriaRef {
    Criterion(CriterionId),
    Group(GroupId),
}

impl CriteriaRef {
    /// Decode a signed wire id
    pub fn from_wire(id: WireId) -> Self {
        if id > 0 {
            CriteriaRef::Criterion(CriterionId(clamp_u32(id.unsigned_abs())))
        } else {
            CriteriaRef::Group(GroupId(clamp_u32(id.unsigned_abs())))
        }
    }

    /// Encode as a signed wire id
    pub const fn to_wire(self) -> WireId {
        match self {
            CriteriaRef::Criterion(id) => id.to_wire(),
            CriteriaRef::Group(id) => id.to_wire(),
        }
    }

    /// The referenced criterion, if any
    pub const fn as_criterion(self) -> Option<CriterionId> {
        match self {
            CriteriaRef::Criterion(id) => Some(id),
            CriteriaRef::Group(_) => None,
        }
    }

    /// The referenced group, if any
    pub const fn as_group(self) -> Option<GroupId> {
        match self {
            CriteriaRef::Group(id) => Some(id),
            CriteriaRef::Criterion(_) => None,
        }
    }
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

impl From<WireId> for CriteriaRef {
    fn from(id: WireId) -> Self {
        CriteriaRef::from_wire(id)
    }
}

impl From<CriteriaRef> for WireId {
    fn from(r: CriteriaRef) -> Self {
        r.to_wire()
    }
}

impl From<CriterionId> for CriteriaRef {
    fn from(id: CriterionId) -> Self {
        CriteriaRef::Criterion(id)
    }
}

impl From<GroupId> for CriteriaRef {
    fn from(id: GroupId) -> Self {
        CriteriaRef::Group(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_wire_ids() {
        assert_eq!(CriteriaRef::from_wire(3), CriteriaRef::Criterion(CriterionId(3)));
        assert_eq!(CriteriaRef::from_wire(-2), CriteriaRef::Group(GroupId(2)));
        assert_eq!(CriteriaRef::from_wire(0), CriteriaRef::Group(GroupId::ROOT));
        assert_eq!(CriteriaRef::from_wire(WireId::MIN), CriteriaRef::Group(GroupId(u32::MAX)));
        assert_eq!(CriteriaRef::from_wire(WireId::MAX), CriteriaRef::Criterion(CriterionId(u32::MAX)));
        assert_eq!(CriteriaRef::Group(GroupId(4)).to_wire(), -4);
    }

    #[test]
    fn test_serializes_as_signed_integer() {
        let refs = vec![
            CriteriaRef::Criterion(CriterionId(1)),
            CriteriaRef::Group(GroupId(1)),
        ];
        let json = serde_json::to_string(&refs).unwrap();
        assert_eq!(json, "[1,-1]");
        let parsed: Vec<CriteriaRef> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, refs);
    }
}
