//! Temporal constraints between criteria

use crate::ids::{CriteriaRef, WireId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Temporal relationship declared between criteria
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemporalConstraintType {
    /// Placeholder left by editors; never serialized
    None,
    SameEncounter,
    DifferentEncounter,
    DirectChronologicalOrdering,
    SameEpisodeOfCare,
}

/// Criteria a constraint applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalIdList {
    /// Every criterion of the query (wire `["All"]`)
    All,
    Ids(Vec<CriteriaRef>),
}

impl TemporalIdList {
    /// Explicit references, empty for `All`
    pub fn refs(&self) -> &[CriteriaRef] {
        match self {
            TemporalIdList::All => &[],
            TemporalIdList::Ids(ids) => ids,
        }
    }
}

const ALL_TOKEN: &str = "All";

impl Serialize for TemporalIdList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TemporalIdList::All => [ALL_TOKEN].serialize(serializer),
            TemporalIdList::Ids(ids) => ids.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TemporalIdList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Ids(Vec<WireId>),
            Tokens(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Ids(ids) => Ok(TemporalIdList::Ids(
                ids.into_iter().map(CriteriaRef::from_wire).collect(),
            )),
            Repr::Tokens(tokens) if tokens.iter().any(|t| t == ALL_TOKEN) => Ok(TemporalIdList::All),
            Repr::Tokens(tokens) => Err(D::Error::custom(format!(
                "unexpected temporal id list: {:?}",
                tokens
            ))),
        }
    }
}

/// Duration bound of a chronological relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TemporalDuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minutes: Option<u32>,
}

/// Occurrence selection for one criterion of a chronological constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceChoice {
    pub criterion_id: CriteriaRef,
    pub occurrence: OccurrenceSelection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OccurrenceSelection {
    Any,
    First,
    Last,
}

/// A temporal constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalConstraint {
    pub id_list: TemporalIdList,
    pub constraint_type: TemporalConstraintType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_choices: Option<Vec<OccurrenceChoice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_relation_min_duration: Option<TemporalDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_relation_max_duration: Option<TemporalDuration>,
}

impl TemporalConstraint {
    pub fn new(constraint_type: TemporalConstraintType, id_list: TemporalIdList) -> Self {
        Self {
            id_list,
            constraint_type,
            occurrence_choices: None,
            time_relation_min_duration: None,
            time_relation_max_duration: None,
        }
    }

    /// Every criteria reference the constraint mentions
    pub fn references(&self) -> impl Iterator<Item = CriteriaRef> + '_ {
        self.id_list.refs().iter().copied().chain(
            self.occurrence_choices
                .iter()
                .flatten()
                .map(|choice| choice.criterion_id),
        )
    }

    /// Rewrite every reference; returns `None` if any reference cannot be mapped
    pub fn try_map_refs<F>(&self, mut f: F) -> Option<Self>
    where
        F: FnMut(CriteriaRef) -> Option<CriteriaRef>,
    {
        let id_list = match &self.id_list {
            TemporalIdList::All => TemporalIdList::All,
            TemporalIdList::Ids(ids) => {
                TemporalIdList::Ids(ids.iter().map(|id| f(*id)).collect::<Option<Vec<_>>>()?)
            }
        };
        let occurrence_choices = match &self.occurrence_choices {
            None => None,
            Some(choices) => Some(
                choices
                    .iter()
                    .map(|choice| {
                        f(choice.criterion_id).map(|criterion_id| OccurrenceChoice {
                            criterion_id,
                            occurrence: choice.occurrence,
                        })
                    })
                    .collect::<Option<Vec<_>>>()?,
            ),
        };
        Some(Self {
            id_list,
            occurrence_choices,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CriterionId;

    #[test]
    fn test_id_list_all_token() {
        let list: TemporalIdList = serde_json::from_str(r#"["All"]"#).unwrap();
        assert_eq!(list, TemporalIdList::All);
        assert_eq!(serde_json::to_string(&list).unwrap(), r#"["All"]"#);
    }

    #[test]
    fn test_id_list_ids() {
        let list: TemporalIdList = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(
            list,
            TemporalIdList::Ids(vec![
                CriteriaRef::Criterion(CriterionId(1)),
                CriteriaRef::Criterion(CriterionId(2)),
            ])
        );
    }

    #[test]
    fn test_try_map_refs_fails_on_missing() {
        let constraint = TemporalConstraint::new(
            TemporalConstraintType::SameEncounter,
            TemporalIdList::Ids(vec![CriteriaRef::from_wire(1), CriteriaRef::from_wire(7)]),
        );
        let mapped = constraint.try_map_refs(|r| (r.to_wire() == 1).then_some(r));
        assert!(mapped.is_none());
    }
}
