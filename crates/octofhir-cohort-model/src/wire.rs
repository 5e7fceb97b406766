//! Query engine wire document
//!
//! The wire document nests groups directly and carries one flattened filter
//! expression per criterion. Ids are signed: positive for criteria, negative
//! for groups, `0` for the root.

use crate::group::NAmongMOptions;
use crate::ids::WireId;
use crate::temporal::TemporalConstraint;
use crate::value::Comparator;
use serde::{Deserialize, Serialize};

/// Request format version emitted by default
pub const DEFAULT_REQUEST_VERSION: &str = "v1.5.0";

/// Root of a wire document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequeteurSearch {
    pub version: String,
    #[serde(rename = "_type", default = "request_tag")]
    pub document_type: String,
    #[serde(default)]
    pub source_population: SourcePopulation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequeteurGroup>,
}

fn request_tag() -> String {
    "request".to_string()
}

impl RequeteurSearch {
    pub fn new(version: impl Into<String>, source_population: SourcePopulation) -> Self {
        Self {
            version: version.into(),
            document_type: request_tag(),
            source_population,
            request: None,
        }
    }

    /// Set the root group
    pub fn with_request(mut self, request: RequeteurGroup) -> Self {
        self.request = Some(request);
        self
    }
}

/// Population the query is evaluated against
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePopulation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caresite_cohort_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_cohort_list: Option<Vec<String>>,
}

impl SourcePopulation {
    /// Every referenced population id, care sites first
    pub fn ids(&self) -> Vec<String> {
        self.caresite_cohort_list
            .iter()
            .flatten()
            .chain(self.provider_cohort_list.iter().flatten())
            .cloned()
            .collect()
    }
}

/// Wire group `_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WireGroupType {
    #[serde(rename = "andGroup")]
    And,
    #[serde(rename = "orGroup")]
    Or,
    #[serde(rename = "nAmongM")]
    NAmongM,
}

/// Wire criterion `_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WireCriteriaType {
    #[default]
    #[serde(rename = "basicResource")]
    BasicResource,
}

/// A group node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequeteurGroup {
    #[serde(rename = "_type")]
    pub group_type: WireGroupType,
    #[serde(rename = "_id")]
    pub id: WireId,
    pub is_inclusive: bool,
    pub criteria: Vec<RequeteurNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_constraints: Option<Vec<TemporalConstraint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_among_m_options: Option<NAmongMOptions>,
}

/// Occurrence requirement of a criterion node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireOccurrence {
    pub n: u32,
    pub operator: Comparator,
}

/// A criterion node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequeteurCriteria {
    #[serde(rename = "_type", default)]
    pub criteria_type: WireCriteriaType,
    #[serde(rename = "_id")]
    pub id: WireId,
    #[serde(default)]
    pub name: String,
    pub is_inclusive: bool,
    pub resource_type: String,
    #[serde(default)]
    pub filter_fhir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence: Option<WireOccurrence>,
}

/// Child of a group node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequeteurNode {
    Group(RequeteurGroup),
    Criteria(RequeteurCriteria),
}

impl RequeteurNode {
    pub fn id(&self) -> WireId {
        match self {
            RequeteurNode::Group(group) => group.id,
            RequeteurNode::Criteria(criteria) => criteria.id,
        }
    }
}

impl RequeteurGroup {
    /// Depth-first search for a group by wire id
    pub fn find_group_mut(&mut self, id: WireId) -> Option<&mut RequeteurGroup> {
        if self.id == id {
            return Some(self);
        }
        self.criteria.iter_mut().find_map(|node| match node {
            RequeteurNode::Group(group) => group.find_group_mut(id),
            RequeteurNode::Criteria(_) => None,
        })
    }

    /// Visit every node id (groups and criteria) of the subtree
    pub fn for_each_id(&self, f: &mut impl FnMut(WireId)) {
        f(self.id);
        for node in &self.criteria {
            match node {
                RequeteurNode::Group(group) => group.for_each_id(f),
                RequeteurNode::Criteria(criteria) => f(criteria.id),
            }
        }
    }
}
