//! JSON serialization for wire documents and criteria trees

use std::io::{Read, Write};

use crate::tree::CriteriaTree;
use crate::wire::RequeteurSearch;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors that can occur during serialization
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON codec shared by wire documents and stored trees
pub trait JsonDocument: Serialize + DeserializeOwned {
    /// Compact JSON
    fn to_json(&self) -> Result<String, SerializeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty-printed JSON
    fn to_json_pretty(&self) -> Result<String, SerializeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from a JSON string
    fn from_json(input: &str) -> Result<Self, SerializeError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Write JSON to a writer
    fn write_json<W: Write>(&self, mut writer: W, pretty: bool) -> Result<(), SerializeError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Read JSON from a reader
    fn read_json<R: Read>(mut reader: R) -> Result<Self, SerializeError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_json(&content)
    }
}

impl JsonDocument for RequeteurSearch {}
impl JsonDocument for CriteriaTree {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{
        RequeteurCriteria, RequeteurGroup, RequeteurNode, SourcePopulation, WireCriteriaType,
        WireGroupType, WireOccurrence,
    };
    use crate::value::Comparator;

    fn sample() -> RequeteurSearch {
        RequeteurSearch::new(
            "v1.5.0",
            SourcePopulation {
                caresite_cohort_list: Some(vec!["42".to_string()]),
                provider_cohort_list: None,
            },
        )
        .with_request(RequeteurGroup {
            group_type: WireGroupType::And,
            id: 0,
            is_inclusive: true,
            criteria: vec![RequeteurNode::Criteria(RequeteurCriteria {
                criteria_type: WireCriteriaType::BasicResource,
                id: 1,
                name: "Diagnosis".to_string(),
                is_inclusive: true,
                resource_type: "Condition".to_string(),
                filter_fhir: "code=I10".to_string(),
                occurrence: Some(WireOccurrence {
                    n: 1,
                    operator: Comparator::GreaterOrEqual,
                }),
            })],
            temporal_constraints: None,
            n_among_m_options: None,
        })
    }

    #[test]
    fn test_wire_field_names() {
        let json = sample().to_json().unwrap();
        assert!(json.contains(r#""_type":"request""#));
        assert!(json.contains(r#""_type":"andGroup""#));
        assert!(json.contains(r#""_type":"basicResource""#));
        assert!(json.contains(r#""filterFhir":"code=I10""#));
        assert!(json.contains(r#""caresiteCohortList":["42"]"#));
        assert!(!json.contains("providerCohortList"));
    }

    #[test]
    fn test_json_roundtrip() {
        let doc = sample();
        let parsed = RequeteurSearch::from_json(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_nested_group_parsed_as_group() {
        let json = r#"{
            "version": "v1.5.0",
            "sourcePopulation": {},
            "request": {
                "_type": "orGroup", "_id": 0, "isInclusive": true,
                "criteria": [
                    {"_type": "andGroup", "_id": -1, "isInclusive": false, "criteria": []}
                ]
            }
        }"#;
        let doc = RequeteurSearch::from_json(json).unwrap();
        let root = doc.request.unwrap();
        assert!(matches!(&root.criteria[0], RequeteurNode::Group(g) if g.id == -1 && !g.is_inclusive));
    }
}
