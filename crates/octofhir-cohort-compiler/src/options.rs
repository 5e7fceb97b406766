//! Compiler configuration

use octofhir_cohort_model::DEFAULT_REQUEST_VERSION;
use serde::{Deserialize, Serialize};

/// Options of a `QueryCompiler`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// `version` written into compiled requests
    pub request_version: String,
    /// Leave criteria flagged `error` out of compiled requests
    pub skip_errored_criteria: bool,
    /// Fixed id offset for joins instead of the computed one
    pub join_offset: Option<u32>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            request_version: DEFAULT_REQUEST_VERSION.to_string(),
            skip_errored_criteria: true,
            join_offset: None,
        }
    }
}

impl CompilerOptions {
    pub fn with_request_version(mut self, version: impl Into<String>) -> Self {
        self.request_version = version.into();
        self
    }

    pub fn with_join_offset(mut self, offset: u32) -> Self {
        self.join_offset = Some(offset);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: CompilerOptions = serde_json::from_str(r#"{"joinOffset": 100}"#).unwrap();
        assert_eq!(options.request_version, "v1.5.0");
        assert!(options.skip_errored_criteria);
        assert_eq!(options.join_offset, Some(100));
    }
}
