//! Mock implementations for testing
//!
//! Configurable entity and population resolvers that record how often they
//! are called.

use async_trait::async_trait;
use octofhir_cohort_compiler::{PopulationRecord, PopulationResolver};
use octofhir_cohort_mapper::{EntityRecord, EntityResolver, ResolverError};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Mock terminology and care site service
#[derive(Clone, Default)]
pub struct MockEntityResolver {
    codes: Arc<RwLock<HashMap<String, EntityRecord>>>,
    entities: Arc<RwLock<HashMap<String, EntityRecord>>>,
    failing_codes: Arc<RwLock<Vec<String>>>,
}

impl MockEntityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a code and its leaf status
    pub fn add_code(&self, code: &str, label: &str, is_leaf: bool) {
        self.codes
            .write()
            .insert(code.to_string(), EntityRecord::new(code, label).with_leaf(is_leaf));
    }

    /// Configure a care site
    pub fn add_entity(&self, id: &str, label: &str) {
        self.entities.write().insert(id.to_string(), EntityRecord::new(id, label));
    }

    /// Make lookups of a code fail
    pub fn fail_on(&self, code: &str) {
        self.failing_codes.write().push(code.to_string());
    }
}

#[async_trait]
impl EntityResolver for MockEntityResolver {
    async fn resolve_entities(&self, ids: &[String]) -> Result<Vec<EntityRecord>, ResolverError> {
        let entities = self.entities.read();
        Ok(ids.iter().filter_map(|id| entities.get(id).cloned()).collect())
    }

    async fn resolve_code(&self, _system: Option<&str>, code: &str) -> Result<Option<EntityRecord>, ResolverError> {
        if self.failing_codes.read().iter().any(|c| c == code) {
            return Err(ResolverError::Service(format!("lookup of {} failed", code)));
        }
        Ok(self.codes.read().get(code).cloned())
    }
}

/// Mock population service
#[derive(Clone, Default)]
pub struct MockPopulationResolver {
    records: Arc<RwLock<Vec<PopulationRecord>>>,
    calls: Arc<RwLock<usize>>,
    unavailable: bool,
}

impl MockPopulationResolver {
    pub fn new(records: Vec<PopulationRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
            ..Self::default()
        }
    }

    /// A resolver whose every lookup fails
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.read()
    }
}

#[async_trait]
impl PopulationResolver for MockPopulationResolver {
    async fn resolve_populations(&self, ids: &[String]) -> Result<Vec<PopulationRecord>, ResolverError> {
        *self.calls.write() += 1;
        if self.unavailable {
            return Err(ResolverError::Service("population service unavailable".to_string()));
        }
        Ok(self
            .records
            .read()
            .iter()
            .filter(|record| ids.contains(&record.cohort_id))
            .cloned()
            .collect())
    }
}
