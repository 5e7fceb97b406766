//! Source populations
//!
//! A request targets one or more populations (care-site or provider
//! cohorts). Any access-restricted population switches the whole request to
//! de-identified mode.

use async_trait::async_trait;
use octofhir_cohort_mapper::ResolverError;
use octofhir_cohort_model::SourcePopulation;
use serde::{Deserialize, Serialize};

/// List a population id is sent in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PopulationSource {
    #[default]
    CareSite,
    Provider,
}

/// A resolved population
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationRecord {
    pub cohort_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub source: PopulationSource,
    /// Only de-identified data may be queried
    #[serde(default)]
    pub access_restricted: bool,
}

impl PopulationRecord {
    pub fn new(cohort_id: impl Into<String>, source: PopulationSource) -> Self {
        Self {
            cohort_id: cohort_id.into(),
            name: None,
            source,
            access_restricted: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_access_restricted(mut self, access_restricted: bool) -> Self {
        self.access_restricted = access_restricted;
        self
    }
}

/// Whether a request over these populations is de-identified
pub fn is_deidentified(populations: &[PopulationRecord]) -> bool {
    populations.iter().any(|population| population.access_restricted)
}

/// Wire population lists for a set of records
pub fn source_population(populations: &[PopulationRecord]) -> SourcePopulation {
    let ids = |source: PopulationSource| {
        let ids: Vec<String> = populations
            .iter()
            .filter(|population| population.source == source)
            .map(|population| population.cohort_id.clone())
            .collect();
        (!ids.is_empty()).then_some(ids)
    };
    SourcePopulation {
        caresite_cohort_list: ids(PopulationSource::CareSite),
        provider_cohort_list: ids(PopulationSource::Provider),
    }
}

/// Looks up population records by cohort id
#[async_trait]
pub trait PopulationResolver: Send + Sync {
    /// Resolve populations; unknown ids are omitted
    async fn resolve_populations(&self, ids: &[String]) -> Result<Vec<PopulationRecord>, ResolverError>;
}

/// Resolver serving a fixed list of records
#[derive(Debug, Clone, Default)]
pub struct StaticPopulationResolver {
    records: Vec<PopulationRecord>,
}

impl StaticPopulationResolver {
    pub fn new(records: Vec<PopulationRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl PopulationResolver for StaticPopulationResolver {
    async fn resolve_populations(&self, ids: &[String]) -> Result<Vec<PopulationRecord>, ResolverError> {
        Ok(self
            .records
            .iter()
            .filter(|record| ids.contains(&record.cohort_id))
            .cloned()
            .collect())
    }
}

/// Resolve the populations of a wire document
///
/// Ids the resolver does not know are kept as unrestricted records of the
/// list they were found in.
pub(crate) async fn resolve_source_population(
    resolver: &dyn PopulationResolver,
    source: &SourcePopulation,
) -> Result<Vec<PopulationRecord>, ResolverError> {
    let ids = source.ids();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut resolved = resolver.resolve_populations(&ids).await?;
    let listed = [
        (PopulationSource::CareSite, &source.caresite_cohort_list),
        (PopulationSource::Provider, &source.provider_cohort_list),
    ];
    for (list_source, list) in listed {
        for id in list.iter().flatten() {
            if !resolved.iter().any(|record| &record.cohort_id == id) {
                log::warn!("Population {} could not be resolved", id);
                resolved.push(PopulationRecord::new(id.clone(), list_source));
            }
        }
    }
    Ok(resolved)
}
