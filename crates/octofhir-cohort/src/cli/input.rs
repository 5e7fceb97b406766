//! Input loading

use anyhow::{Context, Result};
use octofhir_cohort_compiler::{CompilerOptions, PopulationRecord, QueryCompiler, StaticPopulationResolver};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Read and parse a JSON file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON file: {}", path.display()))
}

/// Population records from an optional JSON array file
pub fn load_populations(path: Option<&Path>) -> Result<Vec<PopulationRecord>> {
    match path {
        Some(path) => load_json(path),
        None => Ok(Vec::new()),
    }
}

/// A compiler resolving populations from the given records
pub fn compiler_for(populations: &[PopulationRecord], options: CompilerOptions) -> QueryCompiler {
    QueryCompiler::builder()
        .options(options)
        .population_resolver(Arc::new(StaticPopulationResolver::new(populations.to_vec())))
        .build()
}
