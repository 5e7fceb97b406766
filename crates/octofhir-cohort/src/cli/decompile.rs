//! Decompile command implementation

use super::{input, output};
use anyhow::{Context, Result};
use octofhir_cohort_compiler::CompilerOptions;
use octofhir_cohort_model::RequeteurSearch;
use std::path::PathBuf;

/// Configuration for decompile command
pub struct DecompileConfig {
    pub request: PathBuf,
    pub populations: Option<PathBuf>,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Decompile a request file into a criteria tree
pub async fn decompile(config: DecompileConfig) -> Result<()> {
    let document: RequeteurSearch = input::load_json(&config.request)?;
    let populations = input::load_populations(config.populations.as_deref())?;

    let compiler = input::compiler_for(&populations, CompilerOptions::default());
    let unbuilt = compiler
        .unbuild_request(&document)
        .await
        .with_context(|| format!("Failed to decompile request: {}", config.request.display()))?;

    for criterion in unbuilt.tree.criteria.iter().filter(|criterion| criterion.error) {
        eprintln!(
            "{}",
            output::format_warning(&format!(
                "Criterion {} ({}) could not be fully restored",
                criterion.id, criterion.title
            ))
        );
    }

    let content = output::format_json(&unbuilt, config.pretty)?;
    output::write_output(&content, config.output_file.as_deref())
}
