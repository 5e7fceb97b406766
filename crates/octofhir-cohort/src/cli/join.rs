//! Join command implementation

use super::{input, output};
use anyhow::{Context, Result};
use octofhir_cohort_compiler::CompilerOptions;
use octofhir_cohort_model::{GroupId, RequeteurSearch};
use std::path::PathBuf;

/// Configuration for join command
pub struct JoinConfig {
    pub host: PathBuf,
    pub incoming: PathBuf,
    /// Host group receiving the incoming root, `0` for the root
    pub parent: u32,
    pub populations: Option<PathBuf>,
    pub join_offset: Option<u32>,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Graft one request file under a group of another
pub async fn join(config: JoinConfig) -> Result<()> {
    let host: RequeteurSearch = input::load_json(&config.host)?;
    let incoming: RequeteurSearch = input::load_json(&config.incoming)?;
    let populations = input::load_populations(config.populations.as_deref())?;

    let mut options = CompilerOptions::default();
    if let Some(offset) = config.join_offset {
        options = options.with_join_offset(offset);
    }
    let compiler = input::compiler_for(&populations, options);

    let joined = compiler
        .join_request(&host, &incoming, GroupId(config.parent))
        .await
        .with_context(|| format!("Failed to join {} into {}", config.incoming.display(), config.host.display()))?;

    let content = output::format_json(&joined, config.pretty)?;
    output::write_output(&content, config.output_file.as_deref())
}
