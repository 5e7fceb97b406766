//! Compile command implementation

use super::{input, output};
use anyhow::{Context, Result};
use octofhir_cohort_compiler::{
    CompilerOptions, PopulationRecord, check_nominative_criteria, clean_nominative_criteria, is_deidentified,
};
use octofhir_cohort_model::{CriteriaTree, CriterionId, RequeteurSearch};
use std::path::PathBuf;

/// Configuration for compile command
pub struct CompileConfig {
    pub tree: PathBuf,
    pub populations: Option<PathBuf>,
    pub request_version: Option<String>,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Result of compiling a tree
#[derive(Debug)]
pub struct Compiled {
    pub document: RequeteurSearch,
    /// Criteria left out because they identify patients
    pub removed: Vec<CriterionId>,
}

/// Compile a tree for the given populations
///
/// Nominative criteria are removed first when the populations are
/// de-identified.
pub fn compile_tree(
    tree: &CriteriaTree,
    populations: &[PopulationRecord],
    request_version: Option<&str>,
) -> Result<Compiled> {
    let mut options = CompilerOptions::default();
    if let Some(version) = request_version {
        options = options.with_request_version(version);
    }
    let compiler = input::compiler_for(populations, options);
    let (tree, removed) = if is_deidentified(populations) {
        (clean_nominative_criteria(tree), check_nominative_criteria(tree))
    } else {
        (tree.clone(), Vec::new())
    };
    let document = compiler
        .build_request(&tree, populations)
        .context("Failed to compile criteria tree")?;
    Ok(Compiled { document, removed })
}

/// Compile a criteria tree file into a request
pub async fn compile(config: CompileConfig) -> Result<()> {
    let tree: CriteriaTree = input::load_json(&config.tree)?;
    let populations = input::load_populations(config.populations.as_deref())?;

    let compiled = compile_tree(&tree, &populations, config.request_version.as_deref())?;
    for id in &compiled.removed {
        eprintln!(
            "{}",
            output::format_warning(&format!("Criterion {} identifies patients and was removed", id))
        );
    }
    if compiled.document.request.is_none() {
        eprintln!("{}", output::format_warning("Criteria tree compiled to an empty request"));
    }

    let content = output::format_json(&compiled.document, config.pretty)?;
    output::write_output(&content, config.output_file.as_deref())
}
