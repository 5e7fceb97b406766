//! Chips command implementation

use super::{input, output};
use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_cohort_compiler::{CompilerOptions, QueryCompiler};
use octofhir_cohort_model::CriteriaTree;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for chips command
pub struct ChipsConfig {
    pub tree: PathBuf,
    pub deidentified: bool,
    pub json: bool,
    pub pretty: bool,
    pub output_file: Option<PathBuf>,
}

/// Summary of one criterion
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionSummary {
    pub id: u32,
    pub title: String,
    pub chips: Vec<String>,
    pub errors: Vec<String>,
}

/// Chips and validation messages of every criterion
pub fn summarize(compiler: &QueryCompiler, tree: &CriteriaTree, deidentified: bool) -> Result<Vec<CriterionSummary>> {
    tree.criteria
        .iter()
        .map(|criterion| -> Result<CriterionSummary> {
            let chips = compiler
                .criterion_chips(criterion, deidentified)
                .with_context(|| format!("Failed to summarize criterion {}", criterion.id))?;
            let errors = compiler.validate_criterion(criterion, deidentified)?;
            Ok(CriterionSummary {
                id: criterion.id.0,
                title: criterion.title.clone(),
                chips: chips.into_iter().map(|chip| chip.label).collect(),
                errors,
            })
        })
        .collect()
}

/// Plain text listing of summaries
pub fn render_summaries(summaries: &[CriterionSummary]) -> String {
    let mut lines = Vec::new();
    for summary in summaries {
        lines.push(format!("{} {}", format!("[{}]", summary.id).bold(), summary.title));
        lines.extend(summary.chips.iter().map(|chip| format!("    {}", chip)));
        lines.extend(summary.errors.iter().map(|error| format!("    {} {}", "!".red().bold(), error)));
    }
    lines.join("\n")
}

/// Print chips for every criterion of a tree file
pub async fn chips(config: ChipsConfig) -> Result<()> {
    let tree: CriteriaTree = input::load_json(&config.tree)?;
    let compiler = input::compiler_for(&[], CompilerOptions::default());
    let summaries = summarize(&compiler, &tree, config.deidentified)?;

    let content = if config.json {
        output::format_json(&summaries, config.pretty)?
    } else {
        render_summaries(&summaries)
    };
    output::write_output(&content, config.output_file.as_deref())
}
