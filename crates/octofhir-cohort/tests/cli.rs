//! CLI Command Tests
//!
//! Runs the command implementations against files in a temporary directory.

use chrono::NaiveDate;
use octofhir_cohort::cli::{chips, compile, decompile, input, join};
use octofhir_cohort::compiler::{PopulationRecord, PopulationSource};
use octofhir_cohort::model::{
    CriteriaGroup, CriterionId, CriterionKind, DataValue, DateRange, RequeteurNode,
};
use octofhir_cohort::{CriteriaTree, JsonDocument, QueryCompiler, RequeteurSearch, UnbuiltRequest};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

/// Root with a male patient criterion and an exact birth date criterion
fn tree() -> CriteriaTree {
    let compiler = QueryCompiler::new();
    let patient = compiler.definition(CriterionKind::Patient).unwrap();
    let mut tree = CriteriaTree::new();
    tree.criteria = vec![
        patient
            .new_criterion(CriterionId(1))
            .with_field("genders", DataValue::labels([("male", "Male")])),
        patient.new_criterion(CriterionId(2)).with_field(
            "birthdates",
            DataValue::DateRange(DateRange::new(NaiveDate::from_ymd_opt(1980, 5, 1), None)),
        ),
    ];
    tree.criteria_groups = vec![
        CriteriaGroup::root()
            .with_member(CriterionId(1))
            .with_member(CriterionId(2)),
    ];
    tree
}

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn write_populations(dir: &Path, restricted: bool) -> PathBuf {
    let records = vec![
        PopulationRecord::new("42", PopulationSource::Provider).with_access_restricted(restricted),
    ];
    write_file(dir, "populations.json", &serde_json::to_string(&records).unwrap())
}

fn criteria_count(document: &RequeteurSearch) -> usize {
    document.request.as_ref().map_or(0, |root| {
        root.criteria
            .iter()
            .filter(|node| matches!(node, RequeteurNode::Criteria(_)))
            .count()
    })
}

async fn compile_to(dir: &Path, name: &str, populations: Option<PathBuf>) -> PathBuf {
    let tree_path = write_file(dir, "tree.json", &tree().to_json().unwrap());
    let output = dir.join(name);
    compile::compile(compile::CompileConfig {
        tree: tree_path,
        populations,
        request_version: None,
        pretty: true,
        output_file: Some(output.clone()),
    })
    .await
    .unwrap();
    output
}

// ============================================================================
// Compile
// ============================================================================

#[rstest]
#[case(false, 2, vec![])]
#[case(true, 1, vec![CriterionId(2)])]
fn test_compile_removes_nominative_criteria_when_restricted(
    #[case] restricted: bool,
    #[case] sent: usize,
    #[case] removed: Vec<CriterionId>,
) {
    let populations =
        vec![PopulationRecord::new("42", PopulationSource::Provider).with_access_restricted(restricted)];
    let compiled = compile::compile_tree(&tree(), &populations, Some("v2")).unwrap();

    assert_eq!(compiled.removed, removed);
    assert_eq!(compiled.document.version, "v2");
    assert_eq!(criteria_count(&compiled.document), sent);
    assert_eq!(
        compiled.document.source_population.provider_cohort_list,
        Some(vec!["42".to_string()])
    );
}

#[tokio::test]
async fn test_compile_writes_request_file() {
    let dir = TempDir::new().unwrap();
    let output = compile_to(dir.path(), "request.json", None).await;

    let document = RequeteurSearch::from_json(&fs::read_to_string(output).unwrap()).unwrap();
    let root = document.request.unwrap();
    let RequeteurNode::Criteria(first) = &root.criteria[0] else {
        panic!("expected a criterion node");
    };
    assert_eq!(first.resource_type, "Patient");
    assert_eq!(first.filter_fhir, "gender=male");
}

#[tokio::test]
async fn test_compile_missing_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.json");
    let error = compile::compile(compile::CompileConfig {
        tree: missing.clone(),
        populations: None,
        request_version: None,
        pretty: false,
        output_file: None,
    })
    .await
    .unwrap_err();
    assert!(error.to_string().contains(&missing.display().to_string()));
}

#[test]
fn test_invalid_population_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "populations.json", "{\"not\": \"an array\"}");
    assert!(input::load_populations(Some(&path)).is_err());
    assert!(input::load_populations(None).unwrap().is_empty());
}

// ============================================================================
// Decompile and join
// ============================================================================

#[tokio::test]
async fn test_decompile_restores_tree() {
    let dir = TempDir::new().unwrap();
    let populations = write_populations(dir.path(), false);
    let request = compile_to(dir.path(), "request.json", Some(populations.clone())).await;
    let output = dir.path().join("tree-out.json");

    decompile::decompile(decompile::DecompileConfig {
        request,
        populations: Some(populations),
        pretty: false,
        output_file: Some(output.clone()),
    })
    .await
    .unwrap();

    let unbuilt: UnbuiltRequest = input::load_json(&output).unwrap();
    assert!(!unbuilt.deidentified);
    assert_eq!(unbuilt.populations.len(), 1);
    assert_eq!(unbuilt.tree.criteria.len(), 2);
    assert_eq!(
        unbuilt.tree.criteria[0].field("genders"),
        Some(&DataValue::labels([("male", "Male")]))
    );
}

#[tokio::test]
async fn test_join_grafts_under_root() {
    let dir = TempDir::new().unwrap();
    let host = compile_to(dir.path(), "host.json", None).await;
    let incoming = compile_to(dir.path(), "incoming.json", None).await;
    let output = dir.path().join("joined.json");

    join::join(join::JoinConfig {
        host,
        incoming,
        parent: 0,
        populations: None,
        join_offset: None,
        pretty: true,
        output_file: Some(output.clone()),
    })
    .await
    .unwrap();

    let joined: UnbuiltRequest = input::load_json(&output).unwrap();
    assert_eq!(joined.tree.criteria.len(), 4);
    assert_eq!(joined.tree.criteria_groups.len(), 2);
}

#[tokio::test]
async fn test_join_into_unknown_group_fails() {
    let dir = TempDir::new().unwrap();
    let host = compile_to(dir.path(), "host.json", None).await;
    let incoming = compile_to(dir.path(), "incoming.json", None).await;

    let result = join::join(join::JoinConfig {
        host,
        incoming,
        parent: 7,
        populations: None,
        join_offset: None,
        pretty: false,
        output_file: None,
    })
    .await;
    assert!(result.is_err());
}

// ============================================================================
// Chips
// ============================================================================

#[test]
fn test_summaries_list_chips() {
    colored::control::set_override(false);
    let compiler = QueryCompiler::new();
    let summaries = chips::summarize(&compiler, &tree(), false).unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, 1);
    assert!(summaries[0].chips.iter().any(|chip| chip.contains("Male")));
    assert!(chips::render_summaries(&summaries).starts_with("[1]"));
}
