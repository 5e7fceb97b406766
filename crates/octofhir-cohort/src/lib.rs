//! Cohort query compiler for FHIR query engines
//!
//! This crate provides:
//! - The criteria tree and wire document model
//! - The field mapper registry and criterion catalog
//! - Compilation, decompilation and joining of query engine requests
//! - The `cohort` command-line tool
//!
//! # Example
//!
//! ```rust,no_run
//! use octofhir_cohort::{CriteriaTree, QueryCompiler};
//!
//! let compiler = QueryCompiler::new();
//! let document = compiler.build_request(&CriteriaTree::new(), &[]).unwrap();
//! assert!(document.request.is_none());
//! ```

// Re-export all public APIs from internal crates
pub use octofhir_cohort_catalog as catalog;
pub use octofhir_cohort_compiler as compiler;
pub use octofhir_cohort_mapper as mapper;
pub use octofhir_cohort_model as model;

// Convenience re-exports
pub use octofhir_cohort_catalog::{Catalog, CriterionDefinition};
pub use octofhir_cohort_compiler::{
    CompilerOptions, PopulationRecord, QueryCompiler, QueryError, QueryResult, UnbuiltRequest,
};
pub use octofhir_cohort_mapper::{EntityResolver, MapperRegistry};
pub use octofhir_cohort_model::{CriteriaTree, JsonDocument, RequeteurSearch};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
