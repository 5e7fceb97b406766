//! Cohort query compiler
//!
//! This crate provides:
//! - Filter assembly and disassembly for single criteria
//! - Compilation of criteria trees into query engine requests (`build_request`)
//! - Decompilation of requests back into trees with id renumbering (`unbuild_request`)
//! - Joining of independently compiled requests (`join_request`)
//! - Chips, validation and nominative criteria checks
//!
//! # Example
//!
//! ```rust,no_run
//! use octofhir_cohort_compiler::QueryCompiler;
//! use octofhir_cohort_model::CriteriaTree;
//!
//! let compiler = QueryCompiler::new();
//! let document = compiler.build_request(&CriteriaTree::new(), &[]).unwrap();
//! assert!(document.request.is_none());
//! ```

pub mod assembler;
pub mod chips;
pub mod disassembler;
pub mod error;
pub mod filter;
pub mod join;
pub mod nominative;
pub mod options;
pub mod population;
pub mod request;
pub mod unbuild;

pub use assembler::assemble_filter;
pub use disassembler::disassemble_filter;
pub use error::{QueryError, QueryResult};
pub use filter::{parse_filter, render_fragment};
pub use nominative::{check_nominative_criteria, clean_nominative_criteria};
pub use options::CompilerOptions;
pub use population::{
    PopulationRecord, PopulationResolver, PopulationSource, StaticPopulationResolver, is_deidentified,
    source_population,
};
pub use request::{QueryCompiler, QueryCompilerBuilder};
pub use unbuild::{IdRemap, UnbuiltRequest};
