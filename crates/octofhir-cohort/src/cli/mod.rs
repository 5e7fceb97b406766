//! CLI functionality for the cohort tool
//!
//! This module contains:
//! - Compilation and decompilation of requests
//! - Request joining
//! - Catalog and chip listings
//! - Input loading and output formatting

pub mod catalog;
pub mod chips;
pub mod compile;
pub mod decompile;
pub mod input;
pub mod join;
pub mod output;
