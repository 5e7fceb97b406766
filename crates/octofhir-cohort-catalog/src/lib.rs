//! Criterion definition catalog
//!
//! This crate provides:
//! - Declarative field schemas per criterion kind (`CriterionDefinition`)
//! - A closed predicate language for display, disable, ignore and error rules
//! - The standard, process-wide catalog with one entry per criterion kind

pub mod catalog;
pub mod definition;
mod definitions;
pub mod predicate;

pub use catalog::{Catalog, CatalogError, RegistryGap};
pub use definition::{
    BuildInfo, CriterionDefinition, ErrorCheck, FieldDefinition, FieldSection, SubtypeDiscriminator,
};
pub use predicate::Predicate;
