//! Cohort query data model
//!
//! This crate provides:
//! - Typed criterion and group identifiers replacing the legacy signed-id scheme
//! - Field values carried by criteria (`DataValue`)
//! - The in-memory criteria tree (criteria, groups, temporal constraints)
//! - The wire document exchanged with the cohort query engine, with JSON
//!   serialization

pub mod criterion;
pub mod group;
pub mod ids;
pub mod serialize;
pub mod temporal;
pub mod tree;
pub mod value;
pub mod wire;

pub use criterion::*;
pub use group::*;
pub use ids::*;
pub use temporal::*;
pub use tree::*;
pub use value::*;
pub use wire::*;
pub use serialize::{JsonDocument, SerializeError};
