//! Field mapper registry
//!
//! This crate provides:
//! - Build mappers: one criterion field value to filter fragments
//! - Unbuild mappers: one `key=value` pair back into a field value, merging
//!   with what earlier pairs produced
//! - Chip mappers: a short human-readable rendering of a field value
//! - Wire keys (`FhirKey`) with de-identification and conditional routing
//! - The entity resolver collaborator used by unbuild mappers

pub mod args;
pub mod error;
pub mod key;
pub mod mappers;
pub mod registry;
pub mod resolver;

pub use args::{ArgSpec, MethodRef, ResolvedArg};
pub use error::{MapperError, MapperResult};
pub use key::{ANSWER_PREFIX, AnswerType, FhirKey, FieldScope, KeyMatch, LINK_ID, ResolvedKey, ValueRef};
pub use mappers::{FILTER_KEY, parse_prefixed};
pub use registry::{
    BuildFn, BuildInput, BuildMethod, Chip, ChipFn, ChipInput, ChipMethod, FieldKind, Fragment, Fragments,
    MapperRegistry, NULL_VALUE, UnbuildFn, UnbuildInput, UnbuildMethod,
};
pub use resolver::{CachedEntityResolver, EntityRecord, EntityResolver, NoOpEntityResolver, ResolverError};
