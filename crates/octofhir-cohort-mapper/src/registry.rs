//! Build, Unbuild and Chip function tables
//!
//! Mappers are keyed by method enums rather than by field kind, so a catalog
//! entry can override the default triple of its field kind per field.

use crate::args::ResolvedArg;
use crate::error::{MapperError, MapperResult};
use crate::key::ResolvedKey;
use crate::resolver::EntityResolver;
use futures::future::BoxFuture;
use octofhir_cohort_model::DataValue;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Raw value standing for "no value" inside composite filters
pub const NULL_VALUE: &str = "null";

// ============================================================================
// Method keys
// ============================================================================

/// Build table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildMethod {
    Text,
    List,
    Boolean,
    Comparator,
    DateRange,
    DurationRange,
    Labels,
    /// Higher order: args `[Build method, gate, ...]`
    Gated,
}

/// Unbuild table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnbuildMethod {
    Text,
    List,
    Boolean,
    Comparator,
    DateRange,
    DurationRange,
    Options,
    Codes,
    Entities,
}

/// Chip table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChipMethod {
    Text,
    Boolean,
    Comparator,
    DateRange,
    DurationRange,
    Labels,
    /// Higher order: args `[chip method, selector, expected, label, other label]`
    Switch,
}

macro_rules! impl_display_as_debug {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        })*
    };
}

impl_display_as_debug!(BuildMethod, UnbuildMethod, ChipMethod);

/// Input widget kind of a field; selects the default mappers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    TextList,
    Boolean,
    Number,
    DateRange,
    DurationRange,
    Select,
    CodeSearch,
    EntityPicker,
}

impl FieldKind {
    /// Default Build / Unbuild / Chip triple
    pub const fn default_methods(self) -> (BuildMethod, UnbuildMethod, ChipMethod) {
        match self {
            FieldKind::Text => (BuildMethod::Text, UnbuildMethod::Text, ChipMethod::Text),
            FieldKind::TextList => (BuildMethod::List, UnbuildMethod::List, ChipMethod::Text),
            FieldKind::Boolean => (BuildMethod::Boolean, UnbuildMethod::Boolean, ChipMethod::Boolean),
            FieldKind::Number => (
                BuildMethod::Comparator,
                UnbuildMethod::Comparator,
                ChipMethod::Comparator,
            ),
            FieldKind::DateRange => (
                BuildMethod::DateRange,
                UnbuildMethod::DateRange,
                ChipMethod::DateRange,
            ),
            FieldKind::DurationRange => (
                BuildMethod::DurationRange,
                UnbuildMethod::DurationRange,
                ChipMethod::DurationRange,
            ),
            FieldKind::Select => (BuildMethod::Labels, UnbuildMethod::Options, ChipMethod::Labels),
            FieldKind::CodeSearch => (BuildMethod::Labels, UnbuildMethod::Codes, ChipMethod::Labels),
            FieldKind::EntityPicker => (BuildMethod::Labels, UnbuildMethod::Entities, ChipMethod::Labels),
        }
    }
}

// ============================================================================
// Mapper signatures
// ============================================================================

/// One piece of a criterion filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Rendered as `key=value` under the field's key
    Raw(String),
    /// Rendered as `filter_key=filter_value`, ignoring the field's key
    Composite { filter_key: String, filter_value: String },
}

impl Fragment {
    pub fn raw(value: impl Into<String>) -> Self {
        Fragment::Raw(value.into())
    }
}

/// Fragments produced by one field; empty means the field is omitted
pub type Fragments = SmallVec<[Fragment; 2]>;

/// Build mapper input
#[derive(Debug, Clone, Copy)]
pub struct BuildInput<'a> {
    pub value: &'a DataValue,
    pub key: &'a ResolvedKey,
    pub deidentified: bool,
    pub args: &'a [ResolvedArg],
}

/// Unbuild mapper input
#[derive(Clone, Copy)]
pub struct UnbuildInput<'a> {
    /// Raw value of one `key=value` pair
    pub raw: &'a str,
    /// The raw key matched the de-identified form
    pub is_deid_key: bool,
    /// Accumulated value of the field so far
    pub existing: &'a DataValue,
    pub key: &'a str,
    pub args: &'a [ResolvedArg],
    pub resolver: &'a dyn EntityResolver,
}

impl fmt::Debug for UnbuildInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnbuildInput")
            .field("raw", &self.raw)
            .field("is_deid_key", &self.is_deid_key)
            .field("existing", &self.existing)
            .field("key", &self.key)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Chip mapper input
#[derive(Clone, Copy)]
pub struct ChipInput<'a> {
    pub value: &'a DataValue,
    /// Field label shown in front of the value
    pub label: &'a str,
    pub deidentified: bool,
    pub args: &'a [ResolvedArg],
    /// Used by higher order chips to delegate
    pub registry: &'a MapperRegistry,
}

/// Short human-readable rendering of a field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chip {
    pub label: String,
}

impl Chip {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

pub type BuildFn = Arc<dyn Fn(&BuildInput<'_>) -> Fragments + Send + Sync>;

pub type UnbuildFn =
    Arc<dyn for<'a> Fn(UnbuildInput<'a>) -> BoxFuture<'a, MapperResult<DataValue>> + Send + Sync>;

pub type ChipFn = Arc<dyn Fn(&ChipInput<'_>) -> Option<Chip> + Send + Sync>;

// ============================================================================
// Registry
// ============================================================================

/// The three mapper tables
#[derive(Clone, Default)]
pub struct MapperRegistry {
    build: HashMap<BuildMethod, BuildFn>,
    unbuild: HashMap<UnbuildMethod, UnbuildFn>,
    chip: HashMap<ChipMethod, ChipFn>,
}

impl fmt::Debug for MapperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperRegistry")
            .field("build", &self.build.keys().collect::<Vec<_>>())
            .field("unbuild", &self.unbuild.keys().collect::<Vec<_>>())
            .field("chip", &self.chip.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MapperRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with all standard mappers registered
    pub fn with_standard_mappers() -> Self {
        let mut registry = Self::new();
        crate::mappers::register_standard_mappers(&mut registry);
        registry
    }

    /// Register or replace a build mapper
    pub fn register_build(&mut self, method: BuildMethod, implementation: BuildFn) {
        self.build.insert(method, implementation);
    }

    /// Register or replace an unbuild mapper
    pub fn register_unbuild(&mut self, method: UnbuildMethod, implementation: UnbuildFn) {
        self.unbuild.insert(method, implementation);
    }

    /// Register or replace a chip mapper
    pub fn register_chip(&mut self, method: ChipMethod, implementation: ChipFn) {
        self.chip.insert(method, implementation);
    }

    pub fn build(&self, method: BuildMethod) -> MapperResult<&BuildFn> {
        self.build
            .get(&method)
            .ok_or_else(|| MapperError::missing("build", method))
    }

    pub fn unbuild(&self, method: UnbuildMethod) -> MapperResult<&UnbuildFn> {
        self.unbuild
            .get(&method)
            .ok_or_else(|| MapperError::missing("unbuild", method))
    }

    pub fn chip(&self, method: ChipMethod) -> MapperResult<&ChipFn> {
        self.chip
            .get(&method)
            .ok_or_else(|| MapperError::missing("chip", method))
    }

    pub fn has_build(&self, method: BuildMethod) -> bool {
        self.build.contains_key(&method)
    }

    pub fn has_unbuild(&self, method: UnbuildMethod) -> bool {
        self.unbuild.contains_key(&method)
    }

    pub fn has_chip(&self, method: ChipMethod) -> bool {
        self.chip.contains_key(&method)
    }
}
