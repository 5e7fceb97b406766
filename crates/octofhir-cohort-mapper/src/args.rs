//! Extra mapper arguments
//!
//! Catalog entries declare arguments as `ArgSpec`s; they are resolved against
//! the criterion being processed right before a mapper is invoked.

use crate::error::MapperResult;
use crate::key::{FieldScope, ValueRef};
use crate::registry::{BuildFn, BuildMethod, ChipFn, ChipMethod, MapperRegistry, UnbuildFn, UnbuildMethod};
use octofhir_cohort_model::DataValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to a registry function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "table", content = "method", rename_all = "camelCase")]
pub enum MethodRef {
    Build(BuildMethod),
    Unbuild(UnbuildMethod),
    Chip(ChipMethod),
}

/// Declared extra argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "arg", content = "value", rename_all = "camelCase")]
pub enum ArgSpec {
    Literal(DataValue),
    /// Current value of a sibling field
    Field(String),
    /// Criterion kind tag
    Kind,
    /// Resolved to a function handle
    Method(MethodRef),
    /// Chip method passed by name
    MethodLiteral(ChipMethod),
}

impl ArgSpec {
    pub fn literal(value: impl Into<DataValue>) -> Self {
        ArgSpec::Literal(value.into())
    }

    pub fn field(name: impl Into<String>) -> Self {
        ArgSpec::Field(name.into())
    }

    /// Resolve against a criterion
    pub fn resolve(&self, scope: &FieldScope<'_>, registry: &MapperRegistry) -> MapperResult<ResolvedArg> {
        Ok(match self {
            ArgSpec::Literal(value) => ResolvedArg::Value(value.clone()),
            ArgSpec::Field(name) => ResolvedArg::Value(ValueRef::Field(name.clone()).resolve(scope)),
            ArgSpec::Kind => ResolvedArg::Value(ValueRef::Kind.resolve(scope)),
            ArgSpec::Method(MethodRef::Build(method)) => ResolvedArg::Build(registry.build(*method)?.clone()),
            ArgSpec::Method(MethodRef::Unbuild(method)) => {
                ResolvedArg::Unbuild(registry.unbuild(*method)?.clone())
            }
            ArgSpec::Method(MethodRef::Chip(method)) => ResolvedArg::Chip(registry.chip(*method)?.clone()),
            ArgSpec::MethodLiteral(method) => ResolvedArg::ChipMethod(*method),
        })
    }

    /// Resolve a list of arguments
    pub fn resolve_all(
        specs: &[ArgSpec],
        scope: &FieldScope<'_>,
        registry: &MapperRegistry,
    ) -> MapperResult<Vec<ResolvedArg>> {
        specs.iter().map(|spec| spec.resolve(scope, registry)).collect()
    }
}

/// Argument handed to a mapper
#[derive(Clone)]
pub enum ResolvedArg {
    Value(DataValue),
    Build(BuildFn),
    Unbuild(UnbuildFn),
    Chip(ChipFn),
    ChipMethod(ChipMethod),
}

impl ResolvedArg {
    pub fn as_value(&self) -> Option<&DataValue> {
        match self {
            ResolvedArg::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Text literal, if the argument is one
    pub fn as_text(&self) -> Option<&str> {
        self.as_value().and_then(DataValue::as_text)
    }
}

impl fmt::Debug for ResolvedArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedArg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            ResolvedArg::Build(_) => f.write_str("Build(<fn>)"),
            ResolvedArg::Unbuild(_) => f.write_str("Unbuild(<fn>)"),
            ResolvedArg::Chip(_) => f.write_str("Chip(<fn>)"),
            ResolvedArg::ChipMethod(method) => f.debug_tuple("ChipMethod").field(method).finish(),
        }
    }
}
