//! The criterion catalog

use crate::definition::CriterionDefinition;
use crate::definitions::standard_definitions;
use octofhir_cohort_mapper::{ArgSpec, MapperError, MapperRegistry, MethodRef};
use octofhir_cohort_model::CriterionKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Standard catalog, built once
static STANDARD_CATALOG: Lazy<Arc<Catalog>> = Lazy::new(|| Arc::new(Catalog::new(standard_definitions())));

/// Lookup failures of wire criteria
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("No catalog entry for resource type {0}")]
    UnknownResourceType(String),

    #[error("No catalog entry of resource type {resource_type} matches filter {filter:?}")]
    UnknownSubtype { resource_type: String, filter: String },
}

/// A method named by a catalog entry but absent from a registry
#[derive(Debug, Clone)]
pub struct RegistryGap {
    pub kind: CriterionKind,
    pub field: String,
    pub error: MapperError,
}

/// Read-only set of criterion definitions, one per kind
#[derive(Debug, Clone)]
pub struct Catalog {
    definitions: Vec<CriterionDefinition>,
    by_kind: HashMap<CriterionKind, usize>,
}

impl Catalog {
    /// Create a catalog; a later definition of the same kind wins
    pub fn new(definitions: Vec<CriterionDefinition>) -> Self {
        let by_kind = definitions
            .iter()
            .enumerate()
            .map(|(index, definition)| (definition.kind, index))
            .collect();
        Self { definitions, by_kind }
    }

    /// The process-wide standard catalog
    pub fn standard() -> Arc<Catalog> {
        Arc::clone(&STANDARD_CATALOG)
    }

    /// Every definition, in catalog order
    pub fn get_all_criteria_items(&self) -> &[CriterionDefinition] {
        &self.definitions
    }

    pub fn get(&self, kind: CriterionKind) -> Option<&CriterionDefinition> {
        self.by_kind.get(&kind).map(|index| &self.definitions[*index])
    }

    /// Definitions sending the given resource type
    pub fn candidates<'a, 'k>(
        &'a self,
        resource_type: &'k str,
    ) -> impl Iterator<Item = &'a CriterionDefinition> + use<'a, 'k> {
        self.definitions
            .iter()
            .filter(move |definition| definition.resource_type() == resource_type)
    }

    /// Definition of a stored wire criterion
    ///
    /// Resource types shared by several definitions are told apart by the
    /// subtype discriminator found in the filter.
    pub fn resolve_wire_criterion(
        &self,
        resource_type: &str,
        filter: &str,
    ) -> Result<&CriterionDefinition, CatalogError> {
        let candidates: Vec<&CriterionDefinition> = self
            .definitions
            .iter()
            .filter(|definition| definition.resource_type() == resource_type)
            .collect();
        match candidates.as_slice() {
            [] => Err(CatalogError::UnknownResourceType(resource_type.to_string())),
            [single] => Ok(*single),
            several => several
                .iter()
                .copied()
                .find(|definition| {
                    definition
                        .subtype
                        .as_ref()
                        .is_some_and(|subtype| subtype.matches_filter(filter))
                })
                .ok_or_else(|| CatalogError::UnknownSubtype {
                    resource_type: resource_type.to_string(),
                    filter: filter.to_string(),
                }),
        }
    }

    /// Every method or method argument the registry cannot serve
    pub fn check_registry(&self, registry: &MapperRegistry) -> Vec<RegistryGap> {
        let mut gaps = Vec::new();
        for definition in &self.definitions {
            for field in definition.fields() {
                let mut errors: Vec<MapperError> = Vec::new();
                if field.key().is_some() {
                    errors.extend(registry.build(field.build_method()).err());
                    errors.extend(registry.unbuild(field.unbuild_method()).err());
                }
                errors.extend(registry.chip(field.chip_method()).err());
                let methods = field
                    .build_args()
                    .iter()
                    .chain(field.unbuild_args())
                    .chain(field.chip_args())
                    .filter_map(|arg| match arg {
                        ArgSpec::Method(method) => Some(*method),
                        ArgSpec::MethodLiteral(method) => Some(MethodRef::Chip(*method)),
                        _ => None,
                    });
                for method in methods {
                    let error = match method {
                        MethodRef::Build(m) => registry.build(m).err(),
                        MethodRef::Unbuild(m) => registry.unbuild(m).err(),
                        MethodRef::Chip(m) => registry.chip(m).err(),
                    };
                    errors.extend(error);
                }
                gaps.extend(errors.into_iter().map(|error| RegistryGap {
                    kind: definition.kind,
                    field: field.name.clone(),
                    error,
                }));
            }
        }
        gaps
    }
}
