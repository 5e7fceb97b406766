//! Criteria tree to wire document
//!
//! `QueryCompiler` is the entry point of the crate. It owns the catalog, the
//! mapper registry and the resolvers used by decompilation, and is cheap to
//! clone.

use crate::assembler::assemble_filter;
use crate::error::{QueryError, QueryResult};
use crate::options::CompilerOptions;
use crate::population::{PopulationRecord, PopulationResolver, StaticPopulationResolver, is_deidentified, source_population};
use octofhir_cohort_catalog::{Catalog, CriterionDefinition};
use octofhir_cohort_mapper::{EntityResolver, MapperRegistry, NoOpEntityResolver};
use octofhir_cohort_model::{
    Comparator, CriteriaGroup, CriteriaRef, CriteriaTree, Criterion, CriterionKind, DataValue, GroupId, GroupKind,
    NumericComparison, OCCURRENCE_FIELD, RequeteurCriteria, RequeteurGroup, RequeteurNode, RequeteurSearch,
    TemporalConstraintType, WireCriteriaType, WireGroupType, WireOccurrence,
};
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Compiler
// ============================================================================

/// Compiles criteria trees to wire documents and back
#[derive(Clone)]
pub struct QueryCompiler {
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) registry: Arc<MapperRegistry>,
    pub(crate) options: CompilerOptions,
    pub(crate) populations: Arc<dyn PopulationResolver>,
    pub(crate) entities: Arc<dyn EntityResolver>,
}

impl QueryCompiler {
    /// Compiler over the standard catalog and mappers, without resolvers
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> QueryCompilerBuilder {
        QueryCompilerBuilder::default()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn registry(&self) -> &MapperRegistry {
        &self.registry
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Catalog entry of a criterion kind
    pub fn definition(&self, kind: CriterionKind) -> QueryResult<&CriterionDefinition> {
        self.catalog.get(kind).ok_or(QueryError::UnknownCriterionKind(kind))
    }

    /// Compile a tree into a wire document
    ///
    /// The request is de-identified when any population is access-restricted.
    /// Errored criteria and dangling references are skipped. A tree whose root
    /// ends up empty compiles to a document without `request`.
    pub fn build_request(
        &self,
        tree: &CriteriaTree,
        populations: &[PopulationRecord],
    ) -> QueryResult<RequeteurSearch> {
        let root = tree.root().ok_or(QueryError::MissingRoot)?;
        let deidentified = is_deidentified(populations);
        log::debug!(
            "Compiling {} criteria, {} groups (deidentified: {})",
            tree.criteria.len(),
            tree.criteria_groups.len(),
            deidentified
        );

        let mut walk = CompileWalk {
            compiler: self,
            tree,
            deidentified,
            visited: HashSet::new(),
            emitted: HashSet::new(),
        };
        let mut request = walk.group(root)?;

        let mut constraints = Vec::new();
        for constraint in &tree.temporal_constraints {
            if constraint.constraint_type == TemporalConstraintType::None {
                continue;
            }
            if constraint.references().all(|r| walk.emitted.contains(&r)) {
                constraints.push(constraint.clone());
            } else {
                log::warn!("Dropping {:?} constraint on criteria not in the request", constraint.constraint_type);
            }
        }
        if !constraints.is_empty() {
            request.temporal_constraints = Some(constraints);
        }

        let document = RequeteurSearch::new(self.options.request_version.clone(), source_population(populations));
        if request.criteria.is_empty() {
            return Ok(document);
        }
        Ok(document.with_request(request))
    }
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCompiler")
            .field("catalog", &self.catalog.get_all_criteria_items().len())
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for `QueryCompiler`
#[derive(Default)]
pub struct QueryCompilerBuilder {
    catalog: Option<Arc<Catalog>>,
    registry: Option<Arc<MapperRegistry>>,
    options: CompilerOptions,
    populations: Option<Arc<dyn PopulationResolver>>,
    entities: Option<Arc<dyn EntityResolver>>,
}

impl QueryCompilerBuilder {
    pub fn catalog(mut self, catalog: Arc<Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn registry(mut self, registry: MapperRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    pub fn options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn population_resolver(mut self, resolver: Arc<dyn PopulationResolver>) -> Self {
        self.populations = Some(resolver);
        self
    }

    pub fn entity_resolver(mut self, resolver: Arc<dyn EntityResolver>) -> Self {
        self.entities = Some(resolver);
        self
    }

    pub fn build(self) -> QueryCompiler {
        QueryCompiler {
            catalog: self.catalog.unwrap_or_else(Catalog::standard),
            registry: self
                .registry
                .unwrap_or_else(|| Arc::new(MapperRegistry::with_standard_mappers())),
            options: self.options,
            populations: self
                .populations
                .unwrap_or_else(|| Arc::new(StaticPopulationResolver::default())),
            entities: self.entities.unwrap_or_else(|| Arc::new(NoOpEntityResolver)),
        }
    }
}

// ============================================================================
// Tree walk
// ============================================================================

struct CompileWalk<'a> {
    compiler: &'a QueryCompiler,
    tree: &'a CriteriaTree,
    deidentified: bool,
    visited: HashSet<GroupId>,
    /// Nodes present in the output, for temporal constraint checks
    emitted: HashSet<CriteriaRef>,
}

impl CompileWalk<'_> {
    fn group(&mut self, group: &CriteriaGroup) -> QueryResult<RequeteurGroup> {
        if !self.visited.insert(group.id) {
            return Err(QueryError::CyclicGroup(group.id));
        }
        self.emitted.insert(group.id.into());

        let mut children = Vec::with_capacity(group.criteria_ids.len());
        for member in &group.criteria_ids {
            match *member {
                CriteriaRef::Criterion(id) => {
                    let Some(criterion) = self.tree.criterion(id) else {
                        log::warn!("Group {} references missing criterion {}", group.id, id);
                        continue;
                    };
                    if let Some(node) = self.criterion(criterion)? {
                        children.push(RequeteurNode::Criteria(node));
                    }
                }
                CriteriaRef::Group(id) => {
                    let Some(child) = self.tree.group(id) else {
                        log::warn!("Group {} references missing group {}", group.id, id);
                        continue;
                    };
                    children.push(RequeteurNode::Group(self.group(child)?));
                }
            }
        }

        let (group_type, n_among_m_options) = match &group.kind {
            GroupKind::AndGroup => (WireGroupType::And, None),
            GroupKind::OrGroup => (WireGroupType::Or, None),
            GroupKind::NAmongM(options) => (WireGroupType::NAmongM, Some(options.clone())),
        };
        Ok(RequeteurGroup {
            group_type,
            id: group.id.to_wire(),
            is_inclusive: group.is_inclusive,
            criteria: children,
            temporal_constraints: None,
            n_among_m_options,
        })
    }

    fn criterion(&mut self, criterion: &Criterion) -> QueryResult<Option<RequeteurCriteria>> {
        if criterion.error && self.compiler.options.skip_errored_criteria {
            log::warn!("Skipping criterion {} ({}): flagged as errored", criterion.id, criterion.title);
            return Ok(None);
        }
        let definition = self.compiler.definition(criterion.kind)?;
        let filter_fhir = assemble_filter(definition, criterion, self.deidentified, &self.compiler.registry)?;
        let occurrence = criterion
            .kind
            .is_occurrence_bearing()
            .then(|| wire_occurrence(criterion, definition));

        self.emitted.insert(criterion.id.into());
        Ok(Some(RequeteurCriteria {
            criteria_type: WireCriteriaType::BasicResource,
            id: criterion.id.to_wire(),
            name: criterion.title.clone(),
            is_inclusive: criterion.is_inclusive,
            resource_type: definition.resource_type().to_string(),
            filter_fhir,
            occurrence,
        }))
    }
}

/// Occurrence of a criterion node; defaults to "at least once"
fn wire_occurrence(criterion: &Criterion, definition: &CriterionDefinition) -> WireOccurrence {
    let fallback = NumericComparison::new(Comparator::GreaterOrEqual, 1);
    let comparison = criterion
        .occurrence()
        .or_else(|| {
            definition
                .field(OCCURRENCE_FIELD)
                .and_then(|field| DataValue::as_comparison(&field.default))
        })
        .unwrap_or(&fallback);

    let operator = match comparison.comparator {
        Comparator::Between => {
            log::warn!(
                "Criterion {}: occurrence ranges are not supported, sending >= {}",
                criterion.id,
                comparison.value
            );
            Comparator::GreaterOrEqual
        }
        other => other,
    };
    let n = comparison.value.trunc().to_u32().unwrap_or_else(|| {
        log::warn!("Criterion {}: invalid occurrence {}, sending 1", criterion.id, comparison.value);
        1
    });
    WireOccurrence { n, operator }
}
