//! Query compiler errors

use octofhir_cohort_catalog::CatalogError;
use octofhir_cohort_mapper::{MapperError, ResolverError};
use octofhir_cohort_model::{CriterionKind, GroupId};
use thiserror::Error;

/// Result type for compiler operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Structural errors; fatal for the whole compile, decompile or join
#[derive(Debug, Error, Clone)]
pub enum QueryError {
    /// A criterion kind has no catalog entry
    #[error("No catalog entry for criterion kind {0}")]
    UnknownCriterionKind(CriterionKind),

    /// A group is reachable more than once from the root
    #[error("Group {0} is reached more than once")]
    CyclicGroup(GroupId),

    /// The tree has no root group
    #[error("Criteria tree has no root group")]
    MissingRoot,

    /// No catalog entry sends this resource type
    #[error("No catalog entry for resource type {0}")]
    UnknownResourceType(String),

    /// Several catalog entries send this resource type and none matches
    #[error("No catalog entry of resource type {resource_type} matches filter {filter:?}")]
    UnknownSubtype { resource_type: String, filter: String },

    /// Join target group is absent from the host request
    #[error("Group {0} not found in the request")]
    GroupNotFound(GroupId),

    /// Join would move ids past the range of criterion and group ids
    #[error("Joined ids leave the supported id range (offset {offset}, highest incoming id {highest})")]
    IdOverflow { offset: u64, highest: u64 },

    /// Source populations could not be resolved
    #[error("Population lookup failed: {0}")]
    Population(ResolverError),

    /// The catalog names a mapper the registry does not hold
    #[error(transparent)]
    Mapper(#[from] MapperError),
}

impl From<CatalogError> for QueryError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::UnknownResourceType(resource_type) => QueryError::UnknownResourceType(resource_type),
            CatalogError::UnknownSubtype { resource_type, filter } => {
                QueryError::UnknownSubtype { resource_type, filter }
            }
        }
    }
}
