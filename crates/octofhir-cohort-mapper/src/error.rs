//! Mapper errors

use crate::resolver::ResolverError;
use thiserror::Error;

/// Result type for mapper operations
pub type MapperResult<T> = Result<T, MapperError>;

/// Errors raised while resolving or running field mappers
#[derive(Debug, Error, Clone)]
pub enum MapperError {
    /// A catalog entry names a method the registry does not hold
    #[error("No {table} mapper registered for {method}")]
    MissingMapper { table: &'static str, method: String },

    /// A mapper received extra arguments of the wrong shape
    #[error("Invalid argument for {method}: {message}")]
    InvalidArgument { method: String, message: String },

    /// An entity or code lookup failed
    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

impl MapperError {
    /// Create a missing mapper error
    pub fn missing(table: &'static str, method: impl std::fmt::Debug) -> Self {
        Self::MissingMapper {
            table,
            method: format!("{:?}", method),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(method: impl std::fmt::Debug, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            method: format!("{:?}", method),
            message: message.into(),
        }
    }
}
