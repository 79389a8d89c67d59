use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::repository::RepositoryError;

/// Generic error type used by service layer functions.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Caller input failed validation.
    #[error("invalid input: {0}")]
    Validation(String),
    /// The page extractor failed outright (navigation, timeout, bad
    /// selector). No partial product state is written.
    #[error("extraction unavailable: {0}")]
    ExtractionUnavailable(String),
    /// A store read or write failed.
    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
