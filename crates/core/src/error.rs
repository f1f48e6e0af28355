// Central Error Type for every DAO operation

use thiserror::Error;

/// Boxed store-level cause carried by [`DaoError::Persistence`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// DAO-level error type
///
/// Callers never see a driver error directly: store failures are wrapped in
/// `Persistence`, which keeps the original error as its `source`.
#[derive(Error, Debug)]
pub enum DaoError {
    /// A single-row lookup matched zero rows
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// `update`/`remove` called on an entity that was never persisted
    #[error("Cannot {operation} {entity}: identifier is missing")]
    MissingId {
        entity: &'static str,
        operation: &'static str,
    },

    /// A mandatory field is empty
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any failure raised by the underlying store
    #[error("{message}")]
    Persistence {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl DaoError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        DaoError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn persistence(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        DaoError::Persistence {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DaoError::NotFound { .. })
    }

    pub fn is_missing_id(&self) -> bool {
        matches!(self, DaoError::MissingId { .. })
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, DaoError::Persistence { .. })
    }
}

/// Result type alias using DaoError
pub type Result<T> = std::result::Result<T, DaoError>;
