// Entity identity

use crate::error::{DaoError, Result};

/// Entity persisted under a generated (or derived) `i64` identifier
///
/// `id() == None` means the entity has never been persisted.
pub trait Entity {
    /// Name used in error messages and logs
    const NAME: &'static str;

    fn id(&self) -> Option<i64>;
}

/// Return the entity's identifier or fail with [`DaoError::MissingId`]
///
/// Called before any connection is acquired, so a never-persisted entity
/// costs no round-trip.
pub fn require_id<E: Entity>(entity: &E, operation: &'static str) -> Result<i64> {
    entity.id().ok_or(DaoError::MissingId {
        entity: E::NAME,
        operation,
    })
}

/// Fail with [`DaoError::Validation`] when a mandatory text field is blank
pub(crate) fn require_text(entity: &'static str, field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DaoError::Validation(format!(
            "{}.{} must not be empty",
            entity, field
        )));
    }
    Ok(())
}
