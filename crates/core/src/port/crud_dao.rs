// Generic CRUD DAO Port (Interface)

use crate::domain::Entity;
use crate::error::Result;
use async_trait::async_trait;

/// Create/read/update/delete operations shared by every entity DAO
///
/// Each call runs in exactly one transaction: it either fully commits or has
/// no effect.
#[async_trait]
pub trait CrudDao<E: Entity + Send + Sync>: Send + Sync {
    /// Insert the entity and assign its generated id (only after commit)
    async fn save(&self, entity: &mut E) -> Result<()>;

    /// Find by id, failing with `NotFound` when no row matches
    async fn find_one(&self, id: i64) -> Result<E>;

    /// All rows, in id order; empty when the table is empty
    async fn find_all(&self) -> Result<Vec<E>>;

    /// Overwrite the stored row (requires an id; `NotFound` if the row is gone)
    async fn update(&self, entity: &E) -> Result<()>;

    /// Delete the stored row (requires an id; a no-op if the row is gone)
    async fn remove(&self, entity: &E) -> Result<()>;
}
