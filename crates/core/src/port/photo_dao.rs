// Photo DAO Port (Interface)

use crate::domain::{Photo, PhotoComment, PhotoCommentId, PhotoId};
use crate::error::Result;
use crate::port::CrudDao;
use async_trait::async_trait;

/// Photo aggregate persistence
///
/// Photos always load with their comments. `save` cascades to the comments,
/// `update` applies orphan removal to comments dropped from the collection,
/// `remove` deletes the comments together with the photo.
#[async_trait]
pub trait PhotoDao: CrudDao<Photo> {
    /// Append a new comment to a stored photo
    async fn add_comment(&self, photo_id: PhotoId, text: &str) -> Result<PhotoComment>;

    /// Find a single comment by id
    async fn find_comment(&self, id: PhotoCommentId) -> Result<PhotoComment>;
}
