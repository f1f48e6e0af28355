// SQLite PhotoDao Implementation
//
// Cascade and orphan removal are explicit statements inside the same
// transaction as the photo write.

use crate::error::map_sqlx_error;
use crate::TxExecutor;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use daokit_core::domain::{require_id, Entity, Photo, PhotoComment, PhotoCommentId, PhotoId};
use daokit_core::error::{DaoError, Result};
use daokit_core::port::{CrudDao, PhotoDao, TimeProvider};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

pub struct SqlitePhotoDao {
    executor: TxExecutor,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqlitePhotoDao {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            executor: TxExecutor::new(pool),
            time_provider,
        }
    }
}

#[async_trait]
impl CrudDao<Photo> for SqlitePhotoDao {
    /// Insert the photo and cascade the insert to all of its comments
    async fn save(&self, photo: &mut Photo) -> Result<()> {
        photo.validate()?;
        if let Some(shared) = photo.comments().iter().find_map(|c| c.id) {
            return Err(DaoError::Validation(format!(
                "PhotoComment {} already belongs to a photo",
                shared
            )));
        }
        let now = self.time_provider.now();
        let row = photo.clone();

        let (photo_id, comment_ids) = self
            .executor
            .perform_within_tx("Error saving photo", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query("INSERT INTO photo (url, description) VALUES (?, ?)")
                        .bind(&row.url)
                        .bind(&row.description)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    let photo_id = done.last_insert_rowid();

                    let mut comment_ids = Vec::with_capacity(row.comments().len());
                    for comment in row.comments() {
                        let created_on = comment.created_on.unwrap_or(now);
                        let id = insert_comment(&mut *conn, photo_id, &comment.text, created_on)
                            .await?;
                        comment_ids.push(id);
                    }
                    Ok((photo_id, comment_ids))
                })
            })
            .await?;

        photo.id = Some(photo_id);
        photo.bind_comments();
        for (comment, id) in photo.comments_mut().iter_mut().zip(comment_ids) {
            comment.id = Some(id);
            comment.created_on.get_or_insert(now);
        }
        Ok(())
    }

    async fn find_one(&self, id: PhotoId) -> Result<Photo> {
        self.executor
            .read_within_tx("Error finding photo by id", move |conn| {
                Box::pin(async move {
                    let row: Option<PhotoRow> =
                        sqlx::query_as("SELECT id, url, description FROM photo WHERE id = ?")
                            .bind(id)
                            .fetch_optional(&mut *conn)
                            .await
                            .map_err(map_sqlx_error)?;
                    let row = row.ok_or_else(|| DaoError::not_found(Photo::NAME, id))?;

                    let comments: Vec<CommentRow> = sqlx::query_as(
                        "SELECT id, text, created_on, photo_id FROM photo_comment \
                         WHERE photo_id = ? ORDER BY id ASC",
                    )
                    .bind(id)
                    .fetch_all(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    Ok(row.into_photo(comments.into_iter().map(CommentRow::into_comment).collect()))
                })
            })
            .await
    }

    async fn find_all(&self) -> Result<Vec<Photo>> {
        self.executor
            .read_within_tx("Error finding all photos", |conn| {
                Box::pin(async move {
                    let photos: Vec<PhotoRow> =
                        sqlx::query_as("SELECT id, url, description FROM photo ORDER BY id ASC")
                            .fetch_all(&mut *conn)
                            .await
                            .map_err(map_sqlx_error)?;

                    let comments: Vec<CommentRow> = sqlx::query_as(
                        "SELECT id, text, created_on, photo_id FROM photo_comment ORDER BY id ASC",
                    )
                    .fetch_all(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    let mut by_photo: HashMap<PhotoId, Vec<PhotoComment>> = HashMap::new();
                    for comment in comments {
                        by_photo
                            .entry(comment.photo_id)
                            .or_default()
                            .push(comment.into_comment());
                    }

                    Ok(photos
                        .into_iter()
                        .map(|row| {
                            let comments = by_photo.remove(&row.id).unwrap_or_default();
                            row.into_photo(comments)
                        })
                        .collect())
                })
            })
            .await
    }

    /// Write the photo's columns and synchronise its comment collection:
    /// stored comments missing from the collection are deleted, comments
    /// without an id are inserted, the rest are updated in place.
    ///
    /// Newly inserted comments get their ids in the store only; reload the
    /// photo to see them.
    async fn update(&self, photo: &Photo) -> Result<()> {
        let id = require_id(photo, "update")?;
        photo.validate()?;
        let now = self.time_provider.now();
        let row = photo.clone();

        self.executor
            .perform_within_tx("Error updating photo", move |conn| {
                Box::pin(async move {
                    let done = sqlx::query("UPDATE photo SET url = ?, description = ? WHERE id = ?")
                        .bind(&row.url)
                        .bind(&row.description)
                        .bind(id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    if done.rows_affected() == 0 {
                        return Err(DaoError::not_found(Photo::NAME, id));
                    }

                    let stored: HashSet<PhotoCommentId> = sqlx::query_scalar::<_, PhotoCommentId>(
                        "SELECT id FROM photo_comment WHERE photo_id = ?",
                    )
                    .bind(id)
                    .fetch_all(&mut *conn)
                    .await
                    .map_err(map_sqlx_error)?
                    .into_iter()
                    .collect();

                    let kept: HashSet<PhotoCommentId> =
                        row.comments().iter().filter_map(|c| c.id).collect();
                    if let Some(foreign) = kept.difference(&stored).next() {
                        return Err(DaoError::Validation(format!(
                            "PhotoComment {} does not belong to Photo {}",
                            foreign, id
                        )));
                    }

                    // Orphan removal
                    for orphan in stored.difference(&kept) {
                        sqlx::query("DELETE FROM photo_comment WHERE id = ?")
                            .bind(*orphan)
                            .execute(&mut *conn)
                            .await
                            .map_err(map_sqlx_error)?;
                    }
                    debug!(
                        photo_id = id,
                        orphans = stored.difference(&kept).count(),
                        "Orphaned comments removed"
                    );

                    for comment in row.comments() {
                        match comment.id {
                            Some(comment_id) => {
                                sqlx::query("UPDATE photo_comment SET text = ? WHERE id = ?")
                                    .bind(&comment.text)
                                    .bind(comment_id)
                                    .execute(&mut *conn)
                                    .await
                                    .map_err(map_sqlx_error)?;
                            }
                            None => {
                                let created_on = comment.created_on.unwrap_or(now);
                                insert_comment(&mut *conn, id, &comment.text, created_on).await?;
                            }
                        }
                    }
                    Ok(())
                })
            })
            .await
    }

    /// Delete the photo together with all of its comments
    async fn remove(&self, photo: &Photo) -> Result<()> {
        let id = require_id(photo, "remove")?;

        self.executor
            .perform_within_tx("Error removing photo", move |conn| {
                Box::pin(async move {
                    sqlx::query("DELETE FROM photo_comment WHERE photo_id = ?")
                        .bind(id)
                        .execute(&mut *conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    sqlx::query("DELETE FROM photo WHERE id = ?")
                        .bind(id)
                        .execute(conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    Ok(())
                })
            })
            .await
    }
}

#[async_trait]
impl PhotoDao for SqlitePhotoDao {
    async fn add_comment(&self, photo_id: PhotoId, text: &str) -> Result<PhotoComment> {
        let mut comment = PhotoComment::new(text);
        comment.validate()?;
        let now = self.time_provider.now();
        let text = comment.text.clone();

        let id = self
            .executor
            .perform_within_tx("Error adding comment to photo", move |conn| {
                Box::pin(async move {
                    let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM photo WHERE id = ?")
                        .bind(photo_id)
                        .fetch_optional(&mut *conn)
                        .await
                        .map_err(map_sqlx_error)?;
                    if exists.is_none() {
                        return Err(DaoError::not_found(Photo::NAME, photo_id));
                    }
                    insert_comment(conn, photo_id, &text, now).await
                })
            })
            .await?;

        comment.id = Some(id);
        comment.photo_id = Some(photo_id);
        comment.created_on = Some(now);
        Ok(comment)
    }

    async fn find_comment(&self, id: PhotoCommentId) -> Result<PhotoComment> {
        self.executor
            .read_within_tx("Error finding comment by id", move |conn| {
                Box::pin(async move {
                    let row: Option<CommentRow> = sqlx::query_as(
                        "SELECT id, text, created_on, photo_id FROM photo_comment WHERE id = ?",
                    )
                    .bind(id)
                    .fetch_optional(conn)
                    .await
                    .map_err(map_sqlx_error)?;

                    row.map(CommentRow::into_comment)
                        .ok_or_else(|| DaoError::not_found(PhotoComment::NAME, id))
                })
            })
            .await
    }
}

async fn insert_comment(
    conn: &mut SqliteConnection,
    photo_id: PhotoId,
    text: &str,
    created_on: NaiveDateTime,
) -> Result<PhotoCommentId> {
    let done = sqlx::query("INSERT INTO photo_comment (text, created_on, photo_id) VALUES (?, ?, ?)")
        .bind(text)
        .bind(created_on)
        .bind(photo_id)
        .execute(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(done.last_insert_rowid())
}

#[derive(Debug, sqlx::FromRow)]
struct PhotoRow {
    id: i64,
    url: String,
    description: Option<String>,
}

impl PhotoRow {
    fn into_photo(self, comments: Vec<PhotoComment>) -> Photo {
        Photo::from_parts(self.id, self.url, self.description, comments)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: i64,
    text: String,
    created_on: NaiveDateTime,
    photo_id: i64,
}

impl CommentRow {
    fn into_comment(self) -> PhotoComment {
        PhotoComment {
            id: Some(self.id),
            text: self.text,
            created_on: Some(self.created_on),
            photo_id: Some(self.photo_id),
        }
    }
}
