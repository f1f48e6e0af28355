// Photo / PhotoComment Domain Model
//
// A Photo owns its comments: they are saved with it, deleted with it, and
// deleted when removed from its collection (orphan removal).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::entity::{require_text, Entity};
use crate::error::Result;

/// Photo ID (generated on insert)
pub type PhotoId = i64;

/// PhotoComment ID (generated on insert)
pub type PhotoCommentId = i64;

/// Photo Entity (table `photo`, `url` is unique)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: Option<PhotoId>,
    pub url: String,
    pub description: Option<String>,
    comments: Vec<PhotoComment>,
}

impl Photo {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: None,
            url: url.into(),
            description: None,
            comments: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Rebuild a persisted photo from its stored parts
    pub fn from_parts(
        id: PhotoId,
        url: String,
        description: Option<String>,
        comments: Vec<PhotoComment>,
    ) -> Self {
        Self {
            id: Some(id),
            url,
            description,
            comments,
        }
    }

    pub fn comments(&self) -> &[PhotoComment] {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut [PhotoComment] {
        &mut self.comments
    }

    /// Add a comment, binding it to this photo
    pub fn add_comment(&mut self, mut comment: PhotoComment) {
        comment.photo_id = self.id;
        self.comments.push(comment);
    }

    /// Detach a comment from this photo.
    ///
    /// The comment is matched by id when it has one, by position otherwise.
    /// Once the photo is updated the removed comment is deleted from the store.
    pub fn remove_comment(&mut self, comment: &PhotoComment) -> Option<PhotoComment> {
        let position = match comment.id {
            Some(id) => self.comments.iter().position(|c| c.id == Some(id)),
            None => self.comments.iter().position(|c| c == comment),
        }?;
        let mut removed = self.comments.remove(position);
        removed.photo_id = None;
        Some(removed)
    }

    /// Rebind every comment to this photo's id (after insert)
    pub fn bind_comments(&mut self) {
        let photo_id = self.id;
        for comment in self.comments_mut() {
            comment.photo_id = photo_id;
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text(Self::NAME, "url", &self.url)?;
        self.comments.iter().try_for_each(PhotoComment::validate)
    }
}

impl Entity for Photo {
    const NAME: &'static str = "Photo";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

/// PhotoComment Entity (table `photo_comment`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoComment {
    pub id: Option<PhotoCommentId>,
    pub text: String,
    pub created_on: Option<NaiveDateTime>,

    /// Mandatory owner, column `photo_id`
    pub photo_id: Option<PhotoId>,
}

impl PhotoComment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            created_on: None,
            photo_id: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_text(Self::NAME, "text", &self.text)
    }
}

impl Entity for PhotoComment {
    const NAME: &'static str = "PhotoComment";

    fn id(&self) -> Option<i64> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_comment_binds_owner() {
        let mut photo = Photo::from_parts(7, "https://img/1.png".into(), None, Vec::new());
        photo.add_comment(PhotoComment::new("nice"));

        assert_eq!(photo.comments().len(), 1);
        assert_eq!(photo.comments()[0].photo_id, Some(7));
    }

    #[test]
    fn test_remove_persisted_comment_by_id() {
        let mut photo = Photo::from_parts(1, "u".into(), None, Vec::new());
        let mut first = PhotoComment::new("first");
        first.id = Some(10);
        let mut second = PhotoComment::new("second");
        second.id = Some(11);
        photo.add_comment(first);
        photo.add_comment(second);

        let mut probe = PhotoComment::new("text is ignored");
        probe.id = Some(10);
        let removed = photo.remove_comment(&probe).unwrap();

        assert_eq!(removed.text, "first");
        assert!(removed.photo_id.is_none());
        assert_eq!(photo.comments().len(), 1);
        assert_eq!(photo.comments()[0].id, Some(11));
    }

    #[test]
    fn test_remove_unknown_comment_is_none() {
        let mut photo = Photo::new("u");
        photo.add_comment(PhotoComment::new("kept"));
        assert!(photo.remove_comment(&PhotoComment::new("other")).is_none());
        assert_eq!(photo.comments().len(), 1);
    }

    #[test]
    fn test_blank_comment_fails_photo_validation() {
        let mut photo = Photo::new("https://img/2.png");
        photo.add_comment(PhotoComment::new(""));
        assert!(photo.validate().is_err());
    }
}
