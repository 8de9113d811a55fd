use std::sync::Arc;

use gallery_store::{Entity, MetadataStore};
use gallery_types::{AppId, Comment, CommentId, UserId};
use tracing::debug;

use crate::error::{GalleryError, GalleryResult};

/// Comments, likes and download counts. Counters are maintained atomically
/// by the metadata store.
pub struct Social {
    store: Arc<dyn MetadataStore>,
}

impl Social {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    pub fn publish_comment(&self, app: &AppId, author: &UserId, text: &str) -> GalleryResult<CommentId> {
        let comment = self.store.add_comment(app, author, text)?;
        debug!(comment_id = %comment.id, app_id = %app, "comment published");
        Ok(comment.id)
    }

    /// Comments on `app`, oldest first.
    pub fn comments(&self, app: &AppId) -> GalleryResult<Vec<Comment>> {
        Ok(self.store.comments_for(app)?)
    }

    /// Like `app` as `user`. Liking twice counts once. Returns the count.
    pub fn increase_likes(&self, app: &AppId, user: &UserId) -> GalleryResult<u64> {
        Ok(self.store.add_like(app, user)?)
    }

    pub fn decrease_likes(&self, app: &AppId, user: &UserId) -> GalleryResult<u64> {
        Ok(self.store.remove_like(app, user)?)
    }

    pub fn num_likes(&self, app: &AppId) -> GalleryResult<u64> {
        self.store
            .get_app(app)?
            .map(|a| a.like_count)
            .ok_or_else(|| GalleryError::not_found(Entity::App, app))
    }

    pub fn is_liked_by(&self, app: &AppId, user: &UserId) -> GalleryResult<bool> {
        Ok(self.store.is_liked(app, user)?)
    }

    /// Count one download. Returns the new total.
    pub fn app_was_downloaded(&self, app: &AppId) -> GalleryResult<u64> {
        Ok(self.store.increment_downloads(app)?)
    }
}
