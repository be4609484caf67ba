/// Post service - the mutation API over posts, likes and comments
///
/// Each mutation is validate, load, check, apply, persist, hydrate, publish.
/// Publishing happens after the write succeeds and before the caller gets
/// its response.
use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{NewComment, NewPost, Post, PostChanges};
use crate::services::hydrate::{hydrate_post, hydrate_posts};
use crate::websocket::PostHub;
use event_schema::{CommentView, LikeView, PopulatedPost, ServerEvent};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

pub struct PostService {
    store: Arc<dyn EntityStore>,
    hub: PostHub,
}

impl PostService {
    pub fn new(store: Arc<dyn EntityStore>, hub: PostHub) -> Self {
        Self { store, hub }
    }

    pub async fn list(&self) -> Result<Vec<PopulatedPost>> {
        let posts = self.store.list_posts().await?;
        Ok(hydrate_posts(self.store.as_ref(), posts).await?)
    }

    pub async fn get(&self, post_id: Uuid) -> Result<PopulatedPost> {
        let post = self.load(post_id).await?;
        self.hydrate(post).await
    }

    pub async fn create(&self, caller: Uuid, input: NewPost) -> Result<PopulatedPost> {
        let input = input.normalized();
        input.validate()?;

        let post = Post::new(caller, input);
        self.store.insert_post(&post).await?;
        metrics::record_mutation("create");

        tracing::info!(post_id = %post.id, author_id = %caller, "post created");

        let populated = self.hydrate(post).await?;
        self.hub
            .publish(&ServerEvent::NewPost {
                post: populated.clone(),
            })
            .await;
        Ok(populated)
    }

    pub async fn update(
        &self,
        caller: Uuid,
        post_id: Uuid,
        changes: PostChanges,
    ) -> Result<PopulatedPost> {
        let changes = changes.normalized();
        changes.validate()?;

        let mut post = self.load(post_id).await?;
        if !post.is_authored_by(caller) {
            return Err(AppError::Forbidden(
                "Not authorized to update this post".to_string(),
            ));
        }

        post.apply(changes);
        self.persist(&mut post, "update").await?;

        let populated = self.hydrate(post).await?;
        self.publish_updated(&populated).await;
        Ok(populated)
    }

    pub async fn delete(&self, caller: Uuid, post_id: Uuid) -> Result<()> {
        let post = self.load(post_id).await?;
        if !post.is_authored_by(caller) {
            return Err(AppError::Forbidden(
                "Not authorized to delete this post".to_string(),
            ));
        }

        if !self.store.delete_post(post_id).await? {
            return Err(post_not_found());
        }
        metrics::record_mutation("delete");

        tracing::info!(%post_id, "post deleted");

        self.hub.publish(&ServerEvent::PostDeleted { post_id }).await;
        Ok(())
    }

    /// Flip the caller's like and return the resulting like set.
    pub async fn toggle_like(&self, caller: Uuid, post_id: Uuid) -> Result<Vec<LikeView>> {
        let mut post = self.load(post_id).await?;
        let liked = post.toggle_like(caller);
        self.persist(&mut post, "toggle_like").await?;

        tracing::debug!(%post_id, user_id = %caller, liked, "like toggled");

        let populated = self.hydrate(post).await?;
        self.publish_updated(&populated).await;
        Ok(populated.likes)
    }

    /// Append a comment and return the full, hydrated comment list.
    pub async fn add_comment(
        &self,
        caller: Uuid,
        post_id: Uuid,
        input: NewComment,
    ) -> Result<Vec<CommentView>> {
        let input = input.normalized();
        input.validate()?;

        let mut post = self.load(post_id).await?;
        let comment_id = post.add_comment(caller, input.text);
        self.persist(&mut post, "add_comment").await?;

        tracing::debug!(%post_id, %comment_id, "comment added");

        let populated = self.hydrate(post).await?;
        self.publish_updated(&populated).await;
        Ok(populated.comments)
    }

    /// Remove a comment. Allowed for the comment's author and the post's author.
    pub async fn delete_comment(
        &self,
        caller: Uuid,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<()> {
        let mut post = self.load(post_id).await?;
        let comment = post
            .find_comment(comment_id)
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        if comment.user_id != caller && !post.is_authored_by(caller) {
            return Err(AppError::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        post.remove_comment(comment_id);
        self.persist(&mut post, "delete_comment").await?;

        tracing::debug!(%post_id, %comment_id, "comment deleted");

        let populated = self.hydrate(post).await?;
        self.publish_updated(&populated).await;
        Ok(())
    }

    async fn load(&self, post_id: Uuid) -> Result<Post> {
        self.store
            .find_post(post_id)
            .await?
            .ok_or_else(post_not_found)
    }

    async fn persist(&self, post: &mut Post, op: &str) -> Result<()> {
        post.touch();
        // The post may have been deleted since it was loaded
        if !self.store.replace_post(post).await? {
            return Err(post_not_found());
        }
        metrics::record_mutation(op);
        Ok(())
    }

    async fn hydrate(&self, post: Post) -> Result<PopulatedPost> {
        Ok(hydrate_post(self.store.as_ref(), post).await?)
    }

    async fn publish_updated(&self, post: &PopulatedPost) {
        self.hub
            .publish(&ServerEvent::PostUpdated { post: post.clone() })
            .await;
    }
}

fn post_not_found() -> AppError {
    AppError::NotFound("Post not found".to_string())
}
