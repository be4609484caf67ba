//! Read-side join from stored documents to client-facing posts.
//!
//! Every response or broadcast carrying a post goes through here, so all
//! callers see the same shape. User references are resolved in one batched
//! lookup; references that no longer resolve render as a placeholder.

use crate::db::{EntityStore, StoreResult};
use crate::models::Post;
use event_schema::{CommentView, LikeView, PopulatedPost, UserSummary};
use std::collections::HashMap;
use uuid::Uuid;

pub async fn hydrate_post(store: &dyn EntityStore, post: Post) -> StoreResult<PopulatedPost> {
    let users = load_summaries(store, &post.referenced_user_ids()).await?;
    Ok(populate(post, &users))
}

pub async fn hydrate_posts(
    store: &dyn EntityStore,
    posts: Vec<Post>,
) -> StoreResult<Vec<PopulatedPost>> {
    let mut ids: Vec<Uuid> = Vec::new();
    for post in &posts {
        for id in post.referenced_user_ids() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    let users = load_summaries(store, &ids).await?;
    Ok(posts.into_iter().map(|p| populate(p, &users)).collect())
}

async fn load_summaries(
    store: &dyn EntityStore,
    ids: &[Uuid],
) -> StoreResult<HashMap<Uuid, UserSummary>> {
    let users = store.find_users(ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u.summary())).collect())
}

fn summary_for(users: &HashMap<Uuid, UserSummary>, id: Uuid) -> UserSummary {
    users
        .get(&id)
        .cloned()
        .unwrap_or_else(|| UserSummary::unknown(id))
}

fn populate(post: Post, users: &HashMap<Uuid, UserSummary>) -> PopulatedPost {
    PopulatedPost {
        id: post.id,
        title: post.title,
        content: post.content,
        image: post.image,
        author: summary_for(users, post.author_id),
        tags: post.tags,
        likes: post
            .likes
            .into_iter()
            .map(|like| LikeView {
                user: summary_for(users, like.user_id),
            })
            .collect(),
        comments: post
            .comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                author: summary_for(users, c.user_id),
                text: c.text,
                created_at: c.created_at,
            })
            .collect(),
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{NewPost, User};

    #[tokio::test]
    async fn test_hydrate_resolves_every_reference() {
        let store = MemoryStore::new();
        let author = User::new("Ann".into(), "ann@example.com".into(), "h".into());
        let reader = User::new("Bob".into(), "bob@example.com".into(), "h".into());
        store.insert_user(&author).await.unwrap();
        store.insert_user(&reader).await.unwrap();

        let mut post = Post::new(
            author.id,
            NewPost {
                title: "Hello".into(),
                content: "World".into(),
                ..Default::default()
            },
        );
        post.toggle_like(reader.id);
        post.add_comment(reader.id, "nice post".into());

        let hydrated = hydrate_post(&store, post).await.unwrap();
        assert_eq!(hydrated.author.name, "Ann");
        assert_eq!(hydrated.likes[0].user.name, "Bob");
        assert_eq!(hydrated.comments[0].author.name, "Bob");
        assert!(hydrated.is_liked_by(reader.id));
    }

    #[tokio::test]
    async fn test_missing_user_renders_placeholder() {
        let store = MemoryStore::new();
        let ghost = Uuid::new_v4();
        let post = Post::new(
            ghost,
            NewPost {
                title: "Orphan".into(),
                content: "body".into(),
                ..Default::default()
            },
        );

        let hydrated = hydrate_posts(&store, vec![post]).await.unwrap();
        assert_eq!(hydrated[0].author, UserSummary::unknown(ghost));
    }
}
