use super::{EntityStore, StoreError, StoreResult};
use crate::models::{Post, User};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Process-local store used when no database is configured and in tests.
///
/// Each collection sits behind its own lock; a single call holds it once.
#[derive(Default)]
pub struct MemoryStore {
    posts: RwLock<HashMap<Uuid, Post>>,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut all: Vec<Post> = posts.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        self.posts.write().await.insert(post.id, post.clone());
        Ok(())
    }

    async fn replace_post(&self, post: &Post) -> StoreResult<bool> {
        let mut posts = self.posts.write().await;
        match posts.get_mut(&post.id) {
            Some(stored) => {
                *stored = post.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("User already exists".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn replace_user(&self, user: &User) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(StoreError::Conflict("Email already in use".to_string()));
        }
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
