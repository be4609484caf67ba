//! Entity store
//!
//! Posts and users are stored as whole documents and replaced wholesale on
//! update. There is no concurrency token: two read-modify-write cycles on the
//! same post race and the last write wins.

pub mod memory;
pub mod postgres;

use crate::models::{Post, User};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated (duplicate email)
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt document: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// All posts, newest first
    async fn list_posts(&self) -> StoreResult<Vec<Post>>;
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>>;
    async fn insert_post(&self, post: &Post) -> StoreResult<()>;
    /// Replace the stored document; returns false if the post no longer exists
    async fn replace_post(&self, post: &Post) -> StoreResult<bool>;
    async fn delete_post(&self, id: Uuid) -> StoreResult<bool>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    /// `email` must already be lowercased
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// Batched lookup; ids that do not resolve are simply absent from the result
    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;
    /// Fails with `Conflict` when the email is taken
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    /// Fails with `Conflict` when the new email belongs to another user
    async fn replace_user(&self, user: &User) -> StoreResult<bool>;
}
