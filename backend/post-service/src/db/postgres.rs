use super::{EntityStore, StoreError, StoreResult};
use crate::models::{Post, User};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

/// PostgreSQL-backed store. Each entity is one JSONB `doc` column.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(format!("migration failed: {e}")))?;

        tracing::info!(max_connections, "connected to PostgreSQL");
        Ok(Self::new(pool))
    }
}

fn map_write_error(err: sqlx::Error, conflict_message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(conflict_message.to_string())
        }
        _ => StoreError::from(err),
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn list_posts(&self) -> StoreResult<Vec<Post>> {
        let docs = sqlx::query_scalar::<_, Json<Post>>(
            "SELECT doc FROM posts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(docs.into_iter().map(|Json(p)| p).collect())
    }

    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let doc = sqlx::query_scalar::<_, Json<Post>>("SELECT doc FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(p)| p))
    }

    async fn insert_post(&self, post: &Post) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, doc, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(Json(post))
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn replace_post(&self, post: &Post) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE posts SET doc = $2, updated_at = $3 WHERE id = $1")
            .bind(post.id)
            .bind(Json(post))
            .bind(post.updated_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let doc = sqlx::query_scalar::<_, Json<User>>("SELECT doc FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(u)| u))
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let doc = sqlx::query_scalar::<_, Json<User>>("SELECT doc FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(doc.map(|Json(u)| u))
    }

    async fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let docs =
            sqlx::query_scalar::<_, Json<User>>("SELECT doc FROM users WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(docs.into_iter().map(|Json(u)| u).collect())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query("INSERT INTO users (id, email, doc, created_at) VALUES ($1, $2, $3, $4)")
            .bind(user.id)
            .bind(&user.email)
            .bind(Json(user))
            .bind(user.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "User already exists"))?;
        Ok(())
    }

    async fn replace_user(&self, user: &User) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET email = $2, doc = $3 WHERE id = $1")
            .bind(user.id)
            .bind(&user.email)
            .bind(Json(user))
            .execute(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Email already in use"))?;
        Ok(result.rows_affected() > 0)
    }
}
