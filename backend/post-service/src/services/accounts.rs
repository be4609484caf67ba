use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, ProfileChanges, RegisterRequest, User};
use crypto_core::{hash_password, jwt, verify_password};
use event_schema::UserProfile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Account fields plus a fresh bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

pub struct AccountService {
    store: Arc<dyn EntityStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        let req = req.normalized();
        req.validate()?;

        let password_hash = hash_password(&req.password)?;
        let user = User::new(req.name, req.email, password_hash);
        self.store.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");

        issue(&user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        let req = req.normalized();
        req.validate()?;

        let user = self
            .store
            .find_user_by_email(&req.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AppError::InvalidCredentials);
        }

        issue(&user)
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile> {
        Ok(self.load(user_id).await?.profile())
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        changes: ProfileChanges,
    ) -> Result<AuthResponse> {
        let changes = changes.normalized();
        changes.validate()?;

        let mut user = self.load(user_id).await?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(avatar) = changes.avatar {
            user.avatar = avatar;
        }
        if let Some(bio) = changes.bio {
            user.bio = bio;
        }
        if let Some(password) = changes.password {
            user.password_hash = hash_password(&password)?;
        }

        if !self.store.replace_user(&user).await? {
            return Err(user_not_found());
        }

        issue(&user)
    }

    async fn load(&self, user_id: Uuid) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(user_not_found)
    }
}

fn issue(user: &User) -> Result<AuthResponse> {
    Ok(AuthResponse {
        user: user.profile(),
        token: jwt::generate_access_token(user.id)?,
    })
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}
