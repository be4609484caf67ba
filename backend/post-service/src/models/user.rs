use chrono::{DateTime, Utc};
use event_schema::{UserProfile, UserSummary, DEFAULT_AVATAR};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User document as persisted. `password_hash` never leaves the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            avatar: DEFAULT_AVATAR.to_string(),
            bio: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            bio: self.bio.clone(),
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Please enter your name"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Minimum password length is 6 characters"))]
    pub password: String,
}

impl RegisterRequest {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl LoginRequest {
    pub fn normalized(self) -> Self {
        Self {
            email: self.email.trim().to_lowercase(),
            password: self.password,
        }
    }
}

/// Partial profile update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileChanges {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Avatar cannot be empty"))]
    pub avatar: Option<String>,
    #[validate(length(max = 200, message = "Bio cannot exceed 200 characters"))]
    pub bio: Option<String>,
    #[validate(length(min = 6, message = "Minimum password length is 6 characters"))]
    pub password: Option<String>,
}

impl ProfileChanges {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|s| s.trim().to_string()),
            email: self.email.map(|s| s.trim().to_lowercase()),
            avatar: self.avatar.map(|s| s.trim().to_string()),
            bio: self.bio.map(|s| s.trim().to_string()),
            password: self.password,
        }
    }
}
