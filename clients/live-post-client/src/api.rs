use crate::error::{ClientError, Result};
use async_trait::async_trait;
use event_schema::{CommentView, LikeView, PopulatedPost, UserProfile};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Account fields plus the bearer token issued with them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    #[serde(flatten)]
    pub user: UserProfile,
    pub token: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PostEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// The requests a live post view issues
#[async_trait]
pub trait PostApi: Send + Sync {
    async fn get_post(&self, post_id: Uuid) -> Result<PopulatedPost>;
    async fn toggle_like(&self, post_id: Uuid) -> Result<Vec<LikeView>>;
    async fn add_comment(&self, post_id: Uuid, text: &str) -> Result<Vec<CommentView>>;
}

/// HTTP client for the blog API
#[derive(Clone)]
pub struct BlogApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BlogApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// WebSocket endpoint on the same host
    pub fn ws_url(&self) -> String {
        let base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{base}/ws")
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message.or(body.error))
                .unwrap_or_else(|| {
                    if text.is_empty() {
                        status.to_string()
                    } else {
                        text
                    }
                });
            return Err(ClientError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<AuthSession> {
        let body = serde_json::json!({ "name": name, "email": email, "password": password });
        self.send(self.request(Method::POST, "/auth/register").json(&body))
            .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        let body = serde_json::json!({ "email": email, "password": password });
        self.send(self.request(Method::POST, "/auth/login").json(&body))
            .await
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.send(self.request(Method::GET, "/auth/profile")).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<AuthSession> {
        self.send(self.request(Method::PUT, "/auth/profile").json(update))
            .await
    }

    pub async fn list_posts(&self) -> Result<Vec<PopulatedPost>> {
        self.send(self.request(Method::GET, "/posts")).await
    }

    pub async fn create_post(&self, draft: &PostDraft) -> Result<PopulatedPost> {
        self.send(self.request(Method::POST, "/posts").json(draft))
            .await
    }

    pub async fn update_post(&self, post_id: Uuid, edit: &PostEdit) -> Result<PopulatedPost> {
        self.send(
            self.request(Method::PUT, &format!("/posts/{post_id}"))
                .json(edit),
        )
        .await
    }

    pub async fn delete_post(&self, post_id: Uuid) -> Result<()> {
        let _: serde_json::Value = self
            .send(self.request(Method::DELETE, &format!("/posts/{post_id}")))
            .await?;
        Ok(())
    }

    pub async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<()> {
        let _: serde_json::Value = self
            .send(self.request(
                Method::DELETE,
                &format!("/posts/{post_id}/comments/{comment_id}"),
            ))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PostApi for BlogApi {
    async fn get_post(&self, post_id: Uuid) -> Result<PopulatedPost> {
        self.send(self.request(Method::GET, &format!("/posts/{post_id}")))
            .await
    }

    async fn toggle_like(&self, post_id: Uuid) -> Result<Vec<LikeView>> {
        self.send(self.request(Method::PUT, &format!("/posts/{post_id}/like")))
            .await
    }

    async fn add_comment(&self, post_id: Uuid, text: &str) -> Result<Vec<CommentView>> {
        let body = serde_json::json!({ "text": text });
        self.send(
            self.request(Method::POST, &format!("/posts/{post_id}/comments"))
                .json(&body),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_url_follows_scheme() {
        assert_eq!(
            BlogApi::new("http://localhost:5000/").ws_url(),
            "ws://localhost:5000/ws"
        );
        assert_eq!(
            BlogApi::new("https://blog.example.com").ws_url(),
            "wss://blog.example.com/ws"
        );
    }

    #[test]
    fn test_edit_serializes_only_supplied_fields() {
        let edit = PostEdit {
            title: Some("New".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&edit).unwrap(), serde_json::json!({"title": "New"}));
    }
}
