//! Real-time event schema
//!
//! Every frame on the post WebSocket is a JSON object tagged by `type`:
//!
//! ```json
//! {"type": "joinPost", "post_id": "uuid"}
//! {"type": "newPost", "post": { ... }}
//! {"type": "postUpdated", "post": { ... }}
//! {"type": "postDeleted", "post_id": "uuid"}
//! ```
//!
//! Creation and deletion notices go to every connected client. Updates go
//! only to the channel of the post they describe.

use crate::post::PopulatedPost;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client -> server frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Subscribe this connection to a post's channel
    #[serde(rename = "joinPost")]
    JoinPost { post_id: Uuid },
}

/// Server -> client frames
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "newPost")]
    NewPost { post: PopulatedPost },

    #[serde(rename = "postUpdated")]
    PostUpdated { post: PopulatedPost },

    #[serde(rename = "postDeleted")]
    PostDeleted { post_id: Uuid },
}

/// Who receives a published event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventScope {
    /// Every live connection
    Global,
    /// Only connections subscribed to this post
    Channel(Uuid),
}

impl ServerEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NewPost { .. } => "newPost",
            Self::PostUpdated { .. } => "postUpdated",
            Self::PostDeleted { .. } => "postDeleted",
        }
    }

    pub fn post_id(&self) -> Uuid {
        match self {
            Self::NewPost { post } | Self::PostUpdated { post } => post.id,
            Self::PostDeleted { post_id } => *post_id,
        }
    }

    pub fn scope(&self) -> EventScope {
        match self {
            Self::NewPost { .. } | Self::PostDeleted { .. } => EventScope::Global,
            Self::PostUpdated { post } => EventScope::Channel(post.id),
        }
    }

    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::UserSummary;
    use chrono::Utc;

    fn sample_post() -> PopulatedPost {
        let now = Utc::now();
        PopulatedPost {
            id: Uuid::new_v4(),
            title: "Hello".to_string(),
            content: "World".to_string(),
            image: None,
            author: UserSummary::unknown(Uuid::new_v4()),
            tags: vec!["rust".to_string()],
            likes: vec![],
            comments: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_join_post_wire_format() {
        let post_id = Uuid::new_v4();
        let raw = format!(r#"{{"type":"joinPost","post_id":"{post_id}"}}"#);
        let parsed: ClientEvent = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, ClientEvent::JoinPost { post_id });
    }

    #[test]
    fn test_server_event_tags() {
        let post = sample_post();
        let payload = ServerEvent::PostUpdated { post: post.clone() }
            .to_payload()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(value["type"], "postUpdated");
        assert_eq!(value["post"]["title"], "Hello");

        let deleted = ServerEvent::PostDeleted { post_id: post.id };
        let value = serde_json::to_value(&deleted).unwrap();
        assert_eq!(value["type"], "postDeleted");
        assert_eq!(value["post_id"], post.id.to_string());
    }

    #[test]
    fn test_scopes() {
        let post = sample_post();
        let id = post.id;
        assert_eq!(
            ServerEvent::NewPost { post: post.clone() }.scope(),
            EventScope::Global
        );
        assert_eq!(
            ServerEvent::PostUpdated { post }.scope(),
            EventScope::Channel(id)
        );
        assert_eq!(
            ServerEvent::PostDeleted { post_id: id }.scope(),
            EventScope::Global
        );
    }

    #[test]
    fn test_event_type_names_are_unique() {
        let post = sample_post();
        let types = [
            ServerEvent::NewPost { post: post.clone() }.event_type(),
            ServerEvent::PostUpdated { post: post.clone() }.event_type(),
            ServerEvent::PostDeleted { post_id: post.id }.event_type(),
        ];
        let unique: std::collections::HashSet<_> = types.iter().collect();
        assert_eq!(types.len(), unique.len());
    }
}
