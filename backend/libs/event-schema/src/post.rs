use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display data for a referenced user (author, liker, commenter)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}

impl UserSummary {
    /// Placeholder used when a reference no longer resolves to a stored user
    pub fn unknown(id: Uuid) -> Self {
        Self {
            id,
            name: "Unknown user".to_string(),
            avatar: crate::DEFAULT_AVATAR.to_string(),
        }
    }
}

/// Full account view returned to the account owner. Never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub bio: String,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeView {
    pub user: UserSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: UserSummary,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A post with every user reference resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulatedPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub author: UserSummary,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: Vec<LikeView>,
    #[serde(default)]
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PopulatedPost {
    /// Like membership is always decided by the raw user id.
    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.iter().any(|like| like.user.id == user_id)
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }

    /// Force the viewer's like membership to `liked`, returning the previous membership.
    pub fn set_liked(&mut self, viewer: &UserSummary, liked: bool) -> bool {
        let was_liked = self.is_liked_by(viewer.id);
        if liked && !was_liked {
            self.likes.push(LikeView {
                user: viewer.clone(),
            });
        } else if !liked && was_liked {
            self.likes.retain(|like| like.user.id != viewer.id);
        }
        was_liked
    }

    /// Flip the viewer's like membership, returning the previous membership.
    pub fn toggle_like(&mut self, viewer: &UserSummary) -> bool {
        let was_liked = self.is_liked_by(viewer.id);
        self.set_liked(viewer, !was_liked)
    }

    /// Remove a comment by id; returns whether anything was removed.
    pub fn remove_comment(&mut self, comment_id: Uuid) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != comment_id);
        before != self.comments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserSummary {
        UserSummary {
            id: Uuid::new_v4(),
            name: name.to_string(),
            avatar: crate::DEFAULT_AVATAR.to_string(),
        }
    }

    fn post(author: &UserSummary) -> PopulatedPost {
        let now = Utc::now();
        PopulatedPost {
            id: Uuid::new_v4(),
            title: "Hello".to_string(),
            content: "World".to_string(),
            image: None,
            author: author.clone(),
            tags: vec![],
            likes: vec![],
            comments: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_toggle_like_twice_restores_likes() {
        let alice = user("alice");
        let bob = user("bob");
        let mut p = post(&alice);
        p.set_liked(&bob, true);
        let original = p.likes.clone();

        assert!(!p.toggle_like(&alice));
        assert!(p.is_liked_by(alice.id));
        assert!(p.toggle_like(&alice));
        assert_eq!(p.likes, original);
    }

    #[test]
    fn test_set_liked_is_idempotent() {
        let alice = user("alice");
        let mut p = post(&alice);

        assert!(!p.set_liked(&alice, true));
        assert!(p.set_liked(&alice, true));
        assert_eq!(p.like_count(), 1);

        assert!(p.set_liked(&alice, false));
        assert!(!p.set_liked(&alice, false));
        assert_eq!(p.like_count(), 0);
    }

    #[test]
    fn test_remove_comment_by_id() {
        let alice = user("alice");
        let bob = user("bob");
        let mut p = post(&alice);
        let comment = CommentView {
            id: Uuid::new_v4(),
            author: bob.clone(),
            text: "nice post".to_string(),
            created_at: Utc::now(),
        };
        p.comments.push(comment.clone());

        assert!(p.remove_comment(comment.id));
        assert!(!p.remove_comment(comment.id));
    }

    #[test]
    fn test_image_omitted_when_absent() {
        let alice = user("alice");
        let json = serde_json::to_value(post(&alice)).unwrap();
        assert!(json.get("image").is_none());
        assert_eq!(json["author"]["name"], "alice");
    }
}
