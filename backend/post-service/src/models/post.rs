use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Post document as persisted. Likes and comments are embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    pub author_id: Uuid,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub likes: Vec<Like>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(author_id: Uuid, input: NewPost) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            content: input.content,
            image: input.image.filter(|s| !s.is_empty()),
            author_id,
            tags: input.tags,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_authored_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }

    pub fn is_liked_by(&self, user_id: Uuid) -> bool {
        self.likes.iter().any(|like| like.user_id == user_id)
    }

    /// Add the user's like if absent, remove it otherwise.
    /// Returns whether the user likes the post afterwards.
    pub fn toggle_like(&mut self, user_id: Uuid) -> bool {
        if self.is_liked_by(user_id) {
            self.likes.retain(|like| like.user_id != user_id);
            false
        } else {
            self.likes.push(Like { user_id });
            true
        }
    }

    /// Overwrite only the supplied fields.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        if let Some(image) = changes.image {
            self.image = if image.is_empty() { None } else { Some(image) };
        }
        if let Some(tags) = changes.tags {
            self.tags = tags;
        }
    }

    pub fn add_comment(&mut self, user_id: Uuid, text: String) -> Uuid {
        let comment = Comment {
            id: Uuid::new_v4(),
            user_id,
            text,
            created_at: Utc::now(),
        };
        let id = comment.id;
        self.comments.push(comment);
        id
    }

    pub fn find_comment(&self, comment_id: Uuid) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    pub fn remove_comment(&mut self, comment_id: Uuid) -> bool {
        let before = self.comments.len();
        self.comments.retain(|c| c.id != comment_id);
        before != self.comments.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Every user id this document references, author first, without duplicates.
    pub fn referenced_user_ids(&self) -> Vec<Uuid> {
        let mut ids = vec![self.author_id];
        let others = self
            .likes
            .iter()
            .map(|l| l.user_id)
            .chain(self.comments.iter().map(|c| c.user_id));
        for id in others {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewPost {
    #[validate(length(min = 1, max = 100, message = "Title is required and must be at most 100 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NewPost {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
            tags: normalize_tags(self.tags),
            image: self.image.map(|s| s.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PostChanges {
    #[validate(length(min = 1, max = 100, message = "Title cannot be empty and must be at most 100 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Content cannot be empty"))]
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
}

impl PostChanges {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.map(|s| s.trim().to_string()),
            content: self.content.map(|s| s.trim().to_string()),
            tags: self.tags.map(normalize_tags),
            image: self.image.map(|s| s.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewComment {
    #[validate(length(min = 1, message = "Comment text is required"))]
    pub text: String,
}

impl NewComment {
    pub fn normalized(self) -> Self {
        Self {
            text: self.text.trim().to_string(),
        }
    }
}
