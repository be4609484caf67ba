//! Stored documents and request bodies
//!
//! Stored documents hold raw user ids; the client-facing shapes with resolved
//! users live in `event_schema::post`.

pub mod post;
pub mod user;

pub use post::{Comment, Like, NewComment, NewPost, Post, PostChanges};
pub use user::{LoginRequest, ProfileChanges, RegisterRequest, User};
