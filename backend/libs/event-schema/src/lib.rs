/// Shared wire schema for the blog platform
///
/// Defines the fully populated ("hydrated") representations returned by the
/// post-service HTTP API and carried by real-time broadcasts, plus the
/// WebSocket event enums exchanged between the broadcast hub and viewers.
/// Both the server and the live client depend on this crate so the two sides
/// cannot drift apart.
pub mod events;
pub mod post;

pub use events::{ClientEvent, EventScope, ServerEvent};
pub use post::{CommentView, LikeView, PopulatedPost, UserProfile, UserSummary};

/// Avatar assigned to accounts that never set one
pub const DEFAULT_AVATAR: &str = "https://i.imgur.com/8Km9tLL.png";
