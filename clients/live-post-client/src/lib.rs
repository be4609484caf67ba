//! Live post client
//!
//! Keeps one viewer's copy of a post consistent with local intent and server
//! truth. Likes and comments are applied optimistically, rolled back when the
//! request fails, and overwritten by every `postUpdated` broadcast for the
//! viewed post.
//!
//! - `view`: the per-post state machine (pure, no I/O)
//! - `session`: the cooperative loop that drives a view from user commands,
//!   request completions and socket frames
//! - `api` / `socket`: HTTP and WebSocket transports

pub mod api;
pub mod error;
pub mod session;
pub mod socket;
pub mod view;

pub use api::{AuthSession, BlogApi, PostApi, PostDraft, PostEdit, ProfileUpdate};
pub use error::{ClientError, Result};
pub use session::{Command, ViewerHandle, ViewerSession};
pub use socket::PostSocket;
pub use view::{ActionId, ActionKind, Notice, Phase, PostView, ViewSnapshot};
