//! Per-post view state machine
//!
//! ```text
//! Loading --fetched--> Loaded --like--> LikePending    --ok--> Loaded
//!    |                   |                             --err-> Reverted
//!    |                   +--comment--> CommentPending  --ok--> Loaded
//!    |                                                 --err-> Reverted
//!    +--fetch failed / postDeleted--> NotFound
//! ```
//!
//! Every optimistic action records its own rollback. A `postUpdated`
//! broadcast replaces the displayed post outright and does not touch pending
//! actions; their rollbacks still run against whatever is displayed when the
//! request fails.

use crate::error::ClientError;
use chrono::Utc;
use event_schema::{CommentView, PopulatedPost, ServerEvent, UserSummary};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Loaded,
    LikePending,
    CommentPending,
    Reverted,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Like,
    Comment,
}

/// Transient message for the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Info(String),
}

type Rollback = Box<dyn FnOnce(&mut PopulatedPost) + Send>;

struct PendingAction {
    id: ActionId,
    kind: ActionKind,
    rollback: Rollback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Loading,
    Ready,
    NotFound,
}

/// Cloneable picture of a view for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub phase: Phase,
    pub post: Option<PopulatedPost>,
    pub pending: usize,
}

pub struct PostView {
    post_id: Uuid,
    viewer: Option<UserSummary>,
    status: Status,
    post: Option<PopulatedPost>,
    pending: Vec<PendingAction>,
    reverted: bool,
    mounted: bool,
    next_action: u64,
    notices: Vec<Notice>,
}

impl PostView {
    /// `viewer` is `None` for anonymous readers, who cannot like or comment.
    pub fn new(post_id: Uuid, viewer: Option<UserSummary>) -> Self {
        Self {
            post_id,
            viewer,
            status: Status::Loading,
            post: None,
            pending: Vec::new(),
            reverted: false,
            mounted: true,
            next_action: 0,
            notices: Vec::new(),
        }
    }

    pub fn post_id(&self) -> Uuid {
        self.post_id
    }

    pub fn post(&self) -> Option<&PopulatedPost> {
        self.post.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn phase(&self) -> Phase {
        match self.status {
            Status::Loading => Phase::Loading,
            Status::NotFound => Phase::NotFound,
            Status::Ready => match self.pending.last() {
                Some(action) if action.kind == ActionKind::Like => Phase::LikePending,
                Some(_) => Phase::CommentPending,
                None if self.reverted => Phase::Reverted,
                None => Phase::Loaded,
            },
        }
    }

    pub fn is_liked_by_viewer(&self) -> bool {
        match (&self.post, &self.viewer) {
            (Some(post), Some(viewer)) => post.is_liked_by(viewer.id),
            _ => false,
        }
    }

    pub fn like_count(&self) -> usize {
        self.post.as_ref().map(|p| p.like_count()).unwrap_or(0)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            phase: self.phase(),
            post: self.post.clone(),
            pending: self.pending.len(),
        }
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Result of the initial fetch.
    pub fn on_fetched(&mut self, result: Result<PopulatedPost, ClientError>) {
        if !self.mounted {
            return;
        }
        match result {
            Ok(post) => {
                // A broadcast may already have delivered a newer copy
                if self.status == Status::Loading {
                    self.post = Some(post);
                    self.status = Status::Ready;
                }
            }
            Err(e) => {
                tracing::debug!(post_id = %self.post_id, error = %e, "initial fetch failed");
                if self.status == Status::Loading {
                    self.status = Status::NotFound;
                    self.notices.push(Notice::Error(if e.is_not_found() {
                        "Post not found".to_string()
                    } else {
                        format!("Failed to load post: {e}")
                    }));
                }
            }
        }
    }

    /// Apply the viewer's like toggle locally.
    ///
    /// Returns the action to settle once the request completes, or `None`
    /// when the action is refused locally and no request should be sent.
    pub fn begin_like(&mut self) -> Option<ActionId> {
        let viewer = self.require_viewer("Please log in to like posts")?;
        let post = self.require_loaded()?;

        let was_liked = post.toggle_like(&viewer);
        let rollback: Rollback = Box::new(move |post: &mut PopulatedPost| {
            post.set_liked(&viewer, was_liked);
        });
        Some(self.push_pending(ActionKind::Like, rollback))
    }

    /// Prepend a synthetic comment locally.
    ///
    /// Returns the action to settle, or `None` when refused locally.
    pub fn begin_comment(&mut self, text: &str) -> Option<ActionId> {
        let text = text.trim();
        if text.is_empty() {
            if self.mounted {
                self.notices
                    .push(Notice::Error("Comment cannot be empty".to_string()));
            }
            return None;
        }
        let viewer = self.require_viewer("Please log in to comment")?;
        let post = self.require_loaded()?;

        let temp_id = Uuid::new_v4();
        post.comments.insert(
            0,
            CommentView {
                id: temp_id,
                author: viewer,
                text: text.to_string(),
                created_at: Utc::now(),
            },
        );
        let rollback: Rollback = Box::new(move |post: &mut PopulatedPost| {
            post.remove_comment(temp_id);
        });
        Some(self.push_pending(ActionKind::Comment, rollback))
    }

    /// Settle an optimistic action with its request outcome.
    ///
    /// Success needs no reconciliation: the broadcast triggered by the
    /// request carries the authoritative post. Failure runs the rollback.
    pub fn settle(&mut self, id: ActionId, outcome: Result<(), ClientError>) {
        if !self.mounted {
            return;
        }
        let Some(index) = self.pending.iter().position(|a| a.id == id) else {
            return;
        };
        let action = self.pending.remove(index);

        match outcome {
            Ok(()) => {
                self.reverted = false;
                if action.kind == ActionKind::Comment {
                    self.notices.push(Notice::Info("Comment added".to_string()));
                }
            }
            Err(e) => {
                if let Some(post) = self.post.as_mut() {
                    (action.rollback)(post);
                }
                self.reverted = true;
                let what = match action.kind {
                    ActionKind::Like => "like post",
                    ActionKind::Comment => "add comment",
                };
                self.notices.push(Notice::Error(format!("Failed to {what}: {e}")));
            }
        }
    }

    /// Apply a broadcast from the post channel.
    pub fn on_server_event(&mut self, event: &ServerEvent) {
        if !self.mounted {
            return;
        }
        match event {
            ServerEvent::PostUpdated { post } if post.id == self.post_id => {
                if self.status == Status::NotFound {
                    return;
                }
                self.post = Some(post.clone());
                self.status = Status::Ready;
            }
            ServerEvent::PostDeleted { post_id } if *post_id == self.post_id => {
                self.status = Status::NotFound;
                self.post = None;
                self.pending.clear();
                self.notices
                    .push(Notice::Info("This post has been deleted".to_string()));
            }
            _ => {}
        }
    }

    /// Stop reacting; later results and broadcasts are discarded.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.pending.clear();
        self.notices.clear();
    }

    fn require_viewer(&mut self, message: &str) -> Option<UserSummary> {
        if !self.mounted {
            return None;
        }
        match &self.viewer {
            Some(viewer) => Some(viewer.clone()),
            None => {
                self.notices.push(Notice::Error(message.to_string()));
                None
            }
        }
    }

    fn require_loaded(&mut self) -> Option<&mut PopulatedPost> {
        if !self.mounted || self.status != Status::Ready {
            return None;
        }
        self.post.as_mut()
    }

    fn push_pending(&mut self, kind: ActionKind, rollback: Rollback) -> ActionId {
        self.next_action += 1;
        let id = ActionId(self.next_action);
        self.pending.push(PendingAction { id, kind, rollback });
        self.reverted = false;
        id
    }
}
