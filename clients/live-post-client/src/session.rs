//! Viewer session: one task per mounted post view
//!
//! The task owns a [`PostView`] and multiplexes three inputs with `select!`:
//! commands from the UI, completions of the HTTP requests it started, and
//! frames from the post channel. After every input the current snapshot is
//! published on a watch channel and any notices are forwarded.

use crate::api::{BlogApi, PostApi};
use crate::error::{ClientError, Result};
use crate::socket::PostSocket;
use crate::view::{ActionId, Notice, PostView, ViewSnapshot};
use event_schema::{PopulatedPost, ServerEvent, UserSummary};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Like,
    Comment(String),
}

enum Completion {
    Fetched(Result<PopulatedPost>),
    Settled(ActionId, Result<()>),
}

pub struct ViewerSession;

impl ViewerSession {
    /// Connect the post channel, then start the session.
    ///
    /// `joinPost` is sent before the initial fetch, but the server applies it
    /// asynchronously. An update published before the subscription lands is
    /// not delivered; the view relies on the fetch for that baseline.
    pub async fn connect(
        api: BlogApi,
        post_id: Uuid,
        viewer: Option<UserSummary>,
    ) -> Result<ViewerHandle> {
        let mut socket = PostSocket::connect(&api.ws_url()).await?;
        socket.join_post(post_id).await?;
        Ok(Self::spawn(
            Arc::new(api),
            socket.into_events(),
            post_id,
            viewer,
        ))
    }

    pub fn spawn<S>(
        api: Arc<dyn PostApi>,
        events: S,
        post_id: Uuid,
        viewer: Option<UserSummary>,
    ) -> ViewerHandle
    where
        S: Stream<Item = Result<ServerEvent>> + Send + Unpin + 'static,
    {
        let view = PostView::new(post_id, viewer);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(view.snapshot());
        let (notice_tx, notice_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run(api, events, view, command_rx, snapshot_tx, notice_tx));

        ViewerHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
            notices: notice_rx,
            task,
        }
    }
}

async fn run<S>(
    api: Arc<dyn PostApi>,
    mut events: S,
    mut view: PostView,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<ViewSnapshot>,
    notices: mpsc::UnboundedSender<Notice>,
) where
    S: Stream<Item = Result<ServerEvent>> + Send + Unpin + 'static,
{
    let post_id = view.post_id();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel();

    {
        let api = api.clone();
        let done_tx = done_tx.clone();
        tokio::spawn(async move {
            let result = api.get_post(post_id).await;
            let _ = done_tx.send(Completion::Fetched(result));
        });
    }

    let mut events_open = true;
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Like) => {
                    if let Some(action) = view.begin_like() {
                        let api = api.clone();
                        let done_tx = done_tx.clone();
                        tokio::spawn(async move {
                            let result = api.toggle_like(post_id).await.map(|_| ());
                            let _ = done_tx.send(Completion::Settled(action, result));
                        });
                    }
                }
                Some(Command::Comment(text)) => {
                    if let Some(action) = view.begin_comment(&text) {
                        let api = api.clone();
                        let done_tx = done_tx.clone();
                        tokio::spawn(async move {
                            let result = api.add_comment(post_id, text.trim()).await.map(|_| ());
                            let _ = done_tx.send(Completion::Settled(action, result));
                        });
                    }
                }
                None => break,
            },
            Some(done) = done_rx.recv() => match done {
                Completion::Fetched(result) => view.on_fetched(result),
                Completion::Settled(action, result) => {
                    if let Err(e) = &result {
                        tracing::debug!(%post_id, error = %e, "optimistic action failed");
                    }
                    view.settle(action, result);
                }
            },
            event = events.next(), if events_open => match event {
                Some(Ok(event)) => view.on_server_event(&event),
                Some(Err(e)) => {
                    tracing::warn!(%post_id, error = %e, "dropping bad post channel frame");
                }
                None => {
                    tracing::debug!(%post_id, "post channel closed");
                    events_open = false;
                }
            },
        }

        snapshots.send_replace(view.snapshot());
        for notice in view.take_notices() {
            let _ = notices.send(notice);
        }
    }

    view.unmount();
    tracing::debug!(%post_id, "viewer session stopped");
}

/// UI side of a running viewer session
pub struct ViewerHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<ViewSnapshot>,
    notices: mpsc::UnboundedReceiver<Notice>,
    task: JoinHandle<()>,
}

impl ViewerHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::SessionClosed)
    }

    pub async fn like(&self) -> Result<()> {
        self.send(Command::Like).await
    }

    pub async fn comment(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::Comment(text.into())).await
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until a published snapshot satisfies `pred`.
    pub async fn wait_for<F>(&mut self, pred: F) -> Result<ViewSnapshot>
    where
        F: FnMut(&ViewSnapshot) -> bool,
    {
        let snapshot = self
            .snapshots
            .wait_for(pred)
            .await
            .map_err(|_| ClientError::SessionClosed)?;
        Ok(snapshot.clone())
    }

    pub fn try_notice(&mut self) -> Option<Notice> {
        self.notices.try_recv().ok()
    }

    pub async fn next_notice(&mut self) -> Option<Notice> {
        self.notices.recv().await
    }

    /// Stop the session. Requests still in flight are left to finish but
    /// their results are dropped.
    pub async fn unmount(self) {
        let Self { commands, task, .. } = self;
        drop(commands);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "viewer session task failed");
        }
    }
}
