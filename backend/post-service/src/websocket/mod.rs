use crate::metrics;
use event_schema::{EventScope, ServerEvent};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod session;

pub use session::ws_handler;

/// Identity of one live WebSocket connection
///
/// Assigned by the hub on `connect` and used for every later subscribe and
/// cleanup call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Default)]
struct HubState {
    // connection -> outbound queue
    connections: HashMap<ConnectionId, UnboundedSender<String>>,
    // post_id -> subscribed connections
    channels: HashMap<Uuid, HashSet<ConnectionId>>,
    // connection -> post channels it joined
    memberships: HashMap<ConnectionId, HashSet<Uuid>>,
}

impl HubState {
    /// Drop a connection and every channel membership it holds.
    /// Channels left without subscribers are removed.
    fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let existed = self.connections.remove(&id).is_some();
        if let Some(posts) = self.memberships.remove(&id) {
            for post_id in posts {
                if let Some(members) = self.channels.get_mut(&post_id) {
                    members.remove(&id);
                    if members.is_empty() {
                        self.channels.remove(&post_id);
                    }
                }
            }
        }
        existed
    }

    fn update_gauges(&self) {
        metrics::WS_CONNECTIONS.set(self.connections.len() as i64);
        metrics::WS_CHANNELS.set(self.channels.len() as i64);
    }
}

/// Broadcast hub for post events
///
/// Groups live connections into per-post channels. Channels exist only while
/// they have subscribers; nothing here is persisted. Delivery is best effort:
/// a connection whose receiver is gone is removed on the next publish that
/// reaches it.
#[derive(Default, Clone)]
pub struct PostHub {
    inner: Arc<RwLock<HubState>>,
}

impl PostHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live connection.
    ///
    /// Returns the connection id and the receiver carrying every frame
    /// published to this connection.
    pub async fn connect(&self) -> (ConnectionId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let id = ConnectionId::new();

        let mut guard = self.inner.write().await;
        guard.connections.insert(id, tx);
        guard.update_gauges();

        tracing::debug!(
            connection_id = %id,
            connections = guard.connections.len(),
            "connection registered"
        );

        (id, rx)
    }

    /// Add a connection to a post's channel.
    ///
    /// Idempotent. Returns true only when the membership is new; unknown
    /// connections are ignored.
    pub async fn subscribe(&self, id: ConnectionId, post_id: Uuid) -> bool {
        let mut guard = self.inner.write().await;
        if !guard.connections.contains_key(&id) {
            tracing::debug!(connection_id = %id, %post_id, "subscribe from unknown connection ignored");
            return false;
        }

        let added = guard.channels.entry(post_id).or_default().insert(id);
        guard.memberships.entry(id).or_default().insert(post_id);
        guard.update_gauges();

        if added {
            tracing::debug!(
                connection_id = %id,
                %post_id,
                subscribers = guard.channels.get(&post_id).map(|s| s.len()).unwrap_or(0),
                "joined post channel"
            );
        }
        added
    }

    /// Remove a connection from every channel and from the hub.
    ///
    /// Called when a WebSocket session stops.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut guard = self.inner.write().await;
        if guard.remove_connection(id) {
            guard.update_gauges();
            tracing::debug!(
                connection_id = %id,
                connections = guard.connections.len(),
                channels = guard.channels.len(),
                "connection removed"
            );
        }
    }

    /// Deliver an event to its audience.
    ///
    /// Channel-scoped events reach connections subscribed at this instant;
    /// global events reach every live connection. Returns the number of
    /// connections the frame was queued for.
    pub async fn publish(&self, event: &ServerEvent) -> usize {
        let payload = match event.to_payload() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, event = event.event_type(), "failed to encode event");
                return 0;
            }
        };

        let delivered = self.deliver(event.scope(), payload).await;
        metrics::record_broadcast(event.event_type());
        tracing::debug!(
            event = event.event_type(),
            post_id = %event.post_id(),
            delivered,
            "event published"
        );
        delivered
    }

    async fn deliver(&self, scope: EventScope, payload: String) -> usize {
        let mut guard = self.inner.write().await;

        let targets: Vec<ConnectionId> = match scope {
            EventScope::Global => guard.connections.keys().copied().collect(),
            EventScope::Channel(post_id) => guard
                .channels
                .get(&post_id)
                .map(|members| members.iter().copied().collect())
                .unwrap_or_default(),
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for id in targets {
            match guard.connections.get(&id) {
                Some(tx) if tx.send(payload.clone()).is_ok() => delivered += 1,
                _ => dead.push(id),
            }
        }

        if !dead.is_empty() {
            for id in &dead {
                guard.remove_connection(*id);
            }
            guard.update_gauges();
            tracing::debug!(
                dead = dead.len(),
                active = guard.connections.len(),
                "dead senders cleaned up"
            );
        }

        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    pub async fn channel_count(&self) -> usize {
        self.inner.read().await.channels.len()
    }

    pub async fn subscriber_count(&self, post_id: Uuid) -> usize {
        self.inner
            .read()
            .await
            .channels
            .get(&post_id)
            .map(|members| members.len())
            .unwrap_or(0)
    }
}
