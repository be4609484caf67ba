use super::{ConnectionId, PostHub};
use crate::config::WebSocketConfig;
use crate::state::AppState;
use actix::{Actor, ActorContext, AsyncContext, Handler, Message as ActixMessage, StreamHandler};
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use event_schema::ClientEvent;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::{wrappers::UnboundedReceiverStream, StreamExt};

/// Frame queued by the hub for this connection
#[derive(ActixMessage)]
#[rtype(result = "()")]
struct Outbound(String);

/// One WebSocket connection
///
/// Owns its hub registration: the connection is registered before the actor
/// starts and removed when it stops.
struct WsSession {
    id: ConnectionId,
    hub: PostHub,
    hb: Instant,
    timing: WebSocketConfig,
    rx: Option<UnboundedReceiver<String>>,
}

impl WsSession {
    fn new(
        id: ConnectionId,
        hub: PostHub,
        rx: UnboundedReceiver<String>,
        timing: WebSocketConfig,
    ) -> Self {
        Self {
            id,
            hub,
            hb: Instant::now(),
            timing,
            rx: Some(rx),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let client_timeout = self.timing.client_timeout;
        ctx.run_interval(self.timing.heartbeat_interval, move |act, ctx| {
            if Instant::now().duration_since(act.hb) > client_timeout {
                tracing::warn!(connection_id = %act.id, "WebSocket heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn handle_client_event(&self, event: ClientEvent) {
        match event {
            ClientEvent::JoinPost { post_id } => {
                let hub = self.hub.clone();
                let id = self.id;
                actix::spawn(async move {
                    hub.subscribe(id, post_id).await;
                });
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::debug!(connection_id = %self.id, "WebSocket session started");

        self.hb(ctx);

        if let Some(rx) = self.rx.take() {
            ctx.add_message_stream(UnboundedReceiverStream::new(rx).map(Outbound));
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        tracing::debug!(connection_id = %self.id, "WebSocket session stopped");

        let hub = self.hub.clone();
        let id = self.id;
        actix::spawn(async move {
            hub.disconnect(id).await;
        });
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => self.handle_client_event(event),
                    Err(e) => {
                        tracing::warn!(connection_id = %self.id, error = %e, "Failed to parse WS message");
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                tracing::debug!(connection_id = %self.id, "Binary WebSocket messages not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::debug!(connection_id = %self.id, ?reason, "WebSocket close received");
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                tracing::warn!(connection_id = %self.id, error = %e, "WebSocket protocol error");
                ctx.stop();
            }
            _ => {}
        }
    }
}

/// Upgrade to a post-event WebSocket.
///
/// Connections are anonymous: every client receives global events and may
/// join any post's channel.
#[get("/ws")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let (id, rx) = state.hub.connect().await;
    let session = WsSession::new(id, state.hub.clone(), rx, state.config.websocket.clone());

    match ws::start(session, &req, stream) {
        Ok(resp) => Ok(resp),
        Err(e) => {
            // Handshake failed; the actor never started, so unregister here
            state.hub.disconnect(id).await;
            Err(e)
        }
    }
}
