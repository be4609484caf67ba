use crate::error::{ClientError, Result};
use event_schema::{ClientEvent, ServerEvent};
use futures::stream::{self, Stream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

/// WebSocket connection to the post event endpoint
pub struct PostSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl PostSocket {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url).await?;
        tracing::debug!(%url, "post socket connected");
        Ok(Self { stream })
    }

    /// Subscribe to a post's channel
    pub async fn join_post(&mut self, post_id: Uuid) -> Result<()> {
        let payload = serde_json::to_string(&ClientEvent::JoinPost { post_id })?;
        self.stream.send(Message::text(payload)).await?;
        Ok(())
    }

    /// Next server event. `None` once the connection is closed.
    ///
    /// Control frames are skipped. Cancel-safe: a frame is consumed only when
    /// it is returned.
    pub async fn next_event(&mut self) -> Option<Result<ServerEvent>> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(text.as_str()).map_err(ClientError::from));
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
        None
    }

    /// Turn the socket into a stream of server events
    pub fn into_events(self) -> impl Stream<Item = Result<ServerEvent>> + Send + Unpin {
        Box::pin(stream::unfold(self, |mut socket| async move {
            socket.next_event().await.map(|event| (event, socket))
        }))
    }
}
