//! WebSocket transport for the push stream.

use async_trait::async_trait;
use futures::StreamExt;
use tokio_tungstenite::tungstenite::Message;

use super::{StreamConnection, StreamTransport};
use crate::errors::SyncError;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Connects to the backend notify endpoint and yields its JSON text frames.
///
/// Ping/pong and binary frames are handled below this layer; only text
/// frames surface to the adapter.
pub struct WsTransport {
    url: String,
}

impl WsTransport {
    pub fn new(url: impl Into<String>) -> Self {
        WsTransport { url: url.into() }
    }
}

#[async_trait]
impl StreamTransport for WsTransport {
    async fn connect(&self) -> Result<Box<dyn StreamConnection>, SyncError> {
        let (socket, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| SyncError::Connect(e.to_string()))?;
        Ok(Box::new(WsConnection { socket }))
    }
}

struct WsConnection {
    socket: WsStream,
}

#[async_trait]
impl StreamConnection for WsConnection {
    async fn next_frame(&mut self) -> Option<Result<String, SyncError>> {
        loop {
            match self.socket.next().await {
                Some(Ok(Message::Text(text))) => return Some(Ok(text)),
                Some(Ok(Message::Close(_))) | None => return None,
                Some(Ok(_)) => continue,
                Some(Err(error)) => return Some(Err(SyncError::Stream(error.to_string()))),
            }
        }
    }
}
