//! WebSocket transport over tokio-tungstenite (rustls).
//!
//! The socket is split once: the sink sits behind an async mutex so join and
//! heartbeat writes never interleave, the stream behind another that only
//! the receive loop takes. tungstenite answers pings on its own.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use bililive_core::error::{BiliLiveError, Result};

use crate::transport::codec::{self, Inbound};
use crate::transport::{Connector, Transport};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// `Connector` dialing `wss://` endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>> {
        let (socket, _resp) = connect_async(url)
            .await
            .map_err(|e| BiliLiveError::Transport(format!("dial {url} failed: {e}")))?;
        tracing::debug!(%url, "websocket connected");
        Ok(Arc::new(WsTransport::new(socket)))
    }
}

pub struct WsTransport {
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
}

impl WsTransport {
    pub fn new(socket: WsStream) -> Self {
        let (sink, stream) = socket.split();
        Self {
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
        }
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&self, frame: Bytes) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.send(codec::encode(frame))
            .await
            .map_err(|e| BiliLiveError::Transport(format!("send failed: {e}")))
    }

    async fn recv(&self) -> Result<Option<Bytes>> {
        let mut stream = self.stream.lock().await;
        loop {
            let Some(incoming) = stream.next().await else {
                return Ok(None);
            };
            let msg = incoming.map_err(|e| BiliLiveError::Transport(format!("read failed: {e}")))?;
            match codec::decode(msg) {
                Inbound::Frame(b) => return Ok(Some(b)),
                Inbound::Ping(_) | Inbound::Pong(_) => continue,
                Inbound::Close => return Ok(None),
            }
        }
    }

    async fn close(&self) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.close()
            .await
            .map_err(|e| BiliLiveError::Transport(format!("close failed: {e}")))
    }
}
