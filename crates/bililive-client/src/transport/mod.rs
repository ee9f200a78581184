//! Transport layer (WebSocket).
//!
//! The session consumes an opaque bidirectional message channel through the
//! `Transport` trait; `ws` provides the tokio-tungstenite implementation and
//! `codec` maps WebSocket messages onto frame bytes.

pub mod codec;
pub mod ws;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use bililive_core::error::Result;

pub use ws::{WsConnector, WsTransport};

/// Bidirectional message channel carrying binary frames.
///
/// `send` may be called from several tasks; implementations serialize writes.
/// `recv` is only ever called by the receive loop.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, frame: Bytes) -> Result<()>;
    /// Next inbound message. `Ok(None)` means the peer closed the channel.
    async fn recv(&self) -> Result<Option<Bytes>>;
    async fn close(&self) -> Result<()>;
}

/// Opens transports (the secure socket handshake lives behind this).
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>>;
}
