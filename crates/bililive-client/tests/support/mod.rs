//! Scripted transport, connector and resolver for session tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use tokio::sync::mpsc;

use bililive_client::identity::{IdentityResolver, RoomIdentity};
use bililive_client::transport::{Connector, Transport};
use bililive_core::error::{BiliLiveError, Result};
use bililive_core::protocol::frame::{encode_frame, op, VERSION_PLAIN, VERSION_ZLIB};

pub const ROOM_ID: u64 = 22603245;
pub const OWNER_ID: u64 = 1234;
pub const OWNER_NAME: &str = "host";

/// Inbound script item: a message or a read failure.
pub type Script = mpsc::UnboundedSender<std::result::Result<Bytes, String>>;

pub struct ScriptedTransport {
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<std::result::Result<Bytes, String>>>,
    sent: Mutex<Vec<Bytes>>,
    closed: AtomicBool,
    /// Sends beyond this many fail with a transport error.
    send_limit: Option<usize>,
    send_attempts: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> (Arc<Self>, Script) {
        Self::build(None)
    }

    /// Transport whose first `limit` sends succeed and every later one fails.
    pub fn with_send_limit(limit: usize) -> (Arc<Self>, Script) {
        Self::build(Some(limit))
    }

    fn build(send_limit: Option<usize>) -> (Arc<Self>, Script) {
        let (tx, rx) = mpsc::unbounded_channel();
        let t = Arc::new(Self {
            inbound: tokio::sync::Mutex::new(rx),
            sent: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
            send_limit,
            send_attempts: AtomicUsize::new(0),
        });
        (t, tx)
    }

    /// Every `send` call, failed ones included.
    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }

    pub fn count_sent(&self, operation: u32) -> usize {
        self.sent_ops().into_iter().filter(|op| *op == operation).count()
    }

    pub fn sent(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_ops(&self) -> Vec<u32> {
        self.sent()
            .into_iter()
            .map(|b| bililive_core::protocol::frame::decode_frame(b).unwrap().header.operation)
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Poll until `send` was called at least `n` times.
    pub async fn wait_for_attempts(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.send_attempts() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("send never attempted");
    }

    /// Poll until a frame with `operation` was sent.
    pub async fn wait_for_sent(&self, operation: u32) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !self.sent_ops().contains(&operation) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("frame never sent");
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, frame: Bytes) -> Result<()> {
        let attempt = self.send_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.is_closed() {
            return Err(BiliLiveError::Transport("closed".into()));
        }
        if self.send_limit.is_some_and(|limit| attempt > limit) {
            return Err(BiliLiveError::Transport("broken pipe".into()));
        }
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn recv(&self) -> Result<Option<Bytes>> {
        match self.inbound.lock().await.recv().await {
            Some(Ok(b)) => Ok(Some(b)),
            Some(Err(e)) => Err(BiliLiveError::Transport(e)),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

pub struct ScriptedConnector {
    transport: Option<Arc<ScriptedTransport>>,
    urls: Mutex<Vec<String>>,
}

impl ScriptedConnector {
    pub fn new(transport: Arc<ScriptedTransport>) -> Arc<Self> {
        Arc::new(Self {
            transport: Some(transport),
            urls: Mutex::new(Vec::new()),
        })
    }

    /// Connector whose dial always fails.
    pub fn refusing() -> Arc<Self> {
        Arc::new(Self {
            transport: None,
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, url: &str) -> Result<Arc<dyn Transport>> {
        self.urls.lock().unwrap().push(url.to_string());
        match &self.transport {
            Some(t) => Ok(t.clone()),
            None => Err(BiliLiveError::Transport("dial refused".into())),
        }
    }
}

pub struct StaticResolver {
    pub fail: bool,
}

#[async_trait]
impl IdentityResolver for StaticResolver {
    async fn resolve_room(&self, _display_id: u64) -> Result<RoomIdentity> {
        if self.fail {
            return Err(BiliLiveError::IdentityResolution("room not found".into()));
        }
        Ok(RoomIdentity {
            room_id: ROOM_ID,
            owner_id: OWNER_ID,
        })
    }

    async fn resolve_owner_name(&self, owner_id: u64) -> Result<String> {
        assert_eq!(owner_id, OWNER_ID);
        Ok(OWNER_NAME.to_string())
    }
}

pub fn resolver() -> Arc<StaticResolver> {
    Arc::new(StaticResolver { fail: false })
}

/// Heartbeat reply carrying an online count.
pub fn count_frame(online: u32) -> Bytes {
    encode_frame(1, op::HEARTBEAT_REPLY, 1, &online.to_be_bytes())
}

/// Plain single-event frame.
pub fn event_frame(json: &str) -> Bytes {
    encode_frame(VERSION_PLAIN, op::EVENT, 0, json.as_bytes())
}

/// Zlib batch frame wrapping each JSON document in its own sub-frame.
pub fn batch_frame(docs: &[&str]) -> Bytes {
    let mut raw = Vec::new();
    for d in docs {
        raw.extend_from_slice(&encode_frame(VERSION_PLAIN, op::EVENT, 0, d.as_bytes()));
    }
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&raw).unwrap();
    encode_frame(VERSION_ZLIB, op::EVENT, 0, &enc.finish().unwrap())
}
