//! Chat session lifecycle.
//!
//! `Session::connect` resolves the room, opens the channel, sends the join
//! frame, then runs the heartbeat as its own task while the receive loop runs
//! on the caller's task until the session ends.
//!
//! There is no reconnection: the first fatal error is returned to the caller.

mod heartbeat;
mod receive;
mod state;

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::Instrument;

use bililive_core::error::{BiliLiveError, Result};
use bililive_core::protocol::frame::{encode_frame, op};

use crate::config::ClientConfig;
use crate::dispatch::{Dispatcher, Event, Flow, Handler};
use crate::identity::{HttpIdentityResolver, IdentityResolver};
use crate::obs::ClientMetrics;
use crate::transport::{Connector, Transport, WsConnector};

use receive::FrameProcessor;
use state::SessionShared;

pub use state::{SessionHandle, SessionState};

/// Synthetic user ids are drawn from `[MIN_UID, MAX_UID)`.
pub const MIN_UID: u64 = 1_000_000_000;
pub const MAX_UID: u64 = 2_000_000_000;

#[derive(Debug, Serialize)]
struct JoinRequest {
    roomid: u64,
    uid: u64,
}

fn synthetic_uid() -> u64 {
    rand::rng().random_range(MIN_UID..MAX_UID)
}

/// One connection to one room. `connect` may be called once.
pub struct Session {
    cfg: ClientConfig,
    dispatcher: Arc<Dispatcher>,
    resolver: Arc<dyn IdentityResolver>,
    connector: Arc<dyn Connector>,
    metrics: Arc<ClientMetrics>,
    shared: Arc<SessionShared>,
}

impl Session {
    /// Session with the HTTP identity resolver and the WebSocket connector.
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        cfg.validate()?;
        let resolver = Arc::new(HttpIdentityResolver::new(&cfg.api)?);
        Ok(Self::with_parts(cfg, resolver, Arc::new(WsConnector)))
    }

    pub fn with_parts(
        cfg: ClientConfig,
        resolver: Arc<dyn IdentityResolver>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            cfg,
            dispatcher: Arc::new(Dispatcher::new()),
            resolver,
            connector,
            metrics: Arc::new(ClientMetrics::default()),
            shared: Arc::new(SessionShared::new()),
        }
    }

    /// Share a dispatcher populated elsewhere.
    pub fn with_dispatcher(mut self, dispatcher: Arc<Dispatcher>) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn metrics(&self) -> Arc<ClientMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Register before `connect`; empty `cmd` receives every server event.
    pub fn register(&self, cmd: &str, handler: Arc<dyn Handler>) {
        self.dispatcher.register(cmd, handler);
    }

    pub fn register_fn<F>(&self, cmd: &str, f: F)
    where
        F: Fn(&Event) -> Flow + Send + Sync + 'static,
    {
        self.dispatcher.register_fn(cmd, f);
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(Arc::clone(&self.shared))
    }

    pub fn disconnect(&self) {
        self.shared.stop();
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Join `display_room_id` and block until the session ends.
    ///
    /// Returns `Ok(())` after an explicit disconnect, otherwise the error
    /// that ended the session. Dropping the returned future stops the
    /// session as well.
    pub async fn connect(&self, display_room_id: u64) -> Result<()> {
        if !self.shared.begin() {
            return Err(BiliLiveError::AlreadyStarted);
        }
        let _stopped = StopOnDrop(&self.shared);

        let span = tracing::info_span!("session", display_room_id);
        let result = self.run(display_room_id).instrument(span).await;

        match &result {
            Ok(()) => tracing::info!(display_room_id, "session stopped"),
            Err(e) => tracing::warn!(display_room_id, error = %e, "session ended"),
        }
        result
    }

    async fn run(&self, display_room_id: u64) -> Result<()> {
        tracing::info!("resolving room");
        let identity = self.resolver.resolve_room(display_room_id).await?;
        let owner_name: Arc<str> = self.resolver.resolve_owner_name(identity.owner_id).await?.into();
        self.shared.set_identity(identity.room_id, Arc::clone(&owner_name));

        let url = self.cfg.chat.ws_url();
        tracing::info!(room_id = identity.room_id, owner = %owner_name, %url, "entering room");
        let transport = self.connector.connect(&url).await?;
        let mut teardown = Teardown::new(Arc::clone(&self.shared), Arc::clone(&transport));

        if let Err(e) = self.join(transport.as_ref(), identity.room_id).await {
            teardown.finish().await;
            return Err(e);
        }
        self.shared.set_state(SessionState::Joined);

        self.shared.mark_connected();
        if self.shared.is_stopping() {
            teardown.finish().await;
            return Ok(());
        }
        self.shared.set_state(SessionState::Running);
        tracing::info!(room_id = identity.room_id, "joined, receiving");

        teardown.heartbeat = Some(tokio::spawn(
            heartbeat::run(
                Arc::clone(&transport),
                Arc::clone(&self.shared),
                Arc::clone(&self.metrics),
                self.cfg.chat.heartbeat_interval(),
                self.cfg.chat.protocol_version,
            )
            .in_current_span(),
        ));

        let processor = FrameProcessor {
            dispatcher: Arc::clone(&self.dispatcher),
            shared: Arc::clone(&self.shared),
            metrics: Arc::clone(&self.metrics),
            room_id: identity.room_id,
            owner_name,
        };
        let result = receive::run(transport.as_ref(), &processor).await;

        teardown.finish().await;
        result
    }

    async fn join(&self, transport: &dyn Transport, room_id: u64) -> Result<()> {
        let uid = synthetic_uid();
        self.shared.set_uid(uid);

        let body = serde_json::to_vec(&JoinRequest { roomid: room_id, uid })
            .map_err(|e| BiliLiveError::Internal(format!("join body encode failed: {e}")))?;
        let frame = encode_frame(self.cfg.chat.protocol_version, op::JOIN, 1, &body);
        transport.send(frame).await?;
        tracing::debug!(room_id, uid, "join frame sent");
        Ok(())
    }
}

/// Marks the session stopped when `connect` returns or its future is dropped.
struct StopOnDrop<'a>(&'a SessionShared);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.stop();
        self.0.set_state(SessionState::Stopped);
    }
}

/// Owns the dialed transport and the heartbeat task.
///
/// `finish` closes the transport in place. If the session future is dropped
/// first, `Drop` cancels the loops, aborts the heartbeat and closes the
/// transport on a detached task.
struct Teardown {
    shared: Arc<SessionShared>,
    transport: Arc<dyn Transport>,
    heartbeat: Option<JoinHandle<()>>,
    done: bool,
}

impl Teardown {
    fn new(shared: Arc<SessionShared>, transport: Arc<dyn Transport>) -> Self {
        Self {
            shared,
            transport,
            heartbeat: None,
            done: false,
        }
    }

    fn stop_loops(&mut self) {
        self.shared.stop();
        if let Some(heartbeat) = self.heartbeat.take() {
            heartbeat.abort();
        }
    }

    async fn finish(&mut self) {
        self.stop_loops();
        close_quietly(self.transport.as_ref()).await;
        self.done = true;
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        self.stop_loops();
        tracing::debug!("session dropped before cleanup, closing transport");
        if let Ok(rt) = tokio::runtime::Handle::try_current() {
            let transport = Arc::clone(&self.transport);
            rt.spawn(async move { close_quietly(transport.as_ref()).await });
        }
    }
}

async fn close_quietly(transport: &dyn Transport) {
    if let Err(e) = transport.close().await {
        tracing::debug!(error = %e, "transport close failed");
    }
}
