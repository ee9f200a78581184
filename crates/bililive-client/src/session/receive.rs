//! Receive loop and per-frame processing.
//!
//! Decode errors are logged, counted and skipped. Only transport failures,
//! peer close, and panics escaping a handler end the loop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;

use bililive_core::error::{BiliLiveError, Result};
use bililive_core::protocol::batch::extract;
use bililive_core::protocol::cmd;
use bililive_core::protocol::event::parse_event;
use bililive_core::protocol::frame::{decode_frame, online_count, FrameKind};

use crate::dispatch::{Dispatcher, Event};
use crate::obs::ClientMetrics;
use crate::session::state::SessionShared;
use crate::transport::Transport;

/// Turns raw inbound messages into dispatched events.
pub(crate) struct FrameProcessor {
    pub(crate) dispatcher: Arc<Dispatcher>,
    pub(crate) shared: Arc<SessionShared>,
    pub(crate) metrics: Arc<ClientMetrics>,
    pub(crate) room_id: u64,
    pub(crate) owner_name: Arc<str>,
}

impl FrameProcessor {
    /// Process one message; a panic inside decoding or a handler becomes `Internal`.
    pub(crate) fn process_guarded(&self, raw: Bytes) -> Result<()> {
        catch_unwind(AssertUnwindSafe(|| self.process(raw))).map_err(|panic| {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".into());
            BiliLiveError::Internal(format!("panic while processing frame: {reason}"))
        })
    }

    pub(crate) fn process(&self, raw: Bytes) {
        let frame = match decode_frame(raw) {
            Ok(f) => f,
            Err(e) => return self.skip(&e),
        };

        let kind = frame.kind();
        self.metrics.frames_received.inc(&[("kind", kind.as_str())]);

        match kind {
            FrameKind::CountUpdate => match online_count(&frame) {
                Ok(online) => self.online_observed(online),
                Err(e) => self.skip(&e),
            },
            FrameKind::EventBatch | FrameKind::EventSingle => {
                let payloads = match extract(kind, &frame.body) {
                    Ok(p) => p,
                    Err(e) => return self.skip(&e),
                };
                for payload in payloads {
                    match parse_event(&payload) {
                        Ok(raw) => {
                            let event = Event::from_raw(raw, self.room_id, self.owner_name.clone());
                            self.dispatcher.dispatch_with_wildcard(&event);
                            self.metrics.events_dispatched.inc(&[("cmd", event.cmd.as_str())]);
                        }
                        Err(e) => self.skip(&e),
                    }
                }
            }
            FrameKind::Ignored => {
                tracing::trace!(op = frame.header.operation, "frame ignored");
            }
        }
    }

    /// Dispatch `ONLINE_CHANGE` through its typed chain only, and only on change.
    fn online_observed(&self, online: u32) {
        if !self.shared.observe_online(online) {
            return;
        }
        let room = self.room_id.to_string();
        self.metrics.online.set(&[("room", room.as_str())], i64::from(online));

        let event = Event::online_change(online, self.room_id, self.owner_name.clone());
        self.dispatcher.dispatch(cmd::ONLINE_CHANGE, &event);
        self.metrics.events_dispatched.inc(&[("cmd", cmd::ONLINE_CHANGE)]);
    }

    fn skip(&self, e: &BiliLiveError) {
        tracing::warn!(error = %e, kind = e.kind().as_str(), "inbound frame skipped");
        self.metrics.decode_errors.inc(&[("kind", e.kind().as_str())]);
    }
}

/// Read until the peer closes, the transport fails, or the session is stopped.
///
/// Explicit disconnect returns `Ok(())`; peer close returns `ConnectionClosed`.
pub(crate) async fn run(transport: &dyn Transport, processor: &FrameProcessor) -> Result<()> {
    let shared = &processor.shared;

    loop {
        let next = tokio::select! {
            biased;
            _ = shared.cancel_token().cancelled() => {
                tracing::info!("disconnect requested");
                return Ok(());
            }
            next = transport.recv() => next,
        };

        match next {
            Ok(Some(raw)) => {
                if raw.is_empty() {
                    continue;
                }
                processor.process_guarded(raw)?;
            }
            Ok(None) if shared.is_stopping() => return Ok(()),
            Ok(None) => return Err(BiliLiveError::ConnectionClosed),
            Err(e) => return Err(e),
        }

        if !shared.is_connected() {
            return Ok(());
        }
    }
}
