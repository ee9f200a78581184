//! Heartbeat loop (runs as its own task next to the receive loop).
//!
//! A send failure stops only this loop; the receive loop notices the broken
//! channel on its own and owns the shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use bililive_core::protocol::frame::{encode_frame, op};

use crate::obs::ClientMetrics;
use crate::session::state::SessionShared;
use crate::transport::Transport;

pub(crate) async fn run(
    transport: Arc<dyn Transport>,
    shared: Arc<SessionShared>,
    metrics: Arc<ClientMetrics>,
    every: Duration,
    protocol_version: u16,
) {
    // First tick fires immediately.
    let mut tick = tokio::time::interval(every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shared.cancel_token().cancelled() => break,
            _ = tick.tick() => {}
        }

        if !shared.is_connected() {
            break;
        }

        let frame = encode_frame(protocol_version, op::HEARTBEAT, 1, &[]);
        if let Err(e) = transport.send(frame).await {
            tracing::warn!(error = %e, "heartbeat send failed");
            return;
        }
        metrics.heartbeats_sent.inc(&[]);
        tracing::trace!("heartbeat sent");
    }

    tracing::debug!("heartbeat loop stopped");
}
