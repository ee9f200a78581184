//! Session state shared between the lifecycle owner, the heartbeat task and
//! external `SessionHandle`s.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// Lifecycle: `Idle -> Connecting -> Joined -> Running -> Stopped`.
///
/// Failures while connecting or joining go straight to `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Connecting = 1,
    Joined = 2,
    Running = 3,
    Stopped = 4,
}

impl SessionState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => SessionState::Idle,
            1 => SessionState::Connecting,
            2 => SessionState::Joined,
            3 => SessionState::Running,
            _ => SessionState::Stopped,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Joined => "joined",
            SessionState::Running => "running",
            SessionState::Stopped => "stopped",
        }
    }
}

#[derive(Debug)]
pub(crate) struct SessionShared {
    state: AtomicU8,
    /// Liveness flag observed by both loops once per iteration.
    connected: AtomicBool,
    /// Fired on disconnect; aborts an in-flight read and the heartbeat wait.
    cancel: CancellationToken,
    room_id: AtomicU64,
    uid: AtomicU64,
    /// Written only by the receive loop.
    last_online: AtomicU32,
    owner_name: OnceLock<Arc<str>>,
}

impl SessionShared {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Idle as u8),
            connected: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            room_id: AtomicU64::new(0),
            uid: AtomicU64::new(0),
            last_online: AtomicU32::new(0),
            owner_name: OnceLock::new(),
        }
    }

    /// `Idle -> Connecting`. False when the session was started before.
    pub(crate) fn begin(&self) -> bool {
        self.state
            .compare_exchange(
                SessionState::Idle as u8,
                SessionState::Connecting as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn set_state(&self, s: SessionState) {
        self.state.store(s as u8, Ordering::Release);
    }

    pub(crate) fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_identity(&self, room_id: u64, owner_name: Arc<str>) {
        self.room_id.store(room_id, Ordering::Release);
        let _ = self.owner_name.set(owner_name);
    }

    pub(crate) fn set_uid(&self, uid: u64) {
        self.uid.store(uid, Ordering::Release);
    }

    pub(crate) fn mark_connected(&self) {
        self.connected.store(true, Ordering::Release);
    }

    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Clear the liveness flag and cancel both loops.
    pub(crate) fn stop(&self) {
        self.connected.store(false, Ordering::Release);
        self.cancel.cancel();
    }

    pub(crate) fn is_stopping(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Record a newly observed online count. Returns true when it changed.
    pub(crate) fn observe_online(&self, online: u32) -> bool {
        self.last_online.swap(online, Ordering::AcqRel) != online
    }
}

/// Cloneable handle to observe or stop a session from another task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<SessionShared>,
}

impl SessionHandle {
    pub(crate) fn new(shared: Arc<SessionShared>) -> Self {
        Self { shared }
    }

    /// Stop the session. `Session::connect` then returns `Ok(())`.
    pub fn disconnect(&self) {
        self.shared.stop();
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    /// Real room id (0 until resolved).
    pub fn room_id(&self) -> u64 {
        self.shared.room_id.load(Ordering::Acquire)
    }

    pub fn owner_name(&self) -> Option<&str> {
        self.shared.owner_name.get().map(|n| n.as_ref())
    }

    /// Synthetic user id sent in the join frame (0 until joined).
    pub fn uid(&self) -> u64 {
        self.shared.uid.load(Ordering::Acquire)
    }

    pub fn last_online_count(&self) -> u32 {
        self.shared.last_online.load(Ordering::Acquire)
    }
}
