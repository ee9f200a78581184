//! Shared error type across bililive crates.

use thiserror::Error;

/// Stable error kinds (used in logs, counters and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Room or owner lookup failed.
    IdentityResolution,
    /// Channel read/write failed.
    Transport,
    /// Peer closed the channel.
    ConnectionClosed,
    /// Frame header or layout is invalid.
    MalformedFrame,
    /// Event payload is not usable JSON.
    InvalidPayload,
    /// Compressed batch could not be inflated.
    Decompression,
    /// Configuration rejected.
    Config,
    /// Session was already started once.
    AlreadyStarted,
    /// Unexpected internal failure.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::IdentityResolution => "IDENTITY_RESOLUTION",
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::ConnectionClosed => "CONNECTION_CLOSED",
            ErrorKind::MalformedFrame => "MALFORMED_FRAME",
            ErrorKind::InvalidPayload => "INVALID_PAYLOAD",
            ErrorKind::Decompression => "DECOMPRESSION",
            ErrorKind::Config => "CONFIG",
            ErrorKind::AlreadyStarted => "ALREADY_STARTED",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BiliLiveError>;

/// Unified error type used by core and client.
#[derive(Debug, Error)]
pub enum BiliLiveError {
    #[error("identity resolution failed: {0}")]
    IdentityResolution(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("connection closed by peer")]
    ConnectionClosed,
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("decompression failed: {0}")]
    Decompression(String),
    #[error("config: {0}")]
    Config(String),
    #[error("session already started")]
    AlreadyStarted,
    #[error("internal: {0}")]
    Internal(String),
}

impl BiliLiveError {
    /// Map the error to its stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BiliLiveError::IdentityResolution(_) => ErrorKind::IdentityResolution,
            BiliLiveError::Transport(_) => ErrorKind::Transport,
            BiliLiveError::ConnectionClosed => ErrorKind::ConnectionClosed,
            BiliLiveError::MalformedFrame(_) => ErrorKind::MalformedFrame,
            BiliLiveError::InvalidPayload(_) => ErrorKind::InvalidPayload,
            BiliLiveError::Decompression(_) => ErrorKind::Decompression,
            BiliLiveError::Config(_) => ErrorKind::Config,
            BiliLiveError::AlreadyStarted => ErrorKind::AlreadyStarted,
            BiliLiveError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error ends the session.
    ///
    /// Per-message decode errors are not fatal: the offending frame is skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::MalformedFrame | ErrorKind::InvalidPayload | ErrorKind::Decompression
        )
    }
}
