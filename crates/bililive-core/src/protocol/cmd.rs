//! Well-known command tags carried in the `cmd` field of server events.

/// Wildcard: handlers registered under it receive every server event.
pub const ALL: &str = "";
/// Stream went live.
pub const LIVE: &str = "LIVE";
/// Stream is preparing (went offline).
pub const PREPARING: &str = "PREPARING";
/// Chat message. The server may append a version suffix (`DANMU_MSG:4:0:2:2:2:0`).
pub const DANMU_MSG: &str = "DANMU_MSG";
/// Guard member entered the room.
pub const WELCOME_GUARD: &str = "WELCOME_GUARD";
/// Viewer entered the room.
pub const WELCOME: &str = "WELCOME";
/// Gift sent.
pub const SEND_GIFT: &str = "SEND_GIFT";
/// System notice.
pub const NOTICE_MSG: &str = "NOTICE_MSG";
/// Synthetic: online count changed. Never sent by the server.
pub const ONLINE_CHANGE: &str = "ONLINE_CHANGE";
