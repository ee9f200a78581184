//! Event payload parsing and command tag normalization.

use serde_json::Value;

use crate::error::{BiliLiveError, Result};
use crate::protocol::cmd;

/// A parsed server event: normalized tag plus the full JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub cmd: String,
    pub payload: Value,
}

/// Collapse versioned chat-message tags to their base tag.
///
/// Any tag starting with `DANMU_MSG` (`DANMU_MSG:4:0:2:2:2:0`,
/// `DANMU_MSG_V2`) becomes `DANMU_MSG`; every other tag passes through.
pub fn normalize_cmd(tag: &str) -> &str {
    if tag.starts_with(cmd::DANMU_MSG) {
        cmd::DANMU_MSG
    } else {
        tag
    }
}

/// Parse a JSON payload and extract its normalized `cmd` tag.
///
/// Fails with `InvalidPayload` when the bytes are not JSON or `cmd` is
/// absent or not a string.
pub fn parse_event(payload: &[u8]) -> Result<RawEvent> {
    let doc: Value = serde_json::from_slice(payload)
        .map_err(|e| BiliLiveError::InvalidPayload(format!("invalid event json: {e}")))?;

    let tag = doc
        .get("cmd")
        .ok_or_else(|| BiliLiveError::InvalidPayload("missing cmd".into()))?
        .as_str()
        .ok_or_else(|| BiliLiveError::InvalidPayload("cmd is not a string".into()))?;

    Ok(RawEvent {
        cmd: normalize_cmd(tag).to_string(),
        payload: doc,
    })
}
