//! Event shape handed to handlers, with typed accessors over the raw JSON.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use bililive_core::error::{BiliLiveError, Result};
use bililive_core::protocol::cmd;
use bililive_core::protocol::event::RawEvent;

/// A decoded server event plus the room context it arrived in.
#[derive(Debug, Clone)]
pub struct Event {
    /// Normalized command tag.
    pub cmd: String,
    /// Full JSON document as sent by the server.
    pub payload: Value,
    /// Real (resolved) room id.
    pub room_id: u64,
    /// Display name of the room owner.
    pub owner_name: Arc<str>,
}

/// Chat message view of a `DANMU_MSG` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Danmaku {
    pub uid: u64,
    pub uname: String,
    pub text: String,
}

/// Gift view of a `SEND_GIFT` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gift {
    pub uname: String,
    pub gift_name: String,
    pub num: u64,
}

impl Event {
    pub fn from_raw(raw: RawEvent, room_id: u64, owner_name: Arc<str>) -> Self {
        Self {
            cmd: raw.cmd,
            payload: raw.payload,
            room_id,
            owner_name,
        }
    }

    /// Synthetic `ONLINE_CHANGE` event.
    pub fn online_change(online: u32, room_id: u64, owner_name: Arc<str>) -> Self {
        Self {
            cmd: cmd::ONLINE_CHANGE.to_string(),
            payload: json!({ "cmd": cmd::ONLINE_CHANGE, "online": online }),
            room_id,
            owner_name,
        }
    }

    /// Read the value at a JSON pointer (`/info/1`) as `T`.
    ///
    /// Fails with `InvalidPayload` when the pointer is absent or the value has
    /// a different shape.
    pub fn field<T: DeserializeOwned>(&self, pointer: &str) -> Result<T> {
        let v = self.payload.pointer(pointer).ok_or_else(|| {
            BiliLiveError::InvalidPayload(format!("{}: missing {pointer}", self.cmd))
        })?;
        T::deserialize(v)
            .map_err(|e| BiliLiveError::InvalidPayload(format!("{}: {pointer}: {e}", self.cmd)))
    }

    pub fn danmaku(&self) -> Result<Danmaku> {
        Ok(Danmaku {
            text: self.field("/info/1")?,
            uid: self.field("/info/2/0")?,
            uname: self.field("/info/2/1")?,
        })
    }

    pub fn gift(&self) -> Result<Gift> {
        Ok(Gift {
            uname: self.field("/data/uname")?,
            gift_name: self.field("/data/giftName")?,
            num: self.field("/data/num")?,
        })
    }

    pub fn online(&self) -> Result<u32> {
        self.field("/online")
    }
}
