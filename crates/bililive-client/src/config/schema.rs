use std::time::Duration;

use serde::Deserialize;
use bililive_core::error::{BiliLiveError, Result};
use bililive_core::protocol::frame::VERSION_CLIENT;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    #[serde(default)]
    pub chat: ChatSection,

    #[serde(default)]
    pub api: ApiSection,

    /// Display room id to join when none is given on the command line.
    #[serde(default)]
    pub room: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: 1,
            chat: ChatSection::default(),
            api: ApiSection::default(),
            room: None,
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(BiliLiveError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.chat.validate()?;
        self.api.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatSection {
    #[serde(default = "default_chat_host")]
    pub host: String,

    #[serde(default = "default_chat_port")]
    pub port: u16,

    #[serde(default = "default_chat_path")]
    pub path: String,

    #[serde(default = "default_heartbeat_interval_ms")]
    pub heartbeat_interval_ms: u64,

    /// Version stamped on outgoing frames.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: u16,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            host: default_chat_host(),
            port: default_chat_port(),
            path: default_chat_path(),
            heartbeat_interval_ms: default_heartbeat_interval_ms(),
            protocol_version: default_protocol_version(),
        }
    }
}

impl ChatSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(BiliLiveError::Config("chat.host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(BiliLiveError::Config("chat.port must not be 0".into()));
        }
        if !self.path.starts_with('/') {
            return Err(BiliLiveError::Config("chat.path must start with '/'".into()));
        }
        if !(1000..=120000).contains(&self.heartbeat_interval_ms) {
            return Err(BiliLiveError::Config(
                "chat.heartbeat_interval_ms must be between 1000 and 120000".into(),
            ));
        }
        Ok(())
    }

    pub fn ws_url(&self) -> String {
        format!("wss://{}:{}{}", self.host, self.port, self.path)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSection {
    #[serde(default = "default_room_init_url")]
    pub room_init_url: String,

    #[serde(default = "default_user_info_url")]
    pub user_info_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            room_init_url: default_room_init_url(),
            user_info_url: default_user_info_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ApiSection {
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("api.room_init_url", &self.room_init_url),
            ("api.user_info_url", &self.user_info_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(BiliLiveError::Config(format!("{name} must be an http(s) url")));
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(BiliLiveError::Config(
                "api.request_timeout_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_chat_host() -> String {
    "broadcastlv.chat.bilibili.com".into()
}
fn default_chat_port() -> u16 {
    443
}
fn default_chat_path() -> String {
    "/sub".into()
}
fn default_heartbeat_interval_ms() -> u64 {
    30000
}
fn default_protocol_version() -> u16 {
    VERSION_CLIENT
}
fn default_room_init_url() -> String {
    "http://api.live.bilibili.com/room/v1/Room/room_init".into()
}
fn default_user_info_url() -> String {
    "https://api.bilibili.com/x/space/acc/info".into()
}
fn default_request_timeout_ms() -> u64 {
    10000
}
