//! Room and owner identity resolution over the public HTTP API.
//!
//! The chat gateway only accepts the real room id, while users usually know
//! the short display id. The owner's display name is carried alongside every
//! dispatched event.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use bililive_core::error::{BiliLiveError, Result};

use crate::config::ApiSection;

/// Resolved room identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomIdentity {
    pub room_id: u64,
    pub owner_id: u64,
}

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Map a display room id to the real room id and its owner.
    async fn resolve_room(&self, display_id: u64) -> Result<RoomIdentity>;
    /// Look up the owner's display name.
    async fn resolve_owner_name(&self, owner_id: u64) -> Result<String>;
}

/// Common `{code, message, data}` envelope of the public API.
///
/// `data` stays untyped until `code` is checked: failed lookups often carry
/// an empty object there.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Value,
}

impl ApiResponse {
    fn into_data<T: DeserializeOwned>(self, what: &str) -> Result<T> {
        if self.code != 0 {
            let reason = if self.message.is_empty() { self.msg } else { self.message };
            return Err(BiliLiveError::IdentityResolution(format!(
                "{what}: code {}: {reason}",
                self.code
            )));
        }
        serde_json::from_value(self.data)
            .map_err(|e| BiliLiveError::IdentityResolution(format!("{what}: unexpected data: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct RoomInitData {
    room_id: u64,
    uid: u64,
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
    name: String,
}

/// `IdentityResolver` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpIdentityResolver {
    http: reqwest::Client,
    room_init_url: String,
    user_info_url: String,
}

impl HttpIdentityResolver {
    pub fn new(api: &ApiSection) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(api.request_timeout())
            .build()
            .map_err(|e| BiliLiveError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            http,
            room_init_url: api.room_init_url.clone(),
            user_info_url: api.user_info_url.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, u64)], what: &str) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BiliLiveError::IdentityResolution(format!("{what}: {e}")))?;

        let body: ApiResponse = resp
            .json()
            .await
            .map_err(|e| BiliLiveError::IdentityResolution(format!("{what}: invalid response: {e}")))?;
        body.into_data(what)
    }
}

#[async_trait]
impl IdentityResolver for HttpIdentityResolver {
    async fn resolve_room(&self, display_id: u64) -> Result<RoomIdentity> {
        let data: RoomInitData = self
            .get_json(&self.room_init_url, &[("id", display_id)], "room_init")
            .await?;
        tracing::debug!(display_id, room_id = data.room_id, owner_id = data.uid, "room resolved");
        Ok(RoomIdentity {
            room_id: data.room_id,
            owner_id: data.uid,
        })
    }

    async fn resolve_owner_name(&self, owner_id: u64) -> Result<String> {
        let data: UserInfoData = self
            .get_json(&self.user_info_url, &[("mid", owner_id)], "user_info")
            .await?;
        Ok(data.name)
    }
}
