//! Control payloads
//!
//! Hello is the only server-sent control payload with structure; the rest are sent by the
//! client.

use std::collections::BTreeMap;

use gateway_core::{Snowflake, Status};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload for op 10 (Hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    pub token: String,
    pub properties: IdentifyProperties,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<PresenceUpdatePayload>,
}

/// Client connection properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,

    /// Browser or client name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl IdentifyProperties {
    #[must_use]
    pub fn new() -> Self {
        Self {
            os: None,
            browser: None,
            device: None,
        }
    }

    /// Properties describing this build
    #[must_use]
    pub fn current() -> Self {
        Self::new()
            .with_os(std::env::consts::OS)
            .with_browser(env!("CARGO_PKG_NAME"))
            .with_device(env!("CARGO_PKG_NAME"))
    }

    #[must_use]
    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = Some(os.into());
        self
    }

    #[must_use]
    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = Some(browser.into());
        self
    }

    #[must_use]
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = Some(device.into());
        self
    }
}

impl Default for IdentifyProperties {
    fn default() -> Self {
        Self::current()
    }
}

/// Payload for op 3 (Presence Update)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdatePayload {
    pub status: Status,
    /// Unix milliseconds at which the client went idle
    #[serde(default)]
    pub since: Option<u64>,
    #[serde(default)]
    pub activities: Vec<Value>,
    #[serde(default)]
    pub afk: bool,
}

impl PresenceUpdatePayload {
    #[must_use]
    pub fn new(status: Status) -> Self {
        Self {
            status,
            since: None,
            activities: Vec::new(),
            afk: matches!(status, Status::Idle),
        }
    }
}

/// Payload for op 4 (Resume)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumePayload {
    pub token: String,
    pub session_id: String,
    /// Last received sequence number
    pub seq: u64,
}

/// Payload for op 14 (Lazy Request)
///
/// Requests a member list window for the listed channels of one guild, plus typing and
/// activity events for that guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LazyRequestPayload {
    pub guild_id: Snowflake,
    /// Channel id to requested `[start, end]` ranges
    pub channels: BTreeMap<Snowflake, Vec<[u32; 2]>>,
    pub typing: bool,
    pub activities: bool,
    pub threads: bool,
}

impl LazyRequestPayload {
    /// One channel, first window `[0, range_end]`
    #[must_use]
    pub fn window(guild_id: Snowflake, channel_id: Snowflake, range_end: u32) -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(channel_id, vec![[0, range_end]]);
        Self {
            guild_id,
            channels,
            typing: true,
            activities: true,
            threads: false,
        }
    }
}
