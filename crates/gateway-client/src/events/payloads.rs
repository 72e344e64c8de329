//! Dispatch payload shapes
//!
//! Full entity payloads (guilds, channels, messages, presences, member list updates) decode
//! straight into the `gateway-core` records. The types here cover the partial shapes.

use chrono::{DateTime, Utc};
use gateway_core::{Channel, Guild, Member, Presence, ReadState, Snowflake, User};
use serde::{Deserialize, Serialize};

/// READY - full bootstrap snapshot for a fresh session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyEvent {
    /// Protocol version
    #[serde(default)]
    pub v: u8,
    pub user: User,
    pub session_id: String,
    #[serde(default)]
    pub guilds: Vec<Guild>,
    #[serde(default)]
    pub private_channels: Vec<Channel>,
    #[serde(default)]
    pub read_state: Vec<ReadState>,
    #[serde(default)]
    pub presences: Vec<Presence>,
    /// Other users referenced by the snapshot
    #[serde(default)]
    pub users: Vec<User>,
}

/// GUILD_DELETE - `unavailable` means an outage, not that the user left
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildDeleteEvent {
    pub id: Snowflake,
    #[serde(default)]
    pub unavailable: bool,
}

/// GUILD_MEMBER_ADD / GUILD_MEMBER_UPDATE
#[derive(Debug, Clone, Deserialize)]
pub struct MemberEvent {
    pub guild_id: Snowflake,
    #[serde(flatten)]
    pub member: Member,
}

/// GUILD_MEMBER_REMOVE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildMemberRemoveEvent {
    pub guild_id: Snowflake,
    pub user: User,
}

/// MESSAGE_UPDATE - only changed fields are present
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageUpdateEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
}

/// MESSAGE_DELETE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeleteEvent {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

/// MESSAGE_DELETE_BULK
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeleteBulkEvent {
    pub ids: Vec<Snowflake>,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

/// TYPING_START
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStartEvent {
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub user_id: Snowflake,
    /// Unix seconds
    #[serde(default)]
    pub timestamp: u64,
}
