//! Test fixtures and payload builders
//!
//! Ids are fixed so assertions can name them.

use gateway_core::Snowflake;
use serde_json::{json, Value};

pub const CURRENT_USER: Snowflake = Snowflake::new(1);
pub const OTHER_USER: Snowflake = Snowflake::new(2);
pub const GUILD_A: Snowflake = Snowflake::new(100);
pub const GENERAL: Snowflake = Snowflake::new(200);
pub const UNKNOWN_GUILD: Snowflake = Snowflake::new(999);

/// Ready snapshot: the current user, guild A with its #general channel, one member
pub fn ready(session_id: &str) -> Value {
    json!({
        "v": 9,
        "user": {"id": CURRENT_USER, "username": "me"},
        "session_id": session_id,
        "guilds": [{
            "id": GUILD_A,
            "name": "guild a",
            "channels": [{"id": GENERAL, "name": "general", "type": 0}],
            "members": [{"user": {"id": OTHER_USER, "username": "ferris"}}]
        }],
        "private_channels": [],
        "read_state": [{"id": GENERAL, "last_message_id": null, "mention_count": 0}],
        "presences": [],
        "users": [{"id": OTHER_USER, "username": "ferris"}]
    })
}

pub fn channel_create(channel_id: Snowflake, guild_id: Snowflake, name: &str) -> Value {
    json!({
        "id": channel_id,
        "guild_id": guild_id,
        "name": name,
        "type": 0
    })
}

pub fn typing_start(channel_id: Snowflake, user_id: Snowflake) -> Value {
    json!({
        "channel_id": channel_id,
        "guild_id": GUILD_A,
        "user_id": user_id,
        "timestamp": 1_714_564_800
    })
}

pub fn message_create(id: Snowflake, channel_id: Snowflake, author: Snowflake, content: &str) -> Value {
    json!({
        "id": id,
        "channel_id": channel_id,
        "guild_id": GUILD_A,
        "author": {"id": author, "username": "ferris"},
        "content": content,
        "timestamp": "2024-05-01T12:00:00Z"
    })
}
