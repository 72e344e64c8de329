//! Store traits (ports) for the client-side entity cache
//!
//! Dispatch handlers run to completion on the connection's event loop, so every operation
//! here is synchronous and must not block. Implementations live in the cache crate.

use std::fmt;
use std::sync::Arc;

use crate::entities::{
    Channel, Guild, Member, MemberList, MemberListUpdate, Message, Presence, ReadState, User,
};
use crate::value_objects::Snowflake;

// ============================================================================
// User Store
// ============================================================================

pub trait UserStore: Send + Sync {
    /// Record the authenticated user from Ready or `USER_UPDATE`
    fn set_current(&self, user: User);

    fn current(&self) -> Option<User>;

    fn upsert(&self, user: User);

    fn get(&self, id: Snowflake) -> Option<User>;

    fn clear(&self);
}

// ============================================================================
// Guild Store
// ============================================================================

pub trait GuildStore: Send + Sync {
    fn upsert(&self, guild: Guild);

    fn get(&self, id: Snowflake) -> Option<Guild>;

    fn contains(&self, id: Snowflake) -> bool;

    fn remove(&self, id: Snowflake) -> Option<Guild>;

    fn all(&self) -> Vec<Guild>;

    fn clear(&self);
}

// ============================================================================
// Channel Store
// ============================================================================

pub trait ChannelStore: Send + Sync {
    fn upsert(&self, channel: Channel);

    fn get(&self, id: Snowflake) -> Option<Channel>;

    fn contains(&self, id: Snowflake) -> bool;

    fn remove(&self, id: Snowflake) -> Option<Channel>;

    /// Channels of one guild, ordered by position
    fn by_guild(&self, guild_id: Snowflake) -> Vec<Channel>;

    /// Drop every channel of a guild; returns how many were removed
    fn remove_by_guild(&self, guild_id: Snowflake) -> usize;

    fn clear(&self);
}

// ============================================================================
// Member Store
// ============================================================================

pub trait MemberStore: Send + Sync {
    fn upsert(&self, guild_id: Snowflake, member: Member);

    fn get(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member>;

    fn remove(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member>;

    fn by_guild(&self, guild_id: Snowflake) -> Vec<Member>;

    fn remove_by_guild(&self, guild_id: Snowflake) -> usize;

    fn clear(&self);
}

// ============================================================================
// Message Store
// ============================================================================

pub trait MessageStore: Send + Sync {
    fn upsert(&self, message: Message);

    fn get(&self, channel_id: Snowflake, message_id: Snowflake) -> Option<Message>;

    fn remove(&self, channel_id: Snowflake, message_id: Snowflake) -> Option<Message>;

    /// Messages of one channel in id (creation) order
    fn by_channel(&self, channel_id: Snowflake) -> Vec<Message>;

    fn remove_by_channel(&self, channel_id: Snowflake) -> usize;

    fn clear(&self);
}

// ============================================================================
// Read State Store
// ============================================================================

pub trait ReadStateStore: Send + Sync {
    fn upsert(&self, state: ReadState);

    fn get(&self, channel_id: Snowflake) -> Option<ReadState>;

    fn clear(&self);
}

// ============================================================================
// Presence Store
// ============================================================================

pub trait PresenceStore: Send + Sync {
    fn upsert(&self, presence: Presence);

    /// `guild_id` is `None` for presences outside any guild (friends, DMs)
    fn get(&self, guild_id: Option<Snowflake>, user_id: Snowflake) -> Option<Presence>;

    fn clear(&self);
}

// ============================================================================
// Member List Store
// ============================================================================

pub trait MemberListStore: Send + Sync {
    /// Apply an update to its (guild, list id) list, creating the list on first use.
    ///
    /// Returns `true` when the list was created by this call.
    fn apply(&self, update: &MemberListUpdate) -> bool;

    fn get(&self, guild_id: Snowflake, list_id: &str) -> Option<MemberList>;

    fn remove_by_guild(&self, guild_id: Snowflake) -> usize;

    fn clear(&self);
}

// ============================================================================
// Store bundle
// ============================================================================

/// Every store the gateway writes to, shared between the connection and the application
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub guilds: Arc<dyn GuildStore>,
    pub channels: Arc<dyn ChannelStore>,
    pub members: Arc<dyn MemberStore>,
    pub messages: Arc<dyn MessageStore>,
    pub read_states: Arc<dyn ReadStateStore>,
    pub presences: Arc<dyn PresenceStore>,
    pub member_lists: Arc<dyn MemberListStore>,
}

impl Stores {
    /// Forget everything, e.g. on logout or before a fresh bootstrap
    pub fn clear_all(&self) {
        self.users.clear();
        self.guilds.clear();
        self.channels.clear();
        self.members.clear();
        self.messages.clear();
        self.read_states.clear();
        self.presences.clear();
        self.member_lists.clear();
    }
}

impl fmt::Debug for Stores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}
