//! Bundle of every cache, handed to the gateway as `Stores`

use std::sync::Arc;

use gateway_core::Stores;

use crate::store::{
    ChannelCache, GuildCache, MemberCache, MemberListCache, MessageCache, PresenceCache,
    ReadStateCache, UserCache,
};

/// Typed handles to the caches. `stores()` erases them for the gateway while the
/// application keeps the concrete types for reads.
#[derive(Debug, Clone, Default)]
pub struct CacheSet {
    pub users: Arc<UserCache>,
    pub guilds: Arc<GuildCache>,
    pub channels: Arc<ChannelCache>,
    pub members: Arc<MemberCache>,
    pub messages: Arc<MessageCache>,
    pub read_states: Arc<ReadStateCache>,
    pub presences: Arc<PresenceCache>,
    pub member_lists: Arc<MemberListCache>,
}

impl CacheSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stores(&self) -> Stores {
        Stores {
            users: self.users.clone(),
            guilds: self.guilds.clone(),
            channels: self.channels.clone(),
            members: self.members.clone(),
            messages: self.messages.clone(),
            read_states: self.read_states.clone(),
            presences: self.presences.clone(),
            member_lists: self.member_lists.clone(),
        }
    }
}
