//! Channel records, indexed by id

use dashmap::DashMap;
use gateway_core::{Channel, ChannelStore, Snowflake};

#[derive(Debug, Default)]
pub struct ChannelCache {
    channels: DashMap<Snowflake, Channel>,
}

impl ChannelCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl ChannelStore for ChannelCache {
    fn upsert(&self, channel: Channel) {
        self.channels.insert(channel.id, channel);
    }

    fn get(&self, id: Snowflake) -> Option<Channel> {
        self.channels.get(&id).map(|c| c.clone())
    }

    fn contains(&self, id: Snowflake) -> bool {
        self.channels.contains_key(&id)
    }

    fn remove(&self, id: Snowflake) -> Option<Channel> {
        self.channels.remove(&id).map(|(_, channel)| channel)
    }

    fn by_guild(&self, guild_id: Snowflake) -> Vec<Channel> {
        let mut channels: Vec<Channel> = self
            .channels
            .iter()
            .filter(|c| c.guild_id == Some(guild_id))
            .map(|c| c.clone())
            .collect();
        channels.sort_by_key(|c| (c.position, c.id));
        channels
    }

    fn remove_by_guild(&self, guild_id: Snowflake) -> usize {
        let mut removed = 0;
        self.channels.retain(|_, c| {
            let keep = c.guild_id != Some(guild_id);
            removed += usize::from(!keep);
            keep
        });
        removed
    }

    fn clear(&self) {
        self.channels.clear();
    }
}
