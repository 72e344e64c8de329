//! Message records, bounded per channel

use std::collections::BTreeMap;

use dashmap::DashMap;
use gateway_core::{Message, MessageStore, Snowflake};

/// How many messages a channel keeps before the oldest are evicted
pub const DEFAULT_MESSAGES_PER_CHANNEL: usize = 200;

/// Messages per channel, ordered by id so eviction drops the oldest first
#[derive(Debug)]
pub struct MessageCache {
    channels: DashMap<Snowflake, BTreeMap<Snowflake, Message>>,
    per_channel: usize,
}

impl Default for MessageCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MESSAGES_PER_CHANNEL)
    }
}

impl MessageCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(per_channel: usize) -> Self {
        Self {
            channels: DashMap::new(),
            per_channel: per_channel.max(1),
        }
    }
}

impl MessageStore for MessageCache {
    fn upsert(&self, message: Message) {
        let mut messages = self.channels.entry(message.channel_id).or_default();
        messages.insert(message.id, message);

        while messages.len() > self.per_channel {
            if messages.pop_first().is_none() {
                break;
            }
        }
    }

    fn get(&self, channel_id: Snowflake, message_id: Snowflake) -> Option<Message> {
        self.channels
            .get(&channel_id)
            .and_then(|messages| messages.get(&message_id).cloned())
    }

    fn remove(&self, channel_id: Snowflake, message_id: Snowflake) -> Option<Message> {
        let mut messages = self.channels.get_mut(&channel_id)?;
        messages.remove(&message_id)
    }

    fn by_channel(&self, channel_id: Snowflake) -> Vec<Message> {
        self.channels
            .get(&channel_id)
            .map(|messages| messages.values().cloned().collect())
            .unwrap_or_default()
    }

    fn remove_by_channel(&self, channel_id: Snowflake) -> usize {
        self.channels
            .remove(&channel_id)
            .map_or(0, |(_, messages)| messages.len())
    }

    fn clear(&self) {
        self.channels.clear();
    }
}
