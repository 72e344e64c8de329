//! Typing indicators
//!
//! One deadline per (channel, user). Re-signalling replaces the deadline, so a key never
//! has two live timers. The event loop sleeps until `next_deadline()` and calls `expire`.

use std::collections::HashMap;
use std::time::Duration;

use gateway_core::Snowflake;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypingKey {
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
}

impl TypingKey {
    #[must_use]
    pub const fn new(channel_id: Snowflake, user_id: Snowflake) -> Self {
        Self {
            channel_id,
            user_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypingTracker {
    expiry: Duration,
    deadlines: HashMap<TypingKey, Instant>,
}

impl TypingTracker {
    #[must_use]
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            deadlines: HashMap::new(),
        }
    }

    #[must_use]
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Start or renew typing for `key`. Returns `true` when the key became active.
    pub fn signal(&mut self, key: TypingKey, now: Instant) -> bool {
        self.deadlines.insert(key, now + self.expiry).is_none()
    }

    /// End typing before expiry. Returns `true` when the key was active.
    pub fn clear(&mut self, key: TypingKey) -> bool {
        self.deadlines.remove(&key).is_some()
    }

    #[must_use]
    pub fn is_active(&self, key: TypingKey) -> bool {
        self.deadlines.contains_key(&key)
    }

    /// Users typing in a channel
    #[must_use]
    pub fn typing_in(&self, channel_id: Snowflake) -> Vec<Snowflake> {
        let mut users: Vec<Snowflake> = self
            .deadlines
            .keys()
            .filter(|key| key.channel_id == channel_id)
            .map(|key| key.user_id)
            .collect();
        users.sort();
        users
    }

    /// Earliest pending expiry
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every key whose deadline has passed
    pub fn expire(&mut self, now: Instant) -> Vec<TypingKey> {
        let mut expired: Vec<TypingKey> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, _)| *key)
            .collect();
        for key in &expired {
            self.deadlines.remove(key);
        }
        expired.sort_by_key(|key| (key.channel_id, key.user_id));
        expired
    }

    /// Remove every key, returning them
    pub fn drain(&mut self) -> Vec<TypingKey> {
        self.deadlines.drain().map(|(key, _)| key).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
