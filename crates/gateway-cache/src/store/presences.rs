//! Presence records, keyed by (guild, user)

use dashmap::DashMap;
use gateway_core::{Presence, PresenceStore, Snowflake};

#[derive(Debug, Default)]
pub struct PresenceCache {
    presences: DashMap<(Option<Snowflake>, Snowflake), Presence>,
}

impl PresenceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.presences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.presences.is_empty()
    }
}

impl PresenceStore for PresenceCache {
    fn upsert(&self, presence: Presence) {
        self.presences
            .insert((presence.guild_id, presence.user_id()), presence);
    }

    fn get(&self, guild_id: Option<Snowflake>, user_id: Snowflake) -> Option<Presence> {
        self.presences.get(&(guild_id, user_id)).map(|p| p.clone())
    }

    fn clear(&self) {
        self.presences.clear();
    }
}
