//! Guild records

use dashmap::DashMap;
use gateway_core::{Guild, GuildStore, Snowflake};

#[derive(Debug, Default)]
pub struct GuildCache {
    guilds: DashMap<Snowflake, Guild>,
}

impl GuildCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guilds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guilds.is_empty()
    }
}

impl GuildStore for GuildCache {
    fn upsert(&self, guild: Guild) {
        self.guilds.insert(guild.id, guild);
    }

    fn get(&self, id: Snowflake) -> Option<Guild> {
        self.guilds.get(&id).map(|g| g.clone())
    }

    fn contains(&self, id: Snowflake) -> bool {
        self.guilds.contains_key(&id)
    }

    fn remove(&self, id: Snowflake) -> Option<Guild> {
        self.guilds.remove(&id).map(|(_, guild)| guild)
    }

    fn all(&self) -> Vec<Guild> {
        let mut guilds: Vec<Guild> = self.guilds.iter().map(|g| g.clone()).collect();
        guilds.sort_by_key(|g| g.id);
        guilds
    }

    fn clear(&self) {
        self.guilds.clear();
    }
}
