//! Guild membership records

use std::collections::HashMap;

use dashmap::DashMap;
use gateway_core::{Member, MemberStore, Snowflake};

/// Members grouped per guild
#[derive(Debug, Default)]
pub struct MemberCache {
    guilds: DashMap<Snowflake, HashMap<Snowflake, Member>>,
}

impl MemberCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self, guild_id: Snowflake) -> usize {
        self.guilds.get(&guild_id).map_or(0, |m| m.len())
    }
}

impl MemberStore for MemberCache {
    fn upsert(&self, guild_id: Snowflake, mut member: Member) {
        member.guild_id = Some(guild_id);
        self.guilds
            .entry(guild_id)
            .or_default()
            .insert(member.user_id(), member);
    }

    fn get(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        self.guilds
            .get(&guild_id)
            .and_then(|members| members.get(&user_id).cloned())
    }

    fn remove(&self, guild_id: Snowflake, user_id: Snowflake) -> Option<Member> {
        let mut members = self.guilds.get_mut(&guild_id)?;
        members.remove(&user_id)
    }

    fn by_guild(&self, guild_id: Snowflake) -> Vec<Member> {
        let mut members: Vec<Member> = self
            .guilds
            .get(&guild_id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();
        members.sort_by_key(Member::user_id);
        members
    }

    fn remove_by_guild(&self, guild_id: Snowflake) -> usize {
        self.guilds.remove(&guild_id).map_or(0, |(_, m)| m.len())
    }

    fn clear(&self) {
        self.guilds.clear();
    }
}
