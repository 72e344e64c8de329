//! Member list windows, created lazily on the first update for a list id

use dashmap::DashMap;
use gateway_core::{MemberList, MemberListStore, MemberListUpdate, Snowflake};

#[derive(Debug, Default)]
pub struct MemberListCache {
    lists: DashMap<(Snowflake, String), MemberList>,
}

impl MemberListCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemberListStore for MemberListCache {
    fn apply(&self, update: &MemberListUpdate) -> bool {
        let key = (update.guild_id, update.id.clone());
        let mut created = false;
        let mut list = self.lists.entry(key).or_insert_with(|| {
            created = true;
            MemberList::new(update.guild_id, update.id.clone())
        });
        list.apply(update);

        if created {
            tracing::debug!(
                guild_id = %update.guild_id,
                list_id = %update.id,
                "Member list created"
            );
        }
        created
    }

    fn get(&self, guild_id: Snowflake, list_id: &str) -> Option<MemberList> {
        self.lists
            .get(&(guild_id, list_id.to_string()))
            .map(|l| l.clone())
    }

    fn remove_by_guild(&self, guild_id: Snowflake) -> usize {
        let mut removed = 0;
        self.lists.retain(|(guild, _), _| {
            let keep = *guild != guild_id;
            removed += usize::from(!keep);
            keep
        });
        removed
    }

    fn clear(&self) {
        self.lists.clear();
    }
}
