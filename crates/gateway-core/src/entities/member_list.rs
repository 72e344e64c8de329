//! Member list windows
//!
//! The server maintains a sidebar list per (guild, list id) and streams paging deltas for the
//! ranges the client subscribed to. Slots outside every synced range are unknown, so the list
//! is sparse.

use serde::{Deserialize, Serialize};

use super::Member;
use crate::value_objects::Snowflake;

/// One `GUILD_MEMBER_LIST_UPDATE` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberListUpdate {
    pub guild_id: Snowflake,
    /// List id; `everyone` or a hash of the channel permission overwrites
    pub id: String,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub online_count: u32,
    #[serde(default)]
    pub groups: Vec<MemberListGroup>,
    #[serde(default)]
    pub ops: Vec<MemberListOp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberListGroup {
    pub id: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberListItem {
    Group(MemberListGroup),
    Member(Member),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberListOp {
    Sync {
        range: [usize; 2],
        #[serde(default)]
        items: Vec<MemberListItem>,
    },
    Insert {
        index: usize,
        item: MemberListItem,
    },
    Update {
        index: usize,
        item: MemberListItem,
    },
    Delete {
        index: usize,
    },
    Invalidate {
        range: [usize; 2],
    },
}

/// Client-side copy of one member list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberList {
    pub guild_id: Snowflake,
    pub id: String,
    pub member_count: u32,
    pub online_count: u32,
    pub groups: Vec<MemberListGroup>,
    slots: Vec<Option<MemberListItem>>,
}

impl MemberList {
    #[must_use]
    pub fn new(guild_id: Snowflake, id: impl Into<String>) -> Self {
        Self {
            guild_id,
            id: id.into(),
            member_count: 0,
            online_count: 0,
            groups: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Apply the counters, groups and ops of one update in order
    pub fn apply(&mut self, update: &MemberListUpdate) {
        self.member_count = update.member_count;
        self.online_count = update.online_count;
        if !update.groups.is_empty() {
            self.groups.clone_from(&update.groups);
        }

        for op in &update.ops {
            self.apply_op(op);
        }
    }

    pub fn apply_op(&mut self, op: &MemberListOp) {
        match op {
            MemberListOp::Sync { range, items } => {
                let start = range[0];
                self.grow_to(start + items.len());
                for (offset, item) in items.iter().enumerate() {
                    self.slots[start + offset] = Some(item.clone());
                }
            }
            MemberListOp::Insert { index, item } => {
                self.grow_to(*index);
                self.slots.insert(*index, Some(item.clone()));
            }
            MemberListOp::Update { index, item } => {
                self.grow_to(index + 1);
                self.slots[*index] = Some(item.clone());
            }
            MemberListOp::Delete { index } => {
                if *index < self.slots.len() {
                    self.slots.remove(*index);
                }
            }
            MemberListOp::Invalidate { range } => {
                let end = range[1].min(self.slots.len().saturating_sub(1));
                for slot in self.slots.iter_mut().take(end + 1).skip(range[0]) {
                    *slot = None;
                }
            }
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MemberListItem> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of slots, known or not
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Known members in list order
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.slots.iter().filter_map(|slot| match slot {
            Some(MemberListItem::Member(member)) => Some(member),
            _ => None,
        })
    }

    fn grow_to(&mut self, len: usize) {
        if self.slots.len() < len {
            self.slots.resize(len, None);
        }
    }
}
