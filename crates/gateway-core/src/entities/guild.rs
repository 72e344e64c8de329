//! Guild record

use serde::{Deserialize, Serialize};

use super::{Channel, Member};
use crate::value_objects::Snowflake;

/// A guild as delivered by Ready or `GUILD_CREATE`.
///
/// `channels` and `members` are only populated on the bootstrap path; the cache stores them
/// separately and keeps the guild record itself lean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    pub id: Snowflake,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Snowflake>,
    #[serde(default)]
    pub unavailable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<Channel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Member>,
}

impl Guild {
    #[must_use]
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            icon: None,
            owner_id: None,
            unavailable: false,
            channels: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Split off the nested collections, leaving the bare guild record
    #[must_use]
    pub fn into_parts(mut self) -> (Guild, Vec<Channel>, Vec<Member>) {
        let channels = std::mem::take(&mut self.channels);
        let members = std::mem::take(&mut self.members);
        (self, channels, members)
    }
}
