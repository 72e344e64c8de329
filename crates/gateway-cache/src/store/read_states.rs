//! Read markers per channel

use dashmap::DashMap;
use gateway_core::{ReadState, ReadStateStore, Snowflake};

#[derive(Debug, Default)]
pub struct ReadStateCache {
    states: DashMap<Snowflake, ReadState>,
}

impl ReadStateCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReadStateStore for ReadStateCache {
    fn upsert(&self, state: ReadState) {
        self.states.insert(state.channel_id, state);
    }

    fn get(&self, channel_id: Snowflake) -> Option<ReadState> {
        self.states.get(&channel_id).map(|s| s.clone())
    }

    fn clear(&self) {
        self.states.clear();
    }
}
