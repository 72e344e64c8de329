//! Lazy member-list subscriptions
//!
//! Tracks which channels of which guilds have an active subscription window so the
//! same request is never sent twice on one connection. A channel counts as subscribed
//! only once its request was handed to the transport; anything that could not be sent
//! waits in the queue.

use std::collections::{HashMap, HashSet, VecDeque};

use gateway_core::Snowflake;

use crate::protocol::LazyRequestPayload;

#[derive(Debug, Clone, Default)]
pub struct SubscriptionManager {
    /// Upper bound of the requested window `[0, range_end]`
    range_end: u32,
    subscribed: HashMap<Snowflake, HashSet<Snowflake>>,
    /// Requests not sent yet, in request order
    queued: VecDeque<(Snowflake, Snowflake)>,
}

impl SubscriptionManager {
    #[must_use]
    pub fn new(range_end: u32) -> Self {
        Self {
            range_end,
            ..Self::default()
        }
    }

    /// Request a window for `channel_id` in `guild_id`.
    ///
    /// Returns the payload when a request should go out now; the caller reports the
    /// outcome with [`confirm`](Self::confirm) or [`defer`](Self::defer). Returns `None`
    /// for a duplicate or while requests are waiting. When the connection is not ready,
    /// or earlier requests are still queued, the request joins the queue.
    pub fn ensure_subscribed(
        &mut self,
        guild_id: Snowflake,
        channel_id: Snowflake,
        ready: bool,
    ) -> Option<LazyRequestPayload> {
        if self.is_subscribed(guild_id, channel_id) || self.is_queued(guild_id, channel_id) {
            tracing::debug!(
                guild_id = %guild_id,
                channel_id = %channel_id,
                "Already subscribed"
            );
            return None;
        }

        if !ready || !self.queued.is_empty() {
            tracing::debug!(
                guild_id = %guild_id,
                channel_id = %channel_id,
                ready,
                "Queueing subscription"
            );
            self.queued.push_back((guild_id, channel_id));
            return None;
        }

        Some(self.payload(guild_id, channel_id))
    }

    /// The request went out
    pub fn confirm(&mut self, guild_id: Snowflake, channel_id: Snowflake) {
        self.queued
            .retain(|&(guild, channel)| (guild, channel) != (guild_id, channel_id));
        self.subscribed
            .entry(guild_id)
            .or_default()
            .insert(channel_id);
    }

    /// The request could not be sent; it goes back to the front of the queue
    pub fn defer(&mut self, guild_id: Snowflake, channel_id: Snowflake) {
        if !self.is_queued(guild_id, channel_id) {
            self.queued.push_front((guild_id, channel_id));
        }
    }

    /// Take the oldest queued request and its payload
    pub fn next_queued(&mut self) -> Option<(Snowflake, Snowflake, LazyRequestPayload)> {
        let (guild_id, channel_id) = self.queued.pop_front()?;
        Some((guild_id, channel_id, self.payload(guild_id, channel_id)))
    }

    #[must_use]
    pub fn is_subscribed(&self, guild_id: Snowflake, channel_id: Snowflake) -> bool {
        self.subscribed
            .get(&guild_id)
            .is_some_and(|channels| channels.contains(&channel_id))
    }

    #[must_use]
    pub fn is_queued(&self, guild_id: Snowflake, channel_id: Snowflake) -> bool {
        self.queued.contains(&(guild_id, channel_id))
    }

    #[must_use]
    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    #[must_use]
    pub fn has_queued(&self) -> bool {
        !self.queued.is_empty()
    }

    /// Subscriptions end with their connection; queued requests are kept
    pub fn reset(&mut self) {
        self.subscribed.clear();
    }

    /// Forget subscriptions of a guild that went away
    pub fn remove_guild(&mut self, guild_id: Snowflake) {
        self.subscribed.remove(&guild_id);
        self.queued.retain(|(guild, _)| *guild != guild_id);
    }

    pub fn clear(&mut self) {
        self.subscribed.clear();
        self.queued.clear();
    }

    fn payload(&self, guild_id: Snowflake, channel_id: Snowflake) -> LazyRequestPayload {
        LazyRequestPayload::window(guild_id, channel_id, self.range_end)
    }
}
