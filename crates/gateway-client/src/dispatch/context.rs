//! State handed to dispatch handlers

use gateway_core::Stores;
use tokio::time::Instant;

use crate::broadcast::Notifier;
use crate::connection::{SessionTracker, SubscriptionManager};
use crate::ephemeral::TypingTracker;

/// Session milestones a handler reports back to the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Ready {
        session_id: String,
        guild_count: usize,
    },
    Resumed,
}

/// Borrowed view of the client state for one dispatch frame
pub struct DispatchContext<'a> {
    pub stores: &'a Stores,
    pub session: &'a mut SessionTracker,
    pub typing: &'a mut TypingTracker,
    pub subscriptions: &'a mut SubscriptionManager,
    pub notifier: &'a Notifier,
    /// Event loop time the frame is processed at
    pub now: Instant,
    /// Set by the Ready/Resumed handlers
    pub lifecycle: Option<Lifecycle>,
}
