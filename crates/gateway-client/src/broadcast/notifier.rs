//! Notification channels from the gateway to the application
//!
//! Events go out on a broadcast channel; the connection phase is a watch value so late
//! subscribers still see whether the gateway is ready.

use std::time::Duration;

use gateway_core::Snowflake;
use tokio::sync::{broadcast, watch};

use crate::connection::ConnectionPhase;

/// Broadcast buffer; slow receivers lag rather than block the event loop
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Events published to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Fresh session bootstrapped
    Ready {
        session_id: String,
        guild_count: usize,
    },
    /// Previous session resumed; no bootstrap
    Resumed,
    TypingStarted {
        channel_id: Snowflake,
        user_id: Snowflake,
        guild_id: Option<Snowflake>,
    },
    TypingStopped {
        channel_id: Snowflake,
        user_id: Snowflake,
    },
    /// A reconnect attempt is scheduled after `delay`
    Reconnecting { attempt: u32, delay: Duration },
    /// The connection dropped; a reconnect may follow
    Disconnected { code: Option<u16> },
    /// Non-recoverable close; credentials and session state are gone
    ForceLogout { code: u16 },
}

#[derive(Debug, Clone)]
pub struct Notifier {
    events: broadcast::Sender<ClientEvent>,
    phase: watch::Sender<ConnectionPhase>,
}

impl Notifier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        let (phase, _) = watch::channel(ConnectionPhase::Idle);
        Self { events, phase }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn watch_phase(&self) -> watch::Receiver<ConnectionPhase> {
        self.phase.subscribe()
    }

    pub fn publish(&self, event: ClientEvent) {
        // Err only means nobody is listening
        if let Err(broadcast::error::SendError(event)) = self.events.send(event) {
            tracing::trace!(event = ?event, "No subscribers for client event");
        }
    }

    pub fn set_phase(&self, phase: ConnectionPhase) {
        self.phase.send_if_modified(|current| {
            if *current == phase {
                return false;
            }
            *current = phase;
            true
        });
    }

    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.borrow()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
