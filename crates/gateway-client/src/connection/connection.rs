//! A single connection attempt

use std::fmt;

use crate::transport::Transport;

use super::HeartbeatScheduler;

/// Identity of one connection attempt, strictly increasing per client
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handshake state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionPhase {
    /// No connection and none requested
    #[default]
    Idle,
    /// Transport is opening
    Connecting,
    /// Transport is open, waiting for Hello
    AwaitingHello,
    /// Identify sent, waiting for Ready
    Identifying,
    /// Resume sent, waiting for Resumed
    Resuming,
    /// Session established; the gateway is usable
    Ready,
    /// Close requested
    Closing,
    Closed,
}

impl ConnectionPhase {
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Phases in which a transport exists
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(
            self,
            Self::Connecting
                | Self::AwaitingHello
                | Self::Identifying
                | Self::Resuming
                | Self::Ready
        )
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::AwaitingHello => "awaiting_hello",
            Self::Identifying => "identifying",
            Self::Resuming => "resuming",
            Self::Ready => "ready",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One connection attempt. Replaced, never reused, on reconnect; dropping it drops the
/// transport and every timer it owns.
pub struct Connection {
    id: ConnectionId,
    pub(crate) transport: Transport,
    phase: ConnectionPhase,
    pub(crate) heartbeat: HeartbeatScheduler,
}

impl Connection {
    #[must_use]
    pub fn new(id: ConnectionId, transport: Transport) -> Self {
        Self {
            id,
            transport,
            phase: ConnectionPhase::Connecting,
            heartbeat: HeartbeatScheduler::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: ConnectionPhase) {
        if self.phase != phase {
            tracing::debug!(
                connection_id = %self.id,
                from = %self.phase,
                to = %phase,
                "Connection phase changed"
            );
            self.phase = phase;
        }
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    #[must_use]
    pub fn heartbeat(&self) -> &HeartbeatScheduler {
        &self.heartbeat
    }

    pub fn heartbeat_mut(&mut self) -> &mut HeartbeatScheduler {
        &mut self.heartbeat
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("heartbeat", &self.heartbeat)
            .finish()
    }
}
