//! Gateway operation codes

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the connection may send an op
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Server to client
    Inbound,
    /// Client to server
    Outbound,
    Both,
}

/// The structural purpose of a frame. Dispatch frames carry an event type on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum OpCode {
    Dispatch = 0,
    Heartbeat = 1,
    Identify = 2,
    PresenceUpdate = 3,
    Resume = 4,
    /// Server asks for a reconnect; the session stays resumable
    Reconnect = 5,
    InvalidSession = 7,
    /// First frame on every connection, carries the heartbeat interval
    Hello = 10,
    HeartbeatAck = 11,
    /// Member list and typing window subscription
    LazyRequest = 14,
}

/// Raw op value this client does not know
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid op code: {0}")]
pub struct UnknownOpCode(pub u8);

impl OpCode {
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::Heartbeat => Direction::Both,
            Self::Identify | Self::PresenceUpdate | Self::Resume | Self::LazyRequest => {
                Direction::Outbound
            }
            Self::Dispatch
            | Self::Reconnect
            | Self::InvalidSession
            | Self::Hello
            | Self::HeartbeatAck => Direction::Inbound,
        }
    }

    /// May arrive from the gateway
    #[must_use]
    pub const fn is_inbound(self) -> bool {
        !matches!(self.direction(), Direction::Outbound)
    }

    /// May be sent by this client
    #[must_use]
    pub const fn is_outbound(self) -> bool {
        !matches!(self.direction(), Direction::Inbound)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Heartbeat => "Heartbeat",
            Self::Identify => "Identify",
            Self::PresenceUpdate => "PresenceUpdate",
            Self::Resume => "Resume",
            Self::Reconnect => "Reconnect",
            Self::InvalidSession => "InvalidSession",
            Self::Hello => "Hello",
            Self::HeartbeatAck => "HeartbeatAck",
            Self::LazyRequest => "LazyRequest",
        }
    }
}

impl TryFrom<u8> for OpCode {
    type Error = UnknownOpCode;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let op = match value {
            0 => Self::Dispatch,
            1 => Self::Heartbeat,
            2 => Self::Identify,
            3 => Self::PresenceUpdate,
            4 => Self::Resume,
            5 => Self::Reconnect,
            7 => Self::InvalidSession,
            10 => Self::Hello,
            11 => Self::HeartbeatAck,
            14 => Self::LazyRequest,
            other => return Err(UnknownOpCode(other)),
        };
        Ok(op)
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), *self as u8)
    }
}
