//! WebSocket close codes and how the client reacts to them

/// Gateway close codes
///
/// 4000-4012 are sent by the server. 4900 and up are sent by this client when it closes a
/// connection itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    /// Unknown error occurred
    UnknownError = 4000,
    /// Invalid opcode sent
    UnknownOpcode = 4001,
    /// Invalid payload encoding
    DecodeError = 4002,
    /// Sent a payload before Identify
    NotAuthenticated = 4003,
    /// Invalid token provided
    AuthenticationFailed = 4004,
    /// Sent Identify twice
    AlreadyAuthenticated = 4005,
    /// Invalid sequence number for Resume
    InvalidSequence = 4007,
    RateLimited = 4008,
    SessionTimeout = 4009,
    InvalidShard = 4010,
    ShardingRequired = 4011,
    /// Invalid/outdated API version
    InvalidApiVersion = 4012,
    /// No HeartbeatAck between two ticks (client only)
    HeartbeatTimeout = 4900,
    /// Dropping the connection to resume on a new one (client only)
    Reconnecting = 4901,
}

/// What the reconnection controller does after a connection closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    /// Credentials or protocol parameters are unusable; surface a terminal failure
    Terminal,
    /// Reconnect; `resume` keeps the session for a Resume handshake
    Reconnect { resume: bool },
}

impl CloseCode {
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            4000 => Some(Self::UnknownError),
            4001 => Some(Self::UnknownOpcode),
            4002 => Some(Self::DecodeError),
            4003 => Some(Self::NotAuthenticated),
            4004 => Some(Self::AuthenticationFailed),
            4005 => Some(Self::AlreadyAuthenticated),
            4007 => Some(Self::InvalidSequence),
            4008 => Some(Self::RateLimited),
            4009 => Some(Self::SessionTimeout),
            4010 => Some(Self::InvalidShard),
            4011 => Some(Self::ShardingRequired),
            4012 => Some(Self::InvalidApiVersion),
            4900 => Some(Self::HeartbeatTimeout),
            4901 => Some(Self::Reconnecting),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Codes after which reconnecting cannot succeed without user action
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated
                | Self::AuthenticationFailed
                | Self::InvalidShard
                | Self::ShardingRequired
                | Self::InvalidApiVersion
        )
    }

    /// Codes after which the server has forgotten the session
    #[must_use]
    pub const fn invalidates_session(self) -> bool {
        matches!(self, Self::InvalidSequence | Self::SessionTimeout)
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::UnknownOpcode => "Invalid opcode sent",
            Self::DecodeError => "Invalid payload encoding",
            Self::NotAuthenticated => "Not authenticated",
            Self::AuthenticationFailed => "Authentication failed",
            Self::AlreadyAuthenticated => "Already authenticated",
            Self::InvalidSequence => "Invalid sequence number",
            Self::RateLimited => "Rate limited",
            Self::SessionTimeout => "Session timeout",
            Self::InvalidShard => "Invalid shard configuration",
            Self::ShardingRequired => "Sharding required",
            Self::InvalidApiVersion => "Invalid API version",
            Self::HeartbeatTimeout => "Heartbeat not acknowledged",
            Self::Reconnecting => "Reconnecting",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnknownError => "UnknownError",
            Self::UnknownOpcode => "UnknownOpcode",
            Self::DecodeError => "DecodeError",
            Self::NotAuthenticated => "NotAuthenticated",
            Self::AuthenticationFailed => "AuthenticationFailed",
            Self::AlreadyAuthenticated => "AlreadyAuthenticated",
            Self::InvalidSequence => "InvalidSequence",
            Self::RateLimited => "RateLimited",
            Self::SessionTimeout => "SessionTimeout",
            Self::InvalidShard => "InvalidShard",
            Self::ShardingRequired => "ShardingRequired",
            Self::InvalidApiVersion => "InvalidApiVersion",
            Self::HeartbeatTimeout => "HeartbeatTimeout",
            Self::Reconnecting => "Reconnecting",
        }
    }
}

impl CloseAction {
    /// Classify a close as observed on the wire. `None` means the connection ended without
    /// a close frame (network failure, TLS failure, abnormal closure).
    #[must_use]
    pub fn classify(code: Option<u16>) -> Self {
        match code {
            // Normal closure and going away end the session on the server side
            Some(1000 | 1001) => Self::Reconnect { resume: false },
            Some(raw) => match CloseCode::from_u16(raw) {
                Some(code) if code.is_terminal() => Self::Terminal,
                Some(code) if code.invalidates_session() => Self::Reconnect { resume: false },
                _ => Self::Reconnect { resume: true },
            },
            None => Self::Reconnect { resume: true },
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_from_u16() {
        assert_eq!(CloseCode::from_u16(4004), Some(CloseCode::AuthenticationFailed));
        assert_eq!(CloseCode::from_u16(4900), Some(CloseCode::HeartbeatTimeout));
        assert_eq!(CloseCode::from_u16(1000), None);
        assert_eq!(CloseCode::from_u16(4006), None); // 4006 is not defined
    }

    #[test]
    fn test_terminal_codes() {
        for raw in [4003, 4004, 4010, 4011, 4012] {
            assert_eq!(CloseAction::classify(Some(raw)), CloseAction::Terminal, "{raw}");
        }
    }

    #[test]
    fn test_reconnect_without_resume() {
        for raw in [1000, 1001, 4007, 4009] {
            assert_eq!(
                CloseAction::classify(Some(raw)),
                CloseAction::Reconnect { resume: false },
                "{raw}"
            );
        }
    }

    #[test]
    fn test_everything_else_resumes() {
        for code in [None, Some(1006), Some(4000), Some(4008), Some(4900), Some(4901)] {
            assert_eq!(
                CloseAction::classify(code),
                CloseAction::Reconnect { resume: true },
                "{code:?}"
            );
        }
    }

    #[test]
    fn test_close_code_display() {
        let display = CloseCode::AuthenticationFailed.to_string();
        assert!(display.contains("4004"));
        assert!(display.contains("Authentication"));
    }
}
