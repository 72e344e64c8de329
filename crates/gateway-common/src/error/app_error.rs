//! Application error types
//!
//! Top-level error for binaries embedding the gateway client. Library components report
//! their own `thiserror` enums; this type collects them at the edge.

use std::fmt;

use crate::config::ConfigError;
use crate::telemetry::TracingError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TracingError),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Session terminated: {0}")]
    SessionTerminated(String),

    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl AppError {
    /// Stable code for structured logs
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Telemetry(_) => "TELEMETRY_ERROR",
            Self::Gateway(_) => "GATEWAY_ERROR",
            Self::SessionTerminated(_) => "SESSION_TERMINATED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Process exit code for the binary
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 78,
            Self::SessionTerminated(_) => 77,
            Self::Telemetry(_) | Self::Gateway(_) | Self::Internal(_) => 1,
        }
    }

    #[must_use]
    pub fn gateway(msg: impl fmt::Display) -> Self {
        Self::Gateway(msg.to_string())
    }

    #[must_use]
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
