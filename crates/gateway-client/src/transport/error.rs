//! Transport errors

/// Failures to hand a command to the transport task
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("transport is closed")]
    Closed,

    #[error("outbound buffer is full")]
    BufferFull,
}
