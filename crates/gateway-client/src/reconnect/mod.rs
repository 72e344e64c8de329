//! Reconnection policy

mod backoff;
mod controller;

pub use backoff::BackoffPolicy;
pub use controller::ReconnectController;
