//! Integration test utilities for the gateway client
//!
//! Scripted transports for driving the client event by event, an in-process WebSocket
//! gateway for end-to-end runs, and payload builders.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
