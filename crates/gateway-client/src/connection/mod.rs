//! Connection lifecycle
//!
//! One `Connection` per attempt, plus the state that outlives attempts (session, URL,
//! subscriptions).

mod connection;
mod heartbeat;
mod session;
mod subscriptions;
mod url;

pub use connection::{Connection, ConnectionId, ConnectionPhase};
pub use heartbeat::{HeartbeatScheduler, HeartbeatTick};
pub use session::SessionTracker;
pub use subscriptions::SubscriptionManager;
pub use url::GatewayUrl;
