//! # gateway-client
//!
//! Client for a real-time chat gateway: opens the WebSocket, performs the Hello and
//! Identify/Resume handshake, heartbeats, tracks the dispatch sequence, routes events into
//! the entity stores and reconnects with backoff.
//!
//! ```ignore
//! let cache = CacheSet::new();
//! let settings = ClientSettings::from_config(&AppConfig::from_env()?);
//! let handle = GatewayClient::new(settings, Arc::new(WebSocketConnector::new()), cache.stores())
//!     .spawn();
//! handle.connect().await?;
//! ```

pub mod broadcast;
pub mod client;
pub mod connection;
pub mod dispatch;
pub mod ephemeral;
pub mod events;
pub mod handlers;
pub mod protocol;
pub mod reconnect;
pub mod transport;

pub use broadcast::ClientEvent;
pub use client::{ClientError, ClientSettings, GatewayClient, GatewayHandle};
pub use connection::{ConnectionPhase, GatewayUrl};
pub use transport::{Connector, WebSocketConnector};
