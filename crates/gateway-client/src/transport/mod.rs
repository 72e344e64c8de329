//! Transport - one duplex, message-oriented connection to the gateway
//!
//! A `Transport` is a pair of channels: outbound commands and inbound events. Whatever sits
//! on the other end (a WebSocket task, a scripted test peer) reports every outcome as a
//! `TransportEvent`, including failures to connect, and ends with exactly one `Closed`.

mod error;
mod websocket;

use std::future::{self, Future};

use tokio::sync::mpsc;

use crate::protocol::GatewayMessage;

pub use error::TransportError;
pub use websocket::WebSocketConnector;

/// Outbound buffer per connection
pub const COMMAND_BUFFER: usize = 64;
/// Inbound buffer per connection
pub const EVENT_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Open,
    Message(GatewayMessage),
    /// Network or TLS failure; a `Closed` follows
    Error(String),
    /// `code` is `None` when the connection ended without a close frame
    Closed { code: Option<u16>, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    Send(GatewayMessage),
    Close { code: u16, reason: String },
}

/// Opens transports. The production implementation is [`WebSocketConnector`].
pub trait Connector: Send + Sync + 'static {
    /// Start connecting to `url`. Never fails synchronously: the outcome arrives as
    /// `Open` or `Error` + `Closed` on the returned transport.
    fn open(&self, url: &str) -> Transport;
}

/// Client side of a connection
#[derive(Debug)]
pub struct Transport {
    commands: mpsc::Sender<TransportCommand>,
    events: mpsc::Receiver<TransportEvent>,
}

/// Remote side of a [`Transport::channel`] pair
#[derive(Debug)]
pub struct TransportPeer {
    pub commands: mpsc::Receiver<TransportCommand>,
    pub events: mpsc::Sender<TransportEvent>,
}

impl Transport {
    #[must_use]
    pub fn new(
        commands: mpsc::Sender<TransportCommand>,
        events: mpsc::Receiver<TransportEvent>,
    ) -> Self {
        Self { commands, events }
    }

    /// A connected transport/peer pair
    #[must_use]
    pub fn channel() -> (Self, TransportPeer) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        (
            Self::new(command_tx, event_rx),
            TransportPeer {
                commands: command_rx,
                events: event_tx,
            },
        )
    }

    /// Queue a frame without waiting
    pub fn send(&self, message: GatewayMessage) -> Result<(), TransportError> {
        self.try_command(TransportCommand::Send(message))
    }

    /// Request an orderly close
    pub fn close(&self, code: u16, reason: impl Into<String>) -> Result<(), TransportError> {
        self.try_command(TransportCommand::Close {
            code,
            reason: reason.into(),
        })
    }

    /// Next inbound event; `None` once the peer is gone
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Resolves once another command fits in the outbound buffer. Never resolves after
    /// the peer is gone.
    pub fn writable(&self) -> impl Future<Output = ()> + Send + 'static {
        let commands = self.commands.clone();
        async move {
            if commands.reserve().await.is_err() {
                future::pending::<()>().await;
            }
        }
    }

    fn try_command(&self, command: TransportCommand) -> Result<(), TransportError> {
        self.commands.try_send(command).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => TransportError::BufferFull,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}
