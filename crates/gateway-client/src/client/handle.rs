//! Application-side handle to a running client

use gateway_core::{Snowflake, Status};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

use crate::broadcast::{ClientEvent, Notifier};
use crate::connection::ConnectionPhase;
use crate::protocol::PresenceUpdatePayload;

/// Requests from the application to the client task
#[derive(Debug, Clone)]
pub(crate) enum Command {
    Connect,
    Login(String),
    Disconnect,
    OpenChannel {
        guild_id: Snowflake,
        channel_id: Snowflake,
    },
    UpdatePresence(PresenceUpdatePayload),
    Shutdown,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Gateway client has stopped")]
    Stopped,
}

/// Cloneable handle to a running [`GatewayClient`](super::GatewayClient)
#[derive(Debug, Clone)]
pub struct GatewayHandle {
    commands: mpsc::Sender<Command>,
    notifier: Notifier,
}

impl GatewayHandle {
    pub(crate) fn new(commands: mpsc::Sender<Command>, notifier: Notifier) -> Self {
        Self { commands, notifier }
    }

    /// Open a connection with the current token
    pub async fn connect(&self) -> Result<(), ClientError> {
        self.send(Command::Connect).await
    }

    /// Set the token and connect
    pub async fn login(&self, token: impl Into<String>) -> Result<(), ClientError> {
        self.send(Command::Login(token.into())).await
    }

    /// Close the connection without reconnecting
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.send(Command::Disconnect).await
    }

    /// Subscribe to the member list window of a channel. Deduplicated; queued until the
    /// gateway is ready.
    pub async fn open_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
    ) -> Result<(), ClientError> {
        self.send(Command::OpenChannel {
            guild_id,
            channel_id,
        })
        .await
    }

    pub async fn update_presence(&self, status: Status) -> Result<(), ClientError> {
        self.send(Command::UpdatePresence(PresenceUpdatePayload::new(status)))
            .await
    }

    /// Stop the client task and wait for it to finish
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.send(Command::Shutdown).await?;
        self.commands.closed().await;
        Ok(())
    }

    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<ClientEvent> {
        self.notifier.subscribe()
    }

    #[must_use]
    pub fn status(&self) -> watch::Receiver<ConnectionPhase> {
        self.notifier.watch_phase()
    }

    /// "Gateway ready"
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.notifier.phase().is_ready()
    }

    async fn send(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::Stopped)
    }
}
