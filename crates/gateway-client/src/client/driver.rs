//! The client event loop
//!
//! One task, one `select!`: transport events of the current connection, the heartbeat,
//! reconnect and typing deadlines, and application commands. Nothing else mutates client
//! state, so handlers run to completion before the next event is looked at.

use std::future::{self, Future};
use std::sync::Arc;

use gateway_core::{Snowflake, Stores};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use super::{ClientSettings, Command, GatewayHandle};
use crate::broadcast::{ClientEvent, Notifier};
use crate::connection::{
    Connection, ConnectionId, ConnectionPhase, HeartbeatTick, SessionTracker, SubscriptionManager,
};
use crate::dispatch::{DispatchContext, DispatchRouter, Lifecycle};
use crate::ephemeral::TypingTracker;
use crate::handlers::{ControlContext, ControlDispatcher, Directive, HelloHandler};
use crate::protocol::{
    CloseAction, CloseCode, GatewayMessage, LazyRequestPayload, OpCode, PresenceUpdatePayload,
};
use crate::reconnect::ReconnectController;
use crate::transport::{Connector, TransportEvent, COMMAND_BUFFER};

/// Close code for a disconnect the application asked for
const NORMAL_CLOSURE: u16 = 1000;

/// A gateway client that has not been started yet
pub struct GatewayClient {
    settings: ClientSettings,
    connector: Arc<dyn Connector>,
    stores: Stores,
    notifier: Notifier,
}

impl GatewayClient {
    #[must_use]
    pub fn new(settings: ClientSettings, connector: Arc<dyn Connector>, stores: Stores) -> Self {
        Self {
            settings,
            connector,
            stores,
            notifier: Notifier::default(),
        }
    }

    /// Start the event loop on the current runtime
    #[must_use]
    pub fn spawn(self) -> GatewayHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = GatewayHandle::new(command_tx, self.notifier.clone());

        let driver = Driver::new(self, command_rx);
        tokio::spawn(driver.run());

        handle
    }
}

struct Driver {
    settings: ClientSettings,
    connector: Arc<dyn Connector>,
    stores: Stores,
    notifier: Notifier,
    commands: mpsc::Receiver<Command>,
    router: DispatchRouter,

    /// Current attempt; replaced, never reused
    connection: Option<Connection>,
    next_connection_id: ConnectionId,

    session: SessionTracker,
    subscriptions: SubscriptionManager,
    typing: TypingTracker,
    reconnect: ReconnectController,
    token: Option<String>,
    /// Presence announced in Identify and sent on change while ready
    presence: Option<PresenceUpdatePayload>,
}

impl Driver {
    fn new(client: GatewayClient, commands: mpsc::Receiver<Command>) -> Self {
        let GatewayClient {
            settings,
            connector,
            stores,
            notifier,
        } = client;

        Self {
            subscriptions: SubscriptionManager::new(settings.member_list_range),
            typing: TypingTracker::new(settings.typing_expiry),
            reconnect: ReconnectController::new(settings.backoff.clone()),
            token: settings.token.clone(),
            settings,
            connector,
            stores,
            notifier,
            commands,
            router: DispatchRouter::with_default_handlers(),
            connection: None,
            next_connection_id: ConnectionId::new(1),
            session: SessionTracker::new(),
            presence: None,
        }
    }

    async fn run(mut self) {
        tracing::info!(url = %self.settings.url, "Gateway client started");

        loop {
            let heartbeat_at = self
                .connection
                .as_ref()
                .and_then(|connection| connection.heartbeat().deadline());
            let reconnect_at = self.reconnect.deadline();
            let typing_at = self.typing.next_deadline();
            let flush = self.pending_flush();

            tokio::select! {
                (connection_id, event) = next_event(self.connection.as_mut()) => {
                    self.on_transport_event(connection_id, event);
                }
                () = sleep_until(heartbeat_at) => self.on_heartbeat_due(),
                () = sleep_until(reconnect_at) => self.on_reconnect_due(),
                () = sleep_until(typing_at) => self.on_typing_due(),
                () = when_writable(flush) => self.flush_subscriptions(),
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.on_command(command),
                },
            }
        }

        self.close_connection(NORMAL_CLOSURE, "client shutdown");
        self.reconnect.cancel();
        tracing::info!("Gateway client stopped");
    }

    // === Commands ===

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Connect => self.open_connection(),
            Command::Login(token) => {
                self.token = Some(token);
                self.on_login();
            }
            Command::Disconnect => {
                tracing::info!("Disconnect requested");
                self.reconnect.cancel();
                self.session.reset();
                self.begin_close(NORMAL_CLOSURE, "client disconnect");
            }
            Command::OpenChannel {
                guild_id,
                channel_id,
            } => {
                let ready = self.phase().is_ready();
                if let Some(payload) =
                    self.subscriptions
                        .ensure_subscribed(guild_id, channel_id, ready)
                {
                    self.request_window(guild_id, channel_id, &payload);
                }
            }
            Command::UpdatePresence(payload) => {
                if self.phase().is_ready() {
                    match GatewayMessage::presence_update(&payload) {
                        Ok(message) => self.send(message),
                        Err(err) => tracing::warn!(error = %err, "Unencodable presence update"),
                    }
                }
                self.presence = Some(payload);
            }
            Command::Shutdown => {}
        }
    }

    // === Connection lifecycle ===

    fn phase(&self) -> ConnectionPhase {
        self.connection
            .as_ref()
            .map_or(ConnectionPhase::Idle, Connection::phase)
    }

    fn open_connection(&mut self) {
        if let Some(connection) = &self.connection {
            if connection.phase() != ConnectionPhase::Closing {
                tracing::debug!(
                    connection_id = %connection.id(),
                    phase = %connection.phase(),
                    "Already connected"
                );
                return;
            }
            // A closing connection is not waited for
            self.teardown();
        }
        self.reconnect.cancel();

        let id = self.next_connection_id;
        self.next_connection_id = id.next();

        tracing::info!(connection_id = %id, url = %self.settings.url, "Connecting");
        let transport = self.connector.open(self.settings.url.as_str());
        self.connection = Some(Connection::new(id, transport));
        self.notifier.set_phase(ConnectionPhase::Connecting);
    }

    /// Drop the current connection and everything scoped to it. Dropping the `Connection`
    /// drops its transport and heartbeat deadline, so nothing from it can fire later.
    fn teardown(&mut self) -> Option<Connection> {
        let connection = self.connection.take()?;
        self.subscriptions.reset();
        self.notifier.set_phase(ConnectionPhase::Closed);
        Some(connection)
    }

    /// Close the current connection from this side
    fn close_connection(&mut self, code: u16, reason: &str) {
        let Some(mut connection) = self.teardown() else {
            return;
        };
        connection.set_phase(ConnectionPhase::Closing);
        if let Err(err) = connection.transport().close(code, reason) {
            tracing::debug!(connection_id = %connection.id(), error = %err, "Close not delivered");
        }
    }

    /// Orderly close: readiness moves to Closing and the connection is kept until the
    /// transport reports `Closed`
    fn begin_close(&mut self, code: u16, reason: &str) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        connection.heartbeat_mut().disarm();
        connection.set_phase(ConnectionPhase::Closing);
        let delivered = connection.transport().close(code, reason);
        self.notifier.set_phase(ConnectionPhase::Closing);

        if let Err(err) = delivered {
            tracing::debug!(error = %err, "Close not delivered; dropping connection");
            self.teardown();
        }
    }

    /// A token arrived. Hello may already have been left unanswered, or a session may be
    /// running under other credentials.
    fn on_login(&mut self) {
        let Some((id, phase, saw_hello)) = self.connection.as_ref().map(|connection| {
            (
                connection.id(),
                connection.phase(),
                connection.heartbeat().is_armed(),
            )
        }) else {
            self.open_connection();
            return;
        };

        match phase {
            ConnectionPhase::AwaitingHello if saw_hello => self.start_session(),
            // Hello is still ahead and will use the new token
            ConnectionPhase::Connecting | ConnectionPhase::AwaitingHello => {}
            ConnectionPhase::Closing => self.open_connection(),
            _ => {
                tracing::info!(connection_id = %id, "Credentials changed; reconnecting");
                self.close_connection(CloseCode::Reconnecting.as_u16(), "credentials changed");
                self.session.reset();
                self.open_connection();
            }
        }
    }

    /// Identify or Resume on a connection that already saw Hello
    fn start_session(&mut self) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        let mut ctx = ControlContext {
            connection,
            session: &mut self.session,
            token: self.token.as_deref(),
            properties: &self.settings.properties,
            presence: self.presence.as_ref(),
            now: Instant::now(),
        };
        let started = HelloHandler::start_session(&mut ctx);
        let phase = ctx.connection.phase();
        self.notifier.set_phase(phase);

        if let Err(err) = started {
            tracing::warn!(error = %err, "Session not started");
        }
    }

    /// Close from this side and reconnect, e.g. heartbeat timeout or server request
    fn close_and_reconnect(&mut self, code: CloseCode, resume: bool) {
        tracing::warn!(
            code = code.as_u16(),
            reason = code.description(),
            resume,
            "Dropping connection"
        );
        self.close_connection(code.as_u16(), code.description());
        if !resume {
            self.session.reset();
        }
        self.notifier.publish(ClientEvent::Disconnected {
            code: Some(code.as_u16()),
        });
        self.schedule_reconnect(Some(code.as_u16()));
    }

    fn schedule_reconnect(&mut self, code: Option<u16>) {
        let Some(delay) = self.reconnect.schedule(Instant::now(), code) else {
            return;
        };
        let attempt = self.reconnect.attempts();
        tracing::info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            code = ?code,
            "Reconnect scheduled"
        );
        self.notifier
            .publish(ClientEvent::Reconnecting { attempt, delay });
    }

    fn on_reconnect_due(&mut self) {
        if self.reconnect.take_due(Instant::now()) {
            self.open_connection();
        }
    }

    // === Transport events ===

    fn on_transport_event(&mut self, connection_id: ConnectionId, event: Option<TransportEvent>) {
        if self.connection.as_ref().map(Connection::id) != Some(connection_id) {
            tracing::debug!(connection_id = %connection_id, "Event from stale connection ignored");
            return;
        }

        if self.phase() == ConnectionPhase::Closing {
            self.on_closing_event(event);
            return;
        }

        match event {
            Some(TransportEvent::Open) => {
                if let Some(connection) = self.connection.as_mut() {
                    connection.set_phase(ConnectionPhase::AwaitingHello);
                }
                self.notifier.set_phase(ConnectionPhase::AwaitingHello);
                tracing::info!(connection_id = %connection_id, "Transport open");
            }
            Some(TransportEvent::Message(message)) => self.on_message(&message),
            Some(TransportEvent::Error(error)) => {
                // A Closed event follows
                tracing::warn!(connection_id = %connection_id, error = %error, "Transport error");
            }
            Some(TransportEvent::Closed { code, reason }) => self.on_closed(code, &reason),
            None => self.on_closed(None, "transport ended"),
        }
    }

    /// Only the end of the transport matters while an orderly close is in flight
    fn on_closing_event(&mut self, event: Option<TransportEvent>) {
        let code = match event {
            Some(TransportEvent::Closed { code, .. }) => code,
            None => None,
            Some(other) => {
                tracing::trace!(event = ?other, "Ignoring event while closing");
                return;
            }
        };
        if let Some(connection) = self.teardown() {
            tracing::info!(connection_id = %connection.id(), code = ?code, "Connection closed");
        }
        self.notifier.publish(ClientEvent::Disconnected { code });
    }

    fn on_closed(&mut self, code: Option<u16>, reason: &str) {
        let Some(connection) = self.teardown() else {
            return;
        };

        match CloseAction::classify(code) {
            CloseAction::Terminal => {
                self.force_logout(code.unwrap_or_default(), reason);
            }
            CloseAction::Reconnect { resume } => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    code = ?code,
                    reason,
                    resume,
                    "Connection closed"
                );
                if !resume {
                    self.session.reset();
                }
                self.notifier.publish(ClientEvent::Disconnected { code });
                self.schedule_reconnect(code);
            }
        }
    }

    /// Non-recoverable close: no reconnect, credentials and cached state are discarded
    fn force_logout(&mut self, code: u16, reason: &str) {
        tracing::error!(
            code,
            reason,
            description = CloseCode::from_u16(code).map_or("unknown", CloseCode::description),
            "Session terminated by gateway"
        );

        self.reconnect.cancel();
        self.session.reset();
        self.token = None;
        self.subscriptions.clear();
        self.typing.drain();
        self.stores.clear_all();

        self.notifier.publish(ClientEvent::ForceLogout { code });
    }

    fn on_message(&mut self, message: &GatewayMessage) {
        tracing::trace!(op = %message.op, event = ?message.t, seq = ?message.s, "Frame received");

        if message.op == OpCode::Dispatch {
            self.on_dispatch(message);
            return;
        }

        let Some(connection) = self.connection.as_mut() else {
            return;
        };
        let mut ctx = ControlContext {
            connection,
            session: &mut self.session,
            token: self.token.as_deref(),
            properties: &self.settings.properties,
            presence: self.presence.as_ref(),
            now: Instant::now(),
        };
        let directive = ControlDispatcher::dispatch(&mut ctx, message);
        let phase = ctx.connection.phase();
        self.notifier.set_phase(phase);

        match directive {
            Ok(Directive::Continue) => {}
            Ok(Directive::Reconnect { resume }) => {
                self.close_and_reconnect(CloseCode::Reconnecting, resume);
            }
            Err(err) => {
                tracing::warn!(op = %message.op, error = %err, "Control frame not handled");
            }
        }
    }

    fn on_dispatch(&mut self, message: &GatewayMessage) {
        let Some(event) = message.t.as_deref() else {
            tracing::debug!(seq = ?message.s, "Dispatch without event type");
            self.session.observe(message.s);
            return;
        };

        let mut ctx = DispatchContext {
            stores: &self.stores,
            session: &mut self.session,
            typing: &mut self.typing,
            subscriptions: &mut self.subscriptions,
            notifier: &self.notifier,
            now: Instant::now(),
            lifecycle: None,
        };
        self.router.route(&mut ctx, event, message.s, &message.d);
        let lifecycle = ctx.lifecycle.take();

        match lifecycle {
            Some(Lifecycle::Ready {
                session_id,
                guild_count,
            }) => {
                tracing::info!(session_id = %session_id, guild_count, "Gateway ready");
                self.on_session_ready(ClientEvent::Ready {
                    session_id,
                    guild_count,
                });
            }
            Some(Lifecycle::Resumed) => {
                tracing::info!(seq = ?self.session.sequence(), "Session resumed");
                self.on_session_ready(ClientEvent::Resumed);
            }
            None => {}
        }
    }

    /// Ready or Resumed: usable connection, baseline backoff, queued subscriptions go out
    fn on_session_ready(&mut self, event: ClientEvent) {
        if let Some(connection) = self.connection.as_mut() {
            connection.set_phase(ConnectionPhase::Ready);
        }
        self.notifier.set_phase(ConnectionPhase::Ready);
        self.reconnect.reset();
        self.notifier.publish(event);

        self.flush_subscriptions();
    }

    // === Timers ===

    fn on_heartbeat_due(&mut self) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };

        match connection.heartbeat_mut().on_tick(Instant::now()) {
            Some(HeartbeatTick::Send) => {
                let seq = self.session.sequence();
                tracing::trace!(connection_id = %connection.id(), seq = ?seq, "Sending heartbeat");
                self.send(GatewayMessage::heartbeat(seq));
            }
            Some(HeartbeatTick::TimedOut) => {
                tracing::warn!(connection_id = %connection.id(), "Heartbeat not acknowledged");
                self.close_and_reconnect(CloseCode::HeartbeatTimeout, true);
            }
            None => {}
        }
    }

    fn on_typing_due(&mut self) {
        for key in self.typing.expire(Instant::now()) {
            self.notifier.publish(ClientEvent::TypingStopped {
                channel_id: key.channel_id,
                user_id: key.user_id,
            });
        }
    }

    // === Outbound ===

    fn send(&self, message: GatewayMessage) {
        let Some(connection) = &self.connection else {
            tracing::debug!(op = %message.op, "Not connected; frame dropped");
            return;
        };
        if let Err(err) = connection.transport().send(message) {
            tracing::warn!(connection_id = %connection.id(), error = %err, "Send failed");
        }
    }

    /// Send one member list request. Recorded as subscribed only once the transport took
    /// it; otherwise it is queued again. Returns `false` when the transport is full.
    fn request_window(
        &mut self,
        guild_id: Snowflake,
        channel_id: Snowflake,
        payload: &LazyRequestPayload,
    ) -> bool {
        let message = match GatewayMessage::lazy_request(payload) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "Unencodable lazy request");
                return true;
            }
        };
        let Some(connection) = &self.connection else {
            self.subscriptions.defer(guild_id, channel_id);
            return false;
        };

        match connection.transport().send(message) {
            Ok(()) => {
                tracing::debug!(
                    guild_id = %guild_id,
                    channel_id = %channel_id,
                    "Requesting member list window"
                );
                self.subscriptions.confirm(guild_id, channel_id);
                true
            }
            Err(err) => {
                tracing::debug!(
                    guild_id = %guild_id,
                    channel_id = %channel_id,
                    error = %err,
                    "Member list request deferred"
                );
                self.subscriptions.defer(guild_id, channel_id);
                false
            }
        }
    }

    /// Send queued requests until the transport is full
    fn flush_subscriptions(&mut self) {
        while let Some((guild_id, channel_id, payload)) = self.subscriptions.next_queued() {
            if !self.request_window(guild_id, channel_id, &payload) {
                break;
            }
        }
    }

    /// Wakes the loop when queued requests can make progress
    fn pending_flush(&self) -> Option<impl Future<Output = ()> + Send + 'static> {
        if !self.subscriptions.has_queued() || !self.phase().is_ready() {
            return None;
        }
        self.connection
            .as_ref()
            .map(|connection| connection.transport().writable())
    }
}

/// Next event of the current connection; pending forever when there is none
async fn next_event(
    connection: Option<&mut Connection>,
) -> (ConnectionId, Option<TransportEvent>) {
    match connection {
        Some(connection) => {
            let id = connection.id();
            (id, connection.transport.recv().await)
        }
        None => future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

async fn when_writable(writable: Option<impl Future<Output = ()>>) {
    match writable {
        Some(writable) => writable.await,
        None => future::pending().await,
    }
}
