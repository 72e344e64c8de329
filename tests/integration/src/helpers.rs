//! Test helpers for integration tests
//!
//! `MockConnector` hands every transport the client opens to the test as a `MockPeer`, which
//! plays the server side frame by frame. `MockGateway` is a real WebSocket server on
//! localhost for end-to-end runs.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use gateway_cache::CacheSet;
use gateway_client::connection::GatewayUrl;
use gateway_client::protocol::{GatewayMessage, OpCode};
use gateway_client::reconnect::BackoffPolicy;
use gateway_client::transport::{Connector, Transport, TransportCommand, TransportEvent};
use gateway_client::{ClientEvent, ClientSettings, GatewayClient, GatewayHandle};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::fixtures;

/// Upper bound for any single wait. Instant under a paused clock.
pub const WAIT: Duration = Duration::from_secs(120);

pub const TEST_TOKEN: &str = "test-token";

/// Long enough that tests not about heartbeats never see a timeout
pub const HEARTBEAT_INTERVAL_MS: u64 = 45_000;

pub const TYPING_EXPIRY: Duration = Duration::from_secs(10);

/// Settings with a fixed 1s, 2s, 4s... backoff and no jitter
pub fn test_settings() -> ClientSettings {
    ClientSettings::new(GatewayUrl::resolve("ws://gateway.test", 9, "json"))
        .with_token(TEST_TOKEN)
        .with_backoff(BackoffPolicy::fixed(
            Duration::from_secs(1),
            Duration::from_secs(60),
        ))
        .with_typing_expiry(TYPING_EXPIRY)
}

/// Poll `condition` until it holds
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..1_000 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}

// ============================================================================
// Scripted transport
// ============================================================================

/// Connector that records every `open` and hands the remote end to the test
pub struct MockConnector {
    peers: mpsc::UnboundedSender<MockPeer>,
    opened: AtomicUsize,
}

impl MockConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<MockPeer>) {
        let (peers, peer_rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            peers,
            opened: AtomicUsize::new(0),
        });
        (connector, peer_rx)
    }

    /// Number of connection attempts so far
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    fn open(&self, url: &str) -> Transport {
        let (transport, peer) = Transport::channel();
        self.opened.fetch_add(1, Ordering::SeqCst);
        let _ = self.peers.send(MockPeer {
            url: url.to_string(),
            commands: peer.commands,
            events: peer.events,
        });
        transport
    }
}

/// Server side of one scripted connection
pub struct MockPeer {
    pub url: String,
    commands: mpsc::Receiver<TransportCommand>,
    events: mpsc::Sender<TransportEvent>,
}

impl MockPeer {
    /// Deliver an event; ignored when the client already dropped the connection
    pub async fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event).await;
    }

    pub async fn open(&self) {
        self.emit(TransportEvent::Open).await;
    }

    pub async fn send(&self, message: GatewayMessage) {
        self.emit(TransportEvent::Message(message)).await;
    }

    pub async fn hello(&self, heartbeat_interval: u64) {
        self.send(GatewayMessage::hello(heartbeat_interval)).await;
    }

    pub async fn dispatch(&self, event: &str, seq: u64, data: Value) {
        self.send(GatewayMessage::dispatch(event, seq, data)).await;
    }

    pub async fn ack(&self) {
        self.send(GatewayMessage::heartbeat_ack()).await;
    }

    pub async fn close(&self, code: u16) {
        self.emit(TransportEvent::Closed {
            code: Some(code),
            reason: String::new(),
        })
        .await;
    }

    pub async fn next_command(&mut self) -> TransportCommand {
        timeout(WAIT, self.commands.recv())
            .await
            .expect("timed out waiting for the client")
            .expect("client dropped the transport")
    }

    /// Next frame sent by the client
    pub async fn next_frame(&mut self) -> GatewayMessage {
        match self.next_command().await {
            TransportCommand::Send(message) => message,
            TransportCommand::Close { code, reason } => {
                panic!("expected a frame, client closed with {code} ({reason})")
            }
        }
    }

    /// Next frame that is not a heartbeat; heartbeats on the way are acknowledged
    pub async fn next_frame_skipping_heartbeats(&mut self) -> GatewayMessage {
        loop {
            let frame = self.next_frame().await;
            if frame.op == OpCode::Heartbeat {
                self.ack().await;
                continue;
            }
            return frame;
        }
    }

    /// Wait for the client to close this connection, ignoring heartbeats
    pub async fn expect_close(&mut self) -> u16 {
        loop {
            match self.next_command().await {
                TransportCommand::Close { code, .. } => return code,
                TransportCommand::Send(frame) if frame.op == OpCode::Heartbeat => {}
                TransportCommand::Send(frame) => panic!("expected close, got {frame}"),
            }
        }
    }
}

// ============================================================================
// Client under test
// ============================================================================

/// A running client wired to a `MockConnector` and a fresh cache
pub struct TestClient {
    pub handle: GatewayHandle,
    pub cache: CacheSet,
    pub connector: Arc<MockConnector>,
    peers: mpsc::UnboundedReceiver<MockPeer>,
    events: broadcast::Receiver<ClientEvent>,
}

impl TestClient {
    pub fn start() -> Self {
        Self::start_with(test_settings())
    }

    pub fn start_with(settings: ClientSettings) -> Self {
        let (connector, peers) = MockConnector::new();
        let cache = CacheSet::new();
        let handle = GatewayClient::new(settings, connector.clone(), cache.stores()).spawn();
        let events = handle.events();

        Self {
            handle,
            cache,
            connector,
            peers,
            events,
        }
    }

    pub async fn next_peer(&mut self) -> MockPeer {
        timeout(WAIT, self.peers.recv())
            .await
            .expect("timed out waiting for a connection attempt")
            .expect("connector dropped")
    }

    /// `true` if no connection attempt happens within `within`
    pub async fn no_connection_within(&mut self, within: Duration) -> bool {
        timeout(within, self.peers.recv()).await.is_err()
    }

    pub async fn next_event(&mut self) -> ClientEvent {
        timeout(WAIT, self.events.recv())
            .await
            .expect("timed out waiting for a client event")
            .expect("client event channel closed")
    }

    pub async fn wait_for_event(&mut self, matches: impl Fn(&ClientEvent) -> bool) -> ClientEvent {
        loop {
            let event = self.next_event().await;
            if matches(&event) {
                return event;
            }
        }
    }

    /// Events published so far and not yet consumed
    pub fn drain_events(&mut self) -> Vec<ClientEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    /// Answer a connection attempt with Hello and return the handshake frame
    pub async fn handshake(&mut self, heartbeat_interval: u64) -> (MockPeer, GatewayMessage) {
        let mut peer = self.next_peer().await;
        peer.open().await;
        peer.hello(heartbeat_interval).await;
        let frame = peer.next_frame_skipping_heartbeats().await;
        (peer, frame)
    }

    /// Connect and complete a fresh Identify handshake with session `abc` at sequence 1
    pub async fn connect_ready(&mut self) -> MockPeer {
        self.handle.connect().await.expect("client stopped");
        let (peer, identify) = self.handshake(HEARTBEAT_INTERVAL_MS).await;
        assert_eq!(identify.op, OpCode::Identify);

        peer.dispatch("READY", 1, fixtures::ready("abc")).await;
        self.wait_for_event(|event| matches!(event, ClientEvent::Ready { .. }))
            .await;
        peer
    }
}

// ============================================================================
// WebSocket gateway
// ============================================================================

/// Minimal gateway server: Hello on connect, READY after Identify, acks heartbeats.
/// Every frame the client sends is forwarded to `frames`.
pub struct MockGateway {
    pub addr: SocketAddr,
    pub frames: mpsc::UnboundedReceiver<GatewayMessage>,
    _handle: JoinHandle<()>,
}

impl MockGateway {
    pub async fn start() -> Result<Self> {
        let (frame_tx, frames) = mpsc::unbounded_channel();
        let app = Router::new()
            .route("/gateway", get(upgrade))
            .with_state(frame_tx);

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            frames,
            _handle: handle,
        })
    }

    pub fn url(&self) -> String {
        format!("ws://{}/gateway", self.addr)
    }

    /// Next client frame with op `op`
    pub async fn expect_frame(&mut self, op: OpCode) -> GatewayMessage {
        loop {
            let frame = timeout(Duration::from_secs(10), self.frames.recv())
                .await
                .expect("timed out waiting for a client frame")
                .expect("gateway stopped");
            if frame.op == op {
                return frame;
            }
        }
    }
}

async fn upgrade(
    ws: WebSocketUpgrade,
    State(frames): State<mpsc::UnboundedSender<GatewayMessage>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, frames))
}

async fn serve_socket(mut socket: WebSocket, frames: mpsc::UnboundedSender<GatewayMessage>) {
    if send_frame(&mut socket, &GatewayMessage::hello(HEARTBEAT_INTERVAL_MS))
        .await
        .is_err()
    {
        return;
    }

    let mut seq = 0;
    while let Some(Ok(message)) = socket.recv().await {
        let Message::Text(text) = message else {
            continue;
        };
        let Ok(frame) = GatewayMessage::from_json(&text) else {
            continue;
        };

        let reply = match frame.op {
            OpCode::Identify => {
                seq += 1;
                Some(GatewayMessage::dispatch(
                    "READY",
                    seq,
                    fixtures::ready("ws-session"),
                ))
            }
            OpCode::Heartbeat => Some(GatewayMessage::heartbeat_ack()),
            _ => None,
        };
        let _ = frames.send(frame);

        if let Some(reply) = reply {
            if send_frame(&mut socket, &reply).await.is_err() {
                return;
            }
        }
    }
}

async fn send_frame(socket: &mut WebSocket, frame: &GatewayMessage) -> Result<()> {
    let json = frame.to_json()?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}
