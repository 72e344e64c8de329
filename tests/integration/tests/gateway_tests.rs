//! Gateway client integration tests
//!
//! Most tests drive the client through `MockPeer` on a paused clock, so timer behaviour
//! (heartbeat cadence, backoff, typing expiry) is asserted to the millisecond. The last
//! test runs a full handshake over a real WebSocket.

use std::sync::Arc;
use std::time::Duration;

use gateway_cache::CacheSet;
use gateway_client::protocol::{GatewayMessage, LazyRequestPayload, OpCode, ResumePayload};
use gateway_client::reconnect::BackoffPolicy;
use gateway_client::transport::{TransportEvent, COMMAND_BUFFER};
use gateway_client::{
    ClientEvent, ClientSettings, ConnectionPhase, GatewayClient, GatewayUrl, WebSocketConnector,
};
use gateway_core::{ChannelStore, GuildStore, Snowflake, Status, UserStore};
use integration_tests::*;
use tokio::time::{sleep, timeout, Instant};

fn heartbeat_seq(frame: &GatewayMessage) -> Option<u64> {
    assert_eq!(frame.op, OpCode::Heartbeat, "expected a heartbeat, got {frame}");
    frame.as_heartbeat_seq().flatten()
}

// ============================================================================
// Member list subscriptions
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_open_channel_subscribes_once() {
    let mut client = TestClient::start();
    let mut peer = client.connect_ready().await;
    let random = Snowflake::new(201);

    client.handle.open_channel(GUILD_A, GENERAL).await.unwrap();
    client.handle.open_channel(GUILD_A, GENERAL).await.unwrap();
    client.handle.open_channel(GUILD_A, random).await.unwrap();
    client.handle.update_presence(Status::Idle).await.unwrap();

    let first = peer.next_frame_skipping_heartbeats().await;
    assert_eq!(first.op, OpCode::LazyRequest);
    assert_eq!(
        first.payload::<LazyRequestPayload>().unwrap(),
        LazyRequestPayload::window(GUILD_A, GENERAL, 99)
    );

    let second = peer.next_frame_skipping_heartbeats().await;
    assert_eq!(second.op, OpCode::LazyRequest);
    assert_eq!(
        second.payload::<LazyRequestPayload>().unwrap(),
        LazyRequestPayload::window(GUILD_A, random, 99)
    );

    // The duplicate produced nothing between the two requests and the presence update
    let third = peer.next_frame_skipping_heartbeats().await;
    assert_eq!(third.op, OpCode::PresenceUpdate);
}

#[tokio::test(start_paused = true)]
async fn test_subscription_before_ready_is_flushed_on_ready() {
    let mut client = TestClient::start();
    client.handle.connect().await.unwrap();
    client.handle.open_channel(GUILD_A, GENERAL).await.unwrap();

    let (mut peer, identify) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(identify.op, OpCode::Identify);

    peer.dispatch("READY", 1, ready("abc")).await;
    let request = peer.next_frame_skipping_heartbeats().await;
    assert_eq!(request.op, OpCode::LazyRequest);
    assert_eq!(
        request.payload::<LazyRequestPayload>().unwrap(),
        LazyRequestPayload::window(GUILD_A, GENERAL, 99)
    );
}

#[tokio::test(start_paused = true)]
async fn test_subscriptions_beyond_transport_buffer_all_sent() {
    let mut client = TestClient::start();
    client.handle.connect().await.unwrap();

    let channels: Vec<Snowflake> = (0..COMMAND_BUFFER as u64 + 16)
        .map(|i| Snowflake::new(1_000 + i))
        .collect();
    for &channel in &channels {
        client.handle.open_channel(GUILD_A, channel).await.unwrap();
    }

    let (mut peer, identify) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(identify.op, OpCode::Identify);
    peer.dispatch("READY", 1, ready("abc")).await;

    for &channel in &channels {
        let request = peer.next_frame_skipping_heartbeats().await;
        assert_eq!(request.op, OpCode::LazyRequest);
        assert_eq!(
            request.payload::<LazyRequestPayload>().unwrap(),
            LazyRequestPayload::window(GUILD_A, channel, 99)
        );
    }

    // Every channel is subscribed now, so opening the last one again sends nothing
    let last = *channels.last().unwrap();
    client.handle.open_channel(GUILD_A, last).await.unwrap();
    client.handle.update_presence(Status::Idle).await.unwrap();
    assert_eq!(
        peer.next_frame_skipping_heartbeats().await.op,
        OpCode::PresenceUpdate
    );
}

// ============================================================================
// Heartbeats
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_heartbeat_cadence() {
    let interval = Duration::from_millis(30_000);
    let mut client = TestClient::start();
    client.handle.connect().await.unwrap();

    let mut peer = client.next_peer().await;
    peer.open().await;
    peer.hello(30_000).await;
    let hello_at = Instant::now();

    assert_eq!(peer.next_frame().await.op, OpCode::Identify);

    let mut sent_at = Vec::new();
    for _ in 0..4 {
        let frame = peer.next_frame().await;
        assert_eq!(frame.op, OpCode::Heartbeat);
        sent_at.push(Instant::now());
        peer.ack().await;
    }

    assert!(sent_at[0] - hello_at < interval);
    for pair in sent_at.windows(2) {
        assert_eq!(pair[1] - pair[0], interval);
    }
}

#[tokio::test(start_paused = true)]
async fn test_missing_ack_reconnects_once() {
    let mut client = TestClient::start();
    client.handle.connect().await.unwrap();

    let (mut peer, identify) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(identify.op, OpCode::Identify);

    // First heartbeat goes unanswered
    assert_eq!(peer.next_frame().await.op, OpCode::Heartbeat);
    assert_eq!(peer.expect_close().await, 4900);
    let closed_at = Instant::now();

    let _second = client.next_peer().await;
    assert_eq!(Instant::now() - closed_at, Duration::from_secs(1));
    assert_eq!(client.connector.opened(), 2);

    // The new connection never opens; no further attempt is made on its behalf
    assert!(client.no_connection_within(Duration::from_secs(600)).await);

    let reconnecting = client
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, ClientEvent::Reconnecting { .. }))
        .count();
    assert_eq!(reconnecting, 1);
}

#[tokio::test(start_paused = true)]
async fn test_heartbeat_carries_latest_sequence() {
    let mut client = TestClient::start();
    let mut peer = client.connect_ready().await;

    for seq in [5, 7, 9] {
        peer.dispatch("SOMETHING_NEW", seq, serde_json::json!({})).await;
    }
    let dispatched_at = Instant::now();

    loop {
        let frame = peer.next_frame().await;
        let seq = heartbeat_seq(&frame);
        peer.ack().await;
        if Instant::now() > dispatched_at {
            assert_eq!(seq, Some(9));
            break;
        }
    }
}

// ============================================================================
// Dispatch and cache
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_channel_for_unknown_guild_is_dropped() {
    let mut client = TestClient::start();
    let peer = client.connect_ready().await;
    let dangling = Snowflake::new(300);
    let marker = Snowflake::new(301);

    peer.dispatch("CHANNEL_CREATE", 2, channel_create(dangling, UNKNOWN_GUILD, "lost"))
        .await;
    peer.dispatch("CHANNEL_CREATE", 3, channel_create(marker, GUILD_A, "marker"))
        .await;

    let channels = client.cache.channels.clone();
    wait_until(|| channels.contains(marker)).await;
    assert!(!client.cache.channels.contains(dangling));
    assert!(!client.cache.guilds.contains(UNKNOWN_GUILD));
}

#[tokio::test(start_paused = true)]
async fn test_ready_populates_cache() {
    let mut client = TestClient::start();
    let _peer = client.connect_ready().await;

    assert_eq!(client.cache.users.current().map(|user| user.id), Some(CURRENT_USER));
    assert!(client.cache.guilds.contains(GUILD_A));
    assert_eq!(
        client.cache.channels.get(GENERAL).and_then(|channel| channel.guild_id),
        Some(GUILD_A)
    );
    assert!(client.handle.is_ready());
    assert_eq!(*client.handle.status().borrow(), ConnectionPhase::Ready);
}

// ============================================================================
// Typing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_typing_renewals_expire_once() {
    let mut client = TestClient::start();
    let peer = client.connect_ready().await;
    client.drain_events();

    for seq in 2..=4 {
        if seq > 2 {
            sleep(Duration::from_secs(2)).await;
        }
        peer.dispatch("TYPING_START", seq, typing_start(GENERAL, OTHER_USER))
            .await;
    }
    let last_signal = Instant::now();

    let mut started = 0;
    loop {
        match client.next_event().await {
            ClientEvent::TypingStarted {
                channel_id,
                user_id,
                ..
            } => {
                assert_eq!((channel_id, user_id), (GENERAL, OTHER_USER));
                started += 1;
            }
            ClientEvent::TypingStopped {
                channel_id,
                user_id,
            } => {
                assert_eq!((channel_id, user_id), (GENERAL, OTHER_USER));
                break;
            }
            _ => {}
        }
    }

    assert_eq!(started, 1);
    assert_eq!(Instant::now() - last_signal, TYPING_EXPIRY);
}

#[tokio::test(start_paused = true)]
async fn test_message_from_typing_user_stops_typing() {
    let mut client = TestClient::start();
    let peer = client.connect_ready().await;

    peer.dispatch("TYPING_START", 2, typing_start(GENERAL, OTHER_USER))
        .await;
    client
        .wait_for_event(|event| matches!(event, ClientEvent::TypingStarted { .. }))
        .await;

    let sent_at = Instant::now();
    peer.dispatch(
        "MESSAGE_CREATE",
        3,
        message_create(Snowflake::new(500), GENERAL, OTHER_USER, "hi"),
    )
    .await;
    client
        .wait_for_event(|event| matches!(event, ClientEvent::TypingStopped { .. }))
        .await;
    assert!(Instant::now() - sent_at < TYPING_EXPIRY);
}

// ============================================================================
// Close handling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_authentication_failure_forces_logout() {
    let mut client = TestClient::start();
    let peer = client.connect_ready().await;

    peer.close(4004).await;
    let event = client
        .wait_for_event(|event| matches!(event, ClientEvent::ForceLogout { .. }))
        .await;
    assert_eq!(event, ClientEvent::ForceLogout { code: 4004 });

    assert!(client.no_connection_within(Duration::from_secs(600)).await);
    let events = client.drain_events();
    assert!(!events
        .iter()
        .any(|event| matches!(event, ClientEvent::ForceLogout { .. })));
    assert!(!events
        .iter()
        .any(|event| matches!(event, ClientEvent::Reconnecting { .. })));
    assert!(!client.cache.guilds.contains(GUILD_A));

    // Credentials are gone, so logging in again starts a fresh session
    client.handle.login("new-token").await.unwrap();
    let (_peer, handshake) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(handshake.op, OpCode::Identify);
    assert_eq!(handshake.d["token"], "new-token");
}

#[tokio::test(start_paused = true)]
async fn test_unknown_error_resumes() {
    let mut client = TestClient::start();
    let peer = client.connect_ready().await;
    peer.dispatch("SOMETHING_NEW", 4, serde_json::json!({})).await;

    peer.close(4000).await;
    assert_eq!(
        client
            .wait_for_event(|event| matches!(event, ClientEvent::Reconnecting { .. }))
            .await,
        ClientEvent::Reconnecting {
            attempt: 1,
            delay: Duration::from_secs(1)
        }
    );

    let (peer, resume) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(resume.op, OpCode::Resume);
    assert_eq!(
        resume.payload::<ResumePayload>().unwrap(),
        ResumePayload {
            token: TEST_TOKEN.to_string(),
            session_id: "abc".to_string(),
            seq: 4,
        }
    );

    peer.dispatch("RESUMED", 5, serde_json::json!({})).await;
    client
        .wait_for_event(|event| *event == ClientEvent::Resumed)
        .await;
    assert!(client.handle.is_ready());
    // Cache survives a resume
    assert!(client.cache.guilds.contains(GUILD_A));
}

#[tokio::test(start_paused = true)]
async fn test_server_reconnect_request_resumes() {
    let mut client = TestClient::start();
    let mut peer = client.connect_ready().await;

    peer.send(GatewayMessage::reconnect()).await;
    assert_eq!(peer.expect_close().await, 4901);

    let (_peer, resume) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(resume.op, OpCode::Resume);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_session_identifies_again() {
    let mut client = TestClient::start();
    let mut peer = client.connect_ready().await;

    peer.send(GatewayMessage::invalid_session(false)).await;
    assert_eq!(peer.expect_close().await, 4901);

    let (_peer, handshake) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(handshake.op, OpCode::Identify);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_does_not_reconnect() {
    let mut client = TestClient::start();
    let mut peer = client.connect_ready().await;
    let status = client.handle.status();

    client.handle.disconnect().await.unwrap();
    assert_eq!(peer.expect_close().await, 1000);
    assert_eq!(*status.borrow(), ConnectionPhase::Closing);
    assert!(!client.handle.is_ready());

    peer.close(1000).await;
    client
        .wait_for_event(|event| *event == ClientEvent::Disconnected { code: Some(1000) })
        .await;
    assert_eq!(*status.borrow(), ConnectionPhase::Closed);

    assert!(client.no_connection_within(Duration::from_secs(600)).await);
    assert!(!client
        .drain_events()
        .iter()
        .any(|event| matches!(event, ClientEvent::Reconnecting { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_events_from_replaced_connection_are_ignored() {
    let mut client = TestClient::start();
    let old = client.connect_ready().await;

    old.close(4000).await;
    let (new, resume) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(resume.op, OpCode::Resume);
    new.dispatch("RESUMED", 2, serde_json::json!({})).await;
    client
        .wait_for_event(|event| *event == ClientEvent::Resumed)
        .await;

    let stale = Snowflake::new(250);
    old.dispatch("CHANNEL_CREATE", 50, channel_create(stale, GUILD_A, "stale"))
        .await;
    old.close(4004).await;

    let fresh = Snowflake::new(251);
    new.dispatch("CHANNEL_CREATE", 3, channel_create(fresh, GUILD_A, "fresh"))
        .await;
    let channels = client.cache.channels.clone();
    wait_until(|| channels.contains(fresh)).await;

    assert!(!client.cache.channels.contains(stale));
    assert!(client.handle.is_ready());
    assert!(!client
        .drain_events()
        .iter()
        .any(|event| matches!(event, ClientEvent::ForceLogout { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_error_then_closed_reconnects_once() {
    let mut client = TestClient::start();
    let peer = client.connect_ready().await;

    peer.emit(TransportEvent::Error("connection reset".to_string()))
        .await;
    peer.emit(TransportEvent::Closed {
        code: None,
        reason: "connection reset".to_string(),
    })
    .await;

    let (_peer, resume) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(resume.op, OpCode::Resume);
    assert_eq!(client.connector.opened(), 2);

    let reconnecting = client
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, ClientEvent::Reconnecting { .. }))
        .count();
    assert_eq!(reconnecting, 1);
}

#[tokio::test(start_paused = true)]
async fn test_login_after_unanswered_hello_identifies() {
    let settings = ClientSettings::new(GatewayUrl::resolve("ws://gateway.test", 9, "json"))
        .with_backoff(BackoffPolicy::fixed(
            Duration::from_secs(1),
            Duration::from_secs(60),
        ));
    let mut client = TestClient::start_with(settings);
    client.handle.connect().await.unwrap();

    let mut peer = client.next_peer().await;
    peer.open().await;
    peer.hello(HEARTBEAT_INTERVAL_MS).await;
    // Hello was handled: heartbeats run but no handshake went out
    assert_eq!(peer.next_frame().await.op, OpCode::Heartbeat);
    peer.ack().await;

    client.handle.login("late-token").await.unwrap();
    let identify = peer.next_frame_skipping_heartbeats().await;
    assert_eq!(identify.op, OpCode::Identify);
    assert_eq!(identify.d["token"], "late-token");

    peer.dispatch("READY", 1, ready("abc")).await;
    client
        .wait_for_event(|event| matches!(event, ClientEvent::Ready { .. }))
        .await;
    assert_eq!(client.connector.opened(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_login_while_ready_starts_new_session() {
    let mut client = TestClient::start();
    let mut peer = client.connect_ready().await;

    client.handle.login("other-token").await.unwrap();
    assert_eq!(peer.expect_close().await, 4901);

    let (_peer, identify) = client.handshake(HEARTBEAT_INTERVAL_MS).await;
    assert_eq!(identify.op, OpCode::Identify);
    assert_eq!(identify.d["token"], "other-token");
    assert_eq!(client.connector.opened(), 2);
}

// ============================================================================
// End to end
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_session_scenario() {
    let mut client = TestClient::start();
    client.handle.connect().await.unwrap();

    let (peer, identify) = client.handshake(30_000).await;
    assert_eq!(identify.op, OpCode::Identify);
    assert_eq!(identify.d["token"], TEST_TOKEN);

    peer.dispatch("READY", 1, ready("abc")).await;
    assert_eq!(
        client
            .wait_for_event(|event| matches!(event, ClientEvent::Ready { .. }))
            .await,
        ClientEvent::Ready {
            session_id: "abc".to_string(),
            guild_count: 1
        }
    );

    let before = client.cache.channels.by_guild(GUILD_A).len();
    let created = Snowflake::new(202);
    peer.dispatch("CHANNEL_CREATE", 2, channel_create(created, GUILD_A, "new"))
        .await;
    let channels = client.cache.channels.clone();
    wait_until(|| channels.contains(created)).await;
    assert_eq!(client.cache.channels.by_guild(GUILD_A).len(), before + 1);

    peer.close(4004).await;
    client
        .wait_for_event(|event| matches!(event, ClientEvent::ForceLogout { code: 4004 }))
        .await;
    assert!(client.no_connection_within(Duration::from_secs(600)).await);
    assert_eq!(client.connector.opened(), 1);
    assert!(!client.drain_events().iter().any(|event| matches!(
        event,
        ClientEvent::Reconnecting { .. } | ClientEvent::ForceLogout { .. }
    )));
}

#[tokio::test]
async fn test_websocket_handshake() {
    let mut gateway = MockGateway::start().await.unwrap();
    let cache = CacheSet::new();
    let settings = ClientSettings::new(GatewayUrl::resolve(&gateway.url(), 9, "json"))
        .with_token(TEST_TOKEN);

    let handle = GatewayClient::new(settings, Arc::new(WebSocketConnector::new()), cache.stores())
        .spawn();
    let mut events = handle.events();
    handle.connect().await.unwrap();

    let identify = gateway.expect_frame(OpCode::Identify).await;
    assert_eq!(identify.d["token"], TEST_TOKEN);

    let ready = timeout(Duration::from_secs(10), async {
        loop {
            if let Ok(ClientEvent::Ready { session_id, .. }) = events.recv().await {
                return session_id;
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(ready, "ws-session");
    assert!(cache.guilds.contains(GUILD_A));
    assert!(cache.channels.contains(GENERAL));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unreachable_gateway_reconnects_once() {
    // Nothing listens on a port that was just released
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let settings = ClientSettings::new(GatewayUrl::resolve(
        &format!("ws://{addr}/gateway"),
        9,
        "json",
    ))
    .with_token(TEST_TOKEN)
    .with_backoff(BackoffPolicy::fixed(
        Duration::from_secs(30),
        Duration::from_secs(60),
    ));
    let handle = GatewayClient::new(
        settings,
        Arc::new(WebSocketConnector::new()),
        CacheSet::new().stores(),
    )
    .spawn();
    let mut events = handle.events();
    handle.connect().await.unwrap();

    let first = timeout(Duration::from_secs(10), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first, ClientEvent::Disconnected { code: None });
    let second = timeout(Duration::from_secs(10), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        second,
        ClientEvent::Reconnecting {
            attempt: 1,
            delay: Duration::from_secs(30)
        }
    );

    // The error and the close that follows it count as one failure
    assert!(timeout(Duration::from_millis(500), events.recv())
        .await
        .is_err());

    handle.shutdown().await.unwrap();
}
