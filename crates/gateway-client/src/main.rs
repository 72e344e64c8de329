//! Gateway client entry point
//!
//! Run with:
//! ```bash
//! GATEWAY_URL=wss://gateway.example.com GATEWAY_TOKEN=... cargo run -p gateway-client
//! ```
//!
//! Configuration is loaded from environment variables (and `.env`).

use std::sync::Arc;

use gateway_cache::CacheSet;
use gateway_client::{ClientEvent, ClientSettings, GatewayClient, WebSocketConnector};
use gateway_common::{try_init_tracing_with_config, AppConfig, AppError, AppResult, TracingConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, code = e.error_code(), "Gateway client exited");
        std::process::exit(e.exit_code());
    }
}

async fn run() -> AppResult<()> {
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    if let Err(e) = try_init_tracing_with_config(TracingConfig::for_environment(config.app.env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        url = %config.gateway.url,
        "Configuration loaded"
    );

    let cache = CacheSet::new();
    let settings = ClientSettings::from_config(&config);
    if settings.token.is_none() {
        warn!("GATEWAY_TOKEN is not set; the handshake will stop at Hello");
    }

    let handle = GatewayClient::new(settings, Arc::new(WebSocketConnector::new()), cache.stores())
        .spawn();
    let mut events = handle.events();
    handle.connect().await.map_err(AppError::gateway)?;

    let outcome = loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ClientEvent::ForceLogout { code }) => {
                    break Err(AppError::SessionTerminated(format!("close code {code}")));
                }
                Ok(event) => log_event(&event, &cache),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Client events lagged"),
                Err(RecvError::Closed) => break Err(AppError::gateway("client stopped unexpectedly")),
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    break Err(AppError::internal(e));
                }
                info!("Shutting down");
                break Ok(());
            }
        }
    };

    if let Err(e) = handle.shutdown().await {
        debug!(error = %e, "Client already stopped");
    }
    outcome
}

fn log_event(event: &ClientEvent, cache: &CacheSet) {
    match event {
        ClientEvent::Ready {
            session_id,
            guild_count,
        } => info!(
            session_id = %session_id,
            guilds = guild_count,
            channels = cache.channels.len(),
            users = cache.users.len(),
            "Ready"
        ),
        ClientEvent::Resumed => info!("Resumed"),
        ClientEvent::Reconnecting { attempt, delay } => info!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "Reconnecting"
        ),
        ClientEvent::Disconnected { code } => warn!(code = ?code, "Disconnected"),
        ClientEvent::TypingStarted {
            channel_id,
            user_id,
            ..
        } => debug!(channel_id = %channel_id, user_id = %user_id, "Typing started"),
        ClientEvent::TypingStopped {
            channel_id,
            user_id,
        } => debug!(channel_id = %channel_id, user_id = %user_id, "Typing stopped"),
        ClientEvent::ForceLogout { code } => error!(code, "Logged out"),
    }
}
