//! WebSocket transport on tokio-tungstenite
//!
//! Each `open` spawns one task owning the socket. The task pumps outbound commands into the
//! sink and inbound frames into the event channel until either side closes.

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use super::{Connector, Transport, TransportCommand, TransportEvent, COMMAND_BUFFER, EVENT_BUFFER};
use crate::protocol::GatewayMessage;

#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Connector for WebSocketConnector {
    fn open(&self, url: &str) -> Transport {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

        tokio::spawn(run_socket(url.to_string(), command_rx, event_tx));

        Transport::new(command_tx, event_rx)
    }
}

async fn run_socket(
    url: String,
    mut commands: mpsc::Receiver<TransportCommand>,
    events: mpsc::Sender<TransportEvent>,
) {
    let socket = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok((socket, _response)) => socket,
        Err(err) => {
            tracing::warn!(url = %url, error = %err, "WebSocket connect failed");
            let _ = events.send(TransportEvent::Error(err.to_string())).await;
            let _ = events
                .send(TransportEvent::Closed {
                    code: None,
                    reason: err.to_string(),
                })
                .await;
            return;
        }
    };

    tracing::debug!(url = %url, "WebSocket connected");
    if events.send(TransportEvent::Open).await.is_err() {
        return;
    }

    let (mut sink, mut stream) = socket.split();

    let closed = loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(TransportCommand::Send(message)) => {
                    let json = match message.to_json() {
                        Ok(json) => json,
                        Err(err) => {
                            tracing::warn!(op = %message.op, error = %err, "Dropping unencodable frame");
                            continue;
                        }
                    };
                    tracing::trace!(frame = %json, "Sending frame");
                    if let Err(err) = sink.send(Message::Text(json)).await {
                        let _ = events.send(TransportEvent::Error(err.to_string())).await;
                        break TransportEvent::Closed { code: None, reason: err.to_string() };
                    }
                }
                Some(TransportCommand::Close { code, reason }) => {
                    let frame = CloseFrame {
                        code: WsCloseCode::from(code),
                        reason: reason.clone().into(),
                    };
                    let _ = sink.send(Message::Close(Some(frame))).await;
                    let _ = sink.close().await;
                    break TransportEvent::Closed { code: Some(code), reason };
                }
                None => {
                    // Owner dropped the transport
                    let _ = sink.close().await;
                    break TransportEvent::Closed { code: None, reason: "transport dropped".to_string() };
                }
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match GatewayMessage::from_json(&text) {
                    Ok(message) => {
                        if events.send(TransportEvent::Message(message)).await.is_err() {
                            let _ = sink.close().await;
                            return;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "Dropping undecodable frame");
                    }
                },
                Some(Ok(Message::Binary(data))) => {
                    tracing::debug!(len = data.len(), "Ignoring binary frame");
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = frame.map_or((None, String::new()), |f| {
                        (Some(u16::from(f.code)), f.reason.into_owned())
                    });
                    break TransportEvent::Closed { code, reason };
                }
                Some(Ok(_)) => {
                    // Ping/pong are answered by tungstenite
                }
                Some(Err(err)) => {
                    let _ = events.send(TransportEvent::Error(err.to_string())).await;
                    break TransportEvent::Closed { code: None, reason: err.to_string() };
                }
                None => {
                    break TransportEvent::Closed { code: None, reason: "stream ended".to_string() };
                }
            },
        }
    };

    tracing::debug!(url = %url, event = ?closed, "WebSocket closed");
    let _ = events.send(closed).await;
}
