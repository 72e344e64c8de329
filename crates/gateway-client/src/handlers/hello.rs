//! Hello handler (op 10)
//!
//! Starts the heartbeat and answers with Resume when a session is known, Identify
//! otherwise.

use std::time::Duration;

use super::{ControlContext, Directive, HandlerError, HandlerResult};
use crate::connection::ConnectionPhase;
use crate::protocol::{GatewayMessage, HelloPayload, IdentifyPayload, ResumePayload};

pub struct HelloHandler;

impl HelloHandler {
    pub fn handle(ctx: &mut ControlContext<'_>, payload: HelloPayload) -> HandlerResult<Directive> {
        let connection_id = ctx.connection.id();
        if ctx.connection.phase() != ConnectionPhase::AwaitingHello {
            tracing::debug!(
                connection_id = %connection_id,
                phase = %ctx.connection.phase(),
                "Ignoring repeated Hello"
            );
            return Ok(Directive::Continue);
        }

        let interval = Duration::from_millis(payload.heartbeat_interval);
        ctx.connection.heartbeat_mut().arm(interval, ctx.now);
        tracing::debug!(
            connection_id = %connection_id,
            interval_ms = payload.heartbeat_interval,
            "Heartbeat armed"
        );

        Self::start_session(ctx)
    }

    /// Send Resume when a session is known, Identify otherwise. Also used when a token
    /// arrives after Hello was left unanswered.
    pub fn start_session(ctx: &mut ControlContext<'_>) -> HandlerResult<Directive> {
        let connection_id = ctx.connection.id();
        let Some(token) = ctx.token else {
            tracing::error!(
                connection_id = %connection_id,
                "Hello received without an authentication token; not identifying"
            );
            return Err(HandlerError::MissingToken);
        };

        match ctx.session.session_id() {
            Some(session_id) => {
                let payload = ResumePayload {
                    token: token.to_string(),
                    session_id: session_id.to_string(),
                    seq: ctx.session.sequence().unwrap_or(0),
                };
                let message = GatewayMessage::resume(&payload)
                    .map_err(|source| HandlerError::invalid_payload("Resume", source))?;
                ctx.connection.transport().send(message)?;
                ctx.connection.set_phase(ConnectionPhase::Resuming);
                tracing::info!(
                    connection_id = %connection_id,
                    session_id = %payload.session_id,
                    seq = payload.seq,
                    "Resuming session"
                );
            }
            None => {
                let payload = IdentifyPayload {
                    token: token.to_string(),
                    properties: ctx.properties.clone(),
                    presence: ctx.presence.cloned(),
                };
                let message = GatewayMessage::identify(&payload)
                    .map_err(|source| HandlerError::invalid_payload("Identify", source))?;
                ctx.connection.transport().send(message)?;
                ctx.connection.set_phase(ConnectionPhase::Identifying);
                tracing::info!(connection_id = %connection_id, "Identifying");
            }
        }

        Ok(Directive::Continue)
    }
}
