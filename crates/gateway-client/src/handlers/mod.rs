//! Control op code handlers
//!
//! Handles every server op code except Dispatch, which goes to the dispatch router.

mod error;
mod heartbeat;
mod hello;
mod session;

pub use error::{HandlerError, HandlerResult};
pub use heartbeat::HeartbeatHandler;
pub use hello::HelloHandler;
pub use session::SessionHandler;

use tokio::time::Instant;

use crate::connection::{Connection, SessionTracker};
use crate::protocol::{
    GatewayMessage, HelloPayload, IdentifyProperties, OpCode, PresenceUpdatePayload,
};

/// What the driver does after a control frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Continue,
    /// Drop this connection and reconnect; `resume` keeps the session
    Reconnect { resume: bool },
}

/// Everything a control handler may touch
pub struct ControlContext<'a> {
    pub connection: &'a mut Connection,
    pub session: &'a mut SessionTracker,
    pub token: Option<&'a str>,
    pub properties: &'a IdentifyProperties,
    /// Presence to announce in Identify
    pub presence: Option<&'a PresenceUpdatePayload>,
    pub now: Instant,
}

/// Routes control frames to their handlers
pub struct ControlDispatcher;

impl ControlDispatcher {
    /// Handle an incoming server control frame
    pub fn dispatch(
        ctx: &mut ControlContext<'_>,
        message: &GatewayMessage,
    ) -> HandlerResult<Directive> {
        if !message.op.is_inbound() {
            tracing::debug!(
                connection_id = %ctx.connection.id(),
                op = %message.op,
                "Ignoring client-only op code from server"
            );
            return Ok(Directive::Continue);
        }

        match message.op {
            OpCode::Hello => {
                let payload: HelloPayload = message
                    .payload()
                    .map_err(|source| HandlerError::invalid_payload("Hello", source))?;

                HelloHandler::handle(ctx, payload)
            }
            OpCode::HeartbeatAck => {
                HeartbeatHandler::ack(ctx);
                Ok(Directive::Continue)
            }
            OpCode::Heartbeat => HeartbeatHandler::requested(ctx),
            OpCode::Reconnect => SessionHandler::reconnect(ctx),
            OpCode::InvalidSession => {
                let resumable = message.as_invalid_session().unwrap_or(false);
                SessionHandler::invalid(ctx, resumable)
            }
            // Dispatch frames are routed before reaching here
            _ => {
                tracing::debug!(op = %message.op, "Unhandled server op code");
                Ok(Directive::Continue)
            }
        }
    }
}
