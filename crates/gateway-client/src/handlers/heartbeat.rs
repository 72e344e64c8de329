//! Heartbeat handlers (op 1 from the server, op 11)

use super::{ControlContext, Directive, HandlerResult};
use crate::protocol::GatewayMessage;

pub struct HeartbeatHandler;

impl HeartbeatHandler {
    /// HeartbeatAck: the next tick may send again
    pub fn ack(ctx: &mut ControlContext<'_>) {
        ctx.connection.heartbeat_mut().ack();
        tracing::trace!(connection_id = %ctx.connection.id(), "Heartbeat acknowledged");
    }

    /// The server asked for a heartbeat now. Answered immediately; the periodic cadence is
    /// left alone.
    pub fn requested(ctx: &mut ControlContext<'_>) -> HandlerResult<Directive> {
        let seq = ctx.session.sequence();
        tracing::trace!(connection_id = %ctx.connection.id(), seq = ?seq, "Heartbeat requested");
        ctx.connection.transport().send(GatewayMessage::heartbeat(seq))?;
        Ok(Directive::Continue)
    }
}
