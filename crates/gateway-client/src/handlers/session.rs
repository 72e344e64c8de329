//! Reconnect (op 5) and InvalidSession (op 7) handlers

use super::{ControlContext, Directive, HandlerResult};

pub struct SessionHandler;

impl SessionHandler {
    /// The server wants this connection gone; the session stays resumable
    pub fn reconnect(ctx: &mut ControlContext<'_>) -> HandlerResult<Directive> {
        tracing::info!(connection_id = %ctx.connection.id(), "Server requested reconnect");
        Ok(Directive::Reconnect { resume: true })
    }

    /// A non-resumable session is discarded so the next handshake is a fresh Identify
    pub fn invalid(ctx: &mut ControlContext<'_>, resumable: bool) -> HandlerResult<Directive> {
        tracing::warn!(
            connection_id = %ctx.connection.id(),
            resumable,
            "Session invalidated"
        );
        if !resumable {
            ctx.session.reset();
        }
        Ok(Directive::Reconnect { resume: resumable })
    }
}
