//! PRESENCE_UPDATE and TYPING_START

use gateway_core::Presence;
use serde_json::Value;

use super::decode;
use crate::broadcast::ClientEvent;
use crate::dispatch::DispatchContext;
use crate::ephemeral::TypingKey;
use crate::events::{GatewayEventType, TypingStartEvent};
use crate::handlers::HandlerResult;

pub(super) fn presence_update(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let presence: Presence = decode(GatewayEventType::PresenceUpdate, payload)?;
    tracing::trace!(user_id = %presence.user_id(), status = %presence.status, "Presence update");
    ctx.stores.presences.upsert(presence);
    Ok(())
}

/// Start or renew a typing indicator. Only the start is announced.
pub(super) fn typing_start(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let event: TypingStartEvent = decode(GatewayEventType::TypingStart, payload)?;

    if ctx
        .stores
        .users
        .current()
        .is_some_and(|me| me.id == event.user_id)
    {
        return Ok(());
    }

    let key = TypingKey::new(event.channel_id, event.user_id);
    if ctx.typing.signal(key, ctx.now) {
        ctx.notifier.publish(ClientEvent::TypingStarted {
            channel_id: event.channel_id,
            user_id: event.user_id,
            guild_id: event.guild_id,
        });
    }
    Ok(())
}
