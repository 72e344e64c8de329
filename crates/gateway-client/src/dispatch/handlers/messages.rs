//! MESSAGE_CREATE / MESSAGE_UPDATE / MESSAGE_DELETE / MESSAGE_DELETE_BULK / MESSAGE_ACK
//!
//! Every message event needs its channel in the cache; otherwise it is dropped with a
//! warning.

use gateway_core::{Message, ReadState, Snowflake};
use serde_json::Value;

use super::decode;
use crate::broadcast::ClientEvent;
use crate::dispatch::DispatchContext;
use crate::ephemeral::TypingKey;
use crate::events::{
    GatewayEventType, MessageDeleteBulkEvent, MessageDeleteEvent, MessageUpdateEvent,
};
use crate::handlers::HandlerResult;

fn channel_known(ctx: &DispatchContext<'_>, channel_id: Snowflake, event: GatewayEventType) -> bool {
    if ctx.stores.channels.contains(channel_id) {
        return true;
    }
    tracing::warn!(
        event = %event,
        channel_id = %channel_id,
        "Event for unknown channel dropped"
    );
    false
}

pub(super) fn message_create(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let message: Message = decode(GatewayEventType::MessageCreate, payload)?;
    if !channel_known(ctx, message.channel_id, GatewayEventType::MessageCreate) {
        return Ok(());
    }

    // Sending a message ends the author's typing state
    let key = TypingKey::new(message.channel_id, message.author.id);
    if ctx.typing.clear(key) {
        ctx.notifier.publish(ClientEvent::TypingStopped {
            channel_id: key.channel_id,
            user_id: key.user_id,
        });
    }

    if let Some(mut channel) = ctx.stores.channels.get(message.channel_id) {
        channel.last_message_id = Some(message.id);
        ctx.stores.channels.upsert(channel);
    }
    ctx.stores.messages.upsert(message);
    Ok(())
}

pub(super) fn message_update(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let update: MessageUpdateEvent = decode(GatewayEventType::MessageUpdate, payload)?;
    if !channel_known(ctx, update.channel_id, GatewayEventType::MessageUpdate) {
        return Ok(());
    }

    let Some(mut message) = ctx.stores.messages.get(update.channel_id, update.id) else {
        tracing::debug!(message_id = %update.id, "Update for uncached message");
        return Ok(());
    };

    if let Some(content) = update.content {
        message.content = content;
    }
    if update.edited_timestamp.is_some() {
        message.edited_timestamp = update.edited_timestamp;
    }
    ctx.stores.messages.upsert(message);
    Ok(())
}

pub(super) fn message_delete(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let event: MessageDeleteEvent = decode(GatewayEventType::MessageDelete, payload)?;
    if !channel_known(ctx, event.channel_id, GatewayEventType::MessageDelete) {
        return Ok(());
    }

    ctx.stores.messages.remove(event.channel_id, event.id);
    Ok(())
}

/// Each id is removed on its own; a missing one does not stop the rest
pub(super) fn message_delete_bulk(
    ctx: &mut DispatchContext<'_>,
    payload: &Value,
) -> HandlerResult<()> {
    let event: MessageDeleteBulkEvent = decode(GatewayEventType::MessageDeleteBulk, payload)?;
    if !channel_known(ctx, event.channel_id, GatewayEventType::MessageDeleteBulk) {
        return Ok(());
    }

    let removed = event
        .ids
        .iter()
        .filter(|id| ctx.stores.messages.remove(event.channel_id, **id).is_some())
        .count();
    tracing::debug!(
        channel_id = %event.channel_id,
        requested = event.ids.len(),
        removed,
        "Bulk delete applied"
    );
    Ok(())
}

pub(super) fn message_ack(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let state: ReadState = decode(GatewayEventType::MessageAck, payload)?;
    if !channel_known(ctx, state.channel_id, GatewayEventType::MessageAck) {
        return Ok(());
    }

    ctx.stores.read_states.upsert(state);
    Ok(())
}
