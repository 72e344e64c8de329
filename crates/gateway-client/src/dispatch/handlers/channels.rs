//! CHANNEL_CREATE / CHANNEL_UPDATE / CHANNEL_DELETE

use gateway_core::Channel;
use serde_json::Value;

use super::decode;
use crate::dispatch::DispatchContext;
use crate::events::GatewayEventType;
use crate::handlers::HandlerResult;

/// Create and update are the same upsert. A guild channel whose guild is not cached is
/// dropped; the guild may have been removed concurrently.
pub(super) fn channel_upsert(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let channel: Channel = decode(GatewayEventType::ChannelCreate, payload)?;

    if let Some(guild_id) = channel.guild_id {
        if !ctx.stores.guilds.contains(guild_id) {
            tracing::warn!(
                channel_id = %channel.id,
                guild_id = %guild_id,
                "Channel for unknown guild dropped"
            );
            return Ok(());
        }
    }

    ctx.stores.channels.upsert(channel);
    Ok(())
}

pub(super) fn channel_delete(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let channel: Channel = decode(GatewayEventType::ChannelDelete, payload)?;

    if ctx.stores.channels.remove(channel.id).is_none() {
        tracing::debug!(channel_id = %channel.id, "Delete for unknown channel");
    }
    ctx.stores.messages.remove_by_channel(channel.id);
    Ok(())
}
