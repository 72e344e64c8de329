//! GUILD_CREATE / GUILD_UPDATE / GUILD_DELETE

use gateway_core::{Guild, Stores};
use serde_json::Value;

use super::decode;
use crate::dispatch::DispatchContext;
use crate::events::{GatewayEventType, GuildDeleteEvent};
use crate::handlers::HandlerResult;

/// Store a full guild payload, splitting out its channels and members
pub(super) fn store_guild(stores: &Stores, guild: Guild) {
    let (guild, channels, members) = guild.into_parts();
    let guild_id = guild.id;

    stores.guilds.upsert(guild);
    for mut channel in channels {
        channel.guild_id = Some(guild_id);
        stores.channels.upsert(channel);
    }
    for member in members {
        stores.members.upsert(guild_id, member);
    }
}

pub(super) fn guild_create(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let guild: Guild = decode(GatewayEventType::GuildCreate, payload)?;
    tracing::debug!(guild_id = %guild.id, "Guild available");
    store_guild(ctx.stores, guild);
    Ok(())
}

pub(super) fn guild_update(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let guild: Guild = decode(GatewayEventType::GuildUpdate, payload)?;
    if !ctx.stores.guilds.contains(guild.id) {
        tracing::warn!(guild_id = %guild.id, "Update for unknown guild dropped");
        return Ok(());
    }

    // Updates carry the guild record only
    let (guild, _, _) = guild.into_parts();
    ctx.stores.guilds.upsert(guild);
    Ok(())
}

pub(super) fn guild_delete(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let event: GuildDeleteEvent = decode(GatewayEventType::GuildDelete, payload)?;
    let stores = ctx.stores;

    if event.unavailable {
        // Outage; the guild comes back with a GUILD_CREATE
        if let Some(mut guild) = stores.guilds.get(event.id) {
            guild.unavailable = true;
            stores.guilds.upsert(guild);
        }
        tracing::warn!(guild_id = %event.id, "Guild unavailable");
        return Ok(());
    }

    if stores.guilds.remove(event.id).is_none() {
        tracing::debug!(guild_id = %event.id, "Delete for unknown guild");
    }
    for channel in stores.channels.by_guild(event.id) {
        stores.messages.remove_by_channel(channel.id);
    }
    let channels = stores.channels.remove_by_guild(event.id);
    let members = stores.members.remove_by_guild(event.id);
    stores.member_lists.remove_by_guild(event.id);
    ctx.subscriptions.remove_guild(event.id);

    tracing::info!(guild_id = %event.id, channels, members, "Left guild");
    Ok(())
}
