//! GUILD_MEMBER_ADD / GUILD_MEMBER_UPDATE / GUILD_MEMBER_REMOVE

use serde_json::Value;

use super::decode;
use crate::dispatch::DispatchContext;
use crate::events::{GatewayEventType, GuildMemberRemoveEvent, MemberEvent};
use crate::handlers::HandlerResult;

pub(super) fn member_upsert(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let event: MemberEvent = decode(GatewayEventType::GuildMemberAdd, payload)?;

    if !ctx.stores.guilds.contains(event.guild_id) {
        tracing::warn!(
            guild_id = %event.guild_id,
            user_id = %event.member.user_id(),
            "Member for unknown guild dropped"
        );
        return Ok(());
    }

    ctx.stores.members.upsert(event.guild_id, event.member);
    Ok(())
}

pub(super) fn member_remove(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let event: GuildMemberRemoveEvent = decode(GatewayEventType::GuildMemberRemove, payload)?;

    if ctx
        .stores
        .members
        .remove(event.guild_id, event.user.id)
        .is_none()
    {
        tracing::debug!(
            guild_id = %event.guild_id,
            user_id = %event.user.id,
            "Remove for unknown member"
        );
    }
    Ok(())
}
