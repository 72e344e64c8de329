//! GUILD_MEMBER_LIST_UPDATE

use gateway_core::MemberListUpdate;
use serde_json::Value;

use super::decode;
use crate::dispatch::DispatchContext;
use crate::events::GatewayEventType;
use crate::handlers::HandlerResult;

pub(super) fn member_list_update(
    ctx: &mut DispatchContext<'_>,
    payload: &Value,
) -> HandlerResult<()> {
    let update: MemberListUpdate = decode(GatewayEventType::GuildMemberListUpdate, payload)?;

    if !ctx.stores.guilds.contains(update.guild_id) {
        tracing::warn!(
            guild_id = %update.guild_id,
            list_id = %update.id,
            "Member list for unknown guild dropped"
        );
        return Ok(());
    }

    ctx.stores.member_lists.apply(&update);
    Ok(())
}
