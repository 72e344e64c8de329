//! READY and RESUMED

use serde_json::Value;

use super::{decode, guilds};
use crate::dispatch::{DispatchContext, Lifecycle};
use crate::events::{GatewayEventType, ReadyEvent};
use crate::handlers::HandlerResult;

/// Replace the whole cache with the bootstrap snapshot
pub(super) fn ready(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let ready: ReadyEvent = decode(GatewayEventType::Ready, payload)?;
    let stores = ctx.stores;

    stores.clear_all();
    stores.users.set_current(ready.user);
    for user in ready.users {
        stores.users.upsert(user);
    }

    let guild_count = ready.guilds.len();
    for guild in ready.guilds {
        guilds::store_guild(stores, guild);
    }
    for channel in ready.private_channels {
        stores.channels.upsert(channel);
    }
    for state in ready.read_state {
        stores.read_states.upsert(state);
    }
    for presence in ready.presences {
        stores.presences.upsert(presence);
    }

    ctx.session.establish(ready.session_id.clone());
    ctx.lifecycle = Some(Lifecycle::Ready {
        session_id: ready.session_id,
        guild_count,
    });
    Ok(())
}

pub(super) fn resumed(ctx: &mut DispatchContext<'_>, _payload: &Value) -> HandlerResult<()> {
    ctx.lifecycle = Some(Lifecycle::Resumed);
    Ok(())
}
