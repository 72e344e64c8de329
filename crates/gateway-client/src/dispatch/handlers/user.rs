//! USER_UPDATE

use gateway_core::User;
use serde_json::Value;

use super::decode;
use crate::dispatch::DispatchContext;
use crate::events::GatewayEventType;
use crate::handlers::HandlerResult;

pub(super) fn user_update(ctx: &mut DispatchContext<'_>, payload: &Value) -> HandlerResult<()> {
    let user: User = decode(GatewayEventType::UserUpdate, payload)?;
    let users = &ctx.stores.users;

    if users.current().is_some_and(|me| me.id == user.id) {
        users.set_current(user);
    } else {
        users.upsert(user);
    }
    Ok(())
}
