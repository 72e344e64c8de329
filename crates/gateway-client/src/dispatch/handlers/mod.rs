//! Dispatch handlers, grouped by the entity they maintain

mod bootstrap;
mod channels;
mod guilds;
mod member_list;
mod members;
mod messages;
mod presence;
mod user;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::DispatchHandler;
use crate::events::GatewayEventType;
use crate::handlers::{HandlerError, HandlerResult};

pub(super) fn default_handlers() -> [(GatewayEventType, DispatchHandler); 20] {
    use GatewayEventType as E;
    [
        (E::Ready, bootstrap::ready),
        (E::Resumed, bootstrap::resumed),
        (E::GuildCreate, guilds::guild_create),
        (E::GuildUpdate, guilds::guild_update),
        (E::GuildDelete, guilds::guild_delete),
        (E::ChannelCreate, channels::channel_upsert),
        (E::ChannelUpdate, channels::channel_upsert),
        (E::ChannelDelete, channels::channel_delete),
        (E::GuildMemberAdd, members::member_upsert),
        (E::GuildMemberUpdate, members::member_upsert),
        (E::GuildMemberRemove, members::member_remove),
        (E::GuildMemberListUpdate, member_list::member_list_update),
        (E::MessageCreate, messages::message_create),
        (E::MessageUpdate, messages::message_update),
        (E::MessageDelete, messages::message_delete),
        (E::MessageDeleteBulk, messages::message_delete_bulk),
        (E::MessageAck, messages::message_ack),
        (E::PresenceUpdate, presence::presence_update),
        (E::TypingStart, presence::typing_start),
        (E::UserUpdate, user::user_update),
    ]
}

fn decode<T: DeserializeOwned>(event: GatewayEventType, payload: &Value) -> HandlerResult<T> {
    T::deserialize(payload).map_err(|source| HandlerError::invalid_payload(event.as_str(), source))
}
