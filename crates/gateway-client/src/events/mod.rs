//! Gateway events
//!
//! Event-type tags carried in Dispatch frames and the payload shapes this client decodes.

mod event_types;
mod payloads;

pub use event_types::GatewayEventType;
pub use payloads::{
    GuildDeleteEvent, GuildMemberRemoveEvent, MemberEvent, MessageDeleteBulkEvent,
    MessageDeleteEvent, MessageUpdateEvent, ReadyEvent, TypingStartEvent,
};
