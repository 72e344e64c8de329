//! # gateway-core
//!
//! Domain layer for the gateway client: snowflake ids, the entity records kept in the
//! client-side cache, and the store traits the connection manager writes through.
//! This crate performs no I/O.

pub mod entities;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Channel, ChannelType, Guild, Member, MemberList, MemberListGroup, MemberListItem,
    MemberListOp, MemberListUpdate, Message, PartialUser, Presence, ReadState, Status, User,
};
pub use traits::{
    ChannelStore, GuildStore, MemberListStore, MemberStore, MessageStore, PresenceStore,
    ReadStateStore, Stores, UserStore,
};
pub use value_objects::{Snowflake, SnowflakeParseError};
