//! Store traits - the outbound interface dispatch handlers write through

mod stores;

pub use stores::{
    ChannelStore, GuildStore, MemberListStore, MemberStore, MessageStore, PresenceStore,
    ReadStateStore, Stores, UserStore,
};
