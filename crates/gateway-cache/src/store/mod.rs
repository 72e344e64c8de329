//! Store implementations

mod channels;
mod guilds;
mod member_lists;
mod members;
mod messages;
mod presences;
mod read_states;
mod users;

pub use channels::ChannelCache;
pub use guilds::GuildCache;
pub use member_lists::MemberListCache;
pub use members::MemberCache;
pub use messages::{MessageCache, DEFAULT_MESSAGES_PER_CHANNEL};
pub use presences::PresenceCache;
pub use read_states::ReadStateCache;
pub use users::UserCache;
