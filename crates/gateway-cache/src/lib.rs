//! # gateway-cache
//!
//! In-memory client-side cache. Every store trait from `gateway-core` has a concurrent
//! implementation here, so the gateway connection can write from its event loop while the
//! application reads from any thread.
//!
//! ## Example
//!
//! ```ignore
//! use gateway_cache::CacheSet;
//!
//! let cache = CacheSet::new();
//! let client = GatewayClient::new(settings, connector, cache.stores());
//!
//! // later, from the UI side
//! let channels = cache.channels.by_guild(guild_id);
//! ```

mod cache_set;
pub mod store;

pub use cache_set::CacheSet;
pub use store::{
    ChannelCache, GuildCache, MemberCache, MemberListCache, MessageCache, PresenceCache,
    ReadStateCache, UserCache, DEFAULT_MESSAGES_PER_CHANNEL,
};
