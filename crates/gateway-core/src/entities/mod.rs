//! Entity records held in the client-side cache

mod channel;
mod guild;
mod member;
mod member_list;
mod message;
mod presence;
mod read_state;
mod user;

pub use channel::{Channel, ChannelType};
pub use guild::Guild;
pub use member::Member;
pub use member_list::{
    MemberList, MemberListGroup, MemberListItem, MemberListOp, MemberListUpdate,
};
pub use message::Message;
pub use presence::{PartialUser, Presence, Status};
pub use read_state::ReadState;
pub use user::User;
