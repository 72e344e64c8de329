//! Gateway protocol definitions
//!
//! Op codes, the frame envelope, close codes and the client-sent payloads.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::{CloseAction, CloseCode};
pub use messages::GatewayMessage;
pub use opcodes::{Direction, OpCode, UnknownOpCode};
pub use payloads::{
    HelloPayload, IdentifyPayload, IdentifyProperties, LazyRequestPayload, PresenceUpdatePayload,
    ResumePayload,
};
