//! Ephemeral state that expires unless renewed

mod typing;

pub use typing::{TypingKey, TypingTracker};
