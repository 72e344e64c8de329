//! Client notifications
//!
//! Fans lifecycle, typing and logout events out to the application.

mod notifier;

pub use notifier::{ClientEvent, Notifier, DEFAULT_EVENT_CAPACITY};
