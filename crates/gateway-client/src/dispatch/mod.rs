//! Dispatch routing
//!
//! Dispatch frames (op 0) carry an event tag. The router maps each known tag to a handler
//! that writes into the stores; unknown tags are logged and skipped.

mod context;
mod handlers;
mod router;

pub use context::{DispatchContext, Lifecycle};
pub use router::{DispatchHandler, DispatchRouter, RouteOutcome};
