//! Gateway client
//!
//! `GatewayClient` owns every piece of connection state and runs it on one task. The
//! application talks to that task through a cloneable `GatewayHandle`.

mod driver;
mod handle;
mod settings;

pub use driver::GatewayClient;
pub use handle::{ClientError, GatewayHandle};
pub use settings::ClientSettings;

pub(crate) use handle::Command;
