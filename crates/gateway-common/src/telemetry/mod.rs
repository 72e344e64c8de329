//! Tracing subscriber setup for the gateway binary and tests
//!
//! Presets are picked per `Environment`; `RUST_LOG` still wins when set.

mod tracing_setup;

pub use tracing_setup::{
    init_tracing, init_tracing_with_config, try_init_tracing, try_init_tracing_with_config,
    TracingConfig, TracingError,
};
