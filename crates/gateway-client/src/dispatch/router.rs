//! Event tag to handler table

use std::collections::HashMap;

use serde_json::Value;

use super::handlers;
use super::DispatchContext;
use crate::events::GatewayEventType;
use crate::handlers::HandlerResult;

/// A dispatch handler. Runs to completion on the event loop and must not block.
pub type DispatchHandler = fn(&mut DispatchContext<'_>, &Value) -> HandlerResult<()>;

/// Result of routing one dispatch frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Handled,
    /// Unknown tag or no handler registered
    Ignored,
    /// Handler returned an error; logged, not fatal
    Failed,
}

/// Registration table, built once at construction and read-only afterwards
#[derive(Clone, Default)]
pub struct DispatchRouter {
    handlers: HashMap<GatewayEventType, DispatchHandler>,
}

impl DispatchRouter {
    /// An empty router; every event is ignored
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A router with a handler for every event type this client understands
    #[must_use]
    pub fn with_default_handlers() -> Self {
        handlers::default_handlers()
            .into_iter()
            .fold(Self::new(), |router, (event, handler)| router.with(event, handler))
    }

    #[must_use]
    pub fn with(mut self, event: GatewayEventType, handler: DispatchHandler) -> Self {
        self.register(event, handler);
        self
    }

    pub fn register(&mut self, event: GatewayEventType, handler: DispatchHandler) {
        if self.handlers.insert(event, handler).is_some() {
            tracing::debug!(event = %event, "Replacing dispatch handler");
        }
    }

    #[must_use]
    pub fn is_registered(&self, event: GatewayEventType) -> bool {
        self.handlers.contains_key(&event)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Record `seq` and run the handler for `event`, if any.
    ///
    /// The sequence is recorded even when the event is ignored or its handler fails.
    pub fn route(
        &self,
        ctx: &mut DispatchContext<'_>,
        event: &str,
        seq: Option<u64>,
        payload: &Value,
    ) -> RouteOutcome {
        ctx.session.observe(seq);

        let Some(handler) = GatewayEventType::from_str(event)
            .and_then(|event_type| self.handlers.get(&event_type))
        else {
            tracing::debug!(event, seq = ?seq, "Ignoring unhandled dispatch event");
            return RouteOutcome::Ignored;
        };

        tracing::trace!(event, seq = ?seq, "Routing dispatch event");
        match handler(ctx, payload) {
            Ok(()) => RouteOutcome::Handled,
            Err(err) => {
                tracing::warn!(event, seq = ?seq, error = %err, "Dispatch handler failed");
                RouteOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for DispatchRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut events: Vec<_> = self.handlers.keys().map(|e| e.as_str()).collect();
        events.sort_unstable();
        f.debug_struct("DispatchRouter")
            .field("events", &events)
            .finish()
    }
}
