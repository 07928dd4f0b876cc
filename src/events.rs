//! Event hooks for generation lifecycle observability.
//!
//! An optional, non-intrusive way to observe generation runs. Operations
//! emit events when they start, retry, and finish. Implement
//! [`EventHandler`] to receive them for logging or progress reporting.

use std::sync::Arc;

/// Events emitted during generation.
#[derive(Debug, Clone)]
pub enum Event {
    /// A generation operation has started.
    GenerationStart {
        /// Operation name (e.g. `"ideas"`, `"blueprint"`).
        operation: &'static str,
        /// Model identifier used for the call.
        model: String,
    },
    /// A generation operation has finished.
    GenerationEnd {
        /// Operation name.
        operation: &'static str,
        /// Whether a model-derived value was produced (false when the
        /// output was degraded to a default).
        ok: bool,
    },
    /// A semantic retry attempt is starting.
    RetryStart {
        /// Operation name.
        operation: &'static str,
        /// The retry attempt number (1-indexed).
        attempt: u32,
        /// Why the retry was triggered.
        reason: String,
    },
    /// A semantic retry sequence has completed.
    RetryEnd {
        /// Operation name.
        operation: &'static str,
        /// Total retry attempts made.
        attempts: u32,
        /// Whether the final attempt was accepted.
        success: bool,
    },
    /// A transport-level retry due to an HTTP error.
    TransportRetry {
        /// Operation name.
        operation: &'static str,
        /// The retry attempt number (1-indexed).
        attempt: u32,
        /// Delay before this retry attempt in milliseconds.
        delay_ms: u64,
        /// Reason for the retry.
        reason: String,
    },
}

/// Handler for generation lifecycle events.
///
/// Entirely optional — operations run without one.
///
/// # Example
///
/// ```
/// use ideaforge::events::{Event, EventHandler};
///
/// struct PrintHandler;
///
/// impl EventHandler for PrintHandler {
///     fn on_event(&self, event: Event) {
///         if let Event::GenerationEnd { operation, ok } = event {
///             println!("[{}] ok={}", operation, ok);
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called for every emitted event.
    fn on_event(&self, event: Event);
}

/// Emit an event if a handler is present. No-op otherwise.
pub(crate) fn emit(handler: &Option<Arc<dyn EventHandler>>, event: Event) {
    if let Some(ref h) = handler {
        h.on_event(event);
    }
}

/// An [`EventHandler`] backed by a closure.
///
/// # Example
///
/// ```
/// use ideaforge::events::{Event, FnEventHandler};
/// use std::sync::Arc;
///
/// let handler = Arc::new(FnEventHandler(|event: Event| {
///     eprintln!("{:?}", event);
/// }));
/// ```
pub struct FnEventHandler<F: Fn(Event) + Send + Sync>(pub F);

impl<F: Fn(Event) + Send + Sync> EventHandler for FnEventHandler<F> {
    fn on_event(&self, event: Event) {
        (self.0)(event);
    }
}
