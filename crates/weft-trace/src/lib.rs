//! Execution tracing for Weft
//!
//! Three pieces cooperate here:
//!
//! - [`Trace`]: an immutable record of one completed (or failed) module
//!   invocation, created once at frame end and never mutated.
//! - [`TraceCollector`]: an append-only, shareable store of traces with
//!   predicate filters, an enabled flag, and recompute-on-demand
//!   statistics. A single instance may be shared across threads; appends
//!   are serialized behind a mutex.
//! - [`TraceContext`]: the per-thread stack of in-flight call frames.
//!   Every `start_trace` is eventually matched by exactly one
//!   `end_trace` or `record_error`, which pops the frame, stamps the
//!   duration, and forwards the built trace to the collector captured
//!   when the frame was opened.
//!
//! The process-wide default collector lives in [`global`]: lazily
//! created, explicitly resettable, and swappable for a scoped block via
//! [`global::with_collector`]. Isolated runs (tests, optimization
//! passes) install a scoped collector instead of mutating the default
//! in place.

#![deny(unsafe_code)]

mod collector;
mod context;
pub mod global;
mod trace;

pub use collector::TraceCollector;
pub use context::TraceContext;
pub use trace::{Trace, TraceMetadata};

/// Serializes tests that swap the process-wide default collector.
#[cfg(test)]
pub(crate) static TEST_GLOBAL_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn test_global_guard() -> std::sync::MutexGuard<'static, ()> {
    TEST_GLOBAL_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
