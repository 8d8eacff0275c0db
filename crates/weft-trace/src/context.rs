//! The per-thread call-frame stack.

use crate::collector::TraceCollector;
use crate::global;
use crate::trace::{Trace, TraceMetadata};
use chrono::Utc;
use std::cell::RefCell;
use std::sync::Arc;
use std::time::Instant;
use weft_signature::{Signature, ValueMap};

struct Frame {
    module_name: String,
    signature: Option<String>,
    inputs: ValueMap,
    started: Instant,
    metadata: ValueMap,
    /// Collector active when the frame was opened; the trace goes here
    /// even if the default collector is swapped mid-call.
    collector: Arc<TraceCollector>,
}

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Per-thread trace frame stack.
///
/// Each thread owns an independent stack, so traced calls never corrupt
/// frames across threads. Stack depth always equals the current
/// traced-call nesting on the thread: every `start_trace` is matched by
/// exactly one `end_trace` or `record_error`.
pub struct TraceContext;

impl TraceContext {
    /// Push a frame for an in-flight call. Never blocks.
    pub fn start_trace(
        module_name: impl Into<String>,
        signature: Option<&Signature>,
        inputs: ValueMap,
    ) {
        let frame = Frame {
            module_name: module_name.into(),
            signature: signature.map(|s| s.to_string()),
            inputs,
            started: Instant::now(),
            metadata: ValueMap::new(),
            collector: global::collector(),
        };
        FRAMES.with(|frames| frames.borrow_mut().push(frame));
    }

    /// Merge metadata into the top frame. Silent no-op when no call is
    /// in flight.
    pub fn add_metadata(partial: ValueMap) {
        FRAMES.with(|frames| {
            if let Some(frame) = frames.borrow_mut().last_mut() {
                frame.metadata.extend(partial);
            }
        });
    }

    /// Pop the top frame as a successful call and forward the built
    /// trace to the frame's collector. Returns `None` when no call is in
    /// flight.
    pub fn end_trace(outputs: ValueMap, metadata: ValueMap) -> Option<Trace> {
        Self::finish(outputs, metadata, None)
    }

    /// Pop the top frame as a failed call.
    pub fn record_error(
        error: impl Into<String>,
        error_kind: impl Into<String>,
        outputs: ValueMap,
        metadata: ValueMap,
    ) -> Option<Trace> {
        Self::finish(outputs, metadata, Some((error.into(), error_kind.into())))
    }

    fn finish(
        outputs: ValueMap,
        metadata: ValueMap,
        error: Option<(String, String)>,
    ) -> Option<Trace> {
        let mut frame = FRAMES.with(|frames| frames.borrow_mut().pop())?;
        frame.metadata.extend(metadata);
        let duration_ms = frame.started.elapsed().as_secs_f64() * 1_000.0;
        let (success, error, error_kind) = match error {
            None => (true, None, None),
            Some((message, kind)) => (false, Some(message), Some(kind)),
        };
        let trace = Trace::new(
            frame.module_name,
            frame.signature,
            frame.inputs,
            outputs,
            TraceMetadata {
                success,
                error,
                error_kind,
                duration_ms,
                extra: frame.metadata,
            },
            Utc::now(),
        );
        frame.collector.collect(trace.clone());
        Some(trace)
    }

    /// Current traced-call nesting depth on this thread.
    pub fn depth() -> usize {
        FRAMES.with(|frames| frames.borrow().len())
    }

    /// Drop any in-flight frames on this thread without emitting traces.
    pub fn clear() {
        FRAMES.with(|frames| frames.borrow_mut().clear());
    }
}
