//! The shared, append-only trace store.

use crate::trace::Trace;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

type TraceFilter = Box<dyn Fn(&Trace) -> bool + Send + Sync>;

/// An ordered, append-only sequence of traces.
///
/// One instance may be shared across threads (`Arc<TraceCollector>`);
/// concurrent appends are serialized behind the inner mutex. All derived
/// views and statistics are recomputed on every read, never cached, so
/// reads may race benignly with concurrent appends and see
/// eventually-consistent counts.
pub struct TraceCollector {
    traces: Mutex<Vec<Trace>>,
    filters: RwLock<Vec<TraceFilter>>,
    enabled: AtomicBool,
}

impl TraceCollector {
    pub fn new() -> Self {
        Self {
            traces: Mutex::new(Vec::new()),
            filters: RwLock::new(Vec::new()),
            enabled: AtomicBool::new(true),
        }
    }

    /// Append a trace. No-op while disabled or when any registered
    /// filter rejects the trace.
    pub fn collect(&self, trace: Trace) {
        if !self.is_enabled() {
            return;
        }
        {
            let filters = self.filters.read().unwrap();
            if !filters.iter().all(|accept| accept(&trace)) {
                return;
            }
        }
        tracing::trace!(
            module = trace.module_name(),
            success = trace.success(),
            "trace collected"
        );
        self.traces.lock().unwrap().push(trace);
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Register a predicate; traces it rejects are dropped at `collect`.
    pub fn add_filter(&self, accept: impl Fn(&Trace) -> bool + Send + Sync + 'static) {
        self.filters.write().unwrap().push(Box::new(accept));
    }

    pub fn clear(&self) {
        self.traces.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.traces.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All collected traces, in collection order.
    pub fn snapshot(&self) -> Vec<Trace> {
        self.traces.lock().unwrap().clone()
    }

    /// The most recent `n` traces, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Trace> {
        let traces = self.traces.lock().unwrap();
        let skip = traces.len().saturating_sub(n);
        traces[skip..].to_vec()
    }

    pub fn by_module(&self, module_name: &str) -> Vec<Trace> {
        self.traces
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.module_name() == module_name)
            .cloned()
            .collect()
    }

    pub fn successes(&self) -> Vec<Trace> {
        self.traces
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.success())
            .cloned()
            .collect()
    }

    pub fn failures(&self) -> Vec<Trace> {
        self.traces
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.success())
            .cloned()
            .collect()
    }

    pub fn between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Trace> {
        self.traces
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.timestamp() >= from && t.timestamp() <= to)
            .cloned()
            .collect()
    }

    /// successful / total; exactly 0.0 for an empty collector, never NaN.
    pub fn success_rate(&self) -> f64 {
        let traces = self.traces.lock().unwrap();
        if traces.is_empty() {
            return 0.0;
        }
        let successful = traces.iter().filter(|t| t.success()).count();
        successful as f64 / traces.len() as f64
    }

    /// Arithmetic mean of completed-call durations, per module, in ms.
    pub fn average_duration_by_module(&self) -> BTreeMap<String, f64> {
        let traces = self.traces.lock().unwrap();
        let mut sums: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for trace in traces.iter() {
            let entry = sums.entry(trace.module_name().to_string()).or_insert((0.0, 0));
            entry.0 += trace.duration_ms();
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(module, (sum, count))| (module, sum / count as f64))
            .collect()
    }

    /// Plain-map export for external persistence.
    pub fn export(&self) -> Vec<Value> {
        self.traces
            .lock()
            .unwrap()
            .iter()
            .map(Trace::to_map)
            .collect()
    }
}

impl Default for TraceCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TraceCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceCollector")
            .field("len", &self.len())
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
