//! The process-wide default collector.
//!
//! Lazily created, explicitly resettable, and swappable for a scoped
//! block. Worker threads that should report into a specific collector
//! receive it as an explicit `Arc` clone rather than relying on ambient
//! state.

use crate::collector::TraceCollector;
use std::sync::{Arc, OnceLock, RwLock};

static DEFAULT: OnceLock<RwLock<Arc<TraceCollector>>> = OnceLock::new();

fn slot() -> &'static RwLock<Arc<TraceCollector>> {
    DEFAULT.get_or_init(|| RwLock::new(Arc::new(TraceCollector::new())))
}

/// The currently installed default collector.
pub fn collector() -> Arc<TraceCollector> {
    slot().read().unwrap().clone()
}

/// Install `next` as the default collector, returning the previous one.
pub fn install_collector(next: Arc<TraceCollector>) -> Arc<TraceCollector> {
    std::mem::replace(&mut *slot().write().unwrap(), next)
}

/// Replace the default with a fresh, empty, enabled collector.
pub fn reset() {
    install_collector(Arc::new(TraceCollector::new()));
}

/// Run `f` with `scoped` installed as the default collector, restoring
/// the previous collector afterward (also on panic).
pub fn with_collector<T>(scoped: Arc<TraceCollector>, f: impl FnOnce() -> T) -> T {
    let _guard = RestoreGuard {
        previous: Some(install_collector(scoped)),
    };
    f()
}

struct RestoreGuard {
    previous: Option<Arc<TraceCollector>>,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            install_collector(previous);
        }
    }
}
