//! Compilation and self-improvement for Weft programs
//!
//! The [`Compiler`] turns a program plus a training set into an improved
//! program: it enables tracing, runs an [`Optimizer`] (or a default
//! demonstration-attachment pass), gathers metrics, restores state, and
//! always returns a [`CompilationResult`] describing success or failure
//! instead of propagating errors.
//!
//! [`BootstrapFewShot`] is the built-in optimizer: it runs the
//! unoptimized program over the training set, scores each prediction
//! against its labels with a [`Metric`], and keeps the passing
//! input/output pairs as demonstrations.

#![deny(unsafe_code)]

mod bootstrap;
mod compiler;
mod errors;
mod evaluate;
mod metrics;
mod optimizer;
mod result;
#[cfg(test)]
mod test_support;

pub use bootstrap::{BootstrapConfig, BootstrapFewShot};
pub use compiler::{Compiler, CompilerConfig};
pub use errors::{OptimizerError, OptimizerResult};
pub use evaluate::{evaluate, Evaluation};
pub use metrics::{extract_answer, Metric, MetricFn};
pub use optimizer::Optimizer;
pub use result::{CompilationMetrics, CompilationResult};

/// Serializes tests that swap the process-wide default collector.
#[cfg(test)]
pub(crate) fn test_global_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
