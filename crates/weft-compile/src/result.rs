//! The compilation outcome envelope.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;
use weft_module::Program;
use weft_trace::Trace;

/// Observability counters gathered during one compilation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompilationMetrics {
    pub training_set_size: usize,
    pub traces_collected: usize,
    pub modules_before: usize,
    pub modules_after: usize,
    /// Success rate over the collected traces; `None` when nothing was
    /// collected.
    pub optimization_score: Option<f64>,
    pub compilation_duration_ms: u64,
}

/// Outcome of [`Compiler::compile`](crate::Compiler::compile).
///
/// The program is always present, optimized on success and in its
/// best-effort state on failure. Failure is reported through `success`,
/// `error`, and `error_kind` rather than a `Result`.
pub struct CompilationResult {
    pub program: Box<dyn Program>,
    pub metrics: CompilationMetrics,
    pub traces: Vec<Trace>,
    pub success: bool,
    pub error: Option<String>,
    pub error_kind: Option<String>,
    pub run_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

impl fmt::Debug for CompilationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationResult")
            .field("program", &self.program.name())
            .field("metrics", &self.metrics)
            .field("traces", &self.traces.len())
            .field("success", &self.success)
            .field("error", &self.error)
            .field("error_kind", &self.error_kind)
            .field("run_id", &self.run_id)
            .field("completed_at", &self.completed_at)
            .finish()
    }
}
