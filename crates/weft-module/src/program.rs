//! The `Program` composition contract.

use crate::errors::{ModuleResult, ProgramError, ProgramResult};
use crate::module::Module;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::time::{Duration, Instant};
use weft_signature::ValueMap;

/// One coarse step record: which module ran, with what, producing what.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramRecord {
    pub module: String,
    pub inputs: ValueMap,
    pub outputs: ValueMap,
    pub timestamp: DateTime<Utc>,
}

/// Coarse module-level trace accumulated during one program run.
///
/// Distinct from the fine-grained `TraceCollector`: this is the
/// program's own step log, returned with every result.
#[derive(Debug, Clone, Default)]
pub struct ProgramTrace {
    records: Vec<ProgramRecord>,
}

impl ProgramTrace {
    pub fn record(&mut self, module: impl Into<String>, inputs: ValueMap, outputs: ValueMap) {
        self.records.push(ProgramRecord {
            module: module.into(),
            inputs,
            outputs,
            timestamp: Utc::now(),
        });
    }

    pub fn records(&self) -> &[ProgramRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ProgramRecord> {
        self.records
    }
}

/// Result of one program run: outputs bundled with timing and the
/// coarse step trace.
#[derive(Debug, Clone)]
pub struct ProgramOutput {
    pub outputs: ValueMap,
    pub execution_time: Duration,
    pub trace: Vec<ProgramRecord>,
    pub program_name: String,
}

/// A named composition of modules.
///
/// Subclasses define `forward`; the provided `call` measures execution
/// time, carries the coarse trace, and wraps any escaping error into a
/// [`ProgramError`] that preserves the original message.
pub trait Program: Send + Sync {
    fn name(&self) -> &str;

    /// Names of the owned modules, in composition order.
    fn module_names(&self) -> Vec<String>;

    fn module(&self, name: &str) -> Option<&dyn Module>;

    fn module_mut(&mut self, name: &str) -> Option<&mut dyn Module>;

    /// Run the composition, appending one record per module step.
    fn forward(&self, inputs: ValueMap, trace: &mut ProgramTrace) -> ModuleResult<ValueMap>;

    /// Execute with timing and coarse tracing.
    fn call(&self, inputs: ValueMap) -> ProgramResult<ProgramOutput> {
        let started = Instant::now();
        let mut trace = ProgramTrace::default();
        tracing::debug!(program = self.name(), "program call started");
        match self.forward(inputs, &mut trace) {
            Ok(outputs) => Ok(ProgramOutput {
                outputs,
                execution_time: started.elapsed(),
                trace: trace.into_records(),
                program_name: self.name().to_string(),
            }),
            Err(err) => Err(ProgramError::ExecutionFailed {
                program: self.name().to_string(),
                message: err.to_string(),
            }),
        }
    }

    /// Stable introspection map `{class, modules, config, metadata}`.
    fn to_map(&self) -> Value {
        let modules: Vec<Value> = self
            .module_names()
            .iter()
            .filter_map(|name| self.module(name).map(|m| m.to_map()))
            .collect();
        serde_json::json!({
            "class": self.name(),
            "modules": modules,
            "config": {},
            "metadata": { "module_count": modules.len() },
        })
    }
}
