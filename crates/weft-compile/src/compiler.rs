//! The never-failing compilation entry point.

use crate::errors::OptimizerResult;
use crate::optimizer::Optimizer;
use crate::result::{CompilationMetrics, CompilationResult};
use chrono::Utc;
use std::time::Instant;
use uuid::Uuid;
use weft_data::Example;
use weft_module::Program;
use weft_trace::global;

/// Knobs for the compilation loop.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Clear the default collector before compiling so metrics reflect
    /// only this run.
    pub clear_traces: bool,
    /// Put every module's tracing flag back the way it was found.
    pub restore_trace_state: bool,
    /// Demonstration cap for the optimizer-less default pass.
    pub max_default_demos: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            clear_traces: true,
            restore_trace_state: true,
            max_default_demos: 5,
        }
    }
}

/// Drives optimization and reports the outcome without ever failing.
///
/// `compile` enables tracing on every module, runs the configured
/// [`Optimizer`] (or a label-attachment default pass), restores module
/// state, and folds any error into the returned [`CompilationResult`].
/// The caller always gets the program back.
pub struct Compiler {
    optimizer: Option<Box<dyn Optimizer>>,
    config: CompilerConfig,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    /// Compiler with no optimizer; `compile` runs the default
    /// demonstration-attachment pass.
    pub fn new() -> Self {
        Self {
            optimizer: None,
            config: CompilerConfig::default(),
        }
    }

    pub fn with_optimizer(optimizer: Box<dyn Optimizer>) -> Self {
        Self {
            optimizer: Some(optimizer),
            config: CompilerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Compile `program` against `trainset`.
    pub fn compile(&self, mut program: Box<dyn Program>, trainset: &[Example]) -> CompilationResult {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        let modules_before = program.module_names().len();
        tracing::info!(
            %run_id,
            program = program.name(),
            training_set_size = trainset.len(),
            "compilation started"
        );

        let collector = global::collector();
        if self.config.clear_traces {
            collector.clear();
        }

        let saved_flags = enable_tracing(program.as_mut());
        let outcome = self.run(program.as_mut(), trainset);
        if self.config.restore_trace_state {
            restore_tracing(program.as_mut(), &saved_flags);
        }

        let traces = collector.snapshot();
        let optimization_score = (!traces.is_empty()).then(|| collector.success_rate());
        let metrics = CompilationMetrics {
            training_set_size: trainset.len(),
            traces_collected: traces.len(),
            modules_before,
            modules_after: program.module_names().len(),
            optimization_score,
            compilation_duration_ms: started.elapsed().as_millis() as u64,
        };

        let (success, error, error_kind) = match outcome {
            Ok(()) => {
                tracing::info!(%run_id, ?metrics, "compilation succeeded");
                (true, None, None)
            }
            Err(err) => {
                tracing::warn!(%run_id, error = %err, kind = err.kind(), "compilation failed");
                (false, Some(err.to_string()), Some(err.kind().to_string()))
            }
        };

        CompilationResult {
            program,
            metrics,
            traces,
            success,
            error,
            error_kind,
            run_id,
            completed_at: Utc::now(),
        }
    }

    fn run(&self, program: &mut dyn Program, trainset: &[Example]) -> OptimizerResult<()> {
        match &self.optimizer {
            Some(optimizer) => {
                tracing::debug!(optimizer = optimizer.name(), "running optimizer");
                optimizer.compile(program, trainset, None)
            }
            None => {
                // Per module: up to max_default_demos labeled examples
                // whose input keys overlap the signature inputs.
                for name in program.module_names() {
                    let Some(module) = program.module_mut(&name) else {
                        continue;
                    };
                    let demos: Vec<Example> = trainset
                        .iter()
                        .filter(|example| !example.labels().is_empty())
                        .filter(|example| {
                            module
                                .signature()
                                .inputs()
                                .iter()
                                .any(|field| example.inputs().contains_key(&field.name))
                        })
                        .take(self.config.max_default_demos)
                        .cloned()
                        .collect();
                    if !demos.is_empty() {
                        tracing::debug!(module = %name, demos = demos.len(), "default demonstration pass");
                        module.set_demos(demos);
                    }
                }
                Ok(())
            }
        }
    }
}

fn enable_tracing(program: &mut dyn Program) -> Vec<(String, bool)> {
    let mut saved = Vec::new();
    for name in program.module_names() {
        if let Some(module) = program.module_mut(&name) {
            saved.push((name.clone(), module.trace_enabled()));
            module.set_trace_enabled(true);
        }
    }
    saved
}

fn restore_tracing(program: &mut dyn Program, saved: &[(String, bool)]) {
    for (name, enabled) in saved {
        if let Some(module) = program.module_mut(name) {
            module.set_trace_enabled(*enabled);
        }
    }
}
