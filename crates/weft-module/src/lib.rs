//! Module and program execution for Weft
//!
//! A [`Module`] binds a [`Signature`](weft_signature::Signature) to a
//! computation. The shared `call` contract validates and coerces inputs,
//! opens a trace frame, runs `forward`, and closes the frame on success
//! or error; tracing is a pure side effect and never alters control flow
//! or the propagated error.
//!
//! [`Predict`] and [`ChainOfThought`] are the concrete capability-backed
//! modules; [`Pipeline`] composes named modules into a sequential
//! [`Program`].

#![deny(unsafe_code)]

mod chain_of_thought;
mod errors;
mod module;
mod pipeline;
mod predict;
mod program;
mod prompt;

pub use chain_of_thought::ChainOfThought;
pub use errors::{ModuleError, ModuleResult, ProgramError, ProgramResult};
pub use module::Module;
pub use pipeline::Pipeline;
pub use predict::{Predict, PredictConfig};
pub use program::{Program, ProgramOutput, ProgramRecord, ProgramTrace};

/// Serializes tests that swap the process-wide default collector.
#[cfg(test)]
pub(crate) fn test_global_guard() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
