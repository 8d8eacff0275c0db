//! Weft: declarative prompt programs, compiled.
//!
//! Programs are compositions of [`Module`]s, each bound to a typed
//! [`Signature`] parsed from a compact text grammar. Every module call
//! flows through one shared contract: validate and coerce inputs, open a
//! trace frame, run the module, close the frame. The [`Compiler`] then
//! turns a program plus a training set into an improved program by
//! harvesting demonstrations with an [`Optimizer`].
//!
//! ```
//! use std::sync::Arc;
//! use weft::prelude::*;
//!
//! let signature = Signature::parse("question: string -> answer: string")?;
//! let capability = Arc::new(StaticCapability::json(serde_json::json!({"answer": "Paris"})));
//! let module = Predict::new(signature, capability);
//!
//! let inputs = [("question".to_string(), serde_json::json!("capital of France?"))]
//!     .into_iter()
//!     .collect();
//! let prediction = module.call(inputs)?;
//! assert_eq!(prediction.get("answer"), Some(&serde_json::json!("Paris")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

pub use weft_compile::{
    evaluate, extract_answer, BootstrapConfig, BootstrapFewShot, CompilationMetrics,
    CompilationResult, Compiler, CompilerConfig, Evaluation, Metric, MetricFn, Optimizer,
    OptimizerError, OptimizerResult,
};
pub use weft_data::{Example, Prediction};
pub use weft_model::{
    ChatMessage, Completion, CompletionError, CompletionOptions, CompletionResult, MessageRole,
    ModelCapability, RetryPolicy, ScriptedCapability, StaticCapability, TokenUsage,
};
pub use weft_module::{
    ChainOfThought, Module, ModuleError, ModuleResult, Pipeline, Predict, PredictConfig, Program,
    ProgramError, ProgramOutput, ProgramRecord, ProgramResult, ProgramTrace,
};
pub use weft_signature::{Field, FieldType, Signature, SignatureError, SignatureResult, ValueMap};
pub use weft_trace::{global, Trace, TraceCollector, TraceContext, TraceMetadata};

/// One-line import for the common surface.
pub mod prelude {
    pub use crate::{
        BootstrapFewShot, ChainOfThought, Compiler, Example, Metric, Module, ModelCapability,
        Pipeline, Predict, Prediction, Program, Signature, StaticCapability, TraceCollector,
        ValueMap,
    };
}
