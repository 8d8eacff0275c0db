//! Error types for module and program execution

use thiserror::Error;
use weft_model::CompletionError;
use weft_signature::SignatureError;

/// Errors raised by a module call
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModuleError {
    #[error("Missing required inputs: {}", .0.join(", "))]
    MissingInputs(Vec<String>),

    #[error(transparent)]
    Signature(SignatureError),

    #[error("Model capability failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("Failed to parse model output: {0}")]
    OutputParse(String),

    #[error("Module call failed: {0}")]
    CallFailed(String),
}

impl ModuleError {
    /// Stable error-kind label for trace metadata.
    pub fn kind(&self) -> &'static str {
        match self {
            ModuleError::MissingInputs(_) => "missing_inputs",
            ModuleError::Signature(_) => "signature",
            ModuleError::Completion(err) => err.kind(),
            ModuleError::OutputParse(_) => "output_parse",
            ModuleError::CallFailed(_) => "module",
        }
    }
}

impl From<SignatureError> for ModuleError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::MissingInputs(names) => ModuleError::MissingInputs(names),
            other => ModuleError::Signature(other),
        }
    }
}

/// Result type alias for module operations
pub type ModuleResult<T> = Result<T, ModuleError>;

/// Program-level error wrapping any failure that escapes program
/// execution, preserving the original message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProgramError {
    #[error("Program '{program}' failed: {message}")]
    ExecutionFailed { program: String, message: String },

    #[error("Invalid program composition: {0}")]
    Composition(String),
}

/// Result type alias for program operations
pub type ProgramResult<T> = Result<T, ProgramError>;
