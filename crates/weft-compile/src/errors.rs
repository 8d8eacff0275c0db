//! Error types for optimization and evaluation

use thiserror::Error;
use weft_module::ProgramError;

/// Errors raised by optimizers and evaluation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OptimizerError {
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Cannot evaluate an empty dataset")]
    EmptyDataset,

    #[error("Invalid optimizer configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Program(#[from] ProgramError),
}

impl OptimizerError {
    /// Stable error-kind label for compilation results.
    pub fn kind(&self) -> &'static str {
        match self {
            OptimizerError::UnknownMetric(_) => "unknown_metric",
            OptimizerError::EmptyDataset => "empty_dataset",
            OptimizerError::InvalidConfig(_) => "invalid_config",
            OptimizerError::Program(_) => "program",
        }
    }
}

/// Result type alias for optimizer operations
pub type OptimizerResult<T> = Result<T, OptimizerError>;
