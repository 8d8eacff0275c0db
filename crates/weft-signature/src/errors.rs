//! Error types for signature parsing, validation, and coercion

use thiserror::Error;

/// Errors raised while parsing or applying a signature
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SignatureError {
    #[error("Malformed signature: {0}")]
    MalformedGrammar(String),

    #[error("Duplicate {side} field: {name}")]
    DuplicateField { side: &'static str, name: String },

    #[error("Signature must declare at least one {0} field")]
    EmptySide(&'static str),

    #[error("Missing required inputs: {}", .0.join(", "))]
    MissingInputs(Vec<String>),

    #[error("Cannot coerce input '{field}' to {expected}: got {value}")]
    Coercion {
        field: String,
        expected: String,
        value: String,
    },
}

/// Result type alias for signature operations
pub type SignatureResult<T> = Result<T, SignatureError>;
