//! Labeled-data containers for Weft
//!
//! `Example` and `Prediction` are the schema-flexible lingua franca
//! between modules, traces, and optimizers. Signature-level validation
//! happens only at module call boundaries, never inside these containers.
//!
//! ```rust
//! use weft_data::Example;
//! use serde_json::json;
//!
//! let ex = Example::default()
//!     .with("question", json!("What is 2+2?"))
//!     .with("answer_output", json!("4"));
//! assert_eq!(ex.inputs().get("question"), Some(&json!("What is 2+2?")));
//! assert_eq!(ex.labels().get("answer"), Some(&json!("4")));
//! ```

#![deny(unsafe_code)]

mod example;
mod prediction;

pub use example::Example;
pub use prediction::Prediction;
pub use weft_signature::ValueMap;
