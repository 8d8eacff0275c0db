//! Typed signatures for Weft prompt programs.
//!
//! A signature is a compact declarative contract describing what a module
//! consumes and produces:
//!
//! ```text
//! question: string "the user question" -> answer: string
//! context: list[string], question -> answer: string, score: float
//! ```
//!
//! Each side is a comma-separated field list. A field is
//! `name[?]: type ["description"]`; `?` marks the field optional and a bare
//! name defaults to `string`. Supported types: `string`, `int`, `float`,
//! `bool`, `literal["a", "b"]`, `list[T]`, `dict[K, V]`.
//!
//! # Usage
//!
//! ```rust
//! use weft_signature::Signature;
//!
//! let sig = Signature::parse("question: string -> answer: string").unwrap();
//! assert_eq!(sig.inputs().len(), 1);
//! assert_eq!(sig.outputs()[0].name, "answer");
//! ```

#![deny(unsafe_code)]

mod errors;
mod field;
mod parser;
mod signature;

pub use errors::{SignatureError, SignatureResult};
pub use field::{Field, FieldType};
pub use signature::Signature;

/// Dynamic value map used as the lingua franca between signatures, data
/// containers, traces, and modules.
pub type ValueMap = std::collections::BTreeMap<String, serde_json::Value>;
