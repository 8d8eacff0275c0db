//! Model-capability interface for Weft
//!
//! Modules are polymorphic over a pluggable language-model capability:
//! `complete(messages, options) -> Completion`. Concrete provider clients
//! (network transport to specific vendors) live outside this workspace;
//! this crate defines the contract they implement, the error taxonomy
//! with its transience predicate, and the bounded retry policy applied
//! around blocking capability calls.

#![deny(unsafe_code)]

mod capability;
mod doubles;
mod error;
mod retry;

pub use capability::{
    ChatMessage, Completion, CompletionOptions, MessageRole, ModelCapability, TokenUsage,
};
pub use doubles::{ScriptedCapability, StaticCapability};
pub use error::{CompletionError, CompletionResult};
pub use retry::RetryPolicy;
