//! The consumed model-capability contract.

use crate::error::CompletionResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// One message in a completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request options carried through to the capability.
///
/// Timeout enforcement is delegated to the capability implementation;
/// this core only transports the configured value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub stop: Vec<String>,
    pub timeout_ms: Option<u64>,
    /// Provider-specific passthrough options.
    #[serde(default)]
    pub extra: std::collections::BTreeMap<String, Value>,
}

/// Token accounting reported by the capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A completed model response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
    /// Raw provider payload, untouched.
    pub raw: Value,
    pub model: String,
}

/// Trait implemented by concrete model-provider clients.
///
/// Calls may block on network I/O; callers apply their own retry policy.
pub trait ModelCapability: Send + Sync {
    /// Run one completion request.
    fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> CompletionResult<Completion>;

    /// Streaming variant. Capabilities that do not stream keep the
    /// default, which rejects the request.
    fn complete_streaming(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> CompletionResult<Box<dyn Iterator<Item = CompletionResult<String>> + Send>> {
        let _ = (messages, options);
        Err(crate::error::CompletionError::InvalidRequest(
            "streaming is not supported by this capability".to_string(),
        ))
    }
}
