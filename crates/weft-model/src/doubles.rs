//! Deterministic in-process capabilities for offline execution and tests.

use crate::capability::{ChatMessage, Completion, CompletionOptions, ModelCapability, TokenUsage};
use crate::error::{CompletionError, CompletionResult};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

fn approximate_usage(messages: &[ChatMessage], content: &str) -> TokenUsage {
    // Rough 4-chars-per-token heuristic; enough for deterministic tests.
    let prompt: usize = messages.iter().map(|m| m.content.len() / 4 + 1).sum();
    let completion = content.len() / 4 + 1;
    TokenUsage {
        prompt_tokens: prompt as u32,
        completion_tokens: completion as u32,
        total_tokens: (prompt + completion) as u32,
    }
}

/// Capability returning the same canned content for every request.
#[derive(Debug, Clone)]
pub struct StaticCapability {
    content: String,
    model: String,
}

impl StaticCapability {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: "static".to_string(),
        }
    }

    /// Canned JSON response.
    pub fn json(value: serde_json::Value) -> Self {
        Self::new(value.to_string())
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

impl ModelCapability for StaticCapability {
    fn complete(
        &self,
        messages: &[ChatMessage],
        options: &CompletionOptions,
    ) -> CompletionResult<Completion> {
        let model = options.model.clone().unwrap_or_else(|| self.model.clone());
        Ok(Completion {
            content: self.content.clone(),
            usage: approximate_usage(messages, &self.content),
            raw: json!({ "static": true }),
            model,
        })
    }
}

/// Capability replaying a scripted sequence of outcomes, one per call.
/// Once the script is exhausted the last step repeats.
pub struct ScriptedCapability {
    steps: Mutex<VecDeque<CompletionResult<String>>>,
    last: Mutex<Option<CompletionResult<String>>>,
    model: String,
}

impl ScriptedCapability {
    pub fn new(steps: Vec<CompletionResult<String>>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            last: Mutex::new(None),
            model: "scripted".to_string(),
        }
    }

    /// A capability that always fails with `error`.
    pub fn failing(error: CompletionError) -> Self {
        Self::new(vec![Err(error)])
    }
}

impl ModelCapability for ScriptedCapability {
    fn complete(
        &self,
        messages: &[ChatMessage],
        _options: &CompletionOptions,
    ) -> CompletionResult<Completion> {
        let mut steps = self.steps.lock().unwrap();
        let mut last = self.last.lock().unwrap();
        let step = match steps.pop_front() {
            Some(step) => {
                *last = Some(step.clone());
                step
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(CompletionError::Api("script exhausted".to_string()))),
        };
        let content = step?;
        Ok(Completion {
            usage: approximate_usage(messages, &content),
            raw: json!({ "scripted": true }),
            model: self.model.clone(),
            content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_returns_canned_content() {
        let cap = StaticCapability::json(json!({"answer": "42"}));
        let out = cap
            .complete(&[ChatMessage::user("q")], &CompletionOptions::default())
            .unwrap();
        assert_eq!(out.content, "{\"answer\":\"42\"}");
        assert!(out.usage.total_tokens > 0);
    }

    #[test]
    fn test_scripted_replays_then_repeats_last() {
        let cap = ScriptedCapability::new(vec![
            Err(CompletionError::RateLimit("busy".into())),
            Ok("done".to_string()),
        ]);
        let opts = CompletionOptions::default();
        assert!(cap.complete(&[], &opts).is_err());
        assert_eq!(cap.complete(&[], &opts).unwrap().content, "done");
        assert_eq!(cap.complete(&[], &opts).unwrap().content, "done");
    }

    #[test]
    fn test_streaming_rejected_by_default() {
        let cap = StaticCapability::new("x");
        assert!(matches!(
            cap.complete_streaming(&[], &CompletionOptions::default()),
            Err(CompletionError::InvalidRequest(_))
        ));
    }
}
