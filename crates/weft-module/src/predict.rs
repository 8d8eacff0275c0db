//! Direct prediction against the model capability.

use crate::errors::ModuleResult;
use crate::module::Module;
use crate::prompt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use weft_data::{Example, Prediction};
use weft_model::{CompletionOptions, ModelCapability, RetryPolicy};
use weft_signature::{Signature, ValueMap};

/// Configuration for capability-backed modules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictConfig {
    pub options: CompletionOptions,
    pub retry: RetryPolicy,
}

/// The simplest capability-backed module: render the signature, demos,
/// and inputs into a chat request, complete it, and parse the output
/// fields out of the response.
pub struct Predict {
    signature: Signature,
    capability: Arc<dyn ModelCapability>,
    config: PredictConfig,
    demos: Vec<Example>,
    trace_enabled: bool,
    name: String,
}

impl Predict {
    pub fn new(signature: Signature, capability: Arc<dyn ModelCapability>) -> Self {
        Self {
            signature,
            capability,
            config: PredictConfig::default(),
            demos: Vec::new(),
            trace_enabled: true,
            name: "Predict".to_string(),
        }
    }

    pub fn with_config(mut self, config: PredictConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn config(&self) -> &PredictConfig {
        &self.config
    }

    fn run_completion(&self, inputs: &ValueMap, preamble: Option<&str>) -> ModuleResult<(ValueMap, Prediction)> {
        let messages = prompt::render_messages(&self.signature, &self.demos, inputs, preamble);
        let completion = self
            .config
            .retry
            .run(|| self.capability.complete(&messages, &self.config.options))?;
        let outputs = prompt::parse_outputs(&self.signature, &completion.content)?;
        let mut prediction = Prediction::new(outputs.clone());
        prediction.set_metadata("model", json!(completion.model));
        prediction.set_metadata(
            "usage",
            json!({
                "prompt_tokens": completion.usage.prompt_tokens,
                "completion_tokens": completion.usage.completion_tokens,
                "total_tokens": completion.usage.total_tokens,
            }),
        );
        Ok((outputs, prediction))
    }
}

impl Module for Predict {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn demos(&self) -> &[Example] {
        &self.demos
    }

    fn set_demos(&mut self, demos: Vec<Example>) {
        self.demos = demos;
    }

    fn trace_enabled(&self) -> bool {
        self.trace_enabled
    }

    fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    fn forward(&self, inputs: ValueMap) -> ModuleResult<Prediction> {
        let (_, prediction) = self.run_completion(&inputs, None)?;
        Ok(prediction)
    }

    fn to_map(&self) -> Value {
        json!({
            "class": self.name,
            "signature": self.signature.to_map(),
            "config": serde_json::to_value(&self.config).unwrap_or(Value::Null),
            "metadata": {
                "demos": self.demos.len(),
                "trace_enabled": self.trace_enabled,
            },
        })
    }
}
