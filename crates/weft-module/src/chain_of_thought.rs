//! Chain-of-thought prediction: ask for reasoning before the answer.

use crate::errors::ModuleResult;
use crate::module::Module;
use crate::prompt;
use serde_json::{json, Value};
use std::sync::Arc;
use weft_data::{Example, Prediction};
use weft_model::ModelCapability;
use weft_signature::{Field, FieldType, Signature, ValueMap};

use crate::predict::PredictConfig;

const PREAMBLE: &str =
    "Think step by step. Explain your reasoning in the 'reasoning' field before the other outputs.";

/// Like [`crate::Predict`], but the request asks for an explicit
/// `reasoning` output ahead of the declared fields. The reasoning text
/// is surfaced both as a completion and in the prediction metadata.
pub struct ChainOfThought {
    /// The caller-declared contract; traces and validation use this one.
    signature: Signature,
    /// The declared contract plus the leading `reasoning` output.
    extended: Signature,
    capability: Arc<dyn ModelCapability>,
    config: PredictConfig,
    demos: Vec<Example>,
    trace_enabled: bool,
    name: String,
}

impl ChainOfThought {
    pub fn new(signature: Signature, capability: Arc<dyn ModelCapability>) -> Self {
        let extended = extend_with_reasoning(&signature);
        Self {
            signature,
            extended,
            capability,
            config: PredictConfig::default(),
            demos: Vec::new(),
            trace_enabled: true,
            name: "ChainOfThought".to_string(),
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
}

fn extend_with_reasoning(signature: &Signature) -> Signature {
    if signature.output("reasoning").is_some() {
        return signature.clone();
    }
    let mut outputs = vec![
        Field::new("reasoning", FieldType::String)
            .with_description("step-by-step reasoning behind the outputs"),
    ];
    outputs.extend(signature.outputs().to_vec());
    // Both sides were already validated on the source signature.
    Signature::from_fields(signature.inputs().to_vec(), outputs)
        .unwrap_or_else(|_| signature.clone())
}

impl Module for ChainOfThought {
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
        let messages =
            prompt::render_messages(&self.extended, &self.demos, &inputs, Some(PREAMBLE));
        let completion = self
            .config
            .retry
            .run(|| self.capability.complete(&messages, &self.config.options))?;
        let outputs = prompt::parse_outputs(&self.extended, &completion.content)?;

        let mut prediction = Prediction::new(outputs);
        if let Some(reasoning) = prediction.completions().get("reasoning").cloned() {
            prediction.set_metadata("reasoning", reasoning);
        }
        prediction.set_metadata("model", json!(completion.model));
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
                "reasoning_field": true,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_model::StaticCapability;

    fn inputs(question: &str) -> ValueMap {
        [("question".to_string(), json!(question))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_reasoning_surfaced_in_metadata() {
        let signature = Signature::parse("question: string -> answer: string").unwrap();
        let capability = Arc::new(StaticCapability::json(json!({
            "reasoning": "4 is 2 plus 2",
            "answer": "4"
        })));
        let mut module = ChainOfThought::new(signature, capability);
        module.set_trace_enabled(false);
        let prediction = module.call(inputs("2+2?")).unwrap();
        assert_eq!(prediction.get("answer"), Some(&json!("4")));
        assert_eq!(prediction.get("reasoning"), Some(&json!("4 is 2 plus 2")));
        assert_eq!(
            prediction.metadata().get("reasoning"),
            Some(&json!("4 is 2 plus 2"))
        );
    }

    #[test]
    fn test_missing_reasoning_is_an_output_parse_error() {
        let signature = Signature::parse("question: string -> answer: string").unwrap();
        let capability = Arc::new(StaticCapability::json(json!({"answer": "4"})));
        let mut module = ChainOfThought::new(signature, capability);
        module.set_trace_enabled(false);
        let err = module.call(inputs("2+2?")).unwrap_err();
        assert!(matches!(
            err,
            crate::ModuleError::OutputParse(ref m) if m.contains("reasoning")
        ));
    }

    #[test]
    fn test_existing_reasoning_output_not_duplicated() {
        let signature =
            Signature::parse("question -> reasoning: string, answer: string").unwrap();
        let module = ChainOfThought::new(
            signature.clone(),
            Arc::new(StaticCapability::new("{}")),
        );
        assert_eq!(module.extended.outputs().len(), signature.outputs().len());
    }
}
