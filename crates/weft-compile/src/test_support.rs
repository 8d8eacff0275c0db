//! Shared deterministic fixtures for in-crate tests.

use serde_json::{json, Value};
use weft_data::{Example, Prediction};
use weft_module::{Module, ModuleError, ModuleResult, Program, ProgramTrace};
use weft_signature::{Signature, ValueMap};

/// Training example with a `question` input and an `answer_output` label.
pub(crate) fn example(question: &str, answer: &str) -> Example {
    Example::default()
        .with("question", json!(question))
        .with("answer_output", json!(answer))
}

/// Module that copies `question` into `answer`, optionally failing.
pub(crate) struct EchoModule {
    signature: Signature,
    demos: Vec<Example>,
    trace_enabled: bool,
    pub(crate) fail_with: Option<String>,
}

impl EchoModule {
    pub(crate) fn new() -> Self {
        Self {
            signature: Signature::parse("question: string -> answer: string")
                .expect("static signature"),
            demos: Vec::new(),
            trace_enabled: false,
            fail_with: None,
        }
    }
}

impl Module for EchoModule {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn name(&self) -> &str {
        "echo"
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
        if let Some(message) = &self.fail_with {
            return Err(ModuleError::CallFailed(message.clone()));
        }
        let value = inputs.get("question").cloned().unwrap_or(Value::Null);
        let completions: ValueMap = [("answer".to_string(), value)].into_iter().collect();
        Ok(Prediction::new(completions))
    }
}

/// Single-module program around [`EchoModule`].
pub(crate) struct EchoProgram {
    module: EchoModule,
}

impl EchoProgram {
    pub(crate) fn new() -> Self {
        Self {
            module: EchoModule::new(),
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        let mut module = EchoModule::new();
        module.fail_with = Some(message.to_string());
        Self { module }
    }
}

impl Program for EchoProgram {
    fn name(&self) -> &str {
        "echo_program"
    }

    fn module_names(&self) -> Vec<String> {
        vec!["echo".to_string()]
    }

    fn module(&self, name: &str) -> Option<&dyn Module> {
        (name == "echo").then_some(&self.module as &dyn Module)
    }

    fn module_mut(&mut self, name: &str) -> Option<&mut dyn Module> {
        (name == "echo").then_some(&mut self.module as &mut dyn Module)
    }

    fn forward(&self, inputs: ValueMap, trace: &mut ProgramTrace) -> ModuleResult<ValueMap> {
        let prediction = self.module.call(inputs.clone())?;
        let outputs = prediction.completions().clone();
        trace.record("echo", inputs, outputs.clone());
        Ok(outputs)
    }
}
