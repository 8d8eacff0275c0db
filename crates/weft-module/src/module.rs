//! The `Module` execution contract.

use crate::errors::ModuleResult;
use serde_json::Value;
use weft_data::{Example, Prediction};
use weft_signature::{Signature, ValueMap};
use weft_trace::TraceContext;

/// A computation unit bound to a signature.
///
/// Concrete modules differ only in `forward`; the provided `call` wraps
/// every invocation in the shared contract: validate and coerce inputs
/// against the signature, open a trace frame, run `forward`, and close
/// the frame on success or error. Tracing never alters control flow;
/// errors from `forward` propagate unmodified after best-effort
/// recording.
pub trait Module: Send + Sync {
    /// The bound input/output contract.
    fn signature(&self) -> &Signature;

    /// Simple display name used to label traces.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Demonstrations injected into capability requests.
    fn demos(&self) -> &[Example];

    /// Replace the attached demonstrations.
    fn set_demos(&mut self, demos: Vec<Example>);

    /// Per-instance tracing flag, independent of any global state.
    fn trace_enabled(&self) -> bool;

    fn set_trace_enabled(&mut self, enabled: bool);

    /// The module-specific computation. Implementations may block on the
    /// model capability.
    fn forward(&self, inputs: ValueMap) -> ModuleResult<Prediction>;

    /// Run the shared call contract around `forward`.
    fn call(&self, inputs: ValueMap) -> ModuleResult<Prediction> {
        let signature = self.signature();
        signature.validate_inputs(&inputs)?;
        let inputs = signature.coerce_inputs(&inputs)?;

        let traced = self.trace_enabled();
        if traced {
            TraceContext::start_trace(self.name(), Some(signature), inputs.clone());
        }
        tracing::debug!(module = self.name(), traced, "module call started");

        match self.forward(inputs) {
            Ok(prediction) => {
                if traced {
                    TraceContext::end_trace(
                        prediction.completions().clone(),
                        prediction.metadata().clone(),
                    );
                }
                tracing::debug!(module = self.name(), "module call succeeded");
                Ok(prediction)
            }
            Err(err) => {
                if traced {
                    TraceContext::record_error(
                        err.to_string(),
                        err.kind(),
                        ValueMap::new(),
                        ValueMap::new(),
                    );
                }
                tracing::debug!(module = self.name(), error = %err, "module call failed");
                Err(err)
            }
        }
    }

    /// Stable introspection map `{class, signature, config, metadata}`
    /// consumed by external endpoint/schema generators.
    fn to_map(&self) -> Value {
        serde_json::json!({
            "class": self.name(),
            "signature": self.signature().to_map(),
            "config": {},
            "metadata": {
                "demos": self.demos().len(),
                "trace_enabled": self.trace_enabled(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ModuleError;
    use serde_json::json;
    use std::sync::Arc;
    use weft_trace::{global, TraceCollector};

    /// Echoes the first input value into every output field.
    struct Echo {
        signature: Signature,
        demos: Vec<Example>,
        trace_enabled: bool,
        fail_with: Option<String>,
    }

    impl Echo {
        fn new() -> Self {
            Self {
                signature: Signature::parse("question: string -> answer: string").unwrap(),
                demos: Vec::new(),
                trace_enabled: true,
                fail_with: None,
            }
        }
    }

    impl Module for Echo {
        fn signature(&self) -> &Signature {
            &self.signature
        }

        fn name(&self) -> &str {
            "Echo"
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
            let value = inputs.values().next().cloned().unwrap_or(Value::Null);
            let completions: ValueMap = [("answer".to_string(), value)].into_iter().collect();
            Ok(Prediction::new(completions))
        }
    }

    fn inputs(question: &str) -> ValueMap {
        [("question".to_string(), json!(question))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_missing_inputs_named() {
        let module = Echo::new();
        let err = module.call(ValueMap::new()).unwrap_err();
        assert_eq!(err, ModuleError::MissingInputs(vec!["question".into()]));
    }

    #[test]
    fn test_successful_call_leaves_one_trace() {
        let _guard = crate::test_global_guard();
        let collector = Arc::new(TraceCollector::new());
        let module = Echo::new();
        global::with_collector(Arc::clone(&collector), || {
            let prediction = module.call(inputs("hi")).unwrap();
            assert_eq!(prediction.get("answer"), Some(&json!("hi")));
        });
        let traces = collector.snapshot();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].module_name(), "Echo");
        assert_eq!(traces[0].inputs().get("question"), Some(&json!("hi")));
        assert!(traces[0].metadata().success);
    }

    #[test]
    fn test_error_recorded_then_reraised() {
        let _guard = crate::test_global_guard();
        let collector = Arc::new(TraceCollector::new());
        let mut module = Echo::new();
        module.fail_with = Some("forward exploded".to_string());
        let err = global::with_collector(Arc::clone(&collector), || {
            module.call(inputs("hi")).unwrap_err()
        });
        assert_eq!(err, ModuleError::CallFailed("forward exploded".into()));
        let traces = collector.snapshot();
        assert_eq!(traces.len(), 1);
        assert!(!traces[0].metadata().success);
        assert_eq!(
            traces[0].metadata().error.as_deref(),
            Some("Module call failed: forward exploded")
        );
        assert_eq!(traces[0].metadata().error_kind.as_deref(), Some("module"));
    }

    #[test]
    fn test_tracing_toggle_per_instance() {
        let _guard = crate::test_global_guard();
        let collector = Arc::new(TraceCollector::new());
        let mut module = Echo::new();
        module.set_trace_enabled(false);
        global::with_collector(Arc::clone(&collector), || {
            module.call(inputs("hi")).unwrap();
        });
        assert!(collector.is_empty());
    }

    #[test]
    fn test_inputs_coerced_before_forward() {
        let sig = Signature::parse("n: int -> answer: string").unwrap();
        let mut module = Echo::new();
        module.signature = sig;
        module.set_trace_enabled(false);
        let values: ValueMap = [("n".to_string(), json!("7"))].into_iter().collect();
        let prediction = module.call(values).unwrap();
        assert_eq!(prediction.get("answer"), Some(&json!(7)));
    }
}
