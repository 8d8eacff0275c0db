//! End-to-end conformance of the module call contract and tracing.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use weft::{
    global, Example, Module, ModuleError, ModuleResult, Prediction, Signature, TraceCollector,
    ValueMap,
};

/// Serializes tests that swap the process-wide default collector.
fn global_lock() -> MutexGuard<'static, ()> {
    static LOCK: Mutex<()> = Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Echoes the `question` input into the `answer` output.
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

fn question(text: &str) -> ValueMap {
    [("question".to_string(), json!(text))].into_iter().collect()
}

#[test]
fn test_traced_call_leaves_exactly_one_trace() {
    let _lock = global_lock();
    let collector = Arc::new(TraceCollector::new());
    let module = Echo::new();

    global::with_collector(Arc::clone(&collector), || {
        let prediction = module.call(question("hi")).unwrap();
        assert_eq!(prediction.get("answer"), Some(&json!("hi")));
    });

    let traces = collector.snapshot();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].module_name(), "echo");
    assert_eq!(traces[0].inputs().get("question"), Some(&json!("hi")));
    assert!(traces[0].metadata().success);
}

#[test]
fn test_failed_call_recorded_with_raised_message() {
    let _lock = global_lock();
    let collector = Arc::new(TraceCollector::new());
    let mut module = Echo::new();
    module.fail_with = Some("backend offline".to_string());

    let err = global::with_collector(Arc::clone(&collector), || {
        module.call(question("hi")).unwrap_err()
    });

    let traces = collector.snapshot();
    assert_eq!(traces.len(), 1);
    assert!(!traces[0].metadata().success);
    assert_eq!(traces[0].metadata().error.as_deref(), Some(&*err.to_string()));
}

#[test]
fn test_two_threads_share_one_collector_without_loss() {
    let _lock = global_lock();
    let collector = Arc::new(TraceCollector::new());
    global::install_collector(Arc::clone(&collector));

    let module = Arc::new(Echo::new());
    let mut handles = Vec::new();
    for worker in 0..2 {
        let module = Arc::clone(&module);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                let prediction = module.call(question(&format!("{worker}-{i}"))).unwrap();
                assert!(prediction.get("answer").is_some());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    global::reset();

    let traces = collector.snapshot();
    assert_eq!(traces.len(), 200);
    assert!(traces.iter().all(|trace| trace.metadata().success));
    // No duplicated entries either.
    let mut ids: Vec<_> = traces.iter().map(|trace| trace.id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 200);
}

#[test]
fn test_trace_statistics_recomputed_per_read() {
    let _lock = global_lock();
    let collector = Arc::new(TraceCollector::new());
    let mut failing = Echo::new();
    failing.fail_with = Some("down".to_string());
    let passing = Echo::new();

    global::with_collector(Arc::clone(&collector), || {
        passing.call(question("a")).unwrap();
        assert_eq!(collector.success_rate(), 1.0);
        let _ = failing.call(question("b"));
        assert_eq!(collector.success_rate(), 0.5);
    });
}
