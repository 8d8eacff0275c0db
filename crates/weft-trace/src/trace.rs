//! The immutable `Trace` record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use weft_data::Example;
use weft_signature::ValueMap;

/// Outcome metadata stamped onto a trace at frame end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMetadata {
    pub success: bool,
    pub error: Option<String>,
    pub error_kind: Option<String>,
    pub duration_ms: f64,
    /// Free-form metadata accumulated during the call.
    #[serde(default)]
    pub extra: ValueMap,
}

/// An immutable record of one module invocation.
///
/// Built once when its call frame ends; never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    id: Uuid,
    module_name: String,
    signature: Option<String>,
    inputs: ValueMap,
    outputs: ValueMap,
    metadata: TraceMetadata,
    timestamp: DateTime<Utc>,
}

impl Trace {
    pub(crate) fn new(
        module_name: String,
        signature: Option<String>,
        inputs: ValueMap,
        outputs: ValueMap,
        metadata: TraceMetadata,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            module_name,
            signature,
            inputs,
            outputs,
            metadata,
            timestamp,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Rendered source of the signature active at call time, if any.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn inputs(&self) -> &ValueMap {
        &self.inputs
    }

    pub fn outputs(&self) -> &ValueMap {
        &self.outputs
    }

    pub fn metadata(&self) -> &TraceMetadata {
        &self.metadata
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn success(&self) -> bool {
        self.metadata.success
    }

    pub fn duration_ms(&self) -> f64 {
        self.metadata.duration_ms
    }

    /// Plain-map export shape consumed by external persistence sinks.
    pub fn to_map(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "module_name": self.module_name,
            "signature": self.signature,
            "inputs": self.inputs,
            "outputs": self.outputs,
            "metadata": {
                "success": self.metadata.success,
                "error": self.metadata.error,
                "error_kind": self.metadata.error_kind,
                "duration_ms": self.metadata.duration_ms,
                "extra": self.metadata.extra,
            },
            "timestamp": self.timestamp.to_rfc3339(),
        })
    }

    /// Convert to a labeled example: inputs keep their names, outputs
    /// get the `_output` label suffix.
    pub fn to_example(&self) -> Example {
        let mut fields = self.inputs.clone();
        for (key, value) in &self.outputs {
            fields.insert(format!("{}_output", key), value.clone());
        }
        Example::new(fields)
    }
}
