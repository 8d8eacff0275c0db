//! The `Prediction` container: an optional source example overlaid by
//! module completions, plus free-form metadata.

use crate::example::Example;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use weft_signature::ValueMap;

/// The result of one module invocation.
///
/// Lookup order: completions shadow the raw example fields, which shadow
/// the example's partitioned input/label views. Metadata is carried
/// separately and is not part of the data view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    example: Option<Example>,
    completions: ValueMap,
    metadata: ValueMap,
}

impl Prediction {
    pub fn new(completions: ValueMap) -> Self {
        Self {
            example: None,
            completions,
            metadata: ValueMap::new(),
        }
    }

    pub fn with_example(example: Example, completions: ValueMap) -> Self {
        Self {
            example: Some(example),
            completions,
            metadata: ValueMap::new(),
        }
    }

    /// Look up a key: completions, then raw example fields, then the
    /// example's partitioned views.
    pub fn get(&self, key: &str) -> Option<&Value> {
        if let Some(value) = self.completions.get(key) {
            return Some(value);
        }
        let example = self.example.as_ref()?;
        example
            .get(key)
            .or_else(|| example.inputs().get(key))
            .or_else(|| example.labels().get(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn example(&self) -> Option<&Example> {
        self.example.as_ref()
    }

    pub fn completions(&self) -> &ValueMap {
        &self.completions
    }

    pub fn set_completion(&mut self, key: impl Into<String>, value: Value) {
        self.completions.insert(key.into(), value);
    }

    pub fn metadata(&self) -> &ValueMap {
        &self.metadata
    }

    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set_metadata(key, value);
        self
    }

    /// Materialize the merged data view (metadata excluded) as a new
    /// `Example`.
    pub fn to_example(&self) -> Example {
        let mut fields = self
            .example
            .as_ref()
            .map(|e| e.to_map())
            .unwrap_or_default();
        for (key, value) in &self.completions {
            fields.insert(key.clone(), value.clone());
        }
        Example::new(fields)
    }
}
