//! The `Example` container: a flat key-value map partitioned by naming
//! convention into inputs and labels.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use weft_signature::ValueMap;

/// A labeled data point.
///
/// Keys ending in `_output` are labels; keys ending in `_input` and bare
/// keys are inputs. The partitioned views expose stripped names
/// (`answer_output` appears as `answer` in `labels()`). The partition is
/// recomputed on every mutation, so the views are always consistent with
/// the raw field map. Equality is full field-map equality.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "ValueMap", into = "ValueMap")]
pub struct Example {
    fields: ValueMap,
    inputs: ValueMap,
    labels: ValueMap,
}

impl Example {
    pub fn new(fields: ValueMap) -> Self {
        let mut example = Self {
            fields,
            inputs: ValueMap::new(),
            labels: ValueMap::new(),
        };
        example.repartition();
        example
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
        self.repartition();
    }

    /// Builder-style `set`.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.fields.remove(key);
        if removed.is_some() {
            self.repartition();
        }
        removed
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The raw field map.
    pub fn to_map(&self) -> ValueMap {
        self.fields.clone()
    }

    /// Input view: `_input`-suffixed and unsuffixed keys, suffixes stripped.
    pub fn inputs(&self) -> &ValueMap {
        &self.inputs
    }

    /// Label view: `_output`-suffixed keys, suffixes stripped.
    pub fn labels(&self) -> &ValueMap {
        &self.labels
    }

    fn repartition(&mut self) {
        self.inputs.clear();
        self.labels.clear();
        for (key, value) in &self.fields {
            if let Some(stripped) = key.strip_suffix("_output") {
                self.labels.insert(stripped.to_string(), value.clone());
            } else if let Some(stripped) = key.strip_suffix("_input") {
                self.inputs.insert(stripped.to_string(), value.clone());
            } else {
                self.inputs.insert(key.clone(), value.clone());
            }
        }
    }
}

impl PartialEq for Example {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl From<ValueMap> for Example {
    fn from(fields: ValueMap) -> Self {
        Self::new(fields)
    }
}

impl From<Example> for ValueMap {
    fn from(example: Example) -> Self {
        example.fields
    }
}
