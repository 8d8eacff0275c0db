//! The `Signature` contract: ordered input/output fields plus validation
//! and coercion applied at module call boundaries.

use crate::errors::{SignatureError, SignatureResult};
use crate::field::Field;
use crate::parser::parse_signature;
use crate::ValueMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A declarative typed input/output contract.
///
/// Immutable after construction and safe to share across threads. Field
/// order follows declaration order. `Display` renders a canonical source
/// string that re-parses to an equivalent signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    inputs: Vec<Field>,
    outputs: Vec<Field>,
    source: String,
}

impl Signature {
    /// Parse a signature from its compact text grammar.
    pub fn parse(source: &str) -> SignatureResult<Self> {
        let (inputs, outputs) = parse_signature(source)?;
        Self::from_fields(inputs, outputs)
    }

    /// Build a signature from already-constructed fields.
    pub fn from_fields(inputs: Vec<Field>, outputs: Vec<Field>) -> SignatureResult<Self> {
        if inputs.is_empty() {
            return Err(SignatureError::EmptySide("input"));
        }
        if outputs.is_empty() {
            return Err(SignatureError::EmptySide("output"));
        }
        check_unique(&inputs, "input")?;
        check_unique(&outputs, "output")?;
        let source = render(&inputs, &outputs);
        Ok(Self {
            inputs,
            outputs,
            source,
        })
    }

    pub fn inputs(&self) -> &[Field] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Field] {
        &self.outputs
    }

    pub fn input(&self, name: &str) -> Option<&Field> {
        self.inputs.iter().find(|f| f.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&Field> {
        self.outputs.iter().find(|f| f.name == name)
    }

    /// The canonical source string this signature renders to.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Check that every required (non-optional) input is present.
    ///
    /// Fails naming every missing field. Unknown extra keys are ignored.
    pub fn validate_inputs(&self, values: &ValueMap) -> SignatureResult<()> {
        let missing: Vec<String> = self
            .inputs
            .iter()
            .filter(|f| !f.optional && !values.contains_key(&f.name))
            .map(|f| f.name.clone())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SignatureError::MissingInputs(missing))
        }
    }

    /// Coerce present declared inputs to their declared types.
    ///
    /// Textual representations convert losslessly (`"10"` -> `10`,
    /// `"true"` -> `true`); already-typed values pass through unchanged.
    /// Undeclared keys pass through untouched.
    pub fn coerce_inputs(&self, values: &ValueMap) -> SignatureResult<ValueMap> {
        let mut out = values.clone();
        for field in &self.inputs {
            if let Some(value) = values.get(&field.name) {
                let coerced = field.field_type.coerce(value).ok_or_else(|| {
                    SignatureError::Coercion {
                        field: field.name.clone(),
                        expected: field.field_type.to_string(),
                        value: value.to_string(),
                    }
                })?;
                out.insert(field.name.clone(), coerced);
            }
        }
        Ok(out)
    }

    /// Stable introspection map consumed by external schema generators.
    pub fn to_map(&self) -> serde_json::Value {
        let render_side = |fields: &[Field]| {
            serde_json::Value::Array(
                fields
                    .iter()
                    .map(|f| {
                        serde_json::json!({
                            "name": f.name,
                            "type": f.field_type.to_string(),
                            "optional": f.optional,
                            "description": f.description,
                        })
                    })
                    .collect(),
            )
        };
        serde_json::json!({
            "source": self.source,
            "inputs": render_side(&self.inputs),
            "outputs": render_side(&self.outputs),
        })
    }
}

fn check_unique(fields: &[Field], side: &'static str) -> SignatureResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SignatureError::DuplicateField {
                side,
                name: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn render(inputs: &[Field], outputs: &[Field]) -> String {
    let join = |fields: &[Field]| {
        fields
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{} -> {}", join(inputs), join(outputs))
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signature::parse(s)
    }
}
