//! Field and field-type definitions
//!
//! A `Field` is one named, typed parameter within a signature. Fields are
//! immutable once built; coercion produces new values and never mutates
//! the declaration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Type tag for a signature field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// Enumerated string values; a value must match one of them exactly.
    Literal(Vec<String>),
    List(Box<FieldType>),
    Dict(Box<FieldType>, Box<FieldType>),
}

impl FieldType {
    /// Whether `value` already has this type, with no conversion needed.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Literal(allowed) => value
                .as_str()
                .map(|s| allowed.iter().any(|a| a == s))
                .unwrap_or(false),
            FieldType::List(elem) => value
                .as_array()
                .map(|items| items.iter().all(|v| elem.matches(v)))
                .unwrap_or(false),
            FieldType::Dict(key, val) => value
                .as_object()
                .map(|map| {
                    map.iter()
                        .all(|(k, v)| key.accepts_key(k) && val.matches(v))
                })
                .unwrap_or(false),
        }
    }

    /// Convert `value` to this type without loss. Already-typed values are
    /// returned unchanged, so coercion is idempotent. Returns `None` when
    /// the value cannot be represented losslessly.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        if self.matches(value) {
            return Some(value.clone());
        }
        match self {
            FieldType::String => match value {
                Value::Number(n) => Some(Value::String(n.to_string())),
                Value::Bool(b) => Some(Value::String(b.to_string())),
                _ => None,
            },
            FieldType::Int => match value {
                Value::Number(n) => {
                    let f = n.as_f64()?;
                    if f.fract() == 0.0 {
                        Some(Value::from(f as i64))
                    } else {
                        None
                    }
                }
                Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
                _ => None,
            },
            FieldType::Float => match value {
                Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| {
                    serde_json::Number::from_f64(f).map(Value::Number)
                }),
                _ => None,
            },
            FieldType::Bool => match value {
                Value::String(s) => match s.trim().to_lowercase().as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            FieldType::Literal(_) => None,
            FieldType::List(elem) => {
                let items = value.as_array()?;
                let coerced: Option<Vec<Value>> =
                    items.iter().map(|v| elem.coerce(v)).collect();
                coerced.map(Value::Array)
            }
            FieldType::Dict(key, val) => {
                let map = value.as_object()?;
                let mut out = serde_json::Map::new();
                for (k, v) in map {
                    if !key.accepts_key(k) {
                        return None;
                    }
                    out.insert(k.clone(), val.coerce(v)?);
                }
                Some(Value::Object(out))
            }
        }
    }

    /// Whether a JSON object key (always textual) is a valid rendering of
    /// this type. Used for `dict[K, V]` key checks.
    fn accepts_key(&self, key: &str) -> bool {
        match self {
            FieldType::String => true,
            FieldType::Int => key.trim().parse::<i64>().is_ok(),
            FieldType::Float => key.trim().parse::<f64>().is_ok(),
            FieldType::Bool => matches!(key.trim(), "true" | "false"),
            FieldType::Literal(allowed) => allowed.iter().any(|a| a == key),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Literal(allowed) => {
                let rendered: Vec<String> =
                    allowed.iter().map(|a| format!("\"{}\"", a)).collect();
                write!(f, "literal[{}]", rendered.join(", "))
            }
            FieldType::List(elem) => write!(f, "list[{}]", elem),
            FieldType::Dict(key, val) => write!(f, "dict[{}, {}]", key, val),
        }
    }
}

/// One named, typed parameter within a signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub optional: bool,
    pub description: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            optional: false,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.optional {
            write!(f, "?")?;
        }
        write!(f, ": {}", self.field_type)?;
        if let Some(desc) = &self.description {
            write!(f, " \"{}\"", desc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_int_from_string() {
        assert_eq!(FieldType::Int.coerce(&json!("10")), Some(json!(10)));
        assert_eq!(FieldType::Int.coerce(&json!(" 42 ")), Some(json!(42)));
        assert_eq!(FieldType::Int.coerce(&json!("ten")), None);
    }

    #[test]
    fn test_coerce_is_idempotent() {
        let cases = vec![
            (FieldType::Int, json!(7)),
            (FieldType::Float, json!(2.5)),
            (FieldType::Bool, json!(true)),
            (FieldType::String, json!("hello")),
            (FieldType::List(Box::new(FieldType::Int)), json!([1, 2, 3])),
        ];
        for (ty, value) in cases {
            let once = ty.coerce(&value).unwrap();
            assert_eq!(once, value);
            assert_eq!(ty.coerce(&once).unwrap(), once);
        }
    }

    #[test]
    fn test_coerce_bool_from_string() {
        assert_eq!(FieldType::Bool.coerce(&json!("true")), Some(json!(true)));
        assert_eq!(FieldType::Bool.coerce(&json!("FALSE")), Some(json!(false)));
        assert_eq!(FieldType::Bool.coerce(&json!("yes")), None);
    }

    #[test]
    fn test_coerce_float_accepts_int() {
        assert_eq!(FieldType::Float.coerce(&json!(3)), Some(json!(3)));
        assert_eq!(FieldType::Float.coerce(&json!("1.5")), Some(json!(1.5)));
    }

    #[test]
    fn test_coerce_int_rejects_fractional() {
        assert_eq!(FieldType::Int.coerce(&json!(1.5)), None);
        assert_eq!(FieldType::Int.coerce(&json!(3.0)), Some(json!(3)));
    }

    #[test]
    fn test_literal_membership() {
        let ty = FieldType::Literal(vec!["yes".into(), "no".into()]);
        assert_eq!(ty.coerce(&json!("yes")), Some(json!("yes")));
        assert_eq!(ty.coerce(&json!("maybe")), None);
    }

    #[test]
    fn test_coerce_list_elements() {
        let ty = FieldType::List(Box::new(FieldType::Int));
        assert_eq!(ty.coerce(&json!(["1", 2, "3"])), Some(json!([1, 2, 3])));
        assert_eq!(ty.coerce(&json!(["1", "x"])), None);
    }

    #[test]
    fn test_coerce_dict_values() {
        let ty = FieldType::Dict(Box::new(FieldType::String), Box::new(FieldType::Int));
        assert_eq!(
            ty.coerce(&json!({"a": "1", "b": 2})),
            Some(json!({"a": 1, "b": 2}))
        );
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let field = Field::new("tags", FieldType::List(Box::new(FieldType::String)))
            .optional()
            .with_description("free-form tags");
        assert_eq!(field.to_string(), "tags?: list[string] \"free-form tags\"");
    }
}
