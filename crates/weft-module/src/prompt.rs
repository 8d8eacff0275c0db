//! Prompt rendering and completion parsing shared by the
//! capability-backed modules.

use crate::errors::{ModuleError, ModuleResult};
use serde_json::Value;
use weft_data::Example;
use weft_signature::{Signature, ValueMap};
use weft_model::ChatMessage;

/// Render a completion request: a system message describing the
/// contract, one user/assistant pair per demonstration, and the actual
/// inputs as the final user message.
pub(crate) fn render_messages(
    signature: &Signature,
    demos: &[Example],
    inputs: &ValueMap,
    preamble: Option<&str>,
) -> Vec<ChatMessage> {
    let mut system = String::new();
    if let Some(preamble) = preamble {
        system.push_str(preamble);
        system.push_str("\n\n");
    }
    system.push_str("You receive input fields and produce output fields.\n\nInput fields:\n");
    for field in signature.inputs() {
        system.push_str(&describe_field(field));
    }
    system.push_str("\nOutput fields:\n");
    for field in signature.outputs() {
        system.push_str(&describe_field(field));
    }
    system.push_str(
        "\nRespond with a single JSON object containing exactly the output fields.",
    );

    let mut messages = vec![ChatMessage::system(system)];
    for demo in demos {
        messages.push(ChatMessage::user(render_map(demo.inputs())));
        messages.push(ChatMessage::assistant(render_map(demo.labels())));
    }
    messages.push(ChatMessage::user(render_map(inputs)));
    messages
}

fn describe_field(field: &weft_signature::Field) -> String {
    let mut line = format!("- {}: {}", field.name, field.field_type);
    if field.optional {
        line.push_str(" (optional)");
    }
    if let Some(desc) = &field.description {
        line.push_str(": ");
        line.push_str(desc);
    }
    line.push('\n');
    line
}

fn render_map(map: &ValueMap) -> String {
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}

/// Parse completion content into the declared output fields.
///
/// Strict JSON first, then the first balanced JSON object embedded in
/// surrounding prose. When the signature declares exactly one output
/// field, raw text is accepted as that field's value.
pub(crate) fn parse_outputs(signature: &Signature, content: &str) -> ModuleResult<ValueMap> {
    let parsed: Option<Value> = serde_json::from_str(content)
        .ok()
        .or_else(|| extract_first_json_object(content).and_then(|s| serde_json::from_str(&s).ok()));

    if let Some(Value::Object(object)) = parsed {
        let mut outputs = ValueMap::new();
        let mut missing = Vec::new();
        for field in signature.outputs() {
            match object.get(&field.name) {
                Some(value) => {
                    outputs.insert(field.name.clone(), value.clone());
                }
                None if field.optional => {}
                None => missing.push(field.name.clone()),
            }
        }
        if !missing.is_empty() {
            return Err(ModuleError::OutputParse(format!(
                "completion is missing output fields: {}",
                missing.join(", ")
            )));
        }
        return Ok(outputs);
    }

    // Single-output signatures accept the raw completion text.
    if signature.outputs().len() == 1 {
        let field = &signature.outputs()[0];
        let mut outputs = ValueMap::new();
        outputs.insert(
            field.name.clone(),
            Value::String(content.trim().to_string()),
        );
        return Ok(outputs);
    }

    Err(ModuleError::OutputParse(format!(
        "expected a JSON object with fields {}, got: {}",
        signature
            .outputs()
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        truncate(content, 120)
    )))
}

/// First balanced `{...}` block in the content, if any.
fn extract_first_json_object(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in raw[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(raw[start..start + idx + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

fn truncate(input: &str, max_len: usize) -> String {
    let mut s = input.trim().replace('\n', " ");
    if s.len() > max_len {
        let mut end = max_len;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}
