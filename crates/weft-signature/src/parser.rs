//! Parser for the compact signature grammar
//!
//! Grammar: `<inputs> -> <outputs>`, each side a comma-separated list of
//! `name[?]: type ["description"]`. Splitting tracks bracket and quote
//! nesting so commas inside `list[...]`, `dict[...]`, `literal[...]`, and
//! quoted descriptions are never treated as separators.

use crate::errors::{SignatureError, SignatureResult};
use crate::field::{Field, FieldType};

/// Parse a signature source string into its input and output field lists.
pub(crate) fn parse_signature(source: &str) -> SignatureResult<(Vec<Field>, Vec<Field>)> {
    let arrows = top_level_arrow_positions(source);
    if arrows.len() != 1 {
        return Err(SignatureError::MalformedGrammar(format!(
            "expected exactly one top-level '->' in '{}', found {}",
            source.trim(),
            arrows.len()
        )));
    }
    let (lhs, rhs) = source.split_at(arrows[0]);
    let rhs = &rhs[2..];

    let inputs = parse_side(lhs)?;
    let outputs = parse_side(rhs)?;
    Ok((inputs, outputs))
}

fn parse_side(side: &str) -> SignatureResult<Vec<Field>> {
    split_top_level_commas(side)
        .into_iter()
        .map(parse_field)
        .collect()
}

/// Byte positions of `->` occurrences outside brackets and quotes.
fn top_level_arrow_positions(source: &str) -> Vec<usize> {
    let bytes = source.as_bytes();
    let mut positions = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b'[' if !in_quotes => depth += 1,
            b']' if !in_quotes => depth -= 1,
            b'-' if !in_quotes && depth == 0 && bytes.get(i + 1) == Some(&b'>') => {
                positions.push(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    positions
}

/// Split on commas outside brackets and quotes.
fn split_top_level_commas(side: &str) -> Vec<&str> {
    let bytes = side.as_bytes();
    let mut chunks = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'[' if !in_quotes => depth += 1,
            b']' if !in_quotes => depth -= 1,
            b',' if !in_quotes && depth == 0 => {
                chunks.push(&side[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    chunks.push(&side[start..]);
    chunks
}

fn parse_field(chunk: &str) -> SignatureResult<Field> {
    let chunk = chunk.trim();
    if chunk.is_empty() {
        return Err(SignatureError::MalformedGrammar(
            "empty field declaration".to_string(),
        ));
    }

    let (name_part, type_part) = match top_level_colon(chunk) {
        Some(pos) => (&chunk[..pos], Some(&chunk[pos + 1..])),
        None => (chunk, None),
    };

    let mut name = name_part.trim();
    let mut optional = false;
    if let Some(stripped) = name.strip_suffix('?') {
        optional = true;
        name = stripped.trim_end();
    }
    validate_name(name, chunk)?;

    let (field_type, description) = match type_part {
        Some(rest) => {
            let (type_expr, description) = split_description(rest)?;
            (parse_type(type_expr.trim())?, description)
        }
        // A bare name defaults to string.
        None => (FieldType::String, None),
    };

    let mut field = Field::new(name, field_type);
    field.optional = optional;
    field.description = description;
    Ok(field)
}

/// Position of the first `:` outside brackets and quotes, if any.
fn top_level_colon(chunk: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_quotes = false;
    for (i, b) in chunk.as_bytes().iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'[' if !in_quotes => depth += 1,
            b']' if !in_quotes => depth -= 1,
            b':' if !in_quotes && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn validate_name(name: &str, chunk: &str) -> SignatureResult<()> {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(SignatureError::MalformedGrammar(format!(
            "invalid field name in '{}'",
            chunk.trim()
        )))
    }
}

/// Split a trailing quoted description off the type expression, e.g.
/// `list[int] "ranked ids"` -> (`list[int]`, `ranked ids`).
fn split_description(rest: &str) -> SignatureResult<(&str, Option<String>)> {
    let bytes = rest.as_bytes();
    let mut depth = 0i32;
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'[' => depth += 1,
            b']' => depth -= 1,
            b'"' if depth == 0 => {
                let body = &rest[i + 1..];
                let close = body.find('"').ok_or_else(|| {
                    SignatureError::MalformedGrammar(format!(
                        "unterminated description in '{}'",
                        rest.trim()
                    ))
                })?;
                let trailing = body[close + 1..].trim();
                if !trailing.is_empty() {
                    return Err(SignatureError::MalformedGrammar(format!(
                        "unexpected trailing content '{}' after description",
                        trailing
                    )));
                }
                return Ok((&rest[..i], Some(body[..close].to_string())));
            }
            _ => {}
        }
    }
    Ok((rest, None))
}

fn parse_type(expr: &str) -> SignatureResult<FieldType> {
    if expr.is_empty() {
        return Err(SignatureError::MalformedGrammar(
            "missing type after ':'".to_string(),
        ));
    }
    match expr {
        "string" => return Ok(FieldType::String),
        "int" | "integer" => return Ok(FieldType::Int),
        "float" => return Ok(FieldType::Float),
        "bool" | "boolean" => return Ok(FieldType::Bool),
        _ => {}
    }
    if let Some(inner) = bracketed(expr, "list") {
        return Ok(FieldType::List(Box::new(parse_type(inner.trim())?)));
    }
    if let Some(inner) = bracketed(expr, "dict") {
        let parts = split_top_level_commas(inner);
        if parts.len() != 2 {
            return Err(SignatureError::MalformedGrammar(format!(
                "dict type expects 'dict[K, V]', got '{}'",
                expr
            )));
        }
        return Ok(FieldType::Dict(
            Box::new(parse_type(parts[0].trim())?),
            Box::new(parse_type(parts[1].trim())?),
        ));
    }
    if let Some(inner) = bracketed(expr, "literal") {
        let values: SignatureResult<Vec<String>> = split_top_level_commas(inner)
            .into_iter()
            .map(|part| {
                let part = part.trim();
                part.strip_prefix('"')
                    .and_then(|p| p.strip_suffix('"'))
                    .map(|p| p.to_string())
                    .ok_or_else(|| {
                        SignatureError::MalformedGrammar(format!(
                            "literal values must be quoted, got '{}'",
                            part
                        ))
                    })
            })
            .collect();
        let values = values?;
        if values.is_empty() {
            return Err(SignatureError::MalformedGrammar(
                "literal type requires at least one value".to_string(),
            ));
        }
        return Ok(FieldType::Literal(values));
    }
    Err(SignatureError::MalformedGrammar(format!(
        "unknown type '{}'",
        expr
    )))
}

/// `bracketed("list[int]", "list")` -> `Some("int")`.
fn bracketed<'a>(expr: &'a str, keyword: &str) -> Option<&'a str> {
    expr.strip_prefix(keyword)?
        .strip_prefix('[')?
        .strip_suffix(']')
}
