//! Turning payload values into file records and console text
//!
//! File serialization first attempts a strict encode that refuses cycles and
//! non-finite numbers. When that fails because of a cycle, a lenient walk
//! replaces every already-visited node with [`CIRCULAR_MARKER`] and every
//! unencodable field with [`UNSERIALIZABLE_MARKER`]. Any other failure falls
//! back to the single-line text form of the value.

use super::color::RESET;
use super::config::LoggerConfig;
use super::value::{ErrorValue, LogValue, Payload};
use serde_json::{json, Map, Number, Value};
use std::collections::HashSet;

pub const CIRCULAR_MARKER: &str = "[Circular Reference]";
pub const UNSERIALIZABLE_MARKER: &str = "[Unserializable]";

/// Marker used in console text for a node that contains itself
const DISPLAY_CIRCULAR: &str = "[Circular]";

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodeError {
    Circular,
    Unserializable,
}

fn error_record(error: &ErrorValue) -> Value {
    json!({
        "name": error.name,
        "message": error.message,
        "stack": error.stack,
    })
}

fn encode_strict(value: &LogValue, ancestors: &mut Vec<usize>) -> Result<Value, EncodeError> {
    if let Some(id) = value.node_id() {
        if ancestors.contains(&id) {
            return Err(EncodeError::Circular);
        }
        ancestors.push(id);
    }

    let encoded = match value {
        LogValue::Null => Ok(Value::Null),
        LogValue::Bool(b) => Ok(Value::Bool(*b)),
        LogValue::Int(i) => Ok(Value::from(*i)),
        LogValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .ok_or(EncodeError::Unserializable),
        LogValue::String(s) => Ok(Value::String(s.clone())),
        LogValue::Error(error) => Ok(error_record(error)),
        LogValue::List(items) => encode_children(items.read().iter(), ancestors).map(Value::Array),
        LogValue::Map(entries) => {
            let entries = entries.read();
            encode_children(entries.iter().map(|(_, v)| v), ancestors).map(|values| {
                Value::Object(
                    entries
                        .iter()
                        .map(|(k, _)| k.clone())
                        .zip(values)
                        .collect::<Map<String, Value>>(),
                )
            })
        }
    };

    if value.node_id().is_some() {
        ancestors.pop();
    }
    encoded
}

/// Encode every child. A cycle anywhere wins over an earlier unencodable
/// field, so the caller knows the lenient walk applies.
fn encode_children<'a>(
    children: impl Iterator<Item = &'a LogValue>,
    ancestors: &mut Vec<usize>,
) -> Result<Vec<Value>, EncodeError> {
    let mut encoded = Vec::new();
    let mut failure = None;
    for child in children {
        match encode_strict(child, ancestors) {
            Ok(value) => encoded.push(value),
            Err(EncodeError::Circular) => return Err(EncodeError::Circular),
            Err(EncodeError::Unserializable) => failure = Some(EncodeError::Unserializable),
        }
    }
    match failure {
        Some(error) => Err(error),
        None => Ok(encoded),
    }
}

fn encode_lenient(value: &LogValue, visited: &mut HashSet<usize>) -> Value {
    if let Some(id) = value.node_id() {
        if !visited.insert(id) {
            return Value::String(CIRCULAR_MARKER.to_string());
        }
    }

    match value {
        LogValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(UNSERIALIZABLE_MARKER.to_string())),
        LogValue::List(items) => Value::Array(
            items
                .read()
                .iter()
                .map(|item| encode_lenient(item, visited))
                .collect(),
        ),
        LogValue::Map(entries) => Value::Object(
            entries
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), encode_lenient(v, visited)))
                .collect(),
        ),
        other => encode_strict(other, &mut Vec::new())
            .unwrap_or_else(|_| Value::String(UNSERIALIZABLE_MARKER.to_string())),
    }
}

/// Convert a value into a JSON-safe structure. Never fails.
pub fn serialize_for_file(value: &LogValue) -> Value {
    match encode_strict(value, &mut Vec::new()) {
        Ok(encoded) => encoded,
        Err(EncodeError::Circular) => encode_lenient(value, &mut HashSet::new()),
        Err(EncodeError::Unserializable) => Value::String(inline(value)),
    }
}

/// The `data` field of a leveled record: every argument, in order
pub fn serialize_payload_for_file(payload: &Payload) -> Value {
    Value::Array(payload.values().iter().map(serialize_for_file).collect())
}

/// Render a value for the console.
///
/// With pretty printing enabled, lists, maps, and errors are rendered over
/// several indented lines (colored when console color is on); everything
/// else uses the single-line form.
pub fn serialize_for_display(value: &LogValue, config: &LoggerConfig) -> String {
    if config.pretty_print && value.is_object() {
        let mut out = String::new();
        write_pretty(value, config.console_color, 0, &mut Vec::new(), &mut out);
        out
    } else {
        inline(value)
    }
}

/// Render every argument independently and join them with a single space
pub fn format_payload(payload: &Payload, config: &LoggerConfig) -> String {
    payload
        .values()
        .iter()
        .map(|value| serialize_for_display(value, config))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Single-line text form. Top-level strings are returned unquoted.
pub fn inline(value: &LogValue) -> String {
    match value {
        LogValue::String(s) => s.clone(),
        LogValue::Error(error) => error.to_string(),
        other => {
            let mut out = String::new();
            write_inline(other, &mut Vec::new(), &mut out);
            out
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        f.to_string()
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn format_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if is_identifier {
        key.to_string()
    } else {
        quote(key)
    }
}

fn write_inline(value: &LogValue, ancestors: &mut Vec<usize>, out: &mut String) {
    if let Some(id) = value.node_id() {
        if ancestors.contains(&id) {
            out.push_str(DISPLAY_CIRCULAR);
            return;
        }
        ancestors.push(id);
    }

    match value {
        LogValue::Null => out.push_str("null"),
        LogValue::Bool(b) => out.push_str(&b.to_string()),
        LogValue::Int(i) => out.push_str(&i.to_string()),
        LogValue::Float(f) => out.push_str(&format_float(*f)),
        LogValue::String(s) => out.push_str(&quote(s)),
        LogValue::Error(error) => {
            out.push('[');
            out.push_str(&error.to_string());
            out.push(']');
        }
        LogValue::List(items) => {
            let items = items.read();
            if items.is_empty() {
                out.push_str("[]");
            } else {
                out.push_str("[ ");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_inline(item, ancestors, out);
                }
                out.push_str(" ]");
            }
        }
        LogValue::Map(entries) => {
            let entries = entries.read();
            if entries.is_empty() {
                out.push_str("{}");
            } else {
                out.push_str("{ ");
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&format_key(key));
                    out.push_str(": ");
                    write_inline(item, ancestors, out);
                }
                out.push_str(" }");
            }
        }
    }

    if value.node_id().is_some() {
        ancestors.pop();
    }
}

/// Escapes are emitted directly so only `consoleColor` decides, not the
/// terminal environment
fn paint(text: String, color: colored::Color, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{}m{}{}", color.to_fg_str(), text, RESET)
    } else {
        text
    }
}

fn write_pretty(
    value: &LogValue,
    color: bool,
    depth: usize,
    ancestors: &mut Vec<usize>,
    out: &mut String,
) {
    use colored::Color as C;

    if let Some(id) = value.node_id() {
        if ancestors.contains(&id) {
            out.push_str(&paint(DISPLAY_CIRCULAR.to_string(), C::Cyan, color));
            return;
        }
        ancestors.push(id);
    }

    let pad = INDENT.repeat(depth + 1);
    let closing_pad = INDENT.repeat(depth);

    match value {
        LogValue::Null => out.push_str(&paint("null".to_string(), C::BrightBlack, color)),
        LogValue::Bool(b) => out.push_str(&paint(b.to_string(), C::Yellow, color)),
        LogValue::Int(i) => out.push_str(&paint(i.to_string(), C::Yellow, color)),
        LogValue::Float(f) => out.push_str(&paint(format_float(*f), C::Yellow, color)),
        LogValue::String(s) => out.push_str(&paint(quote(s), C::Green, color)),
        LogValue::Error(error) => {
            out.push_str(&paint(error.to_string(), C::Red, color));
            if let Some(stack) = &error.stack {
                for line in stack.lines() {
                    out.push('\n');
                    out.push_str(&closing_pad);
                    out.push_str(line);
                }
            }
        }
        LogValue::List(items) => {
            let items = items.read();
            if items.is_empty() {
                out.push_str("[]");
            } else {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('\n');
                    out.push_str(&pad);
                    write_pretty(item, color, depth + 1, ancestors, out);
                }
                out.push('\n');
                out.push_str(&closing_pad);
                out.push(']');
            }
        }
        LogValue::Map(entries) => {
            let entries = entries.read();
            if entries.is_empty() {
                out.push_str("{}");
            } else {
                out.push('{');
                for (i, (key, item)) in entries.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('\n');
                    out.push_str(&pad);
                    out.push_str(&format_key(key));
                    out.push_str(": ");
                    write_pretty(item, color, depth + 1, ancestors, out);
                }
                out.push('\n');
                out.push_str(&closing_pad);
                out.push('}');
            }
        }
    }

    if value.node_id().is_some() {
        ancestors.pop();
    }
}
