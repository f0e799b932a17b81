use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::ExtractionError;

const FENCE: &str = "```";

/// Removes a leading ```` ```lang ```` line and a trailing ```` ``` ```` from a
/// model reply. Text without fences comes back trimmed and otherwise untouched.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    if cleaned.starts_with(FENCE) {
        // An opening fence with no newline has no body to keep.
        cleaned = match cleaned.find('\n') {
            Some(newline) => &cleaned[newline + 1..],
            None => "",
        };
    }
    if let Some(body) = cleaned.strip_suffix(FENCE) {
        cleaned = body;
    }
    cleaned.trim()
}

/// Turns the model's raw text into the list of atoms to return.
///
/// Accepts either `{"policies": [...]}` (missing key means no atoms) or a bare
/// array. Atoms are not validated here.
pub fn parse_policies(raw: &str) -> Result<Vec<Value>, ExtractionError> {
    let cleaned = strip_code_fences(raw);
    let parsed: Value = serde_json::from_str(cleaned)?;

    match parsed {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => match object.remove("policies") {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(ExtractionError::Internal(format!(
                "Claude response field \"policies\" is {}, expected an array",
                json_type_name(&other)
            ))),
        },
        other => Err(ExtractionError::Internal(format!(
            "Claude response is a JSON {}, expected an object or array",
            json_type_name(&other)
        ))),
    }
}

/// First `max` grapheme clusters of `text`, for log lines.
pub fn preview(text: &str, max: usize) -> String {
    text.graphemes(true).take(max).collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
