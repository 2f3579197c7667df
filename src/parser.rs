//! Response parsing for raw model output
//!
//! The model usually wraps its JSON in a Markdown code fence and sometimes
//! appends prose. This layer strips the fence and decodes the rest into a
//! generic key-value tree; interpreting field meaning is the normalizer's job.
//! Single attempt, fail fast.

use serde_json::{Map, Value};

use crate::{Result, VoyageMindError};

/// Extract the JSON object payload from a raw model response.
///
/// Fails with a parse error when the stripped text is not well-formed JSON or
/// decodes to something other than an object.
pub fn parse_model_response(raw: &str) -> Result<Map<String, Value>> {
    let stripped = strip_code_fence(raw);

    let value: Value = serde_json::from_str(stripped).map_err(|e| {
        VoyageMindError::parse(format!("model response is not valid JSON: {e}"))
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(VoyageMindError::parse(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Strip a leading ```` ``` ```` fence (with optional language tag) and a
/// trailing fence, if present. Text without fences passes through untouched.
fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();

    let body = match text.strip_prefix("```") {
        Some(rest) => {
            // Drop the language tag line when the opener sits on its own line,
            // otherwise tolerate an inline "```json{...}" opener.
            let rest = match rest.split_once('\n') {
                Some((tag, tail)) if tag.trim().chars().all(|c| c.is_ascii_alphanumeric()) => tail,
                _ => rest.strip_prefix("json").unwrap_or(rest),
            };
            rest.trim_end().strip_suffix("```").unwrap_or(rest)
        }
        None => text,
    };

    body.trim()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
