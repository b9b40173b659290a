use serde_json::json;

/// Interpret raw provider or tool text as a step output.
///
/// JSON is parsed as-is, including JSON wrapped in a Markdown code fence.
/// Anything else is wrapped as `{"text": ...}`.
pub fn parse_output(text: &str) -> serde_json::Value {
  let trimmed = text.trim();
  let body = strip_fence(trimmed).unwrap_or(trimmed);

  match serde_json::from_str::<serde_json::Value>(body) {
    Ok(value) => value,
    Err(_) => json!({ "text": text }),
  }
}

/// Tool outputs are already JSON, but some tools return JSON encoded as a
/// string.
pub(crate) fn normalize_tool_output(output: serde_json::Value) -> serde_json::Value {
  match output {
    serde_json::Value::String(text) => parse_output(&text),
    other => other,
  }
}

fn strip_fence(text: &str) -> Option<&str> {
  let rest = text.strip_prefix("```")?;
  let rest = rest.strip_suffix("```")?;
  // Drop the info string ("json") on the opening line.
  let body = match rest.find('\n') {
    Some(newline) => &rest[newline + 1..],
    None => rest,
  };
  Some(body.trim())
}
