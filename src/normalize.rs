use serde_json::Value;

use crate::error::GatewayError;
use crate::models::{DEFAULT_TEMPERATURE, NormalizedRequest};

// Prefix marking an inline system instruction at the top of a prompt
const INSTRUCTION_MARKER: &str = "Instructions:";

// Validate the inbound payload and split out an inline system instruction.
//
// A prompt of the form "Instructions: <text>\n\n<rest>" yields
// system_message = <text> and prompt = <rest>. A marker without a clean
// double line-break split is ambiguous and passes through verbatim.
pub fn normalize(raw: &Value) -> Result<NormalizedRequest, GatewayError> {
    let object = raw
        .as_object()
        .ok_or_else(|| GatewayError::BadRequest("Invalid request format".to_string()))?;

    let prompt = object
        .get("prompt")
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::BadRequest("Missing 'prompt' field".to_string()))?;

    let (prompt, system_message) = extract_system_message(prompt);

    let temperature = object
        .get("temperature")
        .and_then(Value::as_f64)
        .map_or(DEFAULT_TEMPERATURE, |t| t as f32);

    let stream = object.get("stream").and_then(Value::as_bool).unwrap_or(true);

    Ok(NormalizedRequest {
        prompt,
        system_message,
        temperature,
        stream,
    })
}

fn extract_system_message(prompt: &str) -> (String, Option<String>) {
    if prompt.starts_with(INSTRUCTION_MARKER) {
        if let Some((head, rest)) = prompt.split_once("\n\n") {
            let instruction = head
                .strip_prefix(INSTRUCTION_MARKER)
                .unwrap_or(head)
                .trim()
                .to_string();
            return (rest.trim().to_string(), Some(instruction));
        }
    }
    (prompt.to_string(), None)
}
