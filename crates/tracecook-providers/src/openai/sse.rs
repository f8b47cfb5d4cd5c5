use std::collections::BTreeMap;

use serde_json::Value;

use crate::common::decode_arguments;

/// One tool-call fragment accumulated across an OpenAI streamed response,
/// keyed by the server-provided `index`.
#[derive(Debug, Default)]
struct ToolCallAccum {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// The response shape recovered from a chunked OpenAI SSE stream, already
/// collapsed to look like the single-shot non-streaming case.
#[derive(Debug, Default)]
pub struct AssembledResponse {
    pub content: String,
    pub tool_calls: Vec<(String, Value, Option<String>)>,
    pub id: Option<String>,
    pub model: Option<String>,
}

/// Reassemble raw `data: {...}` SSE lines into one logical response.
///
/// Per-line JSON parse failures are skipped (a malformed fragment never
/// aborts the batch); the terminal `data: [DONE]` sentinel is dropped.
pub fn reassemble(lines: &[String]) -> AssembledResponse {
    let mut content = String::new();
    let mut tool_calls: BTreeMap<u64, ToolCallAccum> = BTreeMap::new();
    let mut id = None;
    let mut model = None;

    for line in lines {
        let payload = match line.strip_prefix("data:") {
            Some(rest) => rest.trim(),
            None => line.trim(),
        };
        if payload.is_empty() || payload == "[DONE]" {
            continue;
        }
        let chunk: Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(_) => continue,
        };

        if id.is_none() {
            id = chunk.get("id").and_then(Value::as_str).map(str::to_string);
        }
        if model.is_none() {
            model = chunk.get("model").and_then(Value::as_str).map(str::to_string);
        }

        let Some(delta) = chunk
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .and_then(|c| c.get("delta"))
        else {
            continue;
        };

        if let Some(text) = delta.get("content").and_then(Value::as_str) {
            content.push_str(text);
        }

        if let Some(calls) = delta.get("tool_calls").and_then(Value::as_array) {
            for call in calls {
                let index = call.get("index").and_then(Value::as_u64).unwrap_or(0);
                let accum = tool_calls.entry(index).or_default();
                if accum.id.is_none() {
                    accum.id = call.get("id").and_then(Value::as_str).map(str::to_string);
                }
                if let Some(function) = call.get("function") {
                    if accum.name.is_none() {
                        accum.name = function
                            .get("name")
                            .and_then(Value::as_str)
                            .map(str::to_string);
                    }
                    if let Some(args) = function.get("arguments").and_then(Value::as_str) {
                        accum.arguments.push_str(args);
                    }
                }
            }
        }
    }

    let tool_calls = tool_calls
        .into_values()
        .map(|accum| {
            let args = decode_arguments(&accum.arguments);
            (accum.name.unwrap_or_default(), args, accum.id)
        })
        .collect();

    AssembledResponse {
        content,
        tool_calls,
        id,
        model,
    }
}
