use std::collections::BTreeMap;

use serde_json::Value;

use crate::common::decode_arguments;

#[derive(Debug, Default)]
struct BlockAccum {
    block_type: String,
    text: String,
    thinking: String,
    tool_id: Option<String>,
    tool_name: Option<String>,
    json_fragment: String,
}

#[derive(Debug, Default)]
pub struct AssembledResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub content_blocks: Vec<Value>,
}

/// Reassemble a Claude SSE event stream into a content-block array shaped
/// like the non-streaming `response.content` field.
pub fn reassemble(lines: &[String]) -> AssembledResponse {
    let mut blocks: BTreeMap<u64, BlockAccum> = BTreeMap::new();
    let mut id = None;
    let mut model = None;

    for line in lines {
        let payload = match line.strip_prefix("data:") {
            Some(rest) => rest.trim(),
            None => line.trim(),
        };
        if payload.is_empty() {
            continue;
        }
        let event: Value = match serde_json::from_str(payload) {
            Ok(v) => v,
            Err(_) => continue,
        };

        match event.get("type").and_then(Value::as_str) {
            Some("message_start") => {
                if let Some(message) = event.get("message") {
                    id = message.get("id").and_then(Value::as_str).map(str::to_string);
                    model = message.get("model").and_then(Value::as_str).map(str::to_string);
                }
            }
            Some("content_block_start") => {
                let index = event.get("index").and_then(Value::as_u64).unwrap_or(0);
                if let Some(block) = event.get("content_block") {
                    let accum = blocks.entry(index).or_default();
                    accum.block_type = block
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string();
                    accum.tool_id = block.get("id").and_then(Value::as_str).map(str::to_string);
                    accum.tool_name = block.get("name").and_then(Value::as_str).map(str::to_string);
                }
            }
            Some("content_block_delta") => {
                let index = event.get("index").and_then(Value::as_u64).unwrap_or(0);
                let Some(delta) = event.get("delta") else {
                    continue;
                };
                let accum = blocks.entry(index).or_default();
                match delta.get("type").and_then(Value::as_str) {
                    Some("text_delta") => {
                        if let Some(t) = delta.get("text").and_then(Value::as_str) {
                            accum.text.push_str(t);
                        }
                    }
                    Some("thinking_delta") => {
                        if let Some(t) = delta.get("thinking").and_then(Value::as_str) {
                            accum.thinking.push_str(t);
                        }
                    }
                    Some("input_json_delta") => {
                        if let Some(t) = delta.get("partial_json").and_then(Value::as_str) {
                            accum.json_fragment.push_str(t);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    let content_blocks = blocks
        .into_values()
        .map(|accum| match accum.block_type.as_str() {
            "thinking" => serde_json::json!({"type": "thinking", "thinking": accum.thinking}),
            "tool_use" => {
                let input = if accum.json_fragment.is_empty() {
                    serde_json::json!({})
                } else {
                    decode_arguments(&accum.json_fragment)
                };
                serde_json::json!({
                    "type": "tool_use",
                    "id": accum.tool_id,
                    "name": accum.tool_name.unwrap_or_default(),
                    "input": input,
                })
            }
            _ => serde_json::json!({"type": "text", "text": accum.text}),
        })
        .collect();

    AssembledResponse {
        id,
        model,
        content_blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reassembles_text_and_tool_use_blocks() {
        let lines = vec![
            r#"data: {"type":"message_start","message":{"id":"msg_1","model":"claude-3"}}"#.to_string(),
            r#"data: {"type":"content_block_start","index":0,"content_block":{"type":"text"}}"#.to_string(),
            r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#.to_string(),
            r#"data: {"type":"content_block_start","index":1,"content_block":{"type":"tool_use","id":"tu_1","name":"search"}}"#.to_string(),
            r#"data: {"type":"content_block_delta","index":1,"delta":{"type":"input_json_delta","partial_json":"{\"q\":1}"}}"#.to_string(),
            r#"data: {"type":"message_stop"}"#.to_string(),
        ];
        let out = reassemble(&lines);
        assert_eq!(out.id.as_deref(), Some("msg_1"));
        assert_eq!(out.content_blocks.len(), 2);
        assert_eq!(out.content_blocks[0]["text"], "Hi");
        assert_eq!(out.content_blocks[1]["name"], "search");
        assert_eq!(out.content_blocks[1]["input"], serde_json::json!({"q": 1}));
    }

    #[test]
    fn malformed_input_json_falls_back_to_raw() {
        let lines = vec![
            r#"data: {"type":"content_block_start","index":0,"content_block":{"type":"tool_use","id":"tu_1","name":"f"}}"#.to_string(),
            r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"input_json_delta","partial_json":"not json"}}"#.to_string(),
        ];
        let out = reassemble(&lines);
        assert_eq!(out.content_blocks[0]["input"], serde_json::json!({"raw": "not json"}));
    }
}
