mod sse;

use serde_json::Value;
use tracecook_core::{MessageDeduplicator, ToolDeduplicator};
use tracecook_types::{Request, Role, ToolCall};

use crate::common::{image_token, iso_to_unix_ms, join_list_content, push_unique};
use crate::traits::Normalizer;
use crate::{Error, Result};

const SSE_EVENT_TYPES: &[&str] = &[
    "message_start",
    "content_block_start",
    "content_block_delta",
    "message_delta",
    "message_stop",
];

pub struct ClaudeNormalizer;

impl Normalizer for ClaudeNormalizer {
    fn name(&self) -> &'static str {
        "claude"
    }

    fn detect(&self, record: &Value) -> bool {
        let request = record.get("request");

        let has_list_system = request
            .and_then(|r| r.get("system"))
            .map(Value::is_array)
            .unwrap_or(false);

        let has_input_schema_tool = request
            .and_then(|r| r.get("tools"))
            .and_then(Value::as_array)
            .and_then(|tools| tools.first())
            .map(|t| t.get("input_schema").is_some())
            .unwrap_or(false);

        let has_claude_block = request
            .and_then(|r| r.get("messages"))
            .and_then(Value::as_array)
            .map(|msgs| {
                msgs.iter().any(|m| {
                    m.get("content")
                        .and_then(Value::as_array)
                        .map(|blocks| {
                            blocks.iter().any(|b| {
                                matches!(
                                    b.get("type").and_then(Value::as_str),
                                    Some("tool_use") | Some("tool_result") | Some("thinking")
                                )
                            })
                        })
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false);

        let has_claude_sse = record
            .get("response")
            .and_then(|r| r.get("sse_lines"))
            .and_then(Value::as_array)
            .map(|lines| {
                lines.iter().any(|l| {
                    l.as_str()
                        .map(|s| SSE_EVENT_TYPES.iter().any(|ty| s.contains(ty)))
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false);

        has_list_system || has_input_schema_tool || has_claude_block || has_claude_sse
    }

    fn process(
        &self,
        record: &Value,
        messages: &mut MessageDeduplicator,
        tools: &mut ToolDeduplicator,
    ) -> Result<Request> {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::Parse("record missing \"id\"".into()))?
            .to_string();
        let timestamp = record
            .get("timestamp")
            .and_then(Value::as_str)
            .map(iso_to_unix_ms)
            .unwrap_or(0);
        let duration_ms = record
            .get("duration_ms")
            .and_then(Value::as_i64)
            .unwrap_or(0);

        let empty = Value::Null;
        let request = record.get("request").unwrap_or(&empty);
        let model = request
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let mut tool_ids = Vec::new();
        if let Some(entries) = request.get("tools").and_then(Value::as_array) {
            for entry in entries {
                push_unique(&mut tool_ids, process_tool_entry(entry, tools));
            }
        }

        let mut request_ids = Vec::new();
        if let Some(system) = request.get("system") {
            request_ids.extend(process_system(system, messages));
        }
        if let Some(msgs) = request.get("messages").and_then(Value::as_array) {
            for msg in msgs {
                let role = match msg.get("role").and_then(Value::as_str) {
                    Some("assistant") => Role::Assistant,
                    _ => Role::User,
                };
                let content = msg.get("content").unwrap_or(&Value::Null);
                request_ids.extend(process_request_content(role, content, messages));
            }
        }

        let response_ids = process_response(record, messages);

        Ok(Request {
            id,
            parent_id: None,
            timestamp,
            request_messages: request_ids,
            response_messages: response_ids,
            model,
            tools: tool_ids,
            duration_ms,
        })
    }
}

fn process_system(system: &Value, messages: &mut MessageDeduplicator) -> Vec<String> {
    match system {
        Value::String(s) => vec![messages.get_or_create(Role::System, s.clone(), None, None, None)],
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .map(|t| messages.get_or_create(Role::System, t, None, None, None))
            .collect(),
        _ => Vec::new(),
    }
}

/// Request-side content blocks: text blocks become one Message each (not
/// concatenated), thinking and tool_result get their own Message, tool_use
/// calls collect onto one trailing Message.
fn process_request_content(role: Role, content: &Value, messages: &mut MessageDeduplicator) -> Vec<String> {
    match content {
        Value::String(s) => vec![messages.get_or_create(role, s.clone(), None, None, None)],
        Value::Array(blocks) => {
            let mut ids = Vec::new();
            let mut collected_calls = Vec::new();
            for block in blocks {
                match block.get("type").and_then(Value::as_str) {
                    Some("text") => {
                        let text = block.get("text").and_then(Value::as_str).unwrap_or("");
                        ids.push(messages.get_or_create(role, text, None, None, None));
                    }
                    Some("thinking") => {
                        let text = block.get("thinking").and_then(Value::as_str).unwrap_or("");
                        if !text.is_empty() {
                            ids.push(messages.get_or_create(Role::Thinking, text, None, None, None));
                        }
                    }
                    Some("image") => {
                        ids.push(messages.get_or_create(role, image_block_token(block), None, None, None));
                    }
                    Some("tool_use") => {
                        collected_calls.push(tool_call_from_block(block));
                    }
                    Some("tool_result") => {
                        ids.push(tool_result_message(block, messages));
                    }
                    _ => {
                        ids.push(messages.get_or_create(role, block.to_string(), None, None, None));
                    }
                }
            }
            if !collected_calls.is_empty() {
                ids.push(messages.get_or_create(Role::ToolUse, "", Some(collected_calls), None, None));
            }
            ids
        }
        Value::Null => vec![messages.get_or_create(role, "", None, None, None)],
        other => vec![messages.get_or_create(role, other.to_string(), None, None, None)],
    }
}

/// Response content blocks: all text parts concatenate into one assistant
/// Message; thinking blocks each get their own Message; tool_use calls
/// collect onto one trailing Message.
fn process_response_content(blocks: &[Value], messages: &mut MessageDeduplicator) -> Vec<String> {
    let mut ids = Vec::new();
    let mut text = String::new();
    let mut collected_calls = Vec::new();

    for block in blocks {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                text.push_str(block.get("text").and_then(Value::as_str).unwrap_or(""));
            }
            Some("thinking") => {
                let t = block.get("thinking").and_then(Value::as_str).unwrap_or("");
                if !t.is_empty() {
                    ids.push(messages.get_or_create(Role::Thinking, t, None, None, None));
                }
            }
            Some("tool_use") => {
                collected_calls.push(tool_call_from_block(block));
            }
            _ => {}
        }
    }

    if !text.is_empty() {
        ids.push(messages.get_or_create(Role::Assistant, text, None, None, None));
    }
    if !collected_calls.is_empty() {
        ids.push(messages.get_or_create(Role::ToolUse, "", Some(collected_calls), None, None));
    }
    if ids.is_empty() {
        ids.push(messages.get_or_create(Role::Assistant, "", None, None, None));
    }
    ids
}

fn process_response(record: &Value, messages: &mut MessageDeduplicator) -> Vec<String> {
    if let Some(error) = record.get("error").and_then(Value::as_str) {
        return vec![messages.get_or_create(Role::Assistant, format!("Error: {}", error), None, None, None)];
    }

    let Some(response) = record.get("response").filter(|r| !r.is_null()) else {
        return vec![messages.get_or_create(Role::Assistant, "", None, None, None)];
    };

    let is_stream = response
        .get("stream")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if is_stream {
        let lines: Vec<String> = response
            .get("sse_lines")
            .and_then(Value::as_array)
            .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        let assembled = sse::reassemble(&lines);
        return process_response_content(&assembled.content_blocks, messages);
    }

    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    process_response_content(&blocks, messages)
}

fn tool_call_from_block(block: &Value) -> ToolCall {
    ToolCall {
        name: block.get("name").and_then(Value::as_str).unwrap_or("").to_string(),
        arguments: block.get("input").cloned().unwrap_or_else(|| serde_json::json!({})),
        id: block.get("id").and_then(Value::as_str).map(str::to_string),
    }
}

fn tool_result_message(block: &Value, messages: &mut MessageDeduplicator) -> String {
    let tool_use_id = block
        .get("tool_use_id")
        .and_then(Value::as_str)
        .map(str::to_string);
    let is_error = block.get("is_error").and_then(Value::as_bool);
    let content = match block.get("content") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => join_list_content(items),
        Some(other) => other.to_string(),
        None => String::new(),
    };
    messages.get_or_create(Role::ToolResult, content, None, tool_use_id, is_error)
}

fn image_block_token(block: &Value) -> String {
    match block.get("source") {
        Some(source) => match source.get("type").and_then(Value::as_str) {
            Some("base64") => "[image: base64 data]".to_string(),
            Some("url") => image_token(source.get("url").and_then(Value::as_str)),
            _ => "[image]".to_string(),
        },
        None => "[image]".to_string(),
    }
}

fn process_tool_entry(entry: &Value, tools: &mut ToolDeduplicator) -> String {
    if let Some(input_schema) = entry.get("input_schema") {
        let name = entry.get("name").and_then(Value::as_str).unwrap_or("").to_string();
        let description = entry
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        tools.get_or_create(name, description, input_schema.clone(), false)
    } else {
        let name = entry
            .get("name")
            .or_else(|| entry.get("type"))
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        tools.get_or_create(name, "", serde_json::json!({}), false)
    }
}
