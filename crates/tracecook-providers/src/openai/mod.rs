mod sse;

use serde_json::Value;
use tracecook_core::{MessageDeduplicator, ToolDeduplicator};
use tracecook_types::{Request, Role, ToolCall};

use crate::common::{decode_arguments, image_token, iso_to_unix_ms, push_unique};
use crate::traits::Normalizer;
use crate::{Error, Result};

pub struct OpenAiNormalizer;

impl Normalizer for OpenAiNormalizer {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn detect(&self, record: &Value) -> bool {
        let request = record.get("request");
        let has_messages = request
            .and_then(|r| r.get("messages"))
            .map(Value::is_array)
            .unwrap_or(false);
        let has_choices_sse = record
            .get("response")
            .and_then(|r| r.get("sse_lines"))
            .and_then(Value::as_array)
            .map(|lines| {
                lines.iter().any(|l| {
                    l.as_str()
                        .map(|s| s.contains("\"choices\""))
                        .unwrap_or(false)
                })
            })
            .unwrap_or(false);
        has_messages || has_choices_sse
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
                let tool_id = process_tool_entry(entry, tools);
                push_unique(&mut tool_ids, tool_id);
            }
        }

        let mut request_ids = Vec::new();
        if let Some(msgs) = request.get("messages").and_then(Value::as_array) {
            for msg in msgs {
                request_ids.extend(process_request_message(msg, messages));
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

fn map_role(role: &str) -> Role {
    match role {
        "system" => Role::System,
        "tool" => Role::ToolResult,
        "assistant" => Role::Assistant,
        _ => Role::User,
    }
}

/// A request-side message is static captured JSON, never an in-flight
/// stream, so its tool_calls always fold in via the non-streaming combine
/// rule. Plain-string content combines into one Message with the
/// tool_calls; array content still expands one Message per element,
/// with the tool_calls trailing as a separate `tool_use` Message.
fn process_request_message(msg: &Value, messages: &mut MessageDeduplicator) -> Vec<String> {
    let role_wire = msg.get("role").and_then(Value::as_str).unwrap_or("user");

    if role_wire == "tool" {
        let content = msg.get("content").and_then(Value::as_str).unwrap_or("");
        let tool_use_id = msg
            .get("tool_call_id")
            .and_then(Value::as_str)
            .map(str::to_string);
        let id = messages.get_or_create(Role::ToolResult, content, None, tool_use_id, None);
        return vec![id];
    }

    let role = map_role(role_wire);
    let content = msg.get("content").unwrap_or(&Value::Null);
    let tool_calls = parse_tool_calls(msg.get("tool_calls"));

    if role == Role::Assistant {
        if let Value::Array(_) = content {
            let mut ids = expand_content(role, content, messages);
            if !tool_calls.is_empty() {
                ids.push(messages.get_or_create(Role::ToolUse, "", Some(tool_calls), None, None));
            }
            return ids;
        }
        let text = content_to_plain_text(content);
        return vec![finish_combined(text, tool_calls, messages)];
    }

    expand_content(role, content, messages)
}

fn process_response(record: &Value, messages: &mut MessageDeduplicator) -> Vec<String> {
    if let Some(error) = record.get("error").and_then(Value::as_str) {
        let id = messages.get_or_create(Role::Assistant, format!("Error: {}", error), None, None, None);
        return vec![id];
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
            .map(|a| {
                a.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let assembled = sse::reassemble(&lines);
        let tool_calls = assembled
            .tool_calls
            .into_iter()
            .map(|(name, arguments, id)| ToolCall { name, arguments, id })
            .collect();
        return finish_split(assembled.content, tool_calls, messages);
    }

    let message = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .and_then(|c| c.get("message"));

    let Some(message) = message else {
        return vec![messages.get_or_create(Role::Assistant, "", None, None, None)];
    };

    let text = content_to_plain_text(message.get("content").unwrap_or(&Value::Null));
    let tool_calls = parse_tool_calls(message.get("tool_calls"));
    vec![finish_combined(text, tool_calls, messages)]
}

fn content_to_plain_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn parse_tool_calls(value: Option<&Value>) -> Vec<ToolCall> {
    let Some(calls) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    calls
        .iter()
        .map(|call| {
            let id = call.get("id").and_then(Value::as_str).map(str::to_string);
            let function = call.get("function");
            let name = function
                .and_then(|f| f.get("name"))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let arguments = function
                .and_then(|f| f.get("arguments"))
                .and_then(Value::as_str)
                .map(decode_arguments)
                .unwrap_or_else(|| serde_json::json!({}));
            ToolCall { name, arguments, id }
        })
        .collect()
}

/// One Message carrying both `content` and `tool_calls` when both are
/// present — the non-streaming combine rule. An assistant message with
/// tool_calls gets role `tool_use` regardless of accompanying text,
/// matching `_map_role`'s `assistant + tool_calls -> tool_use`.
fn finish_combined(
    text: String,
    tool_calls: Vec<ToolCall>,
    messages: &mut MessageDeduplicator,
) -> String {
    if tool_calls.is_empty() {
        messages.get_or_create(Role::Assistant, text, None, None, None)
    } else {
        messages.get_or_create(Role::ToolUse, text, Some(tool_calls), None, None)
    }
}

/// Content and tool_calls as up to two separate Messages — the streaming
/// split rule.
fn finish_split(
    text: String,
    tool_calls: Vec<ToolCall>,
    messages: &mut MessageDeduplicator,
) -> Vec<String> {
    let mut ids = Vec::new();
    if !text.is_empty() {
        ids.push(messages.get_or_create(Role::Assistant, text, None, None, None));
    }
    if !tool_calls.is_empty() {
        ids.push(messages.get_or_create(Role::ToolUse, "", Some(tool_calls), None, None));
    }
    if ids.is_empty() {
        ids.push(messages.get_or_create(Role::Assistant, "", None, None, None));
    }
    ids
}

fn expand_content(role: Role, content: &Value, messages: &mut MessageDeduplicator) -> Vec<String> {
    match content {
        Value::Null => vec![messages.get_or_create(role, "", None, None, None)],
        Value::String(s) => vec![messages.get_or_create(role, s.clone(), None, None, None)],
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let text = extract_content_item(item);
                messages.get_or_create(role, text, None, None, None)
            })
            .collect(),
        other => vec![messages.get_or_create(role, other.to_string(), None, None, None)],
    }
}

fn extract_content_item(item: &Value) -> String {
    match item.get("type").and_then(Value::as_str) {
        Some("text") => item
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
        Some("image_url") => {
            let url = item
                .get("image_url")
                .and_then(|u| u.get("url"))
                .and_then(Value::as_str);
            image_token(url)
        }
        _ => item.to_string(),
    }
}

fn process_tool_entry(entry: &Value, tools: &mut ToolDeduplicator) -> String {
    if entry.get("type").and_then(Value::as_str) == Some("function") {
        let function = entry.get("function").unwrap_or(&Value::Null);
        let name = function
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let description = function
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();
        let parameters = function.get("parameters").cloned().unwrap_or_else(|| serde_json::json!({}));
        tools.get_or_create(name, description, parameters, false)
    } else {
        let kind = entry
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        tools.get_or_create(kind, "", serde_json::json!({}), false)
    }
}
