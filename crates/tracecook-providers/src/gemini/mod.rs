use serde_json::Value;
use tracecook_core::{MessageDeduplicator, ToolDeduplicator};
use tracecook_types::{Request, Role, ToolCall};

use crate::common::{image_token, iso_to_unix_ms, push_unique};
use crate::traits::Normalizer;
use crate::{Error, Result};

pub struct GeminiNormalizer;

impl Normalizer for GeminiNormalizer {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn detect(&self, record: &Value) -> bool {
        let request = record.get("request");

        let has_contents = request
            .map(|r| r.get("contents").is_some())
            .unwrap_or(false);
        let has_system_instruction = request
            .map(|r| r.get("system_instruction").is_some())
            .unwrap_or(false);
        let has_function_declarations = request
            .and_then(|r| r.get("tools"))
            .and_then(Value::as_array)
            .and_then(|tools| tools.first())
            .map(|t| t.get("function_declarations").is_some())
            .unwrap_or(false);

        let response = record.get("response");
        let has_candidate_parts = response
            .and_then(|r| r.get("candidates"))
            .and_then(Value::as_array)
            .and_then(|c| c.first())
            .map(|c| {
                c.get("content")
                    .map(|content| content.get("parts").is_some() && content.get("role").is_some())
                    .unwrap_or(false)
            })
            .unwrap_or(false);
        let has_model_version = response.map(|r| r.get("modelVersion").is_some()).unwrap_or(false);

        has_contents
            || has_system_instruction
            || has_function_declarations
            || has_candidate_parts
            || has_model_version
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
        let model = record
            .get("response")
            .and_then(|r| r.get("modelVersion"))
            .and_then(Value::as_str)
            .or_else(|| request.get("model").and_then(Value::as_str))
            .unwrap_or("")
            .to_string();

        let mut tool_ids = Vec::new();
        if let Some(entries) = request.get("tools").and_then(Value::as_array) {
            for entry in entries {
                if let Some(decls) = entry.get("function_declarations").and_then(Value::as_array) {
                    for decl in decls {
                        push_unique(&mut tool_ids, process_function_declaration(decl, tools));
                    }
                }
            }
        }

        let mut request_ids = Vec::new();
        if let Some(system) = request.get("system_instruction") {
            if let Some(parts) = system.get("parts").and_then(Value::as_array) {
                for part in parts {
                    if let Some(text) = part.get("text").and_then(Value::as_str) {
                        request_ids.push(messages.get_or_create(Role::System, text, None, None, None));
                    }
                }
            }
        }
        if let Some(contents) = request.get("contents").and_then(Value::as_array) {
            for content in contents {
                let role = map_role(content.get("role").and_then(Value::as_str));
                let parts = content.get("parts").and_then(Value::as_array).cloned().unwrap_or_default();
                request_ids.extend(process_parts(role, &parts, messages));
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

/// `model` maps to assistant; anything else, including an absent role,
/// maps to user.
fn map_role(role: Option<&str>) -> Role {
    match role {
        Some("model") => Role::Assistant,
        _ => Role::User,
    }
}

fn process_parts(role: Role, parts: &[Value], messages: &mut MessageDeduplicator) -> Vec<String> {
    let mut ids = Vec::new();
    let mut collected_calls = Vec::new();

    for part in parts {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            ids.push(messages.get_or_create(role, text, None, None, None));
            continue;
        }
        if let Some(call) = part.get("functionCall").or_else(|| part.get("function_call")) {
            collected_calls.push(ToolCall {
                name: call.get("name").and_then(Value::as_str).unwrap_or("").to_string(),
                arguments: call.get("args").cloned().unwrap_or_else(|| serde_json::json!({})),
                id: None,
            });
            continue;
        }
        if let Some(response) = part.get("functionResponse").or_else(|| part.get("function_response")) {
            let tool_use_id = response.get("name").and_then(Value::as_str).map(str::to_string);
            let inner = response.get("response").cloned().unwrap_or_else(|| serde_json::json!({}));
            let content = match inner.get("content") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => inner.to_string(),
            };
            ids.push(messages.get_or_create(Role::ToolResult, content, None, tool_use_id, None));
            continue;
        }
        if let Some(inline) = part.get("inlineData").or_else(|| part.get("inline_data")) {
            let _ = inline;
            ids.push(messages.get_or_create(role, "[image: base64 data]", None, None, None));
            continue;
        }
        if let Some(file_data) = part.get("fileData").or_else(|| part.get("file_data")) {
            let uri = file_data
                .get("fileUri")
                .or_else(|| file_data.get("file_uri"))
                .and_then(Value::as_str);
            ids.push(messages.get_or_create(role, image_token(uri), None, None, None));
            continue;
        }
        ids.push(messages.get_or_create(role, part.to_string(), None, None, None));
    }

    if !collected_calls.is_empty() {
        ids.push(messages.get_or_create(Role::ToolUse, "", Some(collected_calls), None, None));
    }
    ids
}

fn process_response(record: &Value, messages: &mut MessageDeduplicator) -> Vec<String> {
    if let Some(error) = record.get("error").and_then(Value::as_str) {
        return vec![messages.get_or_create(Role::Assistant, format!("Error: {}", error), None, None, None)];
    }

    let parts = record
        .get("response")
        .filter(|r| !r.is_null())
        .and_then(|r| r.get("candidates"))
        .and_then(Value::as_array)
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(Value::as_array)
        .cloned();

    let Some(parts) = parts else {
        return vec![messages.get_or_create(Role::Assistant, "", None, None, None)];
    };

    let ids = process_parts(Role::Assistant, &parts, messages);
    if ids.is_empty() {
        vec![messages.get_or_create(Role::Assistant, "", None, None, None)]
    } else {
        ids
    }
}

fn process_function_declaration(decl: &Value, tools: &mut ToolDeduplicator) -> String {
    let name = decl.get("name").and_then(Value::as_str).unwrap_or("").to_string();
    let description = decl
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    let parameters = decl.get("parameters").cloned().unwrap_or_else(|| serde_json::json!({}));
    tools.get_or_create(name, description, parameters, false)
}
