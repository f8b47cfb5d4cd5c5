use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hash::content_hash;

/// Canonical role of a normalized message. Role participates in message
/// identity — a `user` message and a `system` message with identical
/// content are distinct entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
    ToolUse,
    ToolResult,
    Thinking,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::ToolUse => "tool_use",
            Role::ToolResult => "tool_result",
            Role::Thinking => "thinking",
        }
    }
}

/// One tool invocation collected onto a `tool_use` message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A single normalized conversational turn fragment, deduplicated across
/// a batch by content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl Message {
    /// Canonical hash input: `{role, content, tool_calls, tool_use_id,
    /// is_error}`.
    pub fn identity_hash(
        role: Role,
        content: &str,
        tool_calls: Option<&[ToolCall]>,
        tool_use_id: Option<&str>,
        is_error: Option<bool>,
    ) -> String {
        let value = serde_json::json!({
            "role": role.as_str(),
            "content": content,
            "tool_calls": tool_calls,
            "tool_use_id": tool_use_id,
            "is_error": is_error,
        });
        content_hash(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_to_lowercase_wire_string() {
        assert_eq!(serde_json::to_value(Role::ToolUse).unwrap(), "tool_use");
        assert_eq!(serde_json::to_value(Role::ToolResult).unwrap(), "tool_result");
    }

    #[test]
    fn identity_hash_is_insensitive_to_absent_vs_none_tool_calls() {
        let a = Message::identity_hash(Role::User, "hi", None, None, None);
        let b = Message::identity_hash(Role::User, "hi", Some(&[]), None, None);
        // `None` (field absent) and `Some(&[])` (empty list) are distinct
        // JSON values (null vs []), so the hashes differ by design.
        assert_ne!(a, b);
    }

    #[test]
    fn identity_hash_distinguishes_roles_with_same_content() {
        let user = Message::identity_hash(Role::User, "hi", None, None, None);
        let system = Message::identity_hash(Role::System, "hi", None, None, None);
        assert_ne!(user, system);
    }
}
