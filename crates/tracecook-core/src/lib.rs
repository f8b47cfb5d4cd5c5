//! Content-addressed deduplication for the trace cooker.
//!
//! Two registries exist per batch — one for [`Message`], one for [`Tool`] —
//! each minting stable `m<n>`/`t<n>` IDs keyed by a SHA-256 content hash.

use std::collections::HashMap;

use tracecook_types::{Message, Role, Tool, ToolCall};

/// Mints stable IDs for [`Message`]s by content hash, preserving
/// first-insertion order in `messages()`.
#[derive(Debug, Default)]
pub struct MessageDeduplicator {
    hash_to_id: HashMap<String, String>,
    messages: Vec<Message>,
}

impl MessageDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the existing message ID for this content, or mint and append a
    /// new one. `content` absent/null is normalized to `""` by the caller
    /// (the provider layer) before reaching here.
    pub fn get_or_create(
        &mut self,
        role: Role,
        content: impl Into<String>,
        tool_calls: Option<Vec<ToolCall>>,
        tool_use_id: Option<String>,
        is_error: Option<bool>,
    ) -> String {
        let content = content.into();
        let hash = Message::identity_hash(
            role,
            &content,
            tool_calls.as_deref(),
            tool_use_id.as_deref(),
            is_error,
        );

        if let Some(id) = self.hash_to_id.get(&hash) {
            return id.clone();
        }

        let id = format!("m{}", self.messages.len());
        self.messages.push(Message {
            id: id.clone(),
            role,
            content,
            tool_calls,
            tool_use_id,
            is_error,
        });
        self.hash_to_id.insert(hash, id.clone());
        id
    }

    /// All deduplicated messages, in first-insertion order.
    pub fn messages(self) -> Vec<Message> {
        self.messages
    }
}

/// Mints stable IDs for [`Tool`] definitions by content hash, preserving
/// first-insertion order in `tools()`.
#[derive(Debug, Default)]
pub struct ToolDeduplicator {
    hash_to_id: HashMap<String, String>,
    tools: Vec<Tool>,
}

impl ToolDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
        is_server_side: bool,
    ) -> String {
        let name = name.into();
        let description = description.into();
        let hash = Tool::identity_hash(&name, &description, &parameters, is_server_side);

        if let Some(id) = self.hash_to_id.get(&hash) {
            return id.clone();
        }

        let id = format!("t{}", self.tools.len());
        self.tools.push(Tool {
            id: id.clone(),
            name,
            description,
            parameters,
            is_server_side,
        });
        self.hash_to_id.insert(hash, id.clone());
        id
    }

    /// All deduplicated tools, in first-insertion order.
    pub fn tools(self) -> Vec<Tool> {
        self.tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identical_messages_share_an_id() {
        let mut dedup = MessageDeduplicator::new();
        let a = dedup.get_or_create(Role::User, "hi", None, None, None);
        let b = dedup.get_or_create(Role::User, "hi", None, None, None);
        assert_eq!(a, b);
        assert_eq!(dedup.messages().len(), 1);
    }

    #[test]
    fn distinct_roles_do_not_merge() {
        let mut dedup = MessageDeduplicator::new();
        let user = dedup.get_or_create(Role::User, "hi", None, None, None);
        let system = dedup.get_or_create(Role::System, "hi", None, None, None);
        assert_ne!(user, system);
        assert_eq!(dedup.messages().len(), 2);
    }

    #[test]
    fn ids_are_assigned_in_first_insertion_order() {
        let mut dedup = MessageDeduplicator::new();
        let a = dedup.get_or_create(Role::User, "first", None, None, None);
        let b = dedup.get_or_create(Role::User, "second", None, None, None);
        let repeat_a = dedup.get_or_create(Role::User, "first", None, None, None);
        assert_eq!(a, "m0");
        assert_eq!(b, "m1");
        assert_eq!(repeat_a, "m0");
        let messages = dedup.messages();
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
    }

    #[test]
    fn identical_tools_share_an_id() {
        let mut dedup = ToolDeduplicator::new();
        let a = dedup.get_or_create("search", "searches", json!({}), false);
        let b = dedup.get_or_create("search", "searches", json!({}), false);
        assert_eq!(a, b);
        assert_eq!(dedup.tools().len(), 1);
    }

    #[test]
    fn tool_ids_are_t_prefixed_and_independent_of_message_ids() {
        let mut tools = ToolDeduplicator::new();
        let id = tools.get_or_create("f", "", json!({}), false);
        assert_eq!(id, "t0");
    }
}
