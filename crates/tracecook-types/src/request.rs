use serde::{Deserialize, Serialize};

/// One captured request/response pair, with references into the batch's
/// deduplicated message and tool lists. `parent_id` points at the request
/// this one most plausibly continues, or is `None` for a conversation root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub parent_id: Option<String>,
    pub timestamp: i64,
    pub request_messages: Vec<String>,
    pub response_messages: Vec<String>,
    pub model: String,
    pub tools: Vec<String>,
    pub duration_ms: i64,
}
