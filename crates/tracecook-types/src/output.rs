use serde::{Deserialize, Serialize};

use crate::{Message, Request, Tool};

/// The cooked artifact: deduplicated messages and tools plus the request
/// forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub messages: Vec<Message>,
    pub tools: Vec<Tool>,
    pub requests: Vec<Request>,
}
