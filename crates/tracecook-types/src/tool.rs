use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hash::content_hash;

/// A tool definition shared across requests, deduplicated by content hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parameters: Value,
    #[serde(default)]
    pub is_server_side: bool,
}

impl Tool {
    /// Canonical hash input: `{name, description, parameters,
    /// is_server_side}`.
    pub fn identity_hash(
        name: &str,
        description: &str,
        parameters: &Value,
        is_server_side: bool,
    ) -> String {
        let value = serde_json::json!({
            "name": name,
            "description": description,
            "parameters": parameters,
            "is_server_side": is_server_side,
        });
        content_hash(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identity_hash_distinguishes_server_side_flag() {
        let a = Tool::identity_hash("search", "", &json!({}), false);
        let b = Tool::identity_hash("search", "", &json!({}), true);
        assert_ne!(a, b);
    }
}
