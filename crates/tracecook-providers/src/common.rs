use serde_json::Value;

/// Decode a JSON-string tool-argument payload, falling back to `{"raw":
/// <original string>}` on parse failure so a malformed fragment never
/// aborts the batch.
pub fn decode_arguments(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({ "raw": raw }))
}

/// Render an image content item as its literal text token. `url` is the
/// item's `image_url.url` (OpenAI) or equivalent; a `data:` URL is
/// rendered without the payload itself.
pub fn image_token(url: Option<&str>) -> String {
    match url {
        Some(u) if u.starts_with("data:") => "[image: base64 data]".to_string(),
        Some(u) => format!("[image: {}]", u),
        None => "[image]".to_string(),
    }
}

/// ISO-8601 timestamp to Unix milliseconds. `Z` is accepted as UTC;
/// anything unparseable becomes `0` rather than failing the batch.
pub fn iso_to_unix_ms(ts: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Join a Claude tool_result list-content's parts into one string: text
/// parts contribute their `text` field, anything else contributes its
/// JSON form. Parts are joined with `\n`.
pub fn join_list_content(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item.get("text").and_then(Value::as_str) {
            Some(text) => text.to_string(),
            None => item.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Push `id` onto `ids` unless it is already present — the source order
/// but set-like membership `tools` and `request_messages`/`response_messages`
/// lists need (duplicate source entries must not repeat their ID).
pub fn push_unique(ids: &mut Vec<String>, id: String) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}
