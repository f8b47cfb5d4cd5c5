use serde_json::json;
use tracecook_types::ApiFormat;

/// A compact, human-diffable rendering of a cooked Output, used only to
/// pin the forest shape across the scenarios below.
fn render(output: &tracecook_types::Output) -> String {
    let mut lines = Vec::new();
    for request in &output.requests {
        lines.push(format!(
            "{} parent={} model={} req={:?} resp={:?}",
            request.id,
            request.parent_id.as_deref().unwrap_or("-"),
            request.model,
            request.request_messages,
            request.response_messages,
        ));
    }
    lines.join("\n")
}

#[test]
fn s2_streaming_tool_call_turn_attaches_to_its_parent() {
    let first = json!({
        "id": "r1",
        "timestamp": "2024-01-01T00:00:00Z",
        "request": {"model": "gpt-4", "messages": [{"role": "user", "content": "hi"}]},
        "response": {"choices": [{"message": {"role": "assistant", "content": "A"}}]},
    });
    let second = json!({
        "id": "r2",
        "timestamp": "2024-01-01T00:01:00Z",
        "request": {
            "model": "gpt-4",
            "messages": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "A"},
                {"role": "user", "content": "and?"},
            ],
        },
        "response": {
            "stream": true,
            "sse_lines": [
                r#"data: {"choices":[{"delta":{"tool_calls":[{"index":0,"id":"c1","function":{"name":"search","arguments":"{}"}}]}}]}"#,
                "data: [DONE]",
            ],
        },
    });

    let output = tracecook_engine::cook_records(&[first, second], ApiFormat::Openai).unwrap();

    insta::assert_snapshot!(render(&output), @r#"
    r1 parent=- model=gpt-4 req=["m0"] resp=["m1"]
    r2 parent=r1 model=gpt-4 req=["m0", "m1", "m2"] resp=["m3"]
    "#);
}
