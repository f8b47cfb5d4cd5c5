mod dependency;
mod io;

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracecook_core::{MessageDeduplicator, ToolDeduplicator};
use tracecook_types::{ApiFormat, Output};

/// Read, cook, and write a trace file in one call.
pub fn cook_file(input_path: &Path, output_path: &Path, format: ApiFormat) -> Result<Output> {
    let records = io::load_records(input_path)?;
    let output = cook(&records, format)?;
    let pretty = serde_json::to_string_pretty(&output).context("failed to serialize cooked output")?;
    std::fs::write(output_path, pretty)
        .with_context(|| format!("failed to write output file {}", output_path.display()))?;
    Ok(output)
}

/// Cook an in-memory record set, for callers that already hold parsed
/// records (the on-demand cooking path).
pub fn cook_records(records: &[Value], format: ApiFormat) -> Result<Output> {
    cook(records, format)
}

fn cook(records: &[Value], format: ApiFormat) -> Result<Output> {
    let mut messages = MessageDeduplicator::new();
    let mut tools = ToolDeduplicator::new();
    let mut requests = Vec::with_capacity(records.len());

    for record in records {
        let normalizer = tracecook_providers::select(record, format);
        let request = normalizer
            .process(record, &mut messages, &mut tools)
            .map_err(|e| anyhow::anyhow!("failed to normalize record: {e}"))?;
        requests.push(request);
    }

    // Stable sort: Requests with equal timestamps keep their original
    // relative order, matching the determinism contract.
    requests.sort_by_key(|r| r.timestamp);
    dependency::assign_parents(&mut requests);

    Ok(Output {
        messages: messages.messages(),
        tools: tools.tools(),
        requests,
    })
}
