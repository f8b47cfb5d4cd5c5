use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Load the raw records from a trace file. The file may hold a JSON array
/// of records, a single JSON record, or newline-delimited JSON records;
/// the three shapes are told apart by attempting whole-file JSON parsing
/// first and falling back to line-splitting only on failure.
pub fn load_records(path: &Path) -> Result<Vec<Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;

    if let Ok(value) = serde_json::from_str::<Value>(&text) {
        return match value {
            Value::Array(records) => Ok(records),
            Value::Object(_) => Ok(vec![value]),
            other => bail!("input file {} is valid JSON but neither an array nor an object: {other}", path.display()),
        };
    }

    text.lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}: malformed JSON on line {}", path.display(), i + 1))
        })
        .collect()
}
