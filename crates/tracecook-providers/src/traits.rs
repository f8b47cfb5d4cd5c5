use serde_json::Value;
use tracecook_core::{MessageDeduplicator, ToolDeduplicator};
use tracecook_types::Request;

use crate::Result;

/// A single provider's view of a raw trace record, registering its
/// messages and tools into the shared dedup registries and returning the
/// `Request` that ties them together.
///
/// Implementors are stateless; the dedup registries and any per-batch
/// bookkeeping live in the caller.
pub trait Normalizer {
    /// Name used for `--format` matching and error messages (`"openai"`,
    /// `"claude"`, `"gemini"`).
    fn name(&self) -> &'static str;

    /// Cheap, order-sensitive shape check. Must not panic or allocate
    /// heavily; called against every record during auto-detection until
    /// one provider claims it.
    fn detect(&self, record: &Value) -> bool;

    /// Normalize one record, registering its messages and tools into the
    /// shared registries and returning the resulting `Request`.
    fn process(
        &self,
        record: &Value,
        messages: &mut MessageDeduplicator,
        tools: &mut ToolDeduplicator,
    ) -> Result<Request>;
}
