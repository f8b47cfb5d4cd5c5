use serde_json::Value;
use tracecook_types::ApiFormat;

use crate::claude::ClaudeNormalizer;
use crate::gemini::GeminiNormalizer;
use crate::openai::OpenAiNormalizer;
use crate::traits::Normalizer;

/// Fixed, ordered registry: Gemini first (most distinctive markers),
/// Claude second, OpenAI last as the permissive fallback.
const GEMINI: GeminiNormalizer = GeminiNormalizer;
const CLAUDE: ClaudeNormalizer = ClaudeNormalizer;
const OPENAI: OpenAiNormalizer = OpenAiNormalizer;

/// Pick the normalizer for a record, honoring an explicit format hint or
/// falling through the ordered auto-detectors with OpenAI as the
/// unconditional fallback.
pub fn select(record: &Value, hint: ApiFormat) -> &'static dyn Normalizer {
    match hint {
        ApiFormat::Gemini => &GEMINI,
        ApiFormat::Claude => &CLAUDE,
        ApiFormat::Openai => &OPENAI,
        ApiFormat::Auto => {
            if GEMINI.detect(record) {
                &GEMINI
            } else if CLAUDE.detect(record) {
                &CLAUDE
            } else {
                &OPENAI
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auto_detect_prefers_gemini_markers() {
        let record = json!({"request": {"contents": []}});
        assert_eq!(select(&record, ApiFormat::Auto).name(), "gemini");
    }

    #[test]
    fn auto_detect_falls_back_to_openai() {
        let record = json!({"request": {"messages": []}});
        assert_eq!(select(&record, ApiFormat::Auto).name(), "openai");
    }

    #[test]
    fn explicit_hint_bypasses_detection() {
        let record = json!({"request": {"messages": []}});
        assert_eq!(select(&record, ApiFormat::Claude).name(), "claude");
    }
}
