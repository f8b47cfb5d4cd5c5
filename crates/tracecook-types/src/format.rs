use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The one configuration knob the core exposes: which wire format to
/// assume, or whether to auto-detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum ApiFormat {
    Auto,
    Openai,
    Claude,
    Gemini,
}

impl Default for ApiFormat {
    fn default() -> Self {
        ApiFormat::Auto
    }
}
