use std::path::PathBuf;

use clap::Parser;
use tracecook_types::ApiFormat;

#[derive(Debug, Parser)]
#[command(name = "tracecook", about = "Normalize, deduplicate, and cross-reference raw LLM trace records")]
pub struct Cli {
    /// Input trace file: a JSON array, a single JSON record, or NDJSON
    pub input: PathBuf,

    /// Path to write the cooked JSON output
    pub output: PathBuf,

    /// Wire format to assume, or auto-detect per record
    #[arg(long, value_enum, default_value = "auto")]
    pub format: ApiFormat,
}
