mod error;
mod format;
mod hash;
mod message;
mod output;
mod request;
mod tool;

pub use error::{Error, Result};
pub use format::ApiFormat;
pub use hash::{canonical_json, content_hash};
pub use message::{Message, Role, ToolCall};
pub use output::Output;
pub use request::Request;
pub use tool::Tool;
