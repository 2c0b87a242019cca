use serde::Serialize;
use thiserror::Error;

/// Everything a tool can report back to the caller.
///
/// Each variant carries the exact message shown to the user, so `Display`
/// is the user-facing text and nothing else.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum ToolError {
    /// Input rejected before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// The request never produced a usable response.
    #[error("{0}")]
    Transport(String),

    /// A successful response that carries no data.
    #[error("{0}")]
    Empty(String),

    /// Non-2xx status or `error: true` from upstream.
    #[error("{0}")]
    Upstream(String),

    /// A submission arrived while the previous one is still loading.
    #[error("A request is already in progress for this tool.")]
    Busy,

    #[error("{0}")]
    Config(String),
}

impl ToolError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;
