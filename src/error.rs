use std::time::Duration;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TripError>;

#[derive(Debug, Error)]
pub enum TripError {
    #[error("tool `{0}` not found")]
    ToolNotFound(String),

    #[error("tool `{name}` invocation failed: {source}")]
    ToolInvocation {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid arguments for `{tool}`: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("language model error: {0}")]
    LanguageModel(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("agent reached the step limit ({0}) without a final answer")]
    StepLimit(usize),

    #[error("agent exceeded its deadline of {0:?}")]
    Deadline(Duration),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TripError {
    pub(crate) fn invalid(tool: &str, reason: impl Into<String>) -> Self {
        TripError::InvalidArguments {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invocation(
        tool: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        TripError::ToolInvocation {
            name: tool.to_string(),
            source: Box::new(source),
        }
    }
}
