/// Error types for the SkillSwap core
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwapError {
    #[error("Load error: {0}")]
    Load(String),

    #[error("Send error: {0}")]
    Send(String),

    #[error("Fetch detail error: {0}")]
    FetchDetail(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Message body is empty")]
    EmptyMessage,

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SwapError>;
