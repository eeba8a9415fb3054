use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Dataset error in {path}: {message}")]
    Dataset { path: String, message: String },

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error("No turn at position {index} (conversation has {len} turns)")]
    TurnNotFound { index: usize, len: usize },

    #[error("Invalid session data: {0}")]
    InvalidSession(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}
