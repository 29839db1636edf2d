use thiserror::Error;

#[derive(Debug, Error)]
pub enum SongwatchError {
    #[error("container element not found: {selector}")]
    ContainerMissing { selector: String },

    #[error("invalid selector table: {0}")]
    Selector(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid trace: {0}")]
    Trace(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
