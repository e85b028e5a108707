use thiserror::Error;

#[derive(Debug, Error)]
pub enum JotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),
}

impl From<arboard::Error> for JotError {
    fn from(err: arboard::Error) -> Self {
        JotError::Clipboard(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JotError>;
