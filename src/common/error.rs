use crate::history::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("Alternative {index} is out of range, question has {len} alternatives")]
    InvalidAlternative { index: usize, len: usize },

    #[error("Invalid catalog: {0}")]
    Catalog(String),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("The session is no longer running")]
    SessionClosed,
}
