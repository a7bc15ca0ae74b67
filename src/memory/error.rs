#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("no such session: {0}")]
    SessionNotFound(uuid::Uuid),

    #[error("tokenizer initialization failed for encoding {0}")]
    TokenizerUnavailable(&'static str),
}
