#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("no such request record: {0}")]
    NotFound(uuid::Uuid),

    #[error("request {0} was already completed")]
    AlreadyCompleted(uuid::Uuid),
}
