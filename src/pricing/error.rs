#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("failed to fetch pricing document: {0}")]
    FetchFailed(String),

    #[error("failed to parse pricing document: {0}")]
    ParseFailed(#[from] serde_json::Error),

    #[error("failed to read disk pricing cache at {path}: {source}")]
    CacheRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write disk pricing cache at {path}: {source}")]
    CacheWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
