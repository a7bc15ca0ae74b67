#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("provider error: {0}")]
    Provider(#[from] crate::llm::ProviderError),

    #[error("empty embedding response from {provider}")]
    EmptyResponse { provider: &'static str },

    #[error("failed to parse embedding response from {provider}: {source}")]
    ParseFailed {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
