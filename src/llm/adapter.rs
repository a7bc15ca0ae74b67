//! The closed-set interface every upstream provider implements.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use super::error::ProviderError;
use super::types::{GenerateRequest, GenerateResponse, StreamChunk};
use crate::config::{ProviderCredential, ProviderKind};

/// A single upstream's generation contract. Concrete adapters live in
/// sibling modules (`openai`, `azure`, `gemini`, `grok`, `bailian`,
/// `compatible`); the registry dispatches to one of them by `ProviderKind`
/// rather than anything duck-typed.
///
/// Credentials are passed in on every call instead of being cached inside
/// the adapter: the registry re-reads the configuration store before each
/// dispatch, so a key rotated mid-session takes effect on the next request
/// without rebuilding adapters.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Model used when the caller doesn't name one.
    fn default_model(&self, credential: &ProviderCredential) -> String;

    /// Models this adapter exposes for the `listModels` tool.
    fn list_models(&self, credential: &ProviderCredential) -> Vec<String>;

    async fn generate(
        &self,
        credential: &ProviderCredential,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ProviderError>;

    async fn stream_generate(
        &self,
        credential: &ProviderCredential,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError>;
}
