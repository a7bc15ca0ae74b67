//! xAI Grok adapter.
//!
//! Wire-compatible with the OpenAI chat-completions format, but Grok does
//! NOT get the `o1*`/`o3*` temperature override: its reasoning models accept
//! a caller-supplied temperature unchanged. It does accept `reasoningEffort`.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use super::adapter::ProviderAdapter;
use super::error::ProviderError;
use super::openai_wire::{self, WireQuirks};
use super::types::{GenerateRequest, GenerateResponse, StreamChunk};
use crate::config::{ProviderCredential, ProviderKind};

const DEFAULT_MODEL: &str = "grok-2-latest";
const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

pub struct GrokAdapter {
    client: reqwest::Client,
}

impl GrokAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn endpoint(credential: &ProviderCredential) -> String {
        let base = credential
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    fn quirks() -> WireQuirks {
        WireQuirks {
            force_reasoning_temperature: false,
            supports_reasoning_effort: true,
            reasoning_effort_any_model: true,
        }
    }
}

#[async_trait]
impl ProviderAdapter for GrokAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Grok
    }

    fn default_model(&self, credential: &ProviderCredential) -> String {
        credential
            .preferred_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    fn list_models(&self, credential: &ProviderCredential) -> Vec<String> {
        if !credential.extras.exposed_models.is_empty() {
            return credential.extras.exposed_models.clone();
        }
        vec!["grok-2-latest".to_string(), "grok-3-mini".to_string()]
    }

    async fn generate(
        &self,
        credential: &ProviderCredential,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ProviderError> {
        let api_key =
            credential
                .api_key
                .clone()
                .ok_or_else(|| ProviderError::ConfigurationMissing {
                    provider: "grok".to_string(),
                })?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));

        openai_wire::generate(
            &self.client,
            "grok",
            &Self::endpoint(credential),
            ("Authorization", format!("Bearer {api_key}")),
            &model,
            request,
            &Self::quirks(),
            cancel,
        )
        .await
    }

    async fn stream_generate(
        &self,
        credential: &ProviderCredential,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError> {
        let api_key =
            credential
                .api_key
                .clone()
                .ok_or_else(|| ProviderError::ConfigurationMissing {
                    provider: "grok".to_string(),
                })?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));

        openai_wire::stream_generate(
            self.client.clone(),
            "grok".to_string(),
            Self::endpoint(credential),
            ("Authorization".to_string(), format!("Bearer {api_key}")),
            model,
            request.clone(),
            Self::quirks(),
            cancel,
        )
        .await
    }
}
