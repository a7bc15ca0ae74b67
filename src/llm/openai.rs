//! OpenAI chat-completions adapter.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use super::adapter::ProviderAdapter;
use super::error::ProviderError;
use super::openai_wire::{self, WireQuirks};
use super::types::{GenerateRequest, GenerateResponse, StreamChunk};
use crate::config::{ProviderCredential, ProviderKind};

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiAdapter {
    client: reqwest::Client,
}

impl OpenAiAdapter {
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
            force_reasoning_temperature: true,
            supports_reasoning_effort: true,
            reasoning_effort_any_model: false,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
        vec![
            "gpt-4o".to_string(),
            "gpt-4o-mini".to_string(),
            "gpt-5".to_string(),
            "o3-mini".to_string(),
        ]
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
                    provider: "openai".to_string(),
                })?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));

        openai_wire::generate(
            &self.client,
            "openai",
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
                    provider: "openai".to_string(),
                })?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));

        openai_wire::stream_generate(
            self.client.clone(),
            "openai".to_string(),
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
