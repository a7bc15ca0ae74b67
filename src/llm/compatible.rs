//! Generic OpenAI-compatible adapter, covering self-hosted Ollama and
//! OpenRouter. Unlike the other five providers this one has no hardcoded
//! base URL: the caller must configure one. Auth strictness differs by
//! subtype — Ollama instances are commonly unauthenticated, OpenRouter
//! always requires a key.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use super::adapter::ProviderAdapter;
use super::error::ProviderError;
use super::openai_wire::{self, WireQuirks};
use super::types::{GenerateRequest, GenerateResponse, StreamChunk};
use crate::config::{CompatibleSubtype, ProviderCredential, ProviderKind};

const DEFAULT_MODEL: &str = "llama3.1";

pub struct CompatibleAdapter {
    client: reqwest::Client,
}

impl CompatibleAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn endpoint(credential: &ProviderCredential) -> Result<String, ProviderError> {
        let base = credential
            .base_url
            .as_deref()
            .ok_or_else(|| ProviderError::ConfigurationMissing {
                provider: "openai-compatible".to_string(),
            })?
            .trim_end_matches('/');
        Ok(format!("{base}/chat/completions"))
    }

    fn requires_api_key(credential: &ProviderCredential) -> bool {
        !matches!(
            credential.extras.compatible_subtype,
            Some(CompatibleSubtype::Ollama)
        )
    }

    fn quirks() -> WireQuirks {
        WireQuirks {
            force_reasoning_temperature: false,
            supports_reasoning_effort: false,
            reasoning_effort_any_model: false,
        }
    }
}

#[async_trait]
impl ProviderAdapter for CompatibleAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAiCompatible
    }

    fn default_model(&self, credential: &ProviderCredential) -> String {
        credential
            .preferred_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    fn list_models(&self, credential: &ProviderCredential) -> Vec<String> {
        credential.extras.exposed_models.clone()
    }

    async fn generate(
        &self,
        credential: &ProviderCredential,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ProviderError> {
        let url = Self::endpoint(credential)?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));

        let api_key = if Self::requires_api_key(credential) {
            Some(
                credential
                    .api_key
                    .clone()
                    .ok_or_else(|| ProviderError::ConfigurationMissing {
                        provider: "openai-compatible".to_string(),
                    })?,
            )
        } else {
            credential.api_key.clone()
        };
        let auth_value = format!("Bearer {}", api_key.unwrap_or_default());

        openai_wire::generate(
            &self.client,
            "openai-compatible",
            &url,
            ("Authorization", auth_value),
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
        let url = Self::endpoint(credential)?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));

        let api_key = if Self::requires_api_key(credential) {
            Some(
                credential
                    .api_key
                    .clone()
                    .ok_or_else(|| ProviderError::ConfigurationMissing {
                        provider: "openai-compatible".to_string(),
                    })?,
            )
        } else {
            credential.api_key.clone()
        };
        let auth_value = format!("Bearer {}", api_key.unwrap_or_default());

        openai_wire::stream_generate(
            self.client.clone(),
            "openai-compatible".to_string(),
            url,
            ("Authorization".to_string(), auth_value),
            model,
            request.clone(),
            Self::quirks(),
            cancel,
        )
        .await
    }
}
