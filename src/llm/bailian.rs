//! Alibaba DashScope/Bailian adapter, addressed through its
//! OpenAI-compatible endpoint.

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use super::adapter::ProviderAdapter;
use super::error::ProviderError;
use super::openai_wire::{self, WireQuirks};
use super::types::{GenerateRequest, GenerateResponse, StreamChunk};
use crate::config::{ProviderCredential, ProviderKind};

const DEFAULT_MODEL: &str = "qwen-plus";
const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

pub struct BailianAdapter {
    client: reqwest::Client,
}

impl BailianAdapter {
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

    /// Model-specific key override: `qwen3-coder` and `deepseek-r1` each
    /// accept a dedicated key distinct from the account's main DashScope key.
    fn api_key_for(credential: &ProviderCredential, model: &str) -> Option<String> {
        if model.starts_with("qwen3-coder") {
            if let Some(key) = &credential.extras.qwen3_coder_api_key {
                return Some(key.clone());
            }
        }
        if model.starts_with("deepseek-r1") {
            if let Some(key) = &credential.extras.deepseek_r1_api_key {
                return Some(key.clone());
            }
        }
        credential.api_key.clone()
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
impl ProviderAdapter for BailianAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Bailian
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
            "qwen-plus".to_string(),
            "qwen-max".to_string(),
            "qwen3-coder-plus".to_string(),
            "deepseek-r1".to_string(),
        ]
    }

    async fn generate(
        &self,
        credential: &ProviderCredential,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ProviderError> {
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));
        let api_key =
            Self::api_key_for(credential, &model).ok_or_else(|| ProviderError::ConfigurationMissing {
                provider: "bailian".to_string(),
            })?;

        openai_wire::generate(
            &self.client,
            "bailian",
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
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));
        let api_key =
            Self::api_key_for(credential, &model).ok_or_else(|| ProviderError::ConfigurationMissing {
                provider: "bailian".to_string(),
            })?;

        openai_wire::stream_generate(
            self.client.clone(),
            "bailian".to_string(),
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
