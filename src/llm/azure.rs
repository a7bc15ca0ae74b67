//! Azure OpenAI adapter.
//!
//! Azure addresses deployments by resource name and api-version query
//! parameter rather than a flat `/v1/chat/completions` path, and authenticates
//! with an `api-key` header instead of a bearer token. The reasoning-model
//! temperature override applies here too (Azure serves the same `o1*`/`o3*`
//! deployments OpenAI does).

use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;

use super::adapter::ProviderAdapter;
use super::error::ProviderError;
use super::openai_wire::{self, WireQuirks};
use super::types::{GenerateRequest, GenerateResponse, StreamChunk};
use crate::config::{ProviderCredential, ProviderKind};

const DEFAULT_MODEL: &str = "gpt-4o";
const API_VERSION: &str = "2024-10-21";

pub struct AzureAdapter {
    client: reqwest::Client,
}

impl AzureAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn endpoint(credential: &ProviderCredential, model: &str) -> Result<String, ProviderError> {
        if let Some(base_url) = &credential.base_url {
            let base = base_url.trim_end_matches('/');
            return Ok(format!(
                "{base}/openai/deployments/{model}/chat/completions?api-version={API_VERSION}"
            ));
        }
        let resource = credential
            .extras
            .azure_resource_name
            .as_deref()
            .ok_or_else(|| ProviderError::ConfigurationMissing {
                provider: "azure".to_string(),
            })?;
        Ok(format!(
            "https://{resource}.openai.azure.com/openai/deployments/{model}/chat/completions?api-version={API_VERSION}"
        ))
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
impl ProviderAdapter for AzureAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Azure
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
        vec![self.default_model(credential)]
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
                    provider: "azure".to_string(),
                })?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));
        let url = Self::endpoint(credential, &model)?;

        openai_wire::generate(
            &self.client,
            "azure",
            &url,
            ("api-key", api_key),
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
                    provider: "azure".to_string(),
                })?;
        let model = request.model.clone().unwrap_or_else(|| self.default_model(credential));
        let url = Self::endpoint(credential, &model)?;

        openai_wire::stream_generate(
            self.client.clone(),
            "azure".to_string(),
            url,
            ("api-key".to_string(), api_key),
            model,
            request.clone(),
            Self::quirks(),
            cancel,
        )
        .await
    }
}
