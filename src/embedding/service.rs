//! `EmbeddingService`: narrow embedding interface sitting alongside chat
//! generation, reusing the same per-provider credentials rather than
//! holding its own copy (mirrors the teacher's `EmbeddingClient` being
//! handed a key directly, generalized to every provider in the table).

use crate::config::{ProviderCredential, ProviderKind, SharedConfigStore};

use super::error::EmbeddingError;
use super::wire::embed_batch;

const OPENAI_DEFAULT_MODEL: &str = "text-embedding-3-small";
const GOOGLE_DEFAULT_MODEL: &str = "text-embedding-004";
const BAILIAN_DEFAULT_MODEL: &str = "text-embedding-v1";

pub struct EmbeddingService {
    client: reqwest::Client,
    config: SharedConfigStore,
}

impl EmbeddingService {
    pub fn new(config: SharedConfigStore, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    pub async fn embed_one(&self, provider: ProviderKind, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let vectors = self.embed_many(provider, &[text.to_string()]).await?;
        vectors
            .into_iter()
            .next()
            .ok_or(EmbeddingError::EmptyResponse { provider: provider_label(provider) })
    }

    /// Azure's embedding endpoint cannot accept batch input: for Azure,
    /// iterate one request per text and concatenate. Every other provider
    /// uses its native batch endpoint.
    pub async fn embed_many(
        &self,
        provider: ProviderKind,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let credential = self.config.get_config().await.credential(provider);
        if !credential.is_configured() {
            return Err(EmbeddingError::Provider(crate::llm::ProviderError::ConfigurationMissing {
                provider: provider.to_string(),
            }));
        }

        if provider == ProviderKind::Azure {
            let mut results = Vec::with_capacity(texts.len());
            for text in texts {
                let vector = self.dispatch(provider, &credential, std::slice::from_ref(text)).await?;
                results.extend(vector);
            }
            return Ok(results);
        }

        self.dispatch(provider, &credential, texts).await
    }

    async fn dispatch(
        &self,
        provider: ProviderKind,
        credential: &ProviderCredential,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let model = credential
            .preferred_model
            .clone()
            .unwrap_or_else(|| default_model(provider).to_string());
        let api_key = credential.api_key.clone().unwrap_or_default();

        match provider {
            ProviderKind::OpenAi => {
                let url = format!(
                    "{}/embeddings",
                    credential.base_url.as_deref().unwrap_or("https://api.openai.com/v1")
                );
                embed_batch(&self.client, "openai", &url, ("Authorization", &format!("Bearer {api_key}")), &model, texts).await
            }
            ProviderKind::Azure => {
                let resource = credential.extras.azure_resource_name.as_deref().unwrap_or_default();
                let url = credential.base_url.clone().unwrap_or_else(|| {
                    format!(
                        "https://{resource}.openai.azure.com/openai/deployments/{model}/embeddings?api-version=2024-10-21"
                    )
                });
                embed_batch(&self.client, "azure", &url, ("api-key", &api_key), &model, texts).await
            }
            ProviderKind::Google => {
                let base = credential
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());
                let url = format!("{base}/models/{model}:batchEmbedContents?key={api_key}");
                embed_batch(&self.client, "google", &url, ("Content-Type", "application/json"), &model, texts).await
            }
            ProviderKind::Bailian => {
                let base = credential
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "https://dashscope.aliyuncs.com/compatible-mode/v1".to_string());
                let url = format!("{base}/embeddings");
                embed_batch(&self.client, "bailian", &url, ("Authorization", &format!("Bearer {api_key}")), &model, texts).await
            }
            ProviderKind::Grok | ProviderKind::OpenAiCompatible => {
                Err(EmbeddingError::Provider(crate::llm::ProviderError::ConfigurationMissing {
                    provider: provider.to_string(),
                }))
            }
        }
    }
}

fn default_model(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::OpenAi | ProviderKind::Azure => OPENAI_DEFAULT_MODEL,
        ProviderKind::Google => GOOGLE_DEFAULT_MODEL,
        ProviderKind::Bailian => BAILIAN_DEFAULT_MODEL,
        ProviderKind::Grok | ProviderKind::OpenAiCompatible => "",
    }
}

fn provider_label(provider: ProviderKind) -> &'static str {
    match provider {
        ProviderKind::OpenAi => "openai",
        ProviderKind::Azure => "azure",
        ProviderKind::Google => "google",
        ProviderKind::Grok => "grok",
        ProviderKind::Bailian => "bailian",
        ProviderKind::OpenAiCompatible => "openai-compatible",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_models_match_table() {
        assert_eq!(default_model(ProviderKind::OpenAi), "text-embedding-3-small");
        assert_eq!(default_model(ProviderKind::Azure), "text-embedding-3-small");
        assert_eq!(default_model(ProviderKind::Google), "text-embedding-004");
        assert_eq!(default_model(ProviderKind::Bailian), "text-embedding-v1");
    }
}
