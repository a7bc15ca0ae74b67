//! Provider Registry: priority-ordered provider selection plus an ambient,
//! in-memory readiness cache surfaced by the `doctor` CLI command.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures::stream::BoxStream;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::adapter::ProviderAdapter;
use super::azure::AzureAdapter;
use super::bailian::BailianAdapter;
use super::compatible::CompatibleAdapter;
use super::error::ProviderError;
use super::gemini::GeminiAdapter;
use super::grok::GrokAdapter;
use super::openai::OpenAiAdapter;
use super::types::{GenerateRequest, GenerateResponse, StreamChunk};
use crate::config::{ProviderKind, SharedConfigStore, PROVIDER_PRIORITY};

/// Non-persisted, process-lifetime readiness snapshot for one provider.
/// Rebuilt from scratch on every process start; never written to disk.
#[derive(Debug, Clone, Default)]
pub struct ProviderHealth {
    pub configured: bool,
    pub last_success: Option<Instant>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

pub struct ProviderRegistry {
    adapters: HashMap<ProviderKind, Box<dyn ProviderAdapter>>,
    config: SharedConfigStore,
    health: RwLock<HashMap<ProviderKind, ProviderHealth>>,
}

impl ProviderRegistry {
    pub fn new(config: SharedConfigStore, client: reqwest::Client) -> Self {
        let mut adapters: HashMap<ProviderKind, Box<dyn ProviderAdapter>> = HashMap::new();
        adapters.insert(ProviderKind::OpenAi, Box::new(OpenAiAdapter::new(client.clone())));
        adapters.insert(ProviderKind::Azure, Box::new(AzureAdapter::new(client.clone())));
        adapters.insert(ProviderKind::Google, Box::new(GeminiAdapter::new(client.clone())));
        adapters.insert(ProviderKind::Grok, Box::new(GrokAdapter::new(client.clone())));
        adapters.insert(ProviderKind::Bailian, Box::new(BailianAdapter::new(client.clone())));
        adapters.insert(
            ProviderKind::OpenAiCompatible,
            Box::new(CompatibleAdapter::new(client)),
        );

        Self {
            adapters,
            config,
            health: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve which provider a request should use: the caller's explicit
    /// choice if given, otherwise the first configured provider in priority
    /// order.
    pub async fn resolve_provider(
        &self,
        requested: Option<ProviderKind>,
    ) -> Result<ProviderKind, ProviderError> {
        let config = self.config.get_config().await;

        if let Some(kind) = requested {
            if config.credential(kind).is_configured() {
                return Ok(kind);
            }
            return Err(ProviderError::ConfigurationMissing {
                provider: kind.to_string(),
            });
        }

        config
            .configured_providers()
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ConfigurationMissing {
                provider: "any".to_string(),
            })
    }

    fn adapter(&self, kind: ProviderKind) -> &dyn ProviderAdapter {
        self.adapters
            .get(&kind)
            .expect("every ProviderKind has a registered adapter")
            .as_ref()
    }

    pub async fn generate(
        &self,
        request: &GenerateRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerateResponse, ProviderError> {
        let kind = self.resolve_provider(request.provider).await?;
        let credential = self.config.get_config().await.credential(kind);
        let adapter = self.adapter(kind);

        let result = adapter.generate(&credential, request, cancel).await;
        self.record_outcome(kind, &result).await;
        result
    }

    pub async fn stream_generate(
        &self,
        request: &GenerateRequest,
        cancel: CancellationToken,
    ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError> {
        let kind = self.resolve_provider(request.provider).await?;
        let credential = self.config.get_config().await.credential(kind);
        let adapter = self.adapter(kind);

        let result = adapter.stream_generate(&credential, request, cancel).await;
        self.record_outcome(kind, &result).await;
        result
    }

    pub async fn list_models(&self, kind: ProviderKind) -> Vec<String> {
        let credential = self.config.get_config().await.credential(kind);
        self.adapter(kind).list_models(&credential)
    }

    /// Snapshot of readiness for every provider, used by `doctor`.
    pub async fn health_snapshot(&self) -> HashMap<ProviderKind, ProviderHealth> {
        let config = self.config.get_config().await;
        let mut snapshot = self.health.read().await.clone();
        for kind in PROVIDER_PRIORITY {
            let entry = snapshot.entry(*kind).or_default();
            entry.configured = config.credential(*kind).is_configured();
        }
        snapshot
    }

    async fn record_outcome<T>(&self, kind: ProviderKind, result: &Result<T, ProviderError>) {
        let mut health = self.health.write().await;
        let entry = health.entry(kind).or_default();
        match result {
            Ok(_) => {
                entry.last_success = Some(Instant::now());
                entry.consecutive_failures = 0;
                entry.last_error = None;
            }
            Err(err) => {
                entry.consecutive_failures += 1;
                entry.last_error = Some(err.to_string());
            }
        }
    }
}

pub type SharedProviderRegistry = Arc<ProviderRegistry>;
