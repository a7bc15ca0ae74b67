//! A unified gateway exposing multiple LLM providers (OpenAI, Google
//! Gemini, Azure OpenAI, xAI Grok, Alibaba DashScope/Bailian, and
//! OpenAI-compatible endpoints) behind one request/response contract,
//! with usage tracking, cost accounting, and optional multi-turn
//! conversation memory.
//!
//! ## Architecture
//!
//! ```text
//! Configuration Store ──▶ Pricing Service ──▶ Provider Adapters
//!                                                     │
//!                                                     ▼
//!                                           Request Tracker ──▶ Conversation Memory
//! ```
//!
//! `GatewayEngine` is the construction root: it owns all five core
//! components in dependency order. The MCP surface (`mcp_surface`) and any
//! future dashboard consume the engine but are not part of it.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod mcp_surface;
pub mod memory;
pub mod pricing;
pub mod tracker;

use std::sync::Arc;

pub use error::{GatewayError, Result};

use config::SharedConfigStore;
use embedding::EmbeddingService;
use llm::{GenerateRequest, GenerateResponse, SharedProviderRegistry};
use memory::ConversationStore;
use pricing::PricingService;
use tracker::{RequestTracker, TrackingHandle};

/// Owns every core component, constructed once in dependency order:
/// Configuration Store → Pricing Service → Provider Adapters → Request
/// Tracker → Conversation Memory.
pub struct GatewayEngine {
    pub config: SharedConfigStore,
    pub pricing: Arc<PricingService>,
    pub providers: SharedProviderRegistry,
    pub tracker: Arc<RequestTracker>,
    pub memory: Arc<ConversationStore>,
    pub embeddings: Arc<EmbeddingService>,
}

impl GatewayEngine {
    pub async fn new(config: SharedConfigStore, db_path: impl AsRef<std::path::Path>) -> Result<Self> {
        let client = reqwest::Client::new();

        let pricing = Arc::new(PricingService::new(client.clone()));
        let providers = Arc::new(llm::ProviderRegistry::new(config.clone(), client.clone()));
        let tracker = Arc::new(RequestTracker::open(&db_path).await?);
        let memory = Arc::new(ConversationStore::open(&db_path).await?);
        let embeddings = Arc::new(EmbeddingService::new(config.clone(), client));

        Ok(Self {
            config,
            pricing,
            providers,
            tracker,
            memory,
            embeddings,
        })
    }

    /// The gateway's core data flow: resolve and call a provider, track the
    /// request's lifecycle from `pending` to a terminal state, resolve its
    /// dollar cost, and — when a session is given — append the exchange to
    /// Conversation Memory. This is the single path every tool handler and
    /// the `doctor --test` CLI command should go through instead of calling
    /// `self.providers` directly, so no request bypasses tracking or
    /// pricing.
    pub async fn generate(
        &self,
        request: &GenerateRequest,
        session_id: Option<uuid::Uuid>,
        cancel: &tokio_util::sync::CancellationToken,
    ) -> Result<GenerateResponse> {
        let provider_label = request
            .provider
            .map(|kind| kind.to_string())
            .unwrap_or_else(|| "auto".to_string());
        let model_label = request.model.clone().unwrap_or_else(|| "auto".to_string());
        let request_payload = serde_json::to_string(&serde_json::json!({
            "provider": request.provider.map(|kind| kind.to_string()),
            "model": request.model,
            "prompt": request.prompt,
            "system_prompt": request.system_prompt,
            "temperature": request.temperature,
            "max_output_tokens": request.max_output_tokens,
            "reasoning_effort": request.reasoning_effort.map(|e| e.as_str()),
            "tool_name": request.tool_name,
        }))
        .ok();

        let id = self
            .tracker
            .start(&provider_label, &model_label, request.tool_name.as_deref(), request_payload.as_deref())
            .await?;
        let handle = TrackingHandle::new(self.tracker.clone(), id);

        match self.providers.generate(request, cancel).await {
            Ok(response) => {
                let usage = response.usage.unwrap_or_default();
                let cost = self.pricing.calculate_cost(&response.model, &usage).await;

                handle
                    .succeed(
                        usage.input_tokens as i64,
                        usage.output_tokens as i64,
                        usage.total_tokens as i64,
                        cost.total_cost,
                        response.finish_reason.clone(),
                        Some(response.content.clone()),
                    )
                    .await;

                if let Some(session_id) = session_id {
                    self.memory
                        .add_message(session_id, memory::MessageRole::User, request.prompt.clone(), request.tool_name.clone(), None, None)
                        .await?;
                    self.memory
                        .add_message(
                            session_id,
                            memory::MessageRole::Assistant,
                            response.content.clone(),
                            request.tool_name.clone(),
                            None,
                            None,
                        )
                        .await?;
                }

                Ok(response)
            }
            Err(err) => {
                handle.fail(&err.to_string()).await;
                Err(GatewayError::from(err))
            }
        }
    }
}
