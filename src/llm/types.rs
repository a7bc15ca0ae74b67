//! Shared request/response types for the Provider Registry & Adapters.

use crate::config::ProviderKind;
use serde::{Deserialize, Serialize};

/// Reasoning effort knob accepted by `o1*`/`o3*`/Grok-style reasoning models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl Default for ReasoningEffort {
    fn default() -> Self {
        ReasoningEffort::Medium
    }
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A uniform generation request handed to any adapter.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u64>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub use_search_grounding: Option<bool>,
    pub tool_name: Option<String>,
}

/// Token usage reported by an upstream provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }
}

/// A complete, non-streamed generation result.
#[derive(Debug, Clone)]
pub struct GenerateResponse {
    pub content: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
    pub model: String,
}

/// One unit of a streaming response.
#[derive(Debug, Clone)]
pub enum StreamChunk {
    /// A decoded content delta.
    Content(String),
    /// Clean termination: final usage (if the upstream reported it in its
    /// last chunk) and finish reason.
    Done {
        usage: Option<TokenUsage>,
        finish_reason: Option<String>,
    },
}

/// Whether a model identifier falls under the reasoning-model prefixes that
/// force `temperature = 1.0` and accept a `reasoningEffort` knob.
pub fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("o1") || model.starts_with("o3") || model.starts_with("gpt-5")
}

/// Narrower check: only `o1*`/`o3*` accept the `reasoningEffort` parameter.
pub fn accepts_reasoning_effort(model: &str) -> bool {
    model.starts_with("o1") || model.starts_with("o3")
}
