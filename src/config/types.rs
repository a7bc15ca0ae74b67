//! Data types for the Configuration Store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Current on-disk schema version. Bump when the persisted layout changes
/// in an incompatible way; a missing or unrecognized value is treated as 1.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// The fixed provider-selection priority order used when a caller omits
/// `provider` from a generation request.
pub const PROVIDER_PRIORITY: &[ProviderKind] = &[
    ProviderKind::Azure,
    ProviderKind::OpenAi,
    ProviderKind::Google,
    ProviderKind::Grok,
    ProviderKind::Bailian,
    ProviderKind::OpenAiCompatible,
];

/// A configured upstream kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    OpenAi,
    Azure,
    Google,
    Grok,
    Bailian,
    OpenAiCompatible,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Azure => "azure",
            Self::Google => "google",
            Self::Grok => "grok",
            Self::Bailian => "bailian",
            Self::OpenAiCompatible => "openai-compatible",
        }
    }
}

/// Subtype of an OpenAI-compatible endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatibleSubtype {
    Ollama,
    OpenRouter,
}

/// Provider-specific fields that don't fit the common credential shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderExtras {
    /// Azure resource name (deployment host prefix).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure_resource_name: Option<String>,
    /// Which flavor of OpenAI-compatible endpoint this is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_subtype: Option<CompatibleSubtype>,
    /// Models this provider instance exposes (enumerated, not discovered).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exposed_models: Vec<String>,
    /// Override key for the `qwen3-coder` Bailian subtype.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qwen3_coder_api_key: Option<String>,
    /// Override key for the `deepseek-r1` Bailian subtype.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepseek_r1_api_key: Option<String>,
}

/// `(providerKind, apiKey?, baseURL?, preferredModel?, extras)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderCredential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_model: Option<String>,
    #[serde(default)]
    pub extras: ProviderExtras,
}

impl ProviderCredential {
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// Configuration for the (out-of-scope) vector-embedding indexer. Persisted
/// as part of the schema even though indexing itself isn't implemented here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// The full persisted + merged configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub providers: HashMap<ProviderKind, ProviderCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<VectorConfig>,
}

fn default_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            providers: HashMap::new(),
            vector: None,
        }
    }
}

impl GatewayConfig {
    pub fn credential(&self, kind: ProviderKind) -> ProviderCredential {
        self.providers.get(&kind).cloned().unwrap_or_default()
    }

    /// The providers with a non-empty API key, in priority order.
    pub fn configured_providers(&self) -> Vec<ProviderKind> {
        PROVIDER_PRIORITY
            .iter()
            .copied()
            .filter(|kind| self.credential(*kind).is_configured())
            .collect()
    }
}

/// Serde requires hashable map keys to round-trip through a string
/// representation for JSON; derive it manually since `ProviderKind` is an
/// enum without a blanket string impl.
impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file at {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config file at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),
}
