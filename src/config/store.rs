//! Persistent configuration store with environment-variable overlay.
//!
//! Persists per-provider credentials to a platform config directory and
//! merges environment variables on every read, with the file's fields
//! winning when both are set. This precedence is the opposite of the
//! teacher's `SettingsStore`, which treats env vars as one-time defaults
//! used only when no settings file exists yet — the specification calls
//! for env vars to be read fresh on every `get_config()` and overridden by
//! whatever the file has present.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::types::{
    CompatibleSubtype, ConfigError, GatewayConfig, ProviderCredential, ProviderKind, VectorConfig,
};

/// Persistent, environment-overlaid store of provider credentials.
pub struct ConfigStore {
    config: RwLock<GatewayConfig>,
    storage_path: PathBuf,
}

impl ConfigStore {
    /// Create a store rooted at the platform-standard config directory
    /// (`~/.config/ultra-mcp/config.json` on Linux, and the macOS/Windows
    /// equivalents `directories` resolves automatically).
    pub async fn new() -> Result<Self, ConfigError> {
        let storage_path = default_config_path();
        Self::with_path(storage_path).await
    }

    /// Create a store at an explicit path (used by tests and `--config-dir`).
    pub async fn with_path(storage_path: PathBuf) -> Result<Self, ConfigError> {
        let on_disk = if storage_path.exists() {
            Self::load_from_path(&storage_path)?
        } else {
            tracing::info!(
                path = %storage_path.display(),
                "no config file found, starting from environment-only defaults"
            );
            GatewayConfig::default()
        };

        Ok(Self {
            config: RwLock::new(on_disk),
            storage_path,
        })
    }

    fn load_from_path(path: &Path) -> Result<GatewayConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn save_to_disk(&self, config: &GatewayConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.storage_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: self.storage_path.display().to_string(),
                source,
            })?;
        }
        let contents = serde_json::to_string_pretty(config).expect("config always serializes");
        std::fs::write(&self.storage_path, contents).map_err(|source| ConfigError::Write {
            path: self.storage_path.display().to_string(),
            source,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.storage_path
    }

    /// The merged view: environment variables read fresh, then overlaid
    /// with whatever the persisted file has present (file wins on conflict).
    pub async fn get_config(&self) -> GatewayConfig {
        let mut merged = env_defaults();
        let on_disk = self.config.read().await.clone();

        merged.schema_version = on_disk.schema_version;
        if on_disk.vector.is_some() {
            merged.vector = on_disk.vector;
        }
        for (kind, file_cred) in on_disk.providers {
            let entry = merged.providers.entry(kind).or_default();
            overlay_credential(entry, file_cred);
        }
        merged
    }

    pub async fn set_api_key(
        &self,
        kind: ProviderKind,
        value: Option<String>,
    ) -> Result<(), ConfigError> {
        let mut guard = self.config.write().await;
        guard.providers.entry(kind).or_default().api_key = value;
        self.save_to_disk(&guard)
    }

    pub async fn set_base_url(
        &self,
        kind: ProviderKind,
        value: Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = &value {
            validate_url(url)?;
        }
        let mut guard = self.config.write().await;
        guard.providers.entry(kind).or_default().base_url = value;
        self.save_to_disk(&guard)
    }

    pub async fn set_azure_resource_name(&self, value: Option<String>) -> Result<(), ConfigError> {
        let mut guard = self.config.write().await;
        guard
            .providers
            .entry(ProviderKind::Azure)
            .or_default()
            .extras
            .azure_resource_name = value;
        self.save_to_disk(&guard)
    }

    pub async fn set_compatible_subtype(
        &self,
        subtype: CompatibleSubtype,
    ) -> Result<(), ConfigError> {
        let mut guard = self.config.write().await;
        guard
            .providers
            .entry(ProviderKind::OpenAiCompatible)
            .or_default()
            .extras
            .compatible_subtype = Some(subtype);
        self.save_to_disk(&guard)
    }

    pub async fn set_vector_config(&self, vector: Option<VectorConfig>) -> Result<(), ConfigError> {
        let mut guard = self.config.write().await;
        guard.vector = vector;
        self.save_to_disk(&guard)
    }

    /// Wipe the persisted file back to defaults (environment still applies).
    pub async fn reset(&self) -> Result<(), ConfigError> {
        let mut guard = self.config.write().await;
        *guard = GatewayConfig::default();
        self.save_to_disk(&guard)
    }
}

/// Fields present in the on-disk record override the corresponding
/// environment-derived field; absent fields leave the environment value.
fn overlay_credential(base: &mut ProviderCredential, file: ProviderCredential) {
    if file.api_key.is_some() {
        base.api_key = file.api_key;
    }
    if file.base_url.is_some() {
        base.base_url = file.base_url;
    }
    if file.preferred_model.is_some() {
        base.preferred_model = file.preferred_model;
    }
    if file.extras.azure_resource_name.is_some() {
        base.extras.azure_resource_name = file.extras.azure_resource_name;
    }
    if file.extras.compatible_subtype.is_some() {
        base.extras.compatible_subtype = file.extras.compatible_subtype;
    }
    if !file.extras.exposed_models.is_empty() {
        base.extras.exposed_models = file.extras.exposed_models;
    }
    if file.extras.qwen3_coder_api_key.is_some() {
        base.extras.qwen3_coder_api_key = file.extras.qwen3_coder_api_key;
    }
    if file.extras.deepseek_r1_api_key.is_some() {
        base.extras.deepseek_r1_api_key = file.extras.deepseek_r1_api_key;
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Build a `GatewayConfig` purely from the environment variables named in
/// the specification. `openai-compatible` has no listed environment
/// variables and is therefore configured via the file only.
fn env_defaults() -> GatewayConfig {
    let mut config = GatewayConfig::default();

    let mut openai = ProviderCredential::default();
    openai.api_key = env_var("OPENAI_API_KEY");
    openai.base_url = env_var("OPENAI_BASE_URL");
    config.providers.insert(ProviderKind::OpenAi, openai);

    let mut google = ProviderCredential::default();
    google.api_key = env_var("GOOGLE_API_KEY");
    google.base_url = env_var("GOOGLE_BASE_URL");
    config.providers.insert(ProviderKind::Google, google);

    let mut azure = ProviderCredential::default();
    azure.api_key = env_var("AZURE_API_KEY");
    azure.base_url = env_var("AZURE_BASE_URL").or_else(|| env_var("AZURE_ENDPOINT"));
    config.providers.insert(ProviderKind::Azure, azure);

    let mut grok = ProviderCredential::default();
    grok.api_key = env_var("XAI_API_KEY");
    grok.base_url = env_var("XAI_BASE_URL");
    config.providers.insert(ProviderKind::Grok, grok);

    let mut bailian = ProviderCredential::default();
    bailian.api_key = env_var("DASHSCOPE_API_KEY");
    bailian.extras.qwen3_coder_api_key = env_var("QWEN3_CODER_API_KEY");
    bailian.extras.deepseek_r1_api_key = env_var("DEEPSEEK_R1_API_KEY");
    config.providers.insert(ProviderKind::Bailian, bailian);

    config
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidUrl(url.to_string()))
    }
}

fn default_config_path() -> PathBuf {
    if let Some(dirs) = directories::BaseDirs::new() {
        dirs.config_dir().join("ultra-mcp").join("config.json")
    } else {
        PathBuf::from(".ultra-mcp").join("config.json")
    }
}

/// Shared handle to the configuration store.
pub type SharedConfigStore = Arc<ConfigStore>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store() -> (ConfigStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = ConfigStore::with_path(path).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn file_wins_over_environment() {
        std::env::set_var("OPENAI_API_KEY", "env-key");
        let (store, _dir) = temp_store().await;
        store
            .set_api_key(ProviderKind::OpenAi, Some("file-key".to_string()))
            .await
            .unwrap();

        let cfg = store.get_config().await;
        assert_eq!(
            cfg.credential(ProviderKind::OpenAi).api_key.as_deref(),
            Some("file-key")
        );
        std::env::remove_var("OPENAI_API_KEY");
    }

    #[tokio::test]
    async fn environment_used_when_file_absent() {
        std::env::set_var("GOOGLE_API_KEY", "env-only-key");
        let (store, _dir) = temp_store().await;

        let cfg = store.get_config().await;
        assert_eq!(
            cfg.credential(ProviderKind::Google).api_key.as_deref(),
            Some("env-only-key")
        );
        std::env::remove_var("GOOGLE_API_KEY");
    }

    #[tokio::test]
    async fn configured_providers_follow_priority_order() {
        let (store, _dir) = temp_store().await;
        store
            .set_api_key(ProviderKind::Google, Some("g".to_string()))
            .await
            .unwrap();
        store
            .set_api_key(ProviderKind::OpenAi, Some("o".to_string()))
            .await
            .unwrap();

        let cfg = store.get_config().await;
        assert_eq!(
            cfg.configured_providers(),
            vec![ProviderKind::OpenAi, ProviderKind::Google]
        );
    }

    #[tokio::test]
    async fn reset_clears_persisted_file_but_not_environment() {
        std::env::set_var("XAI_API_KEY", "env-xai");
        let (store, _dir) = temp_store().await;
        store
            .set_api_key(ProviderKind::OpenAi, Some("o".to_string()))
            .await
            .unwrap();
        store.reset().await.unwrap();

        let cfg = store.get_config().await;
        assert!(cfg.credential(ProviderKind::OpenAi).api_key.is_none());
        assert_eq!(
            cfg.credential(ProviderKind::Grok).api_key.as_deref(),
            Some("env-xai")
        );
        std::env::remove_var("XAI_API_KEY");
    }

    #[tokio::test]
    async fn rejects_invalid_base_url() {
        let (store, _dir) = temp_store().await;
        let err = store
            .set_base_url(ProviderKind::OpenAi, Some("not-a-url".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl(_)));
    }
}
