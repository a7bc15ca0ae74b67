//! Two-layer pricing cache: a 5-minute in-memory layer in front of a
//! 1-hour on-disk layer, in front of a remote LiteLLM-style pricing
//! document. Falls back to the last good snapshot (stale memory, then
//! stale disk, then the hardcoded seed table) rather than failing a
//! request outright when the remote fetch breaks.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::catalog::{default_pricing, ingest};
use super::error::PricingError;
use super::types::{CostBreakdown, ModelPricing, PricingCatalog};
use crate::llm::TokenUsage;

const MEMORY_TTL: Duration = Duration::from_secs(5 * 60);
const DISK_TTL: Duration = Duration::from_secs(60 * 60);
const DEFAULT_SOURCE_URL: &str =
    "https://raw.githubusercontent.com/BerriAI/litellm/main/model_prices_and_context_window.json";

#[derive(Serialize, Deserialize)]
struct DiskCacheEnvelope {
    fetched_at: u64,
    catalog: PricingCatalog,
}

struct MemoryEntry {
    cached_at: SystemTime,
    catalog: PricingCatalog,
}

pub struct PricingService {
    client: reqwest::Client,
    source_url: String,
    disk_cache_path: PathBuf,
    memory: RwLock<Option<MemoryEntry>>,
}

impl PricingService {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            source_url: DEFAULT_SOURCE_URL.to_string(),
            disk_cache_path: default_disk_cache_path(),
            memory: RwLock::new(None),
        }
    }

    pub fn with_source(client: reqwest::Client, source_url: String, disk_cache_path: PathBuf) -> Self {
        Self {
            client,
            source_url,
            disk_cache_path,
            memory: RwLock::new(None),
        }
    }

    pub fn disk_cache_path(&self) -> &std::path::Path {
        &self.disk_cache_path
    }

    /// Resolve the full catalog, refreshing whichever layer has gone stale.
    pub async fn get_catalog(&self) -> PricingCatalog {
        {
            let memory = self.memory.read().await;
            if let Some(entry) = memory.as_ref() {
                if elapsed_since(entry.cached_at) < MEMORY_TTL {
                    return entry.catalog.clone();
                }
            }
        }

        if let Some((fetched_at, catalog)) = self.read_disk_cache() {
            if elapsed_since(fetched_at) < DISK_TTL {
                self.store_memory(catalog.clone()).await;
                return catalog;
            }
        }

        match self.fetch_remote().await {
            Ok(catalog) => {
                let _ = self.write_disk_cache(&catalog);
                self.store_memory(catalog.clone()).await;
                catalog
            }
            Err(_) => {
                // Stale disk cache beats the hardcoded seed table, which
                // beats nothing at all.
                if let Some((_, catalog)) = self.read_disk_cache() {
                    self.store_memory(catalog.clone()).await;
                    return catalog;
                }
                default_pricing()
            }
        }
    }

    pub async fn pricing_for_model(&self, model: &str) -> Option<ModelPricing> {
        self.get_catalog().await.pricing_for_model(model).cloned()
    }

    /// Cost breakdown, falling back to all-zero when the model has no
    /// known pricing rather than failing the surrounding request.
    pub async fn calculate_cost(&self, model: &str, usage: &TokenUsage) -> CostBreakdown {
        match self.pricing_for_model(model).await {
            Some(pricing) => pricing.cost_breakdown(usage.input_tokens, usage.output_tokens),
            None => CostBreakdown {
                input_cost: 0.0,
                output_cost: 0.0,
                total_cost: 0.0,
                tiered_applied: false,
            },
        }
    }

    pub async fn refresh(&self) -> Result<(), PricingError> {
        let catalog = self.fetch_remote().await?;
        self.write_disk_cache(&catalog)?;
        self.store_memory(catalog).await;
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), PricingError> {
        *self.memory.write().await = None;
        if self.disk_cache_path.exists() {
            std::fs::remove_file(&self.disk_cache_path).map_err(|source| PricingError::CacheWrite {
                path: self.disk_cache_path.display().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    async fn store_memory(&self, catalog: PricingCatalog) {
        *self.memory.write().await = Some(MemoryEntry {
            cached_at: SystemTime::now(),
            catalog,
        });
    }

    async fn fetch_remote(&self) -> Result<PricingCatalog, PricingError> {
        let response = self
            .client
            .get(&self.source_url)
            .send()
            .await
            .map_err(|e| PricingError::FetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PricingError::FetchFailed(format!(
                "status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PricingError::FetchFailed(e.to_string()))?;

        Ok(ingest(&body)?)
    }

    fn read_disk_cache(&self) -> Option<(SystemTime, PricingCatalog)> {
        let contents = std::fs::read_to_string(&self.disk_cache_path).ok()?;
        let envelope: DiskCacheEnvelope = serde_json::from_str(&contents).ok()?;
        let fetched_at = SystemTime::UNIX_EPOCH + Duration::from_secs(envelope.fetched_at);
        Some((fetched_at, envelope.catalog))
    }

    fn write_disk_cache(&self, catalog: &PricingCatalog) -> Result<(), PricingError> {
        if let Some(parent) = self.disk_cache_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| PricingError::CacheWrite {
                path: self.disk_cache_path.display().to_string(),
                source,
            })?;
        }
        let fetched_at = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let envelope = DiskCacheEnvelope {
            fetched_at,
            catalog: catalog.clone(),
        };
        let contents = serde_json::to_string(&envelope).expect("catalog always serializes");
        std::fs::write(&self.disk_cache_path, contents).map_err(|source| PricingError::CacheWrite {
            path: self.disk_cache_path.display().to_string(),
            source,
        })
    }
}

fn elapsed_since(point: SystemTime) -> Duration {
    SystemTime::now()
        .duration_since(point)
        .unwrap_or(Duration::ZERO)
}

fn default_disk_cache_path() -> PathBuf {
    if let Some(dirs) = directories::BaseDirs::new() {
        dirs.config_dir()
            .join("ultra-mcp")
            .join("litellm-pricing-cache.json")
    } else {
        PathBuf::from(".ultra-mcp").join("litellm-pricing-cache.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_service() -> (PricingService, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let service = PricingService::with_source(
            reqwest::Client::new(),
            "http://127.0.0.1:0/unreachable".to_string(),
            path,
        );
        (service, dir)
    }

    #[tokio::test]
    async fn falls_back_to_default_pricing_when_unreachable_and_uncached() {
        let (service, _dir) = temp_service();
        let catalog = service.get_catalog().await;
        assert!(catalog.models.contains_key("gpt-4o"));
    }

    #[tokio::test]
    async fn stale_disk_cache_wins_over_default_when_fetch_fails() {
        let (service, _dir) = temp_service();
        let mut catalog = default_pricing();
        catalog.models.insert(
            "custom-model".to_string(),
            ModelPricing {
                input_cost_per_million: 9.0,
                output_cost_per_million: 9.0,
                input_cost_per_million_above_threshold: None,
                output_cost_per_million_above_threshold: None,
            },
        );
        service.write_disk_cache(&catalog).unwrap();

        let resolved = service.get_catalog().await;
        assert!(resolved.models.contains_key("custom-model"));
    }

    #[tokio::test]
    async fn missing_model_prices_at_zero() {
        let (service, _dir) = temp_service();
        let usage = TokenUsage::new(1000, 1000);
        let cost = service.calculate_cost("totally-unknown-model-xyz", &usage).await;
        assert_eq!(cost.total_cost, 0.0);
        assert!(!cost.tiered_applied);
    }
}
