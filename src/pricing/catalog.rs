//! Ingest of the remote LiteLLM-style pricing document into a
//! [`PricingCatalog`].

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use super::types::{ModelPricing, PricingCatalog};

const EXCLUDED_NAME_FRAGMENTS: &[&str] = &[
    "dall-e",
    "whisper",
    "tts",
    "embedding",
    "moderation",
    "flux",
    "stable-diffusion",
    "sample_spec",
];

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    input_cost_per_token: Option<Value>,
    #[serde(default)]
    output_cost_per_token: Option<Value>,
    #[serde(default)]
    input_cost_per_image: Option<Value>,
    #[serde(default)]
    output_cost_per_image: Option<Value>,
}

fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Parse the raw LiteLLM JSON document (`{modelName: {...}, ...}`) into a
/// catalog, applying the exclusion list and keeping only entries that carry
/// either base token pricing or explicit image pricing.
pub fn ingest(raw_json: &str) -> Result<PricingCatalog, serde_json::Error> {
    let raw: HashMap<String, Value> = serde_json::from_str(raw_json)?;
    let mut models = HashMap::new();

    for (name, value) in raw {
        if name == "sample_spec" {
            continue;
        }
        let lower = name.to_lowercase();
        if EXCLUDED_NAME_FRAGMENTS
            .iter()
            .any(|fragment| lower.contains(fragment))
        {
            continue;
        }

        let Ok(entry) = serde_json::from_value::<RawEntry>(value) else {
            continue;
        };

        let input_per_token = entry.input_cost_per_token.as_ref().and_then(coerce_numeric);
        let output_per_token = entry.output_cost_per_token.as_ref().and_then(coerce_numeric);
        let has_image_pricing =
            entry.input_cost_per_image.is_some() || entry.output_cost_per_image.is_some();

        if input_per_token.is_none() && output_per_token.is_none() && !has_image_pricing {
            continue;
        }

        models.insert(
            name,
            ModelPricing {
                input_cost_per_million: input_per_token.unwrap_or(0.0) * 1_000_000.0,
                output_cost_per_million: output_per_token.unwrap_or(0.0) * 1_000_000.0,
                input_cost_per_million_above_threshold: None,
                output_cost_per_million_above_threshold: None,
            },
        );
    }

    Ok(PricingCatalog {
        models,
        aliases: default_aliases(),
    })
}

/// Common alternate spellings that don't differ enough to need substring
/// matching but also don't share a prefix/suffix with the canonical key.
fn default_aliases() -> HashMap<String, String> {
    let mut aliases = HashMap::new();
    aliases.insert("gpt4o".to_string(), "gpt-4o".to_string());
    aliases.insert("gpt4".to_string(), "gpt-4".to_string());
    aliases.insert("gemini-pro".to_string(), "gemini-1.5-pro".to_string());
    aliases
}

/// Hardcoded fallback seed used when no cached or fetched catalog is
/// available at all (first run, offline, remote document unreachable).
pub fn default_pricing() -> PricingCatalog {
    let mut models = HashMap::new();
    models.insert(
        "gpt-4o".to_string(),
        ModelPricing {
            input_cost_per_million: 2.50,
            output_cost_per_million: 10.00,
            input_cost_per_million_above_threshold: None,
            output_cost_per_million_above_threshold: None,
        },
    );
    models.insert(
        "gpt-4o-mini".to_string(),
        ModelPricing {
            input_cost_per_million: 0.15,
            output_cost_per_million: 0.60,
            input_cost_per_million_above_threshold: None,
            output_cost_per_million_above_threshold: None,
        },
    );
    models.insert(
        "gemini-1.5-pro".to_string(),
        ModelPricing {
            input_cost_per_million: 1.25,
            output_cost_per_million: 5.00,
            input_cost_per_million_above_threshold: Some(2.50),
            output_cost_per_million_above_threshold: Some(10.00),
        },
    );
    models.insert(
        "grok-2-latest".to_string(),
        ModelPricing {
            input_cost_per_million: 2.00,
            output_cost_per_million: 10.00,
            input_cost_per_million_above_threshold: None,
            output_cost_per_million_above_threshold: None,
        },
    );
    models.insert(
        "qwen-plus".to_string(),
        ModelPricing {
            input_cost_per_million: 0.40,
            output_cost_per_million: 1.20,
            input_cost_per_million_above_threshold: None,
            output_cost_per_million_above_threshold: None,
        },
    );

    PricingCatalog {
        models,
        aliases: default_aliases(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_non_text_model_families() {
        let raw = serde_json::json!({
            "dall-e-3": {"input_cost_per_token": 0.0, "mode": "image_generation"},
            "gpt-4o": {"input_cost_per_token": 0.0000025, "output_cost_per_token": 0.00001},
        })
        .to_string();

        let catalog = ingest(&raw).unwrap();
        assert!(!catalog.models.contains_key("dall-e-3"));
        assert!(catalog.models.contains_key("gpt-4o"));
    }

    #[test]
    fn coerces_string_numerics() {
        let raw = serde_json::json!({
            "some-model": {"input_cost_per_token": "0.000001", "output_cost_per_token": "0.000002"},
        })
        .to_string();

        let catalog = ingest(&raw).unwrap();
        let pricing = catalog.models.get("some-model").unwrap();
        assert!((pricing.input_cost_per_million - 1.0).abs() < 1e-9);
    }

    #[test]
    fn drops_entries_with_no_usable_pricing() {
        let raw = serde_json::json!({
            "mystery-model": {"mode": "chat"},
        })
        .to_string();

        let catalog = ingest(&raw).unwrap();
        assert!(catalog.models.is_empty());
    }
}
