//! Pricing data types and the LiteLLM-style ingest record.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Token count above which some models bill input/output at a different
/// (typically higher) per-token rate.
pub const TIERED_PRICING_THRESHOLD: u64 = 200_000;

/// Resolved pricing for one model, in dollars per 1M tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPricing {
    pub input_cost_per_million: f64,
    pub output_cost_per_million: f64,
    /// Rate applied to the portion of input tokens beyond
    /// [`TIERED_PRICING_THRESHOLD`], if this model has a long-context tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_cost_per_million_above_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_cost_per_million_above_threshold: Option<f64>,
}

/// Dollar cost of one request, split by input/output and flagged for
/// whether the long-context tier actually applied to either side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub tiered_applied: bool,
}

impl ModelPricing {
    /// Cost breakdown for a request with the given token counts, applying
    /// the long-context tier only to tokens strictly beyond the threshold
    /// (a request landing exactly on the threshold is billed entirely at
    /// the base rate).
    pub fn cost_breakdown(&self, input_tokens: u64, output_tokens: u64) -> CostBreakdown {
        let (input_cost, input_tiered) = self.tiered_cost(
            input_tokens,
            self.input_cost_per_million,
            self.input_cost_per_million_above_threshold,
        );
        let (output_cost, output_tiered) = self.tiered_cost(
            output_tokens,
            self.output_cost_per_million,
            self.output_cost_per_million_above_threshold,
        );
        CostBreakdown {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
            tiered_applied: input_tiered || output_tiered,
        }
    }

    fn tiered_cost(&self, tokens: u64, base_rate: f64, above_rate: Option<f64>) -> (f64, bool) {
        match above_rate {
            Some(above_rate) if tokens > TIERED_PRICING_THRESHOLD => {
                let base_tokens = TIERED_PRICING_THRESHOLD;
                let extra_tokens = tokens - TIERED_PRICING_THRESHOLD;
                (
                    (base_tokens as f64 * base_rate + extra_tokens as f64 * above_rate) / 1_000_000.0,
                    true,
                )
            }
            _ => (tokens as f64 * base_rate / 1_000_000.0, false),
        }
    }
}

/// The full catalog: model name (as published by the upstream pricing
/// document) to resolved pricing, plus an alias table mapping alternate
/// spellings callers might pass in to the canonical key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingCatalog {
    pub models: HashMap<String, ModelPricing>,
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

impl PricingCatalog {
    /// Resolve a caller-supplied model name to pricing, trying an exact
    /// match, then the alias table, then a case-insensitive substring
    /// fallback against every known model name.
    pub fn pricing_for_model(&self, model: &str) -> Option<&ModelPricing> {
        if let Some(pricing) = self.models.get(model) {
            return Some(pricing);
        }
        if let Some(canonical) = self.aliases.get(model) {
            if let Some(pricing) = self.models.get(canonical) {
                return Some(pricing);
            }
        }
        let needle = model.to_lowercase();
        self.models
            .iter()
            .find(|(name, _)| name.to_lowercase().contains(&needle) || needle.contains(&name.to_lowercase()))
            .map(|(_, pricing)| pricing)
    }
}

/// Format a dollar cost the way the specification's output tables expect:
/// 6 decimal places under a cent, 4 under a dollar, otherwise 2.
pub fn format_cost(dollars: f64) -> String {
    if dollars < 0.01 {
        format!("${dollars:.6}")
    } else if dollars < 1.0 {
        format!("${dollars:.4}")
    } else {
        format!("${dollars:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pricing() -> ModelPricing {
        ModelPricing {
            input_cost_per_million: 1.0,
            output_cost_per_million: 2.0,
            input_cost_per_million_above_threshold: Some(0.5),
            output_cost_per_million_above_threshold: Some(1.0),
        }
    }

    #[test]
    fn exact_threshold_uses_base_rate_only() {
        let p = pricing();
        let expected = TIERED_PRICING_THRESHOLD as f64 * 1.0 / 1_000_000.0;
        let breakdown = p.cost_breakdown(TIERED_PRICING_THRESHOLD, 0);
        assert!((breakdown.total_cost - expected).abs() < 1e-9);
        assert!(!breakdown.tiered_applied);
    }

    #[test]
    fn above_threshold_splits_rates() {
        let p = pricing();
        let extra = 1_000u64;
        let expected = (TIERED_PRICING_THRESHOLD as f64 * 1.0 + extra as f64 * 0.5) / 1_000_000.0;
        let breakdown = p.cost_breakdown(TIERED_PRICING_THRESHOLD + extra, 0);
        assert!((breakdown.total_cost - expected).abs() < 1e-9);
        assert!(breakdown.tiered_applied);
    }

    #[test]
    fn format_cost_picks_precision_by_magnitude() {
        assert_eq!(format_cost(0.0000034), "$0.000003");
        assert_eq!(format_cost(0.1234), "$0.1234");
        assert_eq!(format_cost(12.3), "$12.30");
    }

    #[test]
    fn substring_fallback_matches_unversioned_name() {
        let mut catalog = PricingCatalog::default();
        catalog.models.insert("openai/gpt-4o-2024-08-06".to_string(), pricing());
        assert!(catalog.pricing_for_model("gpt-4o").is_some());
    }
}
