//! Pricing Service: a two-layer cache over a LiteLLM-style cost catalog,
//! used to attach a dollar cost to every completed request.

mod cache;
mod catalog;
mod error;
mod types;

pub use cache::PricingService;
pub use error::PricingError;
pub use types::{format_cost, CostBreakdown, ModelPricing, PricingCatalog, TIERED_PRICING_THRESHOLD};
