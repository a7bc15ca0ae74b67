//! Crate-level error type composing every module's own error enum.

use crate::config::ConfigError;
use crate::llm::ProviderError;
use crate::memory::MemoryError;
use crate::pricing::PricingError;
use crate::tracker::TrackerError;

/// Top-level error surfaced to MCP tool handlers and the CLI.
///
/// Each variant wraps a module-local error so callers that care about detail
/// can still match on it via `source()`, while callers that only want the
/// outer kind (matching the table in the specification's error-handling
/// section) can match on this enum directly.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("request canceled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, GatewayError>;
