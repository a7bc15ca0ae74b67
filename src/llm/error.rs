//! Provider error kinds, matching the error-handling table: configuration
//! gaps, upstream HTTP failures, transport failures, and parse failures on
//! individual streamed fragments (which callers are expected to skip rather
//! than propagate).

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider {provider} is not configured (missing API key)")]
    ConfigurationMissing { provider: String },

    #[error("unknown provider {0:?}")]
    UnknownProvider(String),

    #[error("upstream {provider} returned HTTP {status}: {body}")]
    UpstreamError {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("transport error calling {provider}: {source}")]
    TransportError {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not parse streamed fragment from {provider}: {fragment}")]
    ParseError { provider: String, fragment: String },

    #[error("request canceled")]
    Cancelled,
}

/// Classification used by adapters to decide what to log at which level;
/// no retries are attempted at the adapter layer, upstream failures are
/// surfaced to the caller as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Caller misconfiguration, not an upstream failure.
    Configuration,
    /// The upstream rejected the request or failed.
    Upstream,
    /// Couldn't reach the upstream at all.
    Transport,
}

pub fn classify_http_status(status: u16) -> ErrorSeverity {
    match status {
        400..=499 => ErrorSeverity::Configuration,
        _ => ErrorSeverity::Upstream,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_classification() {
        assert_eq!(classify_http_status(401), ErrorSeverity::Configuration);
        assert_eq!(classify_http_status(404), ErrorSeverity::Configuration);
        assert_eq!(classify_http_status(500), ErrorSeverity::Upstream);
        assert_eq!(classify_http_status(503), ErrorSeverity::Upstream);
    }

    #[test]
    fn error_messages_include_provider_context() {
        let err = ProviderError::ConfigurationMissing {
            provider: "openai".to_string(),
        };
        assert!(err.to_string().contains("openai"));
    }
}
