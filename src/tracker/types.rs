//! Request Tracker data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Success,
    Error,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn from_str(value: &str) -> Self {
        match value {
            "success" => Self::Success,
            "error" => Self::Error,
            _ => Self::Pending,
        }
    }
}

/// A single write-once-append record of one provider request's lifecycle.
/// Moves from `Pending` to exactly one of `Success`/`Error`; nothing
/// re-opens a terminal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub provider: String,
    pub model: String,
    pub tool_name: Option<String>,
    pub status: RequestStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<i64>,
    /// Sanitized snapshot of the inbound request (JSON), recorded at `start`
    /// so a failed or canceled request still leaves a reproducible trace.
    pub request_payload: Option<String>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub total_tokens: Option<i64>,
    pub cost_dollars: Option<f64>,
    pub finish_reason: Option<String>,
    /// Snapshot of the generated response, recorded on success only.
    pub response_payload: Option<String>,
    pub error_message: Option<String>,
}

/// Aggregate counters used by the `db:stats` CLI command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerStats {
    pub total_requests: i64,
    pub successful_requests: i64,
    pub failed_requests: i64,
    pub total_cost_dollars: f64,
    pub total_input_tokens: i64,
    pub total_output_tokens: i64,
}
