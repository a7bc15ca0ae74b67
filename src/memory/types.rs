//! Types for the Conversation Memory store: sessions, messages, file
//! attachments, and per-session budgets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Archived,
    Deleted,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Deleted => "deleted",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "archived" => Self::Archived,
            "deleted" => Self::Deleted,
            _ => Self::Active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Tool => "tool",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "assistant" => Self::Assistant,
            "system" => Self::System,
            "tool" => Self::Tool,
            _ => Self::User,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub name: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub session_id: Uuid,
    pub message_index: i64,
    pub role: MessageRole,
    pub content: String,
    pub tool_name: Option<String>,
    pub parent_message_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationFile {
    pub id: Uuid,
    pub session_id: Uuid,
    pub file_path: String,
    pub file_content: String,
    pub content_hash: String,
    pub added_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: i64,
    pub is_relevant: bool,
}

/// A `(path, content)` pair submitted to `addFiles`.
pub struct NewFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationBudget {
    pub session_id: Uuid,
    pub max_tokens: Option<i64>,
    pub max_cost_usd: Option<f64>,
    pub max_duration_ms: Option<i64>,
    pub used_tokens: i64,
    pub used_cost_usd: f64,
    pub used_duration_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLimitStatus {
    pub within_tokens: bool,
    pub within_cost: bool,
    pub within_duration: bool,
    pub within_limits: bool,
}

/// Result of `getConversationContext`: the (possibly pruned) view of a
/// session's messages and files, plus whether pruning actually ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationContext {
    pub messages: Vec<ConversationMessage>,
    pub files: Vec<ConversationFile>,
    pub total_tokens: u64,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub status: SessionStatus,
    pub message_count: i64,
    pub file_count: i64,
    pub total_tokens: i64,
    pub total_cost_usd: f64,
    pub last_message_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionList {
    pub sessions: Vec<SessionSummary>,
    pub total_count: i64,
    pub has_more: bool,
}
