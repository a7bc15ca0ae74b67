//! rusqlite-backed persistence for request records, sharing the
//! `ultra-mcp.db` connection with the Conversation Memory store.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::TrackerError;
use super::types::{RequestRecord, RequestStatus, TrackerStats};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS request_records (
    id TEXT PRIMARY KEY,
    provider TEXT NOT NULL,
    model TEXT NOT NULL,
    tool_name TEXT,
    status TEXT NOT NULL,
    started_at TEXT NOT NULL,
    completed_at TEXT,
    duration_ms INTEGER,
    request_payload TEXT,
    input_tokens INTEGER,
    output_tokens INTEGER,
    total_tokens INTEGER,
    cost_dollars REAL,
    finish_reason TEXT,
    response_payload TEXT,
    error_message TEXT
);
CREATE INDEX IF NOT EXISTS idx_request_records_started_at ON request_records(started_at);
CREATE INDEX IF NOT EXISTS idx_request_records_status ON request_records(status);
";

pub struct RequestTracker {
    conn: Arc<Mutex<Connection>>,
}

impl RequestTracker {
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self, TrackerError> {
        let path = db_path.as_ref().to_path_buf();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, TrackerError> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            let conn = Connection::open(path)?;
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.execute_batch(SCHEMA)?;
            Ok(conn)
        })
        .await
        .expect("tracker schema init task panicked")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Connection) -> Result<Self, TrackerError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert a new `pending` record, returning its id. `request_payload`
    /// is a sanitized snapshot (no credentials ever flow through
    /// `GenerateRequest`, so the caller's JSON encoding is safe to store
    /// as-is) taken before the provider call so a canceled or failed
    /// request still leaves a reproducible trace.
    pub async fn start(
        &self,
        provider: &str,
        model: &str,
        tool_name: Option<&str>,
        request_payload: Option<&str>,
    ) -> Result<Uuid, TrackerError> {
        let id = Uuid::new_v4();
        let provider = provider.to_string();
        let model = model.to_string();
        let tool_name = tool_name.map(|s| s.to_string());
        let request_payload = request_payload.map(|s| s.to_string());
        let started_at = Utc::now();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || -> Result<(), TrackerError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO request_records (id, provider, model, tool_name, status, started_at, request_payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id.to_string(),
                    provider,
                    model,
                    tool_name,
                    RequestStatus::Pending.as_str(),
                    started_at.to_rfc3339(),
                    request_payload,
                ],
            )?;
            Ok(())
        })
        .await
        .expect("tracker insert task panicked")?;

        Ok(id)
    }

    /// Complete a pending record as `success`. Cost resolution happens
    /// exactly once, by the caller, before this is called; a pricing
    /// lookup failure is the caller's problem to fall back to `0.0` for,
    /// not this store's — the record still completes successfully either
    /// way.
    #[allow(clippy::too_many_arguments)]
    pub async fn complete(
        &self,
        id: Uuid,
        input_tokens: i64,
        output_tokens: i64,
        total_tokens: i64,
        cost_dollars: f64,
        finish_reason: Option<String>,
        response_payload: Option<String>,
    ) -> Result<(), TrackerError> {
        self.finish(
            id,
            RequestStatus::Success,
            Some(input_tokens),
            Some(output_tokens),
            Some(total_tokens),
            Some(cost_dollars),
            finish_reason,
            response_payload,
            None,
        )
        .await
    }

    /// Complete a pending record as `error`.
    pub async fn fail(&self, id: Uuid, error_message: &str) -> Result<(), TrackerError> {
        self.finish(id, RequestStatus::Error, None, None, None, None, None, None, Some(error_message.to_string()))
            .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        id: Uuid,
        status: RequestStatus,
        input_tokens: Option<i64>,
        output_tokens: Option<i64>,
        total_tokens: Option<i64>,
        cost_dollars: Option<f64>,
        finish_reason: Option<String>,
        response_payload: Option<String>,
        error_message: Option<String>,
    ) -> Result<(), TrackerError> {
        let conn = self.conn.clone();
        let completed_at = Utc::now();

        tokio::task::spawn_blocking(move || -> Result<(), TrackerError> {
            let conn = conn.blocking_lock();
            let started_at: Option<String> = conn
                .query_row(
                    "SELECT started_at FROM request_records WHERE id = ?1 AND status = 'pending'",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(started_at) = started_at else {
                return Err(TrackerError::NotFound(id));
            };
            let started_at: DateTime<Utc> = started_at
                .parse()
                .unwrap_or(completed_at);
            let duration_ms = (completed_at - started_at).num_milliseconds();

            conn.execute(
                "UPDATE request_records
                 SET status = ?2, completed_at = ?3, duration_ms = ?4,
                     input_tokens = ?5, output_tokens = ?6, total_tokens = ?7, cost_dollars = ?8,
                     finish_reason = ?9, response_payload = ?10, error_message = ?11
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    status.as_str(),
                    completed_at.to_rfc3339(),
                    duration_ms,
                    input_tokens,
                    output_tokens,
                    total_tokens,
                    cost_dollars,
                    finish_reason,
                    response_payload,
                    error_message,
                ],
            )?;
            Ok(())
        })
        .await
        .expect("tracker update task panicked")?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<RequestRecord>, TrackerError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Option<RequestRecord>, TrackerError> {
            let conn = conn.blocking_lock();
            conn.query_row(
                "SELECT id, provider, model, tool_name, status, started_at, completed_at,
                        duration_ms, request_payload, input_tokens, output_tokens, total_tokens,
                        cost_dollars, finish_reason, response_payload, error_message
                 FROM request_records WHERE id = ?1",
                params![id.to_string()],
                row_to_record,
            )
            .optional()
            .map_err(TrackerError::from)
        })
        .await
        .expect("tracker get task panicked")
    }

    pub async fn recent(&self, limit: i64) -> Result<Vec<RequestRecord>, TrackerError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<RequestRecord>, TrackerError> {
            let conn = conn.blocking_lock();
            let mut stmt = conn.prepare(
                "SELECT id, provider, model, tool_name, status, started_at, completed_at,
                        duration_ms, request_payload, input_tokens, output_tokens, total_tokens,
                        cost_dollars, finish_reason, response_payload, error_message
                 FROM request_records ORDER BY started_at DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], row_to_record)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .expect("tracker recent task panicked")
    }

    pub async fn stats(&self) -> Result<TrackerStats, TrackerError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<TrackerStats, TrackerError> {
            let conn = conn.blocking_lock();
            conn.query_row(
                "SELECT
                    COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN status = 'error' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(cost_dollars), 0.0),
                    COALESCE(SUM(input_tokens), 0),
                    COALESCE(SUM(output_tokens), 0)
                 FROM request_records",
                [],
                |row| {
                    Ok(TrackerStats {
                        total_requests: row.get(0)?,
                        successful_requests: row.get(1)?,
                        failed_requests: row.get(2)?,
                        total_cost_dollars: row.get(3)?,
                        total_input_tokens: row.get(4)?,
                        total_output_tokens: row.get(5)?,
                    })
                },
            )
            .map_err(TrackerError::from)
        })
        .await
        .expect("tracker stats task panicked")
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<RequestRecord> {
    let id: String = row.get(0)?;
    let status: String = row.get(4)?;
    let started_at: String = row.get(5)?;
    let completed_at: Option<String> = row.get(6)?;

    Ok(RequestRecord {
        id: id.parse().unwrap_or_default(),
        provider: row.get(1)?,
        model: row.get(2)?,
        tool_name: row.get(3)?,
        status: RequestStatus::from_str(&status),
        started_at: started_at.parse().unwrap_or_else(|_| Utc::now()),
        completed_at: completed_at.and_then(|s| s.parse().ok()),
        duration_ms: row.get(7)?,
        request_payload: row.get(8)?,
        input_tokens: row.get(9)?,
        output_tokens: row.get(10)?,
        total_tokens: row.get(11)?,
        cost_dollars: row.get(12)?,
        finish_reason: row.get(13)?,
        response_payload: row.get(14)?,
        error_message: row.get(15)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> RequestTracker {
        RequestTracker::from_connection(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn start_then_complete_round_trips() {
        let tracker = tracker();
        let id = tracker
            .start("openai", "gpt-4o", Some("generate"), Some("{\"prompt\":\"hi\"}"))
            .await
            .unwrap();
        tracker
            .complete(id, 100, 50, 150, 0.002, Some("stop".to_string()), Some("hello back".to_string()))
            .await
            .unwrap();

        let record = tracker.get(id).await.unwrap().unwrap();
        assert_eq!(record.status, RequestStatus::Success);
        assert_eq!(record.input_tokens, Some(100));
        assert_eq!(record.total_tokens, Some(150));
        assert_eq!(record.finish_reason.as_deref(), Some("stop"));
        assert_eq!(record.response_payload.as_deref(), Some("hello back"));
        assert_eq!(record.request_payload.as_deref(), Some("{\"prompt\":\"hi\"}"));
        assert!(record.duration_ms.unwrap() >= 0);
    }

    #[tokio::test]
    async fn start_then_fail_records_error_message() {
        let tracker = tracker();
        let id = tracker.start("azure", "gpt-4o", None, None).await.unwrap();
        tracker.fail(id, "upstream 500").await.unwrap();

        let record = tracker.get(id).await.unwrap().unwrap();
        assert_eq!(record.status, RequestStatus::Error);
        assert_eq!(record.error_message.as_deref(), Some("upstream 500"));
    }

    #[tokio::test]
    async fn completing_twice_is_rejected() {
        let tracker = tracker();
        let id = tracker.start("openai", "gpt-4o", None, None).await.unwrap();
        tracker.complete(id, 1, 1, 2, 0.0, None, None).await.unwrap();

        let err = tracker.complete(id, 1, 1, 2, 0.0, None, None).await.unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }

    #[tokio::test]
    async fn stats_aggregate_across_records() {
        let tracker = tracker();
        let a = tracker.start("openai", "gpt-4o", None, None).await.unwrap();
        tracker.complete(a, 10, 10, 20, 0.01, Some("stop".to_string()), None).await.unwrap();
        let b = tracker.start("openai", "gpt-4o", None, None).await.unwrap();
        tracker.fail(b, "boom").await.unwrap();

        let stats = tracker.stats().await.unwrap();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 1);
    }
}
