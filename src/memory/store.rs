//! rusqlite-backed persistence for sessions, messages, file attachments,
//! and budgets, sharing the `ultra-mcp.db` connection with the Request
//! Tracker.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::MemoryError;
use super::pruning::{prune_files, prune_messages, split_budget};
use super::types::{
    BudgetLimitStatus, ConversationBudget, ConversationContext, ConversationFile,
    ConversationMessage, MessageRole, NewFile, Session, SessionList, SessionStatus,
    SessionSummary,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    name TEXT,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    last_message_at TEXT,
    metadata TEXT
);
CREATE TABLE IF NOT EXISTS conversation_messages (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    message_index INTEGER NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    tool_name TEXT,
    parent_message_id TEXT,
    timestamp TEXT NOT NULL,
    metadata TEXT,
    UNIQUE(session_id, message_index)
);
CREATE TABLE IF NOT EXISTS conversation_files (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    file_path TEXT NOT NULL,
    file_content TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    added_at TEXT NOT NULL,
    last_accessed_at TEXT NOT NULL,
    access_count INTEGER NOT NULL DEFAULT 1,
    is_relevant INTEGER NOT NULL DEFAULT 1,
    UNIQUE(session_id, content_hash)
);
CREATE TABLE IF NOT EXISTS conversation_budgets (
    session_id TEXT PRIMARY KEY REFERENCES sessions(id),
    max_tokens INTEGER,
    max_cost_usd REAL,
    max_duration_ms INTEGER,
    used_tokens INTEGER NOT NULL DEFAULT 0,
    used_cost_usd REAL NOT NULL DEFAULT 0.0,
    used_duration_ms INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_messages_session ON conversation_messages(session_id, message_index);
CREATE INDEX IF NOT EXISTS idx_files_session ON conversation_files(session_id, last_accessed_at);
";

pub struct ConversationStore {
    conn: Arc<Mutex<Connection>>,
}

impl ConversationStore {
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = db_path.as_ref().to_path_buf();
        let conn = tokio::task::spawn_blocking(move || -> Result<Connection, MemoryError> {
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
        .expect("memory schema init task panicked")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Connection) -> Result<Self, MemoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn get_or_create_session(
        &self,
        id: Option<Uuid>,
        name: Option<String>,
    ) -> Result<Session, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Session, MemoryError> {
            let conn = conn.blocking_lock();

            if let Some(id) = id {
                if let Some(session) = read_session(&conn, id)? {
                    return Ok(session);
                }
            }

            let id = id.unwrap_or_else(Uuid::new_v4);
            let now = Utc::now();
            conn.execute(
                "INSERT INTO sessions (id, name, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![id.to_string(), name, SessionStatus::Active.as_str(), now.to_rfc3339()],
            )?;

            Ok(Session {
                id,
                name,
                status: SessionStatus::Active,
                created_at: now,
                updated_at: now,
                last_message_at: None,
                metadata: None,
            })
        })
        .await
        .expect("get_or_create_session task panicked")
    }

    pub async fn add_message(
        &self,
        session_id: Uuid,
        role: MessageRole,
        content: String,
        tool_name: Option<String>,
        parent_message_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) -> Result<ConversationMessage, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<ConversationMessage, MemoryError> {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction()?;

            let next_index: i64 = tx.query_row(
                "SELECT COALESCE(MAX(message_index) + 1, 0) FROM conversation_messages WHERE session_id = ?1",
                params![session_id.to_string()],
                |row| row.get(0),
            )?;

            let id = Uuid::new_v4();
            let now = Utc::now();
            let metadata_json = metadata.as_ref().map(|v| v.to_string());
            let parent_str = parent_message_id.map(|p| p.to_string());

            tx.execute(
                "INSERT INTO conversation_messages
                    (id, session_id, message_index, role, content, tool_name, parent_message_id, timestamp, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    id.to_string(),
                    session_id.to_string(),
                    next_index,
                    role.as_str(),
                    content,
                    tool_name,
                    parent_str,
                    now.to_rfc3339(),
                    metadata_json,
                ],
            )?;

            tx.execute(
                "UPDATE sessions SET last_message_at = ?2, updated_at = ?2 WHERE id = ?1",
                params![session_id.to_string(), now.to_rfc3339()],
            )?;

            tx.commit()?;

            Ok(ConversationMessage {
                id,
                session_id,
                message_index: next_index,
                role,
                content,
                tool_name,
                parent_message_id,
                timestamp: now,
                metadata,
            })
        })
        .await
        .expect("add_message task panicked")
    }

    pub async fn add_files(
        &self,
        session_id: Uuid,
        files: Vec<NewFile>,
    ) -> Result<Vec<ConversationFile>, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<Vec<ConversationFile>, MemoryError> {
            let mut conn = conn.blocking_lock();
            let tx = conn.transaction()?;
            let mut result = Vec::with_capacity(files.len());

            for file in files {
                let hash = hex_sha256(&file.content);
                let now = Utc::now();

                let existing: Option<(String, i64)> = tx
                    .query_row(
                        "SELECT id, access_count FROM conversation_files
                         WHERE session_id = ?1 AND content_hash = ?2",
                        params![session_id.to_string(), hash],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .optional()?;

                if let Some((existing_id, access_count)) = existing {
                    tx.execute(
                        "UPDATE conversation_files
                         SET access_count = ?2, last_accessed_at = ?3
                         WHERE id = ?1",
                        params![existing_id, access_count + 1, now.to_rfc3339()],
                    )?;
                    let record = tx.query_row(
                        "SELECT id, session_id, file_path, file_content, content_hash,
                                added_at, last_accessed_at, access_count, is_relevant
                         FROM conversation_files WHERE id = ?1",
                        params![existing_id],
                        row_to_file,
                    )?;
                    result.push(record);
                } else {
                    let id = Uuid::new_v4();
                    tx.execute(
                        "INSERT INTO conversation_files
                            (id, session_id, file_path, file_content, content_hash,
                             added_at, last_accessed_at, access_count, is_relevant)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6, 1, 1)",
                        params![
                            id.to_string(),
                            session_id.to_string(),
                            file.path,
                            file.content,
                            hash,
                            now.to_rfc3339(),
                        ],
                    )?;
                    result.push(ConversationFile {
                        id,
                        session_id,
                        file_path: file.path,
                        file_content: file.content,
                        content_hash: hash,
                        added_at: now,
                        last_accessed_at: now,
                        access_count: 1,
                        is_relevant: true,
                    });
                }
            }

            tx.commit()?;
            Ok(result)
        })
        .await
        .expect("add_files task panicked")
    }

    pub async fn get_conversation_context(
        &self,
        session_id: Uuid,
        max_tokens: Option<u64>,
        include_files: bool,
        model: String,
    ) -> Result<ConversationContext, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<ConversationContext, MemoryError> {
            let conn = conn.blocking_lock();

            let mut stmt = conn.prepare(
                "SELECT id, session_id, message_index, role, content, tool_name,
                        parent_message_id, timestamp, metadata
                 FROM conversation_messages WHERE session_id = ?1 ORDER BY message_index ASC",
            )?;
            let messages: Vec<ConversationMessage> = stmt
                .query_map(params![session_id.to_string()], row_to_message)?
                .collect::<Result<Vec<_>, _>>()?;

            let files: Vec<ConversationFile> = if include_files {
                let mut stmt = conn.prepare(
                    "SELECT id, session_id, file_path, file_content, content_hash,
                            added_at, last_accessed_at, access_count, is_relevant
                     FROM conversation_files WHERE session_id = ?1 AND is_relevant = 1
                     ORDER BY last_accessed_at DESC",
                )?;
                stmt.query_map(params![session_id.to_string()], row_to_file)?
                    .collect::<Result<Vec<_>, _>>()?
            } else {
                Vec::new()
            };

            match max_tokens {
                None => {
                    let message_refs: Vec<&ConversationMessage> = messages.iter().collect();
                    let total_tokens = super::tokenizer::count_message_tokens(&model, &message_refs)
                        + files
                            .iter()
                            .map(|f| super::tokenizer::count_tokens(&model, &f.file_content))
                            .sum::<u64>();
                    Ok(ConversationContext {
                        messages,
                        files,
                        total_tokens,
                        truncated: false,
                    })
                }
                Some(budget) => {
                    let (message_budget, file_budget) = split_budget(budget);
                    let (admitted_messages, message_tokens) =
                        prune_messages(&model, &messages, message_budget);
                    let (admitted_files, file_tokens) = if include_files {
                        prune_files(&model, &files, file_budget)
                    } else {
                        (Vec::new(), 0)
                    };
                    let truncated =
                        admitted_messages.len() < messages.len() || admitted_files.len() < files.len();
                    Ok(ConversationContext {
                        messages: admitted_messages,
                        files: admitted_files,
                        total_tokens: message_tokens + file_tokens,
                        truncated,
                    })
                }
            }
        })
        .await
        .expect("get_conversation_context task panicked")
    }

    pub async fn set_budget(
        &self,
        session_id: Uuid,
        max_tokens: Option<i64>,
        max_cost_usd: Option<f64>,
        max_duration_ms: Option<i64>,
    ) -> Result<ConversationBudget, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<ConversationBudget, MemoryError> {
            let conn = conn.blocking_lock();
            conn.execute(
                "INSERT INTO conversation_budgets (session_id, max_tokens, max_cost_usd, max_duration_ms)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(session_id) DO UPDATE SET
                    max_tokens = excluded.max_tokens,
                    max_cost_usd = excluded.max_cost_usd,
                    max_duration_ms = excluded.max_duration_ms",
                params![session_id.to_string(), max_tokens, max_cost_usd, max_duration_ms],
            )?;
            read_budget(&conn, session_id)?.ok_or(MemoryError::SessionNotFound(session_id))
        })
        .await
        .expect("set_budget task panicked")
    }

    /// Best-effort: logs and swallows any database error per the
    /// advisory budget-tracking contract.
    pub async fn update_budget_usage(
        &self,
        session_id: Uuid,
        delta_tokens: i64,
        delta_cost_usd: f64,
        delta_duration_ms: i64,
    ) {
        let conn = self.conn.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<(), rusqlite::Error> {
            let conn = conn.blocking_lock();
            conn.execute(
                "UPDATE conversation_budgets
                 SET used_tokens = used_tokens + ?2,
                     used_cost_usd = used_cost_usd + ?3,
                     used_duration_ms = used_duration_ms + ?4
                 WHERE session_id = ?1",
                params![session_id.to_string(), delta_tokens, delta_cost_usd, delta_duration_ms],
            )?;
            Ok(())
        })
        .await;

        match result {
            Ok(Err(err)) => tracing::warn!("updateBudgetUsage failed for session {session_id}: {err}"),
            Err(join_err) => tracing::warn!("updateBudgetUsage task panicked for session {session_id}: {join_err}"),
            Ok(Ok(())) => {}
        }
    }

    pub async fn check_budget_limits(
        &self,
        session_id: Uuid,
    ) -> Result<BudgetLimitStatus, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<BudgetLimitStatus, MemoryError> {
            let conn = conn.blocking_lock();
            let budget = read_budget(&conn, session_id)?;

            let Some(budget) = budget else {
                return Ok(BudgetLimitStatus {
                    within_tokens: true,
                    within_cost: true,
                    within_duration: true,
                    within_limits: true,
                });
            };

            let within_tokens = budget
                .max_tokens
                .map(|max| budget.used_tokens <= max)
                .unwrap_or(true);
            let within_cost = budget
                .max_cost_usd
                .map(|max| budget.used_cost_usd <= max)
                .unwrap_or(true);
            let within_duration = budget
                .max_duration_ms
                .map(|max| budget.used_duration_ms <= max)
                .unwrap_or(true);

            Ok(BudgetLimitStatus {
                within_tokens,
                within_cost,
                within_duration,
                within_limits: within_tokens && within_cost && within_duration,
            })
        })
        .await
        .expect("check_budget_limits task panicked")
    }

    pub async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
    ) -> Result<(), MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<(), MemoryError> {
            let conn = conn.blocking_lock();
            let updated = conn.execute(
                "UPDATE sessions SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![session_id.to_string(), status.as_str(), Utc::now().to_rfc3339()],
            )?;
            if updated == 0 {
                return Err(MemoryError::SessionNotFound(session_id));
            }
            Ok(())
        })
        .await
        .expect("update_session_status task panicked")
    }

    pub async fn list_sessions(
        &self,
        status: Option<SessionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<SessionList, MemoryError> {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || -> Result<SessionList, MemoryError> {
            let conn = conn.blocking_lock();
            let status_filter = status.map(|s| s.as_str().to_string());

            let query = "
                SELECT s.id, s.name, s.status, s.last_message_at,
                       COALESCE(m.message_count, 0),
                       COALESCE(f.file_count, 0),
                       COALESCE(b.used_tokens, 0),
                       COALESCE(b.used_cost_usd, 0.0)
                FROM sessions s
                LEFT JOIN (SELECT session_id, COUNT(*) AS message_count FROM conversation_messages GROUP BY session_id) m
                    ON m.session_id = s.id
                LEFT JOIN (SELECT session_id, COUNT(*) AS file_count FROM conversation_files GROUP BY session_id) f
                    ON f.session_id = s.id
                LEFT JOIN conversation_budgets b ON b.session_id = s.id
                WHERE (?1 IS NULL OR s.status = ?1)
                ORDER BY s.updated_at DESC
                LIMIT ?2 OFFSET ?3";

            let mut stmt = conn.prepare(query)?;
            let sessions: Vec<SessionSummary> = stmt
                .query_map(params![status_filter, limit, offset], |row| {
                    let id: String = row.get(0)?;
                    let status: String = row.get(2)?;
                    let last_message_at: Option<String> = row.get(3)?;
                    Ok(SessionSummary {
                        id: id.parse().unwrap_or_default(),
                        name: row.get(1)?,
                        status: SessionStatus::from_str(&status),
                        message_count: row.get(4)?,
                        file_count: row.get(5)?,
                        total_tokens: row.get(6)?,
                        total_cost_usd: row.get(7)?,
                        last_message_at: last_message_at.and_then(|s| s.parse().ok()),
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;

            let total_count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sessions WHERE (?1 IS NULL OR status = ?1)",
                params![status.map(|s| s.as_str().to_string())],
                |row| row.get(0),
            )?;

            let has_more = offset + (sessions.len() as i64) < total_count;

            Ok(SessionList {
                sessions,
                total_count,
                has_more,
            })
        })
        .await
        .expect("list_sessions task panicked")
    }
}

fn read_session(conn: &Connection, id: Uuid) -> Result<Option<Session>, MemoryError> {
    conn.query_row(
        "SELECT id, name, status, created_at, updated_at, last_message_at, metadata
         FROM sessions WHERE id = ?1",
        params![id.to_string()],
        row_to_session,
    )
    .optional()
    .map_err(MemoryError::from)
}

fn read_budget(conn: &Connection, session_id: Uuid) -> Result<Option<ConversationBudget>, MemoryError> {
    conn.query_row(
        "SELECT session_id, max_tokens, max_cost_usd, max_duration_ms,
                used_tokens, used_cost_usd, used_duration_ms
         FROM conversation_budgets WHERE session_id = ?1",
        params![session_id.to_string()],
        row_to_budget,
    )
    .optional()
    .map_err(MemoryError::from)
}

fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
    let id: String = row.get(0)?;
    let status: String = row.get(2)?;
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;
    let last_message_at: Option<String> = row.get(5)?;
    let metadata: Option<String> = row.get(6)?;

    Ok(Session {
        id: id.parse().unwrap_or_default(),
        name: row.get(1)?,
        status: SessionStatus::from_str(&status),
        created_at: created_at.parse().unwrap_or_else(|_| Utc::now()),
        updated_at: updated_at.parse().unwrap_or_else(|_| Utc::now()),
        last_message_at: last_message_at.and_then(|s| s.parse().ok()),
        metadata: metadata.and_then(|s| serde_json::from_str(&s).ok()),
    })
}

fn row_to_message(row: &rusqlite::Row) -> rusqlite::Result<ConversationMessage> {
    let id: String = row.get(0)?;
    let session_id: String = row.get(1)?;
    let role: String = row.get(3)?;
    let parent: Option<String> = row.get(6)?;
    let timestamp: String = row.get(7)?;
    let metadata: Option<String> = row.get(8)?;

    Ok(ConversationMessage {
        id: id.parse().unwrap_or_default(),
        session_id: session_id.parse().unwrap_or_default(),
        message_index: row.get(2)?,
        role: MessageRole::from_str(&role),
        content: row.get(4)?,
        tool_name: row.get(5)?,
        parent_message_id: parent.and_then(|s| s.parse().ok()),
        timestamp: timestamp.parse().unwrap_or_else(|_| Utc::now()),
        metadata: metadata.and_then(|s| serde_json::from_str(&s).ok()),
    })
}

fn row_to_file(row: &rusqlite::Row) -> rusqlite::Result<ConversationFile> {
    let id: String = row.get(0)?;
    let session_id: String = row.get(1)?;
    let added_at: String = row.get(5)?;
    let last_accessed_at: String = row.get(6)?;

    Ok(ConversationFile {
        id: id.parse().unwrap_or_default(),
        session_id: session_id.parse().unwrap_or_default(),
        file_path: row.get(2)?,
        file_content: row.get(3)?,
        content_hash: row.get(4)?,
        added_at: added_at.parse().unwrap_or_else(|_| Utc::now()),
        last_accessed_at: last_accessed_at.parse().unwrap_or_else(|_| Utc::now()),
        access_count: row.get(7)?,
        is_relevant: row.get::<_, i64>(8)? != 0,
    })
}

fn row_to_budget(row: &rusqlite::Row) -> rusqlite::Result<ConversationBudget> {
    let session_id: String = row.get(0)?;
    Ok(ConversationBudget {
        session_id: session_id.parse().unwrap_or_default(),
        max_tokens: row.get(1)?,
        max_cost_usd: row.get(2)?,
        max_duration_ms: row.get(3)?,
        used_tokens: row.get(4)?,
        used_cost_usd: row.get(5)?,
        used_duration_ms: row.get(6)?,
    })
}

fn hex_sha256(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ConversationStore {
        ConversationStore::from_connection(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn get_or_create_session_creates_then_returns_same() {
        let store = store();
        let session = store.get_or_create_session(None, Some("demo".into())).await.unwrap();
        let again = store.get_or_create_session(Some(session.id), None).await.unwrap();
        assert_eq!(session.id, again.id);
        assert_eq!(again.name.as_deref(), Some("demo"));
    }

    #[tokio::test]
    async fn add_message_assigns_dense_monotonic_indices() {
        let store = store();
        let session = store.get_or_create_session(None, None).await.unwrap();

        let a = store
            .add_message(session.id, MessageRole::User, "a".into(), None, None, None)
            .await
            .unwrap();
        let b = store
            .add_message(session.id, MessageRole::Assistant, "b".into(), None, None, None)
            .await
            .unwrap();

        assert_eq!(a.message_index, 0);
        assert_eq!(b.message_index, 1);
    }

    #[tokio::test]
    async fn add_files_dedups_by_content_hash() {
        let store = store();
        let session = store.get_or_create_session(None, None).await.unwrap();

        let first = store
            .add_files(
                session.id,
                vec![NewFile { path: "a.txt".into(), content: "hello".into() }],
            )
            .await
            .unwrap();
        let second = store
            .add_files(
                session.id,
                vec![NewFile { path: "a-renamed.txt".into(), content: "hello".into() }],
            )
            .await
            .unwrap();

        assert_eq!(first[0].id, second[0].id);
        assert_eq!(second[0].access_count, 2);
    }

    #[tokio::test]
    async fn budget_usage_accumulates_and_limits_are_checked() {
        let store = store();
        let session = store.get_or_create_session(None, None).await.unwrap();
        store.set_budget(session.id, Some(100), None, None).await.unwrap();

        store.update_budget_usage(session.id, 40, 0.1, 500).await;
        store.update_budget_usage(session.id, 40, 0.1, 500).await;

        let status = store.check_budget_limits(session.id).await.unwrap();
        assert!(status.within_limits);

        store.update_budget_usage(session.id, 100, 0.0, 0).await;
        let status = store.check_budget_limits(session.id).await.unwrap();
        assert!(!status.within_tokens);
        assert!(!status.within_limits);
    }

    #[tokio::test]
    async fn update_budget_usage_is_noop_without_budget() {
        let store = store();
        let session = store.get_or_create_session(None, None).await.unwrap();
        // No budget row exists; this must not panic or error.
        store.update_budget_usage(session.id, 10, 0.01, 10).await;
        let status = store.check_budget_limits(session.id).await.unwrap();
        assert!(status.within_limits);
    }

    #[tokio::test]
    async fn get_conversation_context_prunes_when_over_budget() {
        let store = store();
        let session = store.get_or_create_session(None, None).await.unwrap();
        for i in 0..10 {
            store
                .add_message(session.id, MessageRole::User, format!("message number {i} has some words"), None, None, None)
                .await
                .unwrap();
        }

        let full = store
            .get_conversation_context(session.id, None, false, "gpt-4o".into())
            .await
            .unwrap();
        assert!(!full.truncated);
        assert_eq!(full.messages.len(), 10);

        let pruned = store
            .get_conversation_context(session.id, Some(20), false, "gpt-4o".into())
            .await
            .unwrap();
        assert!(pruned.truncated);
        assert!(pruned.messages.len() < 10);
    }

    #[tokio::test]
    async fn list_sessions_paginates() {
        let store = store();
        for i in 0..3 {
            store.get_or_create_session(None, Some(format!("s{i}"))).await.unwrap();
        }

        let page = store.list_sessions(None, 2, 0).await.unwrap();
        assert_eq!(page.sessions.len(), 2);
        assert_eq!(page.total_count, 3);
        assert!(page.has_more);
    }
}
