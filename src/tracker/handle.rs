//! Scoped, defer-style completion for a request record: realizes the
//! "callback `onFinish`" redesign note as an RAII guard instead. Callers
//! call `succeed`/`fail` explicitly; if the handle is dropped without
//! either, it fails the record as canceled on a best-effort basis.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use super::store::RequestTracker;

pub struct TrackingHandle {
    tracker: Arc<RequestTracker>,
    id: Uuid,
    finished: AtomicBool,
}

impl TrackingHandle {
    pub fn new(tracker: Arc<RequestTracker>, id: Uuid) -> Self {
        Self {
            tracker,
            id,
            finished: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn succeed(
        self,
        input_tokens: i64,
        output_tokens: i64,
        total_tokens: i64,
        cost_dollars: f64,
        finish_reason: Option<String>,
        response_payload: Option<String>,
    ) {
        self.finished.store(true, Ordering::SeqCst);
        let _ = self
            .tracker
            .complete(self.id, input_tokens, output_tokens, total_tokens, cost_dollars, finish_reason, response_payload)
            .await;
    }

    pub async fn fail(self, message: &str) {
        self.finished.store(true, Ordering::SeqCst);
        let _ = self.tracker.fail(self.id, message).await;
    }
}

impl Drop for TrackingHandle {
    fn drop(&mut self) {
        if self.finished.load(Ordering::SeqCst) {
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let tracker = self.tracker.clone();
            let id = self.id;
            handle.spawn(async move {
                let _ = tracker.fail(id, "canceled").await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[tokio::test]
    async fn drop_without_completion_marks_canceled() {
        let tracker = Arc::new(RequestTracker::from_connection(Connection::open_in_memory().unwrap()).unwrap());
        let id = tracker.start("openai", "gpt-4o", None, None).await.unwrap();
        {
            let _handle = TrackingHandle::new(tracker.clone(), id);
        }
        tokio::task::yield_now().await;

        let record = tracker.get(id).await.unwrap().unwrap();
        assert_eq!(record.error_message.as_deref(), Some("canceled"));
    }

    #[tokio::test]
    async fn explicit_succeed_skips_drop_cancellation() {
        let tracker = Arc::new(RequestTracker::from_connection(Connection::open_in_memory().unwrap()).unwrap());
        let id = tracker.start("openai", "gpt-4o", None, None).await.unwrap();
        let handle = TrackingHandle::new(tracker.clone(), id);
        handle.succeed(10, 10, 20, 0.01, Some("stop".to_string()), None).await;

        let record = tracker.get(id).await.unwrap().unwrap();
        assert!(record.error_message.is_none());
    }
}
