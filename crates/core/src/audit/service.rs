//! Audit trail service

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;
use workledger_common::time::clock::{Clock, SystemClock};
use workledger_domain::{AuditEntry, Result, TimerAction};

use super::ports::AuditStore;

/// Append-only audit trail over timer actions
///
/// Writes are advisory: `record` returns `()` rather than a `Result`
/// because a failed append must never abort the timer operation that
/// triggered it. The failure is logged and discarded here, at the
/// boundary where it occurs.
pub struct AuditTrail {
    store: Arc<dyn AuditStore>,
    clock: Arc<dyn Clock>,
}

impl AuditTrail {
    /// Create a new audit trail
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store, clock: Arc::new(SystemClock) }
    }

    /// Replace the wall clock
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Append one action, best-effort
    pub async fn record(
        &self,
        user_id: &str,
        record_id: Option<&str>,
        action: TimerAction,
        metadata: serde_json::Value,
    ) {
        let entry = AuditEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            record_id: record_id.map(ToString::to_string),
            action,
            metadata,
            timestamp: self.clock.now(),
        };

        if let Err(err) = self.store.append(entry).await {
            warn!(user_id = %user_id, action = %action, error = %err, "Failed to append audit entry");
        }
    }

    /// Most recent entries for a user, newest first
    pub async fn recent_for_user(&self, user_id: &str, limit: usize) -> Result<Vec<AuditEntry>> {
        self.store.find_by_user(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryAuditStore;

    #[tokio::test]
    async fn test_record_appends_entry() {
        let store = Arc::new(InMemoryAuditStore::new());
        let trail = AuditTrail::new(Arc::clone(&store) as Arc<dyn AuditStore>);

        trail
            .record("user-1", Some("rec-1"), TimerAction::Started, serde_json::json!({"p": 1}))
            .await;

        let entries = trail.recent_for_user("user-1", 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, TimerAction::Started);
        assert_eq!(entries[0].record_id.as_deref(), Some("rec-1"));
    }

    #[tokio::test]
    async fn test_record_swallows_store_failure() {
        let store = Arc::new(InMemoryAuditStore::new());
        store.set_failing(true);
        let trail = AuditTrail::new(Arc::clone(&store) as Arc<dyn AuditStore>);

        // Must not panic or surface the failure.
        trail.record("user-1", None, TimerAction::Stopped, serde_json::Value::Null).await;

        store.set_failing(false);
        assert!(trail.recent_for_user("user-1", 10).await.unwrap().is_empty());
    }
}
