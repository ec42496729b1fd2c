//! Deterministic in-memory adapters for the core ports
//!
//! Each adapter guards its rows with a single mutex and applies closed
//! update payloads entirely under that lock, which gives tests the same
//! atomic read-modify-write contract the engines require of real store
//! implementations. The directory, publisher, and audit adapters carry a
//! fail-switch so collaborator-failure paths can be exercised.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use workledger_domain::{
    AuditEntry, Budget, BudgetUpdate, Result, TimeRecord, TimeRecordUpdate, UserProfile,
    WorkLedgerError,
};

use crate::audit::ports::AuditStore;
use crate::budget::ports::BudgetStore;
use crate::costs::ports::UserDirectory;
use crate::timer::ports::{EventPublisher, TimeRecordStore};

/* -------------------------------------------------------------------------- */
/* Time Records */
/* -------------------------------------------------------------------------- */

/// In-memory time record store
#[derive(Default)]
pub struct InMemoryTimeRecordStore {
    records: Mutex<Vec<TimeRecord>>,
}

impl InMemoryTimeRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored record
    pub fn records(&self) -> Vec<TimeRecord> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl TimeRecordStore for InMemoryTimeRecordStore {
    async fn create(&self, record: TimeRecord) -> Result<TimeRecord> {
        self.records.lock().push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<TimeRecord>> {
        Ok(self.records.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn find_active_by_user(&self, user_id: &str) -> Result<Option<TimeRecord>> {
        Ok(self.records.lock().iter().find(|r| r.user_id == user_id && r.is_active).cloned())
    }

    async fn find_by_user_and_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.user_id == user_id && r.start_time >= start && r.start_time <= end)
            .cloned()
            .collect())
    }

    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeRecord>> {
        Ok(self
            .records
            .lock()
            .iter()
            .filter(|r| r.start_time >= start && r.start_time <= end)
            .cloned()
            .collect())
    }

    async fn find_all_active(&self) -> Result<Vec<TimeRecord>> {
        Ok(self.records.lock().iter().filter(|r| r.is_active).cloned().collect())
    }

    async fn update(&self, id: &str, update: TimeRecordUpdate) -> Result<Option<TimeRecord>> {
        let mut records = self.records.lock();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        update.apply(record);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.records.lock().retain(|r| r.id != id);
        Ok(())
    }
}

/* -------------------------------------------------------------------------- */
/* Budgets */
/* -------------------------------------------------------------------------- */

/// In-memory budget store
#[derive(Default)]
pub struct InMemoryBudgetStore {
    budgets: Mutex<Vec<Budget>>,
}

impl InMemoryBudgetStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BudgetStore for InMemoryBudgetStore {
    async fn create(&self, budget: Budget) -> Result<Budget> {
        self.budgets.lock().push(budget.clone());
        Ok(budget)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Budget>> {
        Ok(self.budgets.lock().iter().find(|b| b.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Budget>> {
        Ok(self.budgets.lock().clone())
    }

    async fn update(&self, id: &str, update: BudgetUpdate) -> Result<Option<Budget>> {
        let mut budgets = self.budgets.lock();
        let Some(budget) = budgets.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        update.apply(budget);
        Ok(Some(budget.clone()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.budgets.lock().retain(|b| b.id != id);
        Ok(())
    }
}

/* -------------------------------------------------------------------------- */
/* Audit */
/* -------------------------------------------------------------------------- */

/// In-memory audit store with a fail-switch
#[derive(Default)]
pub struct InMemoryAuditStore {
    entries: Mutex<Vec<AuditEntry>>,
    failing: AtomicBool,
}

impl InMemoryAuditStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every append fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of every appended entry, oldest first
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, entry: AuditEntry) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WorkLedgerError::Storage("simulated audit outage".to_string()));
        }
        self.entries.lock().push(entry);
        Ok(())
    }

    async fn find_by_user(&self, user_id: &str, limit: usize) -> Result<Vec<AuditEntry>> {
        Ok(self
            .entries
            .lock()
            .iter()
            .rev()
            .filter(|e| e.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

/* -------------------------------------------------------------------------- */
/* User Directory */
/* -------------------------------------------------------------------------- */

/// Seeded user directory with a fail-switch
#[derive(Default)]
pub struct StaticUserDirectory {
    profiles: Mutex<HashMap<String, UserProfile>>,
    failing: AtomicBool,
}

impl StaticUserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one profile, builder style
    #[must_use]
    pub fn with_profile(self, profile: UserProfile) -> Self {
        self.insert(profile);
        self
    }

    /// Seed one profile
    pub fn insert(&self, profile: UserProfile) {
        self.profiles.lock().insert(profile.id.clone(), profile);
    }

    /// Make every lookup fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn resolve(&self, user_id: &str) -> Result<Option<UserProfile>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WorkLedgerError::Directory("simulated directory outage".to_string()));
        }
        Ok(self.profiles.lock().get(user_id).cloned())
    }
}

/// Convenience profile for tests
pub fn profile(id: &str, display_name: &str, monthly_salary: f64) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        display_name: display_name.to_string(),
        email: format!("{id}@example.com"),
        monthly_salary,
        profile_image: None,
    }
}

/* -------------------------------------------------------------------------- */
/* Event Publisher */
/* -------------------------------------------------------------------------- */

/// One captured publish call
#[derive(Debug, Clone)]
pub struct PublishedEvent {
    pub user_id: String,
    pub event: String,
    pub payload: serde_json::Value,
}

/// Publisher that records every event, with a fail-switch
#[derive(Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<PublishedEvent>>,
    failing: AtomicBool,
}

impl RecordingEventPublisher {
    /// Create an empty publisher
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every publish fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of every captured event, oldest first
    pub fn events(&self) -> Vec<PublishedEvent> {
        self.events.lock().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, user_id: &str, event: &str, payload: serde_json::Value) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WorkLedgerError::Internal("simulated publisher outage".to_string()));
        }
        self.events.lock().push(PublishedEvent {
            user_id: user_id.to_string(),
            event: event.to_string(),
            payload,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_update_is_applied_atomically_under_the_lock() {
        let store = InMemoryTimeRecordStore::new();
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

        tokio_test::block_on(async {
            let record = TimeRecord {
                id: "rec-1".to_string(),
                user_id: "user-1".to_string(),
                projects: vec!["Alpha".to_string()],
                tasks: Vec::new(),
                start_time: start,
                end_time: None,
                is_active: true,
                is_paused: false,
                paused_duration_ms: 0,
                last_paused_at: None,
                duration_minutes: 0,
                is_overtime: false,
            };
            store.create(record).await.unwrap();

            let update = TimeRecordUpdate {
                is_active: Some(false),
                duration_minutes: Some(30),
                end_time: Some(start + chrono::Duration::minutes(30)),
                ..TimeRecordUpdate::default()
            };
            let updated = store.update("rec-1", update).await.unwrap().unwrap();
            assert!(!updated.is_active);
            assert_eq!(updated.duration_minutes, 30);

            assert!(store.update("missing", TimeRecordUpdate::default()).await.unwrap().is_none());
        });
    }

    #[test]
    fn test_range_query_and_delete() {
        let store = InMemoryTimeRecordStore::new();
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

        tokio_test::block_on(async {
            for (id, user_id, offset_hours) in
                [("rec-1", "user-1", 0), ("rec-2", "user-1", 48), ("rec-3", "user-2", 1)]
            {
                let record = TimeRecord {
                    id: id.to_string(),
                    user_id: user_id.to_string(),
                    projects: vec!["Alpha".to_string()],
                    tasks: Vec::new(),
                    start_time: start + chrono::Duration::hours(offset_hours),
                    end_time: None,
                    is_active: false,
                    is_paused: false,
                    paused_duration_ms: 0,
                    last_paused_at: None,
                    duration_minutes: 0,
                    is_overtime: false,
                };
                store.create(record).await.unwrap();
            }

            let day_one = store
                .find_by_user_and_range(
                    "user-1",
                    start,
                    start + chrono::Duration::hours(24),
                )
                .await
                .unwrap();
            assert_eq!(day_one.len(), 1);
            assert_eq!(day_one[0].id, "rec-1");

            store.delete("rec-1").await.unwrap();
            assert!(store.find_by_id("rec-1").await.unwrap().is_none());
            assert_eq!(store.records().len(), 2);
        });
    }

    #[test]
    fn test_directory_fail_switch() {
        let directory = StaticUserDirectory::new().with_profile(profile("user-1", "Ada", 16_000.0));

        tokio_test::block_on(async {
            assert!(directory.resolve("user-1").await.unwrap().is_some());

            directory.set_failing(true);
            assert!(directory.resolve("user-1").await.is_err());
        });
    }

    #[test]
    fn test_audit_query_is_newest_first_and_limited() {
        let store = InMemoryAuditStore::new();

        tokio_test::block_on(async {
            for i in 0..5 {
                let entry = AuditEntry {
                    id: format!("a-{i}"),
                    user_id: "user-1".to_string(),
                    record_id: None,
                    action: workledger_domain::TimerAction::Started,
                    metadata: serde_json::Value::Null,
                    timestamp: Utc.with_ymd_and_hms(2025, 6, 2, 9, i, 0).unwrap(),
                };
                store.append(entry).await.unwrap();
            }

            let recent = store.find_by_user("user-1", 2).await.unwrap();
            assert_eq!(recent.len(), 2);
            assert_eq!(recent[0].id, "a-4");
            assert_eq!(recent[1].id, "a-3");
        });
    }
}
