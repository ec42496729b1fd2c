//! Port interfaces for the timer lifecycle
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use workledger_domain::{Result, TimeRecord, TimeRecordUpdate};

/// Trait for persisting and querying time records
///
/// Implementations must apply `update` as a single atomic
/// read-modify-write per record; the engine relies on that for its
/// single-active-timer invariant under concurrent requests.
#[async_trait]
pub trait TimeRecordStore: Send + Sync {
    /// Persist a freshly created record
    async fn create(&self, record: TimeRecord) -> Result<TimeRecord>;

    /// Look up a record by id
    async fn find_by_id(&self, id: &str) -> Result<Option<TimeRecord>>;

    /// The record currently accruing time for a user, if any
    async fn find_active_by_user(&self, user_id: &str) -> Result<Option<TimeRecord>>;

    /// A user's records whose session start falls inside the range
    async fn find_by_user_and_range(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeRecord>>;

    /// All records whose session start falls inside the range
    async fn find_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeRecord>>;

    /// Every currently active record across all users
    async fn find_all_active(&self) -> Result<Vec<TimeRecord>>;

    /// Apply a closed update atomically
    ///
    /// Returns the updated record, or `None` when no record has this id.
    async fn update(&self, id: &str, update: TimeRecordUpdate) -> Result<Option<TimeRecord>>;

    /// Remove a record
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Trait for fire-and-forget notification of timer state changes
///
/// Used to push live updates to dashboards. Publishing is advisory: the
/// engine logs a failure and carries on, so implementations should not
/// retry aggressively on its behalf.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event scoped to a user
    async fn publish(&self, user_id: &str, event: &str, payload: serde_json::Value) -> Result<()>;
}
