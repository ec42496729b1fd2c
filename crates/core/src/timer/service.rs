//! Timer engine - per-user session lifecycle
//!
//! State machine: Idle -> Active -> {Paused <-> Active} -> Stopped. Idle
//! is the absence of an active record; Stopped is terminal for a record
//! and a new start creates a fresh one.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use workledger_common::time::calendar::format_minutes;
use workledger_common::time::clock::{Clock, SystemClock};
use workledger_domain::constants::{
    EVENT_TIMER_PAUSED, EVENT_TIMER_RESUMED, EVENT_TIMER_STARTED, EVENT_TIMER_STOPPED,
    EVENT_TIMER_TASK_ADDED, MS_PER_MINUTE,
};
use workledger_domain::{
    EngineConfig, Result, TaskEntry, TimeRecord, TimeRecordUpdate, TimerAction, WorkLedgerError,
};

use super::ports::{EventPublisher, TimeRecordStore};
use crate::audit::AuditTrail;

/// Timer lifecycle engine
///
/// Every mutating operation is serialized per user through an internal
/// lock registry, so two racing requests for the same user cannot both
/// observe the same active record. Cross-user operations run in parallel.
pub struct TimerEngine {
    store: Arc<dyn TimeRecordStore>,
    publisher: Arc<dyn EventPublisher>,
    audit: Arc<AuditTrail>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    user_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TimerEngine {
    /// Create a new timer engine
    pub fn new(
        store: Arc<dyn TimeRecordStore>,
        publisher: Arc<dyn EventPublisher>,
        audit: Arc<AuditTrail>,
    ) -> Self {
        Self {
            store,
            publisher,
            audit,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the wall clock (tests drive a mock clock through this)
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the engine configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Start a new session, superseding any session already running
    ///
    /// An existing active timer is finalized first; starting is never
    /// blocked by one. The first task entry is seeded from `task`, falling
    /// back to the configured default label for blank text.
    pub async fn start(
        &self,
        user_id: &str,
        projects: Vec<String>,
        task: &str,
        is_overtime: bool,
    ) -> Result<TimeRecord> {
        let projects = normalize_projects(projects);
        if projects.is_empty() {
            return Err(WorkLedgerError::Validation(
                "at least one non-blank project is required".to_string(),
            ));
        }

        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;
        let now = self.clock.now();

        // The previous session must be finalized before the new record
        // exists, preserving the single-active invariant at every instant.
        if let Some(active) = self.store.find_active_by_user(user_id).await? {
            let update = finalize_update(&active, now);
            if let Some(stopped) = self.store.update(&active.id, update).await? {
                info!(user_id = %user_id, record_id = %stopped.id, "Superseded running timer");
                self.emit(
                    user_id,
                    &stopped,
                    TimerAction::Stopped,
                    EVENT_TIMER_STOPPED,
                    json!({ "superseded": true }),
                )
                .await;
            }
        }

        let record = TimeRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            projects,
            tasks: vec![TaskEntry {
                text: self.task_label(task),
                added_at: now,
                duration_minutes: 0,
            }],
            start_time: now,
            end_time: None,
            is_active: true,
            is_paused: false,
            paused_duration_ms: 0,
            last_paused_at: None,
            duration_minutes: 0,
            is_overtime,
        };
        let record = self.store.create(record).await?;

        info!(user_id = %user_id, record_id = %record.id, "Timer started");
        self.emit(
            user_id,
            &record,
            TimerAction::Started,
            EVENT_TIMER_STARTED,
            json!({ "projects": record.projects, "is_overtime": is_overtime }),
        )
        .await;

        Ok(record)
    }

    /// Pause the running session
    ///
    /// Returns `Ok(None)` when there is nothing to pause (no active timer,
    /// or the timer is already paused); callers treat that as a no-op, not
    /// a failure.
    pub async fn pause(&self, user_id: &str) -> Result<Option<TimeRecord>> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some(record) = self.store.find_active_by_user(user_id).await? else {
            return Ok(None);
        };
        if record.is_paused {
            return Ok(None);
        }

        let now = self.clock.now();
        let update = TimeRecordUpdate {
            is_paused: Some(true),
            last_paused_at: Some(Some(now)),
            ..TimeRecordUpdate::default()
        };
        let Some(paused) = self.store.update(&record.id, update).await? else {
            return Ok(None);
        };

        self.emit(user_id, &paused, TimerAction::Paused, EVENT_TIMER_PAUSED, json!({})).await;
        Ok(Some(paused))
    }

    /// Resume a paused session
    ///
    /// Folds the just-closed pause interval into the cumulative paused
    /// duration. `Ok(None)` when no paused timer exists.
    pub async fn resume(&self, user_id: &str) -> Result<Option<TimeRecord>> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some(record) = self.store.find_active_by_user(user_id).await? else {
            return Ok(None);
        };
        if !record.is_paused {
            return Ok(None);
        }

        let now = self.clock.now();
        let closed_ms = record
            .last_paused_at
            .map(|paused_at| (now - paused_at).num_milliseconds().max(0))
            .unwrap_or(0);
        let update = TimeRecordUpdate {
            is_paused: Some(false),
            paused_duration_ms: Some(record.paused_duration_ms + closed_ms),
            last_paused_at: Some(None),
            ..TimeRecordUpdate::default()
        };
        let Some(resumed) = self.store.update(&record.id, update).await? else {
            return Ok(None);
        };

        self.emit(
            user_id,
            &resumed,
            TimerAction::Resumed,
            EVENT_TIMER_RESUMED,
            json!({ "pause_ms": closed_ms }),
        )
        .await;
        Ok(Some(resumed))
    }

    /// Stop the running session, paused or not
    ///
    /// Finalizes the record's duration and the current task's duration.
    /// `Ok(None)` when no active timer exists.
    pub async fn stop(&self, user_id: &str) -> Result<Option<TimeRecord>> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some(record) = self.store.find_active_by_user(user_id).await? else {
            return Ok(None);
        };

        let now = self.clock.now();
        let update = finalize_update(&record, now);
        let Some(stopped) = self.store.update(&record.id, update).await? else {
            return Ok(None);
        };

        info!(
            user_id = %user_id,
            record_id = %stopped.id,
            worked = %format_minutes(stopped.duration_minutes),
            "Timer stopped"
        );
        self.emit(
            user_id,
            &stopped,
            TimerAction::Stopped,
            EVENT_TIMER_STOPPED,
            json!({ "duration_minutes": stopped.duration_minutes }),
        )
        .await;
        Ok(Some(stopped))
    }

    /// Switch the running session to a new task
    ///
    /// The previous task's duration is finalized with a proportional share
    /// of the session's completed paused time. `Ok(None)` when no active
    /// timer exists.
    pub async fn add_task(&self, user_id: &str, task_text: &str) -> Result<Option<TimeRecord>> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let Some(record) = self.store.find_active_by_user(user_id).await? else {
            return Ok(None);
        };

        let now = self.clock.now();
        let mut tasks = record.tasks.clone();
        if let Some(last) = tasks.last_mut() {
            last.duration_minutes =
                task_minutes(last.added_at, record.start_time, now, record.paused_duration_ms);
        }
        let text = self.task_label(task_text);
        tasks.push(TaskEntry { text: text.clone(), added_at: now, duration_minutes: 0 });

        let update = TimeRecordUpdate { tasks: Some(tasks), ..TimeRecordUpdate::default() };
        let Some(updated) = self.store.update(&record.id, update).await? else {
            return Ok(None);
        };

        self.emit(
            user_id,
            &updated,
            TimerAction::TaskAdded,
            EVENT_TIMER_TASK_ADDED,
            json!({ "task": text }),
        )
        .await;
        Ok(Some(updated))
    }

    /// The user's active session with its worked minutes computed live
    ///
    /// The returned `duration_minutes` is a read-time projection (elapsed
    /// minus paused, including an open pause interval) and is never
    /// persisted.
    pub async fn get_active(&self, user_id: &str) -> Result<Option<TimeRecord>> {
        let Some(mut record) = self.store.find_active_by_user(user_id).await? else {
            return Ok(None);
        };
        record.duration_minutes = record.live_duration_minutes(self.clock.now());
        Ok(Some(record))
    }

    /// Finalize every active session for a user (day-end closure)
    ///
    /// The invariant implies at most one, but any duplicate active rows a
    /// buggy store accumulated are closed here too.
    pub async fn stop_all_for_user(&self, user_id: &str) -> Result<Vec<TimeRecord>> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let now = self.clock.now();
        let active: Vec<TimeRecord> = self
            .store
            .find_all_active()
            .await?
            .into_iter()
            .filter(|record| record.user_id == user_id)
            .collect();

        let mut stopped = Vec::with_capacity(active.len());
        for record in active {
            let update = finalize_update(&record, now);
            if let Some(finalized) = self.store.update(&record.id, update).await? {
                self.emit(
                    user_id,
                    &finalized,
                    TimerAction::Stopped,
                    EVENT_TIMER_STOPPED,
                    json!({ "day_end_closure": true }),
                )
                .await;
                stopped.push(finalized);
            }
        }
        info!(user_id = %user_id, stopped = stopped.len(), "Closed all timers for user");
        Ok(stopped)
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.user_locks.lock();
        Arc::clone(
            locks.entry(user_id.to_string()).or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }

    fn task_label(&self, text: &str) -> String {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.config.default_task_label.clone()
        } else {
            trimmed.to_string()
        }
    }

    /// Audit + publish for a completed transition, both best-effort
    async fn emit(
        &self,
        user_id: &str,
        record: &TimeRecord,
        action: TimerAction,
        event: &str,
        metadata: serde_json::Value,
    ) {
        self.audit.record(user_id, Some(&record.id), action, metadata).await;

        let payload = serde_json::to_value(record).unwrap_or_default();
        if let Err(err) = self.publisher.publish(user_id, event, payload).await {
            warn!(user_id = %user_id, event = %event, error = %err, "Failed to publish timer event");
        }
    }
}

/// Drop blank project names and duplicates, preserving first-seen order
fn normalize_projects(projects: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    projects
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Build the closed update that finalizes a session at `now`
///
/// An open pause interval is folded into the cumulative paused duration
/// first; the session duration is elapsed minus paused, floored to whole
/// minutes and clamped at zero.
fn finalize_update(record: &TimeRecord, now: DateTime<Utc>) -> TimeRecordUpdate {
    let mut paused_ms = record.paused_duration_ms;
    if let Some(paused_at) = record.last_paused_at {
        paused_ms += (now - paused_at).num_milliseconds().max(0);
    }

    let elapsed_ms = (now - record.start_time).num_milliseconds();
    let duration_minutes = ((elapsed_ms - paused_ms) / MS_PER_MINUTE).max(0);

    let mut tasks = record.tasks.clone();
    if let Some(last) = tasks.last_mut() {
        last.duration_minutes = task_minutes(last.added_at, record.start_time, now, paused_ms);
    }

    TimeRecordUpdate {
        tasks: Some(tasks),
        end_time: Some(now),
        is_active: Some(false),
        is_paused: Some(false),
        paused_duration_ms: Some(paused_ms),
        last_paused_at: Some(None),
        duration_minutes: Some(duration_minutes),
        ..TimeRecordUpdate::default()
    }
}

/// Worked minutes for one task, subtracting a proportional share of the
/// session's paused time
///
/// The share is task-elapsed over total-elapsed: pauses cannot be
/// attributed precisely to a single task once several tasks share a
/// session, so this is a deliberate approximation rather than an exact
/// audit figure.
fn task_minutes(
    added_at: DateTime<Utc>,
    start_time: DateTime<Utc>,
    now: DateTime<Utc>,
    paused_ms: i64,
) -> i64 {
    let task_elapsed_ms = (now - added_at).num_milliseconds().max(0);
    let total_elapsed_ms = (now - start_time).num_milliseconds().max(0);
    if total_elapsed_ms == 0 {
        return 0;
    }

    let share = task_elapsed_ms as f64 / total_elapsed_ms as f64;
    let worked_ms = task_elapsed_ms as f64 - paused_ms as f64 * share;
    let minutes = (worked_ms / MS_PER_MINUTE as f64).floor() as i64;
    minutes.max(0)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use workledger_common::time::clock::MockClock;

    use super::*;
    use crate::testing::{
        InMemoryAuditStore, InMemoryTimeRecordStore, RecordingEventPublisher,
    };

    fn engine_with_clock() -> (TimerEngine, MockClock, Arc<InMemoryTimeRecordStore>) {
        let clock = MockClock::at(Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap());
        let store = Arc::new(InMemoryTimeRecordStore::new());
        let audit = Arc::new(
            AuditTrail::new(Arc::new(InMemoryAuditStore::new()))
                .with_clock(Arc::new(clock.clone())),
        );
        let engine = TimerEngine::new(
            Arc::clone(&store) as Arc<dyn TimeRecordStore>,
            Arc::new(RecordingEventPublisher::new()),
            audit,
        )
        .with_clock(Arc::new(clock.clone()));
        (engine, clock, store)
    }

    #[test]
    fn test_normalize_projects_trims_and_dedupes() {
        let projects = vec![
            "  Alpha ".to_string(),
            String::new(),
            "Beta".to_string(),
            "Alpha".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize_projects(projects), vec!["Alpha".to_string(), "Beta".to_string()]);
    }

    #[test]
    fn test_task_minutes_proportional_share() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let added = start + Duration::minutes(30);
        let now = start + Duration::minutes(60);

        // Task covers half the session; it absorbs half of the 10 paused
        // minutes: 30 - 5 = 25.
        assert_eq!(task_minutes(added, start, now, 10 * MS_PER_MINUTE), 25);
    }

    #[test]
    fn test_task_minutes_zero_elapsed() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        assert_eq!(task_minutes(start, start, start, 0), 0);
    }

    #[test]
    fn test_finalize_update_folds_open_pause() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let record = TimeRecord {
            id: "rec-1".to_string(),
            user_id: "user-1".to_string(),
            projects: vec!["Alpha".to_string()],
            tasks: vec![TaskEntry {
                text: "design".to_string(),
                added_at: start,
                duration_minutes: 0,
            }],
            start_time: start,
            end_time: None,
            is_active: true,
            is_paused: true,
            paused_duration_ms: 2 * MS_PER_MINUTE,
            last_paused_at: Some(start + Duration::minutes(20)),
            duration_minutes: 0,
            is_overtime: false,
        };

        // Stop at +25m with a pause open since +20m: 2m completed plus 5m
        // open = 7m paused, 18m worked.
        let update = finalize_update(&record, start + Duration::minutes(25));
        assert_eq!(update.paused_duration_ms, Some(7 * MS_PER_MINUTE));
        assert_eq!(update.duration_minutes, Some(18));
        assert_eq!(update.is_active, Some(false));
        assert_eq!(update.is_paused, Some(false));
        assert_eq!(update.last_paused_at, Some(None));
    }

    #[tokio::test]
    async fn test_start_rejects_blank_projects() {
        let (engine, _clock, _store) = engine_with_clock();

        let result = engine.start("user-1", vec!["  ".to_string()], "design", false).await;
        assert!(matches!(result, Err(WorkLedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_start_seeds_default_task_label() {
        let (engine, _clock, _store) = engine_with_clock();

        let record = engine.start("user-1", vec!["Alpha".to_string()], "   ", false).await.unwrap();
        assert_eq!(record.tasks[0].text, "General work");
    }

    #[tokio::test]
    async fn test_pause_without_timer_is_not_an_error() {
        let (engine, _clock, _store) = engine_with_clock();

        assert!(engine.pause("user-1").await.unwrap().is_none());
        assert!(engine.resume("user-1").await.unwrap().is_none());
        assert!(engine.stop("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_active_projects_duration_without_persisting() {
        let (engine, clock, store) = engine_with_clock();

        let record = engine.start("user-1", vec!["Alpha".to_string()], "design", false).await.unwrap();
        clock.advance(Duration::minutes(12));

        let live = engine.get_active("user-1").await.unwrap().unwrap();
        assert_eq!(live.duration_minutes, 12);

        // The stored row still carries the unfinalized zero.
        let stored = store.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.duration_minutes, 0);
    }
}
