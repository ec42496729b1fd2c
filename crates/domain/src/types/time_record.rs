//! Time record types
//!
//! One `TimeRecord` per tracked work session. A session may span multiple
//! projects and carries an ordered sequence of tasks; a task's duration is
//! finalized only when it is superseded by the next task or by session
//! stop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MS_PER_MINUTE;

/// A single task worked inside a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Free-text description of the task
    pub text: String,
    /// When this task became the session's current task
    pub added_at: DateTime<Utc>,
    /// Finalized worked minutes; zero while the task is still current
    pub duration_minutes: i64,
}

/// One tracked work session for a user
///
/// Invariants maintained by the timer engine:
/// - at most one record with `is_active = true` per `user_id`
/// - `is_paused = true` implies `is_active = true` and `last_paused_at` set
/// - `paused_duration_ms` accumulates completed pause intervals only
/// - finalized `duration_minutes` is wall-clock elapsed minus paused time,
///   floored to whole minutes, never negative
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRecord {
    pub id: String,
    /// Owner of the session, immutable after creation
    pub user_id: String,
    /// Projects this session is attributed to (order-insensitive)
    pub projects: Vec<String>,
    /// Ordered task sequence; the last entry is the current task
    pub tasks: Vec<TaskEntry>,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_paused: bool,
    /// Cumulative milliseconds spent in completed pause intervals
    pub paused_duration_ms: i64,
    /// Set only while currently paused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_paused_at: Option<DateTime<Utc>>,
    /// Finalized at stop; derived at read time for active sessions
    pub duration_minutes: i64,
    /// Overtime flag, fixed at start for the whole session
    pub is_overtime: bool,
}

impl TimeRecord {
    /// Worked minutes as of `now`, for read-time projection on active
    /// sessions
    ///
    /// Elapsed wall-clock time minus accumulated paused time, including
    /// the currently open pause interval if the session is paused right
    /// now. Floored to whole minutes and clamped at zero. Never persisted.
    pub fn live_duration_minutes(&self, now: DateTime<Utc>) -> i64 {
        let end = self.end_time.unwrap_or(now);
        let mut paused_ms = self.paused_duration_ms;
        if let Some(paused_at) = self.last_paused_at {
            paused_ms += (now - paused_at).num_milliseconds().max(0);
        }
        let worked_ms = (end - self.start_time).num_milliseconds() - paused_ms;
        (worked_ms / MS_PER_MINUTE).max(0)
    }
}

/// Closed update payload for a time record
///
/// Every field is optional; set fields are applied, unset fields leave the
/// record untouched. `last_paused_at` is doubly optional so a pending
/// pause marker can be cleared explicitly. Stores must apply the whole
/// payload as one atomic read-modify-write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeRecordUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_duration_ms: Option<i64>,
    /// `Some(None)` clears the pause marker, `Some(Some(ts))` sets it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_paused_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
}

impl TimeRecordUpdate {
    /// Apply this update to a record in place
    ///
    /// Shared by store implementations so update semantics cannot drift
    /// between them.
    pub fn apply(&self, record: &mut TimeRecord) {
        if let Some(projects) = &self.projects {
            record.projects = projects.clone();
        }
        if let Some(tasks) = &self.tasks {
            record.tasks = tasks.clone();
        }
        if let Some(end_time) = self.end_time {
            record.end_time = Some(end_time);
        }
        if let Some(is_active) = self.is_active {
            record.is_active = is_active;
        }
        if let Some(is_paused) = self.is_paused {
            record.is_paused = is_paused;
        }
        if let Some(paused_duration_ms) = self.paused_duration_ms {
            record.paused_duration_ms = paused_duration_ms;
        }
        if let Some(last_paused_at) = self.last_paused_at {
            record.last_paused_at = last_paused_at;
        }
        if let Some(duration_minutes) = self.duration_minutes {
            record.duration_minutes = duration_minutes;
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn record_at(start: DateTime<Utc>) -> TimeRecord {
        TimeRecord {
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
            is_paused: false,
            paused_duration_ms: 0,
            last_paused_at: None,
            duration_minutes: 0,
            is_overtime: false,
        }
    }

    #[test]
    fn test_live_duration_simple_elapsed() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let record = record_at(start);

        let now = start + Duration::minutes(42) + Duration::seconds(30);
        assert_eq!(record.live_duration_minutes(now), 42);
    }

    #[test]
    fn test_live_duration_subtracts_completed_pauses() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut record = record_at(start);
        record.paused_duration_ms = 10 * MS_PER_MINUTE;

        let now = start + Duration::minutes(60);
        assert_eq!(record.live_duration_minutes(now), 50);
    }

    #[test]
    fn test_live_duration_includes_open_pause_interval() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut record = record_at(start);
        record.is_paused = true;
        record.last_paused_at = Some(start + Duration::minutes(30));

        // 40 minutes elapsed, 10 of them inside the still-open pause
        let now = start + Duration::minutes(40);
        assert_eq!(record.live_duration_minutes(now), 30);
    }

    #[test]
    fn test_live_duration_never_negative() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut record = record_at(start);
        record.paused_duration_ms = 120 * MS_PER_MINUTE;

        let now = start + Duration::minutes(5);
        assert_eq!(record.live_duration_minutes(now), 0);
    }

    #[test]
    fn test_update_apply_clears_pause_marker() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut record = record_at(start);
        record.is_paused = true;
        record.last_paused_at = Some(start + Duration::minutes(5));

        let update = TimeRecordUpdate {
            is_paused: Some(false),
            paused_duration_ms: Some(3 * MS_PER_MINUTE),
            last_paused_at: Some(None),
            ..TimeRecordUpdate::default()
        };
        update.apply(&mut record);

        assert!(!record.is_paused);
        assert_eq!(record.paused_duration_ms, 3 * MS_PER_MINUTE);
        assert!(record.last_paused_at.is_none());
    }

    #[test]
    fn test_update_apply_leaves_unset_fields_alone() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut record = record_at(start);

        TimeRecordUpdate::default().apply(&mut record);

        assert!(record.is_active);
        assert_eq!(record.projects, vec!["Alpha".to_string()]);
        assert_eq!(record.tasks.len(), 1);
    }
}
