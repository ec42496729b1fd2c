//! Audit trail types
//!
//! Append-only records of timer actions kept for compliance review.
//! Entries are never mutated after they are written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_status_conversions;

/// Timer action recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerAction {
    Started,
    Paused,
    Resumed,
    Stopped,
    TaskAdded,
}

impl_status_conversions!(TimerAction {
    Started => "started",
    Paused => "paused",
    Resumed => "resumed",
    Stopped => "stopped",
    TaskAdded => "task_added",
});

/// One appended audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    /// User whose timer the action applied to
    pub user_id: String,
    /// Time record the action touched, when one exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    pub action: TimerAction,
    /// Free-form action context (projects, task text, durations)
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
