//! Cost analytics types
//!
//! This module centralizes the derived cost shapes produced by the
//! aggregation engine:
//! - Live burn-rate reports over currently active sessions
//! - Historical cost summaries (per project / developer / day / month)
//! - Overtime split and top-performer rankings
//!
//! Every shape exists in a privileged variant (carries compensation-derived
//! fields) and a safe variant (does not). The two are distinct types on
//! purpose: the safe tree has no rate or salary field anywhere, so the
//! public path cannot leak compensation data for any input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/* -------------------------------------------------------------------------- */
/* Live Cost */
/* -------------------------------------------------------------------------- */

/// Live cost figures for one project, derived from active sessions
///
/// `burn_rate_per_hour` sums the full hourly rate of every contributor
/// currently active on the project; `live_cost` and `active_minutes` carry
/// each session's even share when a session spans several projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectLiveCost {
    pub project: String,
    pub live_cost: f64,
    pub burn_rate_per_hour: f64,
    pub contributor_count: usize,
    pub active_minutes: i64,
}

/// One currently active contributor, privileged variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveContributor {
    pub user_id: String,
    pub display_name: String,
    pub projects: Vec<String>,
    pub active_minutes: i64,
    pub live_cost: f64,
    pub hourly_rate: f64,
}

/// One currently active contributor, safe variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeActiveContributor {
    pub user_id: String,
    pub display_name: String,
    pub projects: Vec<String>,
    pub active_minutes: i64,
    pub live_cost: f64,
}

/// Snapshot of live cost across all active sessions, privileged variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveCostReport {
    pub generated_at: DateTime<Utc>,
    pub total_live_cost: f64,
    /// Sum of hourly rates across distinct active contributors
    pub total_burn_rate_per_hour: f64,
    pub active_contributor_count: usize,
    pub projects: Vec<ProjectLiveCost>,
    pub contributors: Vec<ActiveContributor>,
}

/// Snapshot of live cost across all active sessions, safe variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeLiveCostReport {
    pub generated_at: DateTime<Utc>,
    pub total_live_cost: f64,
    pub total_burn_rate_per_hour: f64,
    pub active_contributor_count: usize,
    pub projects: Vec<ProjectLiveCost>,
    pub contributors: Vec<SafeActiveContributor>,
}

/* -------------------------------------------------------------------------- */
/* Historical Summary */
/* -------------------------------------------------------------------------- */

/// Cost and hours one developer contributed to a project, privileged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperCost {
    pub user_id: String,
    pub display_name: String,
    pub hours: f64,
    pub cost: f64,
    pub hourly_rate: f64,
}

/// Cost and hours one developer contributed to a project, safe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeDeveloperCost {
    pub user_id: String,
    pub display_name: String,
    pub hours: f64,
    pub cost: f64,
}

/// Per-project cost breakdown with developer sub-breakdown, privileged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCostBreakdown {
    pub project: String,
    pub cost: f64,
    pub hours: f64,
    pub developers: Vec<DeveloperCost>,
}

/// Per-project cost breakdown with developer sub-breakdown, safe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeProjectCostBreakdown {
    pub project: String,
    pub cost: f64,
    pub hours: f64,
    pub developers: Vec<SafeDeveloperCost>,
}

/// Ranking entry ordered by total hours worked, privileged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformerRanking {
    pub user_id: String,
    pub display_name: String,
    pub total_hours: f64,
    pub total_cost: f64,
    pub hourly_rate: f64,
}

/// Ranking entry ordered by total hours worked, safe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafePerformerRanking {
    pub user_id: String,
    pub display_name: String,
    pub total_hours: f64,
    pub total_cost: f64,
}

/// Cost and hours accrued on one calendar day (`YYYY-MM-DD`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCost {
    pub day: String,
    pub cost: f64,
    pub hours: f64,
}

/// Cost and hours accrued in one calendar month (`YYYY-MM`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCost {
    pub month: String,
    pub cost: f64,
    pub hours: f64,
}

/// Regular vs. overtime split, keyed by each session's immutable flag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OvertimeSplit {
    pub regular_hours: f64,
    pub regular_cost: f64,
    pub overtime_hours: f64,
    pub overtime_cost: f64,
}

/// Historical cost summary over a date range, privileged variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostSummary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Project filter the summary was computed with, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub total_cost: f64,
    pub total_hours: f64,
    pub record_count: usize,
    pub projects: Vec<ProjectCostBreakdown>,
    pub top_performers: Vec<PerformerRanking>,
    pub daily_costs: Vec<DailyCost>,
    pub monthly_costs: Vec<MonthlyCost>,
    pub overtime: OvertimeSplit,
}

/// Historical cost summary over a date range, safe variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeCostSummary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub total_cost: f64,
    pub total_hours: f64,
    pub record_count: usize,
    pub projects: Vec<SafeProjectCostBreakdown>,
    pub top_performers: Vec<SafePerformerRanking>,
    pub daily_costs: Vec<DailyCost>,
    pub monthly_costs: Vec<MonthlyCost>,
    pub overtime: OvertimeSplit,
}
