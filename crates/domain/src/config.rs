//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_TASK_LABEL, STANDARD_MONTHLY_HOURS, TOP_PERFORMER_LIMIT, TREND_SLOPE_THRESHOLD,
};

/// Tunables shared by the timer, cost, and forecast engines
///
/// Defaults mirror company policy (160 standard hours per month); deploys
/// with different standards override the relevant fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Divisor used to derive an hourly rate from a monthly salary
    pub standard_monthly_hours: f64,
    /// Maximum number of entries in the top-performer ranking
    pub top_performer_limit: usize,
    /// Task label used when a timer is started with blank task text
    pub default_task_label: String,
    /// Minimum regression slope treated as a real trend
    pub trend_slope_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_monthly_hours: STANDARD_MONTHLY_HOURS,
            top_performer_limit: TOP_PERFORMER_LIMIT,
            default_task_label: DEFAULT_TASK_LABEL.to_string(),
            trend_slope_threshold: TREND_SLOPE_THRESHOLD,
        }
    }
}
