//! Cost forecast types

use serde::{Deserialize, Serialize};

use crate::impl_status_conversions;
use crate::types::costs::DailyCost;

/// Direction of the fitted daily-cost trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl_status_conversions!(Trend {
    Increasing => "increasing",
    Decreasing => "decreasing",
    Stable => "stable",
});

/// Projection of future cost from a historical daily-cost series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostForecast {
    /// Projected total cost over the forecast window
    pub projected_cost: f64,
    pub trend: Trend,
    /// 0-100; low values mean a volatile history
    pub confidence: f64,
    pub forecast_days: i64,
    pub historical_daily_average: f64,
    /// The daily series the projection was fitted against
    pub daily_costs: Vec<DailyCost>,
}
