//! Forecast engine - cost trend projection
//!
//! Fits an ordinary-least-squares line over the historical daily-cost
//! series and blends the regression's next-day figure with the plain
//! historical average. Confidence degrades with the series' coefficient
//! of variation: a volatile history earns a low-confidence forecast.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use workledger_domain::{CostForecast, EngineConfig, Result, Trend, WorkLedgerError};

use crate::costs::CostAggregationEngine;

/// Cost forecast engine
pub struct ForecastEngine {
    costs: Arc<CostAggregationEngine>,
    config: EngineConfig,
}

impl ForecastEngine {
    /// Create a new forecast engine
    pub fn new(costs: Arc<CostAggregationEngine>) -> Self {
        Self { costs, config: EngineConfig::default() }
    }

    /// Override the engine configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Project cost `days` into the future from the range's daily series
    ///
    /// With fewer than two daily data points the projection is trivial:
    /// last known daily cost times `days`, zero confidence, stable trend.
    pub async fn forecast(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        days: i64,
        project: Option<&str>,
    ) -> Result<CostForecast> {
        if days <= 0 {
            return Err(WorkLedgerError::Validation(
                "forecast days must be positive".to_string(),
            ));
        }

        let summary = self.costs.cost_summary_privileged(start, end, project).await?;
        let daily_costs = summary.daily_costs;
        let series: Vec<f64> = daily_costs.iter().map(|d| d.cost).collect();

        if series.len() < 2 {
            let last_known = series.last().copied().unwrap_or(0.0);
            return Ok(CostForecast {
                projected_cost: last_known * days as f64,
                trend: Trend::Stable,
                confidence: 0.0,
                forecast_days: days,
                historical_daily_average: last_known,
                daily_costs,
            });
        }

        let (slope, intercept) = linear_regression(&series);
        let mean = series.iter().sum::<f64>() / series.len() as f64;

        // Next-day regression figure blended 50/50 with the historical
        // average, so a steep short-lived spike does not dominate.
        let projected_daily = slope * series.len() as f64 + intercept;
        let projected_cost = ((projected_daily + mean) / 2.0 * days as f64).max(0.0);

        let trend = if slope > self.config.trend_slope_threshold {
            Trend::Increasing
        } else if slope < -self.config.trend_slope_threshold {
            Trend::Decreasing
        } else {
            Trend::Stable
        };

        let confidence = if mean <= 0.0 {
            0.0
        } else {
            let variance =
                series.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / series.len() as f64;
            let coefficient_of_variation = variance.sqrt() / mean;
            100.0 - (100.0 * coefficient_of_variation).min(100.0)
        };

        Ok(CostForecast {
            projected_cost,
            trend,
            confidence,
            forecast_days: days,
            historical_daily_average: mean,
            daily_costs,
        })
    }
}

/// Ordinary least squares over sequential indices `0..n`
///
/// Returns `(slope, intercept)` of the fitted line.
fn linear_regression(series: &[f64]) -> (f64, f64) {
    let n = series.len() as f64;
    let sum_x: f64 = (0..series.len()).map(|x| x as f64).sum();
    let sum_y: f64 = series.iter().sum();
    let sum_xy: f64 = series.iter().enumerate().map(|(x, y)| x as f64 * y).sum();
    let sum_x2: f64 = (0..series.len()).map(|x| (x as f64).powi(2)).sum();

    let denominator = n * sum_x2 - sum_x.powi(2);
    if denominator == 0.0 {
        return (0.0, sum_y / n);
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regression_recovers_exact_line() {
        // y = 2x + 1
        let series = vec![1.0, 3.0, 5.0, 7.0];
        let (slope, intercept) = linear_regression(&series);

        assert!((slope - 2.0).abs() < 1e-9);
        assert!((intercept - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_regression_flat_series() {
        let series = vec![4.0, 4.0, 4.0];
        let (slope, intercept) = linear_regression(&series);

        assert!(slope.abs() < 1e-9);
        assert!((intercept - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_regression_single_point_degenerate() {
        let (slope, intercept) = linear_regression(&[10.0]);

        assert!(slope.abs() < 1e-9);
        assert!((intercept - 10.0).abs() < 1e-9);
    }
}
