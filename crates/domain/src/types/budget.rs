//! Budget types
//!
//! A budget bounds spend for a project (or the whole organization) over a
//! date range. Mutation is owner-gated: only the creator or a caller with
//! the manage-all override may update or delete a budget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CRITICAL_THRESHOLD, DEFAULT_WARNING_THRESHOLD};
use crate::impl_status_conversions;

/// Utilization percentages at which alerts fire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self { warning: DEFAULT_WARNING_THRESHOLD, critical: DEFAULT_CRITICAL_THRESHOLD }
    }
}

/// A budget definition
///
/// Invariants: `start_date < end_date`, `amount > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    /// Scoping project; `None` means the budget covers all projects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: f64,
    pub currency: String,
    pub alert_thresholds: AlertThresholds,
    /// Owner; immutable, drives object-level authorization
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub amount: f64,
    pub currency: String,
    /// Defaults to the standard warning/critical pair when omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_thresholds: Option<AlertThresholds>,
}

/// Closed update payload for a budget
///
/// `project` is doubly optional so the project scope can be cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_thresholds: Option<AlertThresholds>,
}

impl BudgetUpdate {
    /// Apply this update to a budget in place
    pub fn apply(&self, budget: &mut Budget) {
        if let Some(project) = &self.project {
            budget.project = project.clone();
        }
        if let Some(start_date) = self.start_date {
            budget.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            budget.end_date = end_date;
        }
        if let Some(amount) = self.amount {
            budget.amount = amount;
        }
        if let Some(currency) = &self.currency {
            budget.currency = currency.clone();
        }
        if let Some(alert_thresholds) = self.alert_thresholds {
            budget.alert_thresholds = alert_thresholds;
        }
    }
}

/// Alert severity derived from budget utilization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Ok,
    Warning,
    Critical,
}

impl_status_conversions!(AlertLevel {
    Ok => "ok",
    Warning => "warning",
    Critical => "critical",
});

/// Budget vs. actual comparison over the budget's date range
///
/// Carries no compensation-derived fields; safe to expose to any caller
/// the edge allows to see the budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub budget_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    pub amount: f64,
    pub currency: String,
    pub actual_cost: f64,
    pub actual_hours: f64,
    /// `amount - actual_cost`; negative when already overspent
    pub remaining_budget: f64,
    pub utilization_percentage: f64,
    pub alert_level: AlertLevel,
    /// Current daily burn extrapolated over the whole budget window
    pub projected_cost: f64,
    /// `projected_cost - amount`; negative means projected under budget
    pub projected_overspend: f64,
    pub days_total: i64,
    pub days_elapsed: i64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_alert_level_conversions() {
        use std::str::FromStr;

        assert_eq!(AlertLevel::Critical.to_string(), "critical");
        assert_eq!(AlertLevel::from_str("WARNING").unwrap(), AlertLevel::Warning);
        assert!(AlertLevel::from_str("meltdown").is_err());
    }

    #[test]
    fn test_update_apply_clears_project_scope() {
        let mut budget = Budget {
            id: "b-1".to_string(),
            project: Some("Alpha".to_string()),
            start_date: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap(),
            amount: 50_000.0,
            currency: "USD".to_string(),
            alert_thresholds: AlertThresholds::default(),
            created_by: "user-1".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 12, 15, 0, 0, 0).unwrap(),
        };

        let update = BudgetUpdate {
            project: Some(None),
            amount: Some(60_000.0),
            ..BudgetUpdate::default()
        };
        update.apply(&mut budget);

        assert!(budget.project.is_none());
        assert!((budget.amount - 60_000.0).abs() < f64::EPSILON);
        assert_eq!(budget.currency, "USD");
    }
}
