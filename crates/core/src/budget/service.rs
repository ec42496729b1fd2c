//! Budget engine - definitions, authorization, and comparison
//!
//! Mutating operations enforce object-level authorization: only the
//! budget's creator, or a caller holding the manage-all override, may
//! update or delete it. The check runs against the stored record, never
//! against caller-supplied data.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;
use workledger_common::time::calendar::days_spanned;
use workledger_common::time::clock::{Clock, SystemClock};
use workledger_domain::{
    AlertLevel, AuthContext, Budget, BudgetComparison, BudgetInput, BudgetUpdate, Permission,
    Result, WorkLedgerError,
};

use super::ports::BudgetStore;
use crate::costs::CostAggregationEngine;

/// Budget management engine
pub struct BudgetEngine {
    store: Arc<dyn BudgetStore>,
    costs: Arc<CostAggregationEngine>,
    clock: Arc<dyn Clock>,
}

impl BudgetEngine {
    /// Create a new budget engine
    pub fn new(store: Arc<dyn BudgetStore>, costs: Arc<CostAggregationEngine>) -> Self {
        Self { store, costs, clock: Arc::new(SystemClock) }
    }

    /// Replace the wall clock (tests drive a mock clock through this)
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a budget owned by the calling user
    pub async fn create(&self, input: BudgetInput, auth: &AuthContext) -> Result<Budget> {
        validate_window(input.start_date, input.end_date, input.amount)?;
        let thresholds = input.alert_thresholds.unwrap_or_default();
        validate_thresholds(thresholds.warning, thresholds.critical)?;

        let budget = Budget {
            id: Uuid::new_v4().to_string(),
            project: input.project,
            start_date: input.start_date,
            end_date: input.end_date,
            amount: input.amount,
            currency: input.currency,
            alert_thresholds: thresholds,
            created_by: auth.user_id.clone(),
            created_at: self.clock.now(),
        };
        let budget = self.store.create(budget).await?;
        info!(budget_id = %budget.id, created_by = %budget.created_by, "Budget created");
        Ok(budget)
    }

    /// Look up a budget by id
    pub async fn get(&self, id: &str) -> Result<Option<Budget>> {
        self.store.find_by_id(id).await
    }

    /// Every stored budget
    pub async fn list(&self) -> Result<Vec<Budget>> {
        self.store.list().await
    }

    /// Update a budget, owner or override only
    ///
    /// The merged result is re-validated before anything is written, so a
    /// partial update cannot break the date/amount invariants.
    pub async fn update(
        &self,
        id: &str,
        update: BudgetUpdate,
        auth: &AuthContext,
    ) -> Result<Budget> {
        let budget = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| WorkLedgerError::NotFound(format!("budget {id}")))?;
        authorize(&budget, auth, "modify")?;

        let mut merged = budget.clone();
        update.apply(&mut merged);
        validate_window(merged.start_date, merged.end_date, merged.amount)?;
        validate_thresholds(merged.alert_thresholds.warning, merged.alert_thresholds.critical)?;

        self.store
            .update(id, update)
            .await?
            .ok_or_else(|| WorkLedgerError::NotFound(format!("budget {id}")))
    }

    /// Delete a budget, owner or override only
    pub async fn delete(&self, id: &str, auth: &AuthContext) -> Result<()> {
        let budget = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| WorkLedgerError::NotFound(format!("budget {id}")))?;
        authorize(&budget, auth, "delete")?;

        self.store.delete(id).await?;
        info!(budget_id = %id, deleted_by = %auth.user_id, "Budget deleted");
        Ok(())
    }

    /// Compare a budget against actual cost over its date range
    ///
    /// The read path is not ownership-gated; the edge scopes which budgets
    /// a caller may see. The comparison exposes no compensation-derived
    /// fields.
    pub async fn compare(&self, budget_id: &str, _auth: &AuthContext) -> Result<BudgetComparison> {
        let budget = self
            .store
            .find_by_id(budget_id)
            .await?
            .ok_or_else(|| WorkLedgerError::NotFound(format!("budget {budget_id}")))?;

        let summary = self
            .costs
            .cost_summary_privileged(budget.start_date, budget.end_date, budget.project.as_deref())
            .await?;
        let actual_cost = summary.total_cost;
        let actual_hours = summary.total_hours;

        let utilization = actual_cost / budget.amount * 100.0;
        let alert_level = if utilization >= budget.alert_thresholds.critical {
            AlertLevel::Critical
        } else if utilization >= budget.alert_thresholds.warning {
            AlertLevel::Warning
        } else {
            AlertLevel::Ok
        };

        let now = self.clock.now();
        let days_total = days_spanned(budget.start_date, budget.end_date);
        // Clamp to [1, days_total]: a budget that has not started yet
        // extrapolates from one day, a finished one from its whole window.
        let days_elapsed = days_spanned(budget.start_date, now.min(budget.end_date))
            .clamp(1, days_total);
        let projected_cost = actual_cost / days_elapsed as f64 * days_total as f64;

        Ok(BudgetComparison {
            budget_id: budget.id,
            project: budget.project,
            amount: budget.amount,
            currency: budget.currency,
            actual_cost,
            actual_hours,
            remaining_budget: budget.amount - actual_cost,
            utilization_percentage: utilization,
            alert_level,
            projected_cost,
            projected_overspend: projected_cost - budget.amount,
            days_total,
            days_elapsed,
        })
    }
}

/// Owner-or-override check against the stored budget
fn authorize(budget: &Budget, auth: &AuthContext, action: &str) -> Result<()> {
    if auth.user_id == budget.created_by || auth.has(Permission::ManageAllBudgets) {
        return Ok(());
    }
    Err(WorkLedgerError::Authorization(format!("Not authorized to {action} this budget")))
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>, amount: f64) -> Result<()> {
    if start >= end {
        return Err(WorkLedgerError::Validation(
            "budget start date must be before end date".to_string(),
        ));
    }
    if amount <= 0.0 {
        return Err(WorkLedgerError::Validation("budget amount must be positive".to_string()));
    }
    Ok(())
}

fn validate_thresholds(warning: f64, critical: f64) -> Result<()> {
    if warning <= 0.0 || critical <= 0.0 {
        return Err(WorkLedgerError::Validation(
            "alert thresholds must be positive".to_string(),
        ));
    }
    if warning > critical {
        return Err(WorkLedgerError::Validation(
            "warning threshold cannot exceed critical threshold".to_string(),
        ));
    }
    Ok(())
}
