//! Domain types and models

pub mod audit;
pub mod auth;
pub mod budget;
pub mod costs;
pub mod forecast;
pub mod time_record;
pub mod user;

// Re-export the working set for convenience
pub use audit::{AuditEntry, TimerAction};
pub use auth::{AuthContext, Permission};
pub use budget::{
    AlertLevel, AlertThresholds, Budget, BudgetComparison, BudgetInput, BudgetUpdate,
};
pub use costs::{
    ActiveContributor, CostSummary, DailyCost, DeveloperCost, LiveCostReport, MonthlyCost,
    OvertimeSplit, PerformerRanking, ProjectCostBreakdown, ProjectLiveCost, SafeActiveContributor,
    SafeCostSummary, SafeDeveloperCost, SafeLiveCostReport, SafePerformerRanking,
    SafeProjectCostBreakdown,
};
pub use forecast::{CostForecast, Trend};
pub use time_record::{TaskEntry, TimeRecord, TimeRecordUpdate};
pub use user::UserProfile;
