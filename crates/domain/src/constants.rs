//! Domain constants
//!
//! Centralized location for all domain-level constants used throughout the
//! engines.

// Compensation & aggregation
pub const STANDARD_MONTHLY_HOURS: f64 = 160.0;
pub const TOP_PERFORMER_LIMIT: usize = 20;

// Timer defaults
pub const DEFAULT_TASK_LABEL: &str = "General work";
pub const MS_PER_MINUTE: i64 = 60_000;

// Forecasting
pub const TREND_SLOPE_THRESHOLD: f64 = 0.01;

// Budget alert defaults (percent utilization)
pub const DEFAULT_WARNING_THRESHOLD: f64 = 75.0;
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 90.0;

// Event names published on timer transitions
pub const EVENT_TIMER_STARTED: &str = "timer-started";
pub const EVENT_TIMER_PAUSED: &str = "timer-paused";
pub const EVENT_TIMER_RESUMED: &str = "timer-resumed";
pub const EVENT_TIMER_STOPPED: &str = "timer-stopped";
pub const EVENT_TIMER_TASK_ADDED: &str = "timer-task-added";
