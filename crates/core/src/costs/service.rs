//! Cost aggregation engine - burn rate and historical summaries
//!
//! The engine always computes the full privileged shape internally; the
//! public entry points project it through [`super::view`] so the safe
//! shape never carries compensation-derived fields, even if an edge-layer
//! permission check is bypassed by mistake. The engine itself performs no
//! permission checks; callers of the `_privileged` operations verify
//! elevated access at the edge.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use workledger_common::time::calendar::{day_key, month_key};
use workledger_common::time::clock::{Clock, SystemClock};
use workledger_domain::{
    ActiveContributor, CostSummary, DailyCost, DeveloperCost, EngineConfig, LiveCostReport,
    MonthlyCost, OvertimeSplit, PerformerRanking, ProjectCostBreakdown, ProjectLiveCost, Result,
    SafeCostSummary, SafeLiveCostReport, UserProfile,
};

use super::ports::UserDirectory;
use super::view;
use crate::timer::ports::TimeRecordStore;

#[derive(Default)]
struct ProjectAccumulator {
    cost: f64,
    burn_rate: f64,
    minutes: i64,
    contributors: HashSet<String>,
}

#[derive(Default)]
struct BreakdownAccumulator {
    cost: f64,
    hours: f64,
    developers: HashMap<String, DeveloperCost>,
}

/// Cost aggregation engine
pub struct CostAggregationEngine {
    store: Arc<dyn TimeRecordStore>,
    directory: Arc<dyn UserDirectory>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl CostAggregationEngine {
    /// Create a new aggregation engine
    pub fn new(store: Arc<dyn TimeRecordStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            store,
            directory,
            clock: Arc::new(SystemClock),
            config: EngineConfig::default(),
        }
    }

    /// Replace the wall clock (tests drive a mock clock through this)
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the engine configuration
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Hourly rate derived from a monthly salary
    pub fn hourly_rate(&self, monthly_salary: f64) -> f64 {
        monthly_salary / self.config.standard_monthly_hours
    }

    /// Live cost across all active sessions, safe shape
    pub async fn live_cost(&self) -> Result<SafeLiveCostReport> {
        Ok(view::safe_live_cost_report(self.live_cost_privileged().await?))
    }

    /// Live cost across all active sessions, privileged shape
    ///
    /// Per-project figures: cost and minutes carry each session's even
    /// share across its projects; the burn rate sums the full hourly rate
    /// of every contributor active on the project. Returns an empty report
    /// when nothing is active.
    pub async fn live_cost_privileged(&self) -> Result<LiveCostReport> {
        let now = self.clock.now();
        let active = self.store.find_all_active().await?;

        let mut projects: BTreeMap<String, ProjectAccumulator> = BTreeMap::new();
        let mut contributors = Vec::new();
        let mut counted_users = HashSet::new();
        let mut total_cost = 0.0;
        let mut total_burn_rate = 0.0;

        for record in active {
            let Some(profile) = self.resolve_profile(&record.user_id).await else {
                continue;
            };
            let rate = self.hourly_rate(profile.monthly_salary);
            let minutes = record.live_duration_minutes(now);
            let cost = minutes as f64 / 60.0 * rate;

            total_cost += cost;
            if counted_users.insert(record.user_id.clone()) {
                total_burn_rate += rate;
            }
            contributors.push(ActiveContributor {
                user_id: record.user_id.clone(),
                display_name: profile.display_name.clone(),
                projects: record.projects.clone(),
                active_minutes: minutes,
                live_cost: cost,
                hourly_rate: rate,
            });

            if record.projects.is_empty() {
                continue;
            }
            let share = 1.0 / record.projects.len() as f64;
            for project in &record.projects {
                let acc = projects.entry(project.clone()).or_default();
                acc.cost += cost * share;
                acc.burn_rate += rate;
                acc.minutes += (minutes as f64 * share) as i64;
                acc.contributors.insert(record.user_id.clone());
            }
        }

        contributors.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        let projects = projects
            .into_iter()
            .map(|(project, acc)| ProjectLiveCost {
                project,
                live_cost: acc.cost,
                burn_rate_per_hour: acc.burn_rate,
                contributor_count: acc.contributors.len(),
                active_minutes: acc.minutes,
            })
            .collect();

        Ok(LiveCostReport {
            generated_at: now,
            total_live_cost: total_cost,
            total_burn_rate_per_hour: total_burn_rate,
            active_contributor_count: counted_users.len(),
            projects,
            contributors,
        })
    }

    /// Historical cost summary over a date range, safe shape
    pub async fn cost_summary(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        project: Option<&str>,
    ) -> Result<SafeCostSummary> {
        Ok(view::safe_cost_summary(self.cost_summary_privileged(start, end, project).await?))
    }

    /// Historical cost summary over a date range, privileged shape
    ///
    /// Considers completed records whose session start falls in the range,
    /// optionally filtered to sessions that include `project`. A record
    /// spanning several projects has its cost and hours split evenly
    /// across them (not time-weighted); downstream consumers depend on
    /// these numbers, so the even split is part of the contract. Records
    /// whose user cannot be resolved are skipped.
    pub async fn cost_summary_privileged(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        project: Option<&str>,
    ) -> Result<CostSummary> {
        let records = self.store.find_in_range(start, end).await?;

        let mut total_cost = 0.0;
        let mut total_hours = 0.0;
        let mut record_count = 0;
        let mut projects: BTreeMap<String, BreakdownAccumulator> = BTreeMap::new();
        let mut performers: HashMap<String, PerformerRanking> = HashMap::new();
        let mut daily: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let mut monthly: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let mut overtime = OvertimeSplit::default();
        let mut profile_cache: HashMap<String, Option<UserProfile>> = HashMap::new();

        for record in records {
            if record.is_active {
                continue;
            }
            if let Some(filter) = project {
                if !record.projects.iter().any(|p| p == filter) {
                    continue;
                }
            }

            let profile = match profile_cache.get(&record.user_id) {
                Some(cached) => cached.clone(),
                None => {
                    let resolved = self.resolve_profile(&record.user_id).await;
                    profile_cache.insert(record.user_id.clone(), resolved.clone());
                    resolved
                }
            };
            let Some(profile) = profile else {
                continue;
            };

            let rate = self.hourly_rate(profile.monthly_salary);
            let hours = record.duration_minutes as f64 / 60.0;
            let cost = hours * rate;

            total_cost += cost;
            total_hours += hours;
            record_count += 1;

            let day = daily.entry(day_key(record.start_time)).or_insert((0.0, 0.0));
            day.0 += cost;
            day.1 += hours;
            let month = monthly.entry(month_key(record.start_time)).or_insert((0.0, 0.0));
            month.0 += cost;
            month.1 += hours;

            if record.is_overtime {
                overtime.overtime_hours += hours;
                overtime.overtime_cost += cost;
            } else {
                overtime.regular_hours += hours;
                overtime.regular_cost += cost;
            }

            let performer = performers.entry(record.user_id.clone()).or_insert_with(|| {
                PerformerRanking {
                    user_id: record.user_id.clone(),
                    display_name: profile.display_name.clone(),
                    total_hours: 0.0,
                    total_cost: 0.0,
                    hourly_rate: rate,
                }
            });
            performer.total_hours += hours;
            performer.total_cost += cost;

            if record.projects.is_empty() {
                continue;
            }
            let share = 1.0 / record.projects.len() as f64;
            for name in &record.projects {
                let breakdown = projects.entry(name.clone()).or_default();
                breakdown.cost += cost * share;
                breakdown.hours += hours * share;
                let developer = breakdown
                    .developers
                    .entry(record.user_id.clone())
                    .or_insert_with(|| DeveloperCost {
                        user_id: record.user_id.clone(),
                        display_name: profile.display_name.clone(),
                        hours: 0.0,
                        cost: 0.0,
                        hourly_rate: rate,
                    });
                developer.hours += hours * share;
                developer.cost += cost * share;
            }
        }

        let projects = projects
            .into_iter()
            .map(|(name, acc)| {
                let mut developers: Vec<DeveloperCost> = acc.developers.into_values().collect();
                developers.sort_by(|a, b| {
                    b.hours
                        .partial_cmp(&a.hours)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| a.user_id.cmp(&b.user_id))
                });
                ProjectCostBreakdown { project: name, cost: acc.cost, hours: acc.hours, developers }
            })
            .collect();

        let mut top_performers: Vec<PerformerRanking> = performers.into_values().collect();
        top_performers.sort_by(|a, b| {
            b.total_hours
                .partial_cmp(&a.total_hours)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        top_performers.truncate(self.config.top_performer_limit);

        Ok(CostSummary {
            start,
            end,
            project: project.map(ToString::to_string),
            total_cost,
            total_hours,
            record_count,
            projects,
            top_performers,
            daily_costs: daily
                .into_iter()
                .map(|(day, (cost, hours))| DailyCost { day, cost, hours })
                .collect(),
            monthly_costs: monthly
                .into_iter()
                .map(|(month, (cost, hours))| MonthlyCost { month, cost, hours })
                .collect(),
            overtime,
        })
    }

    /// Resolve a user, treating directory misses and outages as skippable
    ///
    /// Aggregations drop the affected records instead of failing the whole
    /// report.
    async fn resolve_profile(&self, user_id: &str) -> Option<UserProfile> {
        match self.directory.resolve(user_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                warn!(user_id = %user_id, "Skipping records for user missing from directory");
                None
            }
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "Directory lookup failed; skipping user");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use workledger_common::time::clock::MockClock;
    use workledger_domain::{TaskEntry, TimeRecord};

    use super::*;
    use crate::testing::{profile, InMemoryTimeRecordStore, StaticUserDirectory};

    fn completed_record(
        id: &str,
        user_id: &str,
        projects: &[&str],
        start: DateTime<Utc>,
        duration_minutes: i64,
        is_overtime: bool,
    ) -> TimeRecord {
        TimeRecord {
            id: id.to_string(),
            user_id: user_id.to_string(),
            projects: projects.iter().map(ToString::to_string).collect(),
            tasks: vec![TaskEntry {
                text: "work".to_string(),
                added_at: start,
                duration_minutes,
            }],
            start_time: start,
            end_time: Some(start + Duration::minutes(duration_minutes)),
            is_active: false,
            is_paused: false,
            paused_duration_ms: 0,
            last_paused_at: None,
            duration_minutes,
            is_overtime,
        }
    }

    fn engine(
        store: Arc<InMemoryTimeRecordStore>,
        directory: Arc<StaticUserDirectory>,
        clock: MockClock,
    ) -> CostAggregationEngine {
        CostAggregationEngine::new(store, directory).with_clock(Arc::new(clock))
    }

    #[tokio::test]
    async fn test_hourly_rate_uses_standard_monthly_hours() {
        let store = Arc::new(InMemoryTimeRecordStore::new());
        let directory = Arc::new(StaticUserDirectory::new());
        let engine = engine(store, directory, MockClock::new());

        assert!((engine.hourly_rate(16_000.0) - 100.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_live_cost_empty_when_nothing_active() {
        let store = Arc::new(InMemoryTimeRecordStore::new());
        let directory = Arc::new(StaticUserDirectory::new());
        let engine = engine(store, directory, MockClock::new());

        let report = engine.live_cost().await.unwrap();
        assert_eq!(report.total_live_cost, 0.0);
        assert_eq!(report.total_burn_rate_per_hour, 0.0);
        assert!(report.projects.is_empty());
        assert!(report.contributors.is_empty());
    }

    #[tokio::test]
    async fn test_cost_splits_evenly_across_projects() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let store = Arc::new(InMemoryTimeRecordStore::new());
        let directory =
            Arc::new(StaticUserDirectory::new().with_profile(profile("user-1", "Ada", 16_000.0)));
        let record = completed_record("rec-1", "user-1", &["A", "B"], start, 60, false);
        store.create(record).await.unwrap();

        let engine = engine(store, directory, MockClock::at(start + Duration::days(1)));
        let summary = engine
            .cost_summary_privileged(start - Duration::hours(1), start + Duration::hours(1), None)
            .await
            .unwrap();

        assert!((summary.total_cost - 100.0).abs() < 1e-9);
        assert!((summary.total_hours - 1.0).abs() < 1e-9);
        assert_eq!(summary.projects.len(), 2);
        for breakdown in &summary.projects {
            assert!((breakdown.cost - 50.0).abs() < 1e-9);
            assert!((breakdown.hours - 0.5).abs() < 1e-9);
            assert_eq!(breakdown.developers.len(), 1);
            assert!((breakdown.developers[0].hourly_rate - 100.0).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_unresolved_users_are_skipped_not_errors() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let store = Arc::new(InMemoryTimeRecordStore::new());
        let directory =
            Arc::new(StaticUserDirectory::new().with_profile(profile("user-1", "Ada", 16_000.0)));
        store
            .create(completed_record("rec-1", "user-1", &["A"], start, 60, false))
            .await
            .unwrap();
        store
            .create(completed_record("rec-2", "ghost", &["A"], start, 60, false))
            .await
            .unwrap();

        let engine = engine(store, directory, MockClock::at(start + Duration::days(1)));
        let summary = engine
            .cost_summary_privileged(start - Duration::hours(1), start + Duration::hours(1), None)
            .await
            .unwrap();

        assert_eq!(summary.record_count, 1);
        assert!((summary.total_cost - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_overtime_split_follows_record_flag() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let store = Arc::new(InMemoryTimeRecordStore::new());
        let directory =
            Arc::new(StaticUserDirectory::new().with_profile(profile("user-1", "Ada", 16_000.0)));
        store
            .create(completed_record("rec-1", "user-1", &["A"], start, 120, false))
            .await
            .unwrap();
        store
            .create(completed_record("rec-2", "user-1", &["A"], start + Duration::hours(10), 30, true))
            .await
            .unwrap();

        let engine = engine(store, directory, MockClock::at(start + Duration::days(1)));
        let summary = engine
            .cost_summary_privileged(start - Duration::hours(1), start + Duration::hours(12), None)
            .await
            .unwrap();

        assert!((summary.overtime.regular_hours - 2.0).abs() < 1e-9);
        assert!((summary.overtime.regular_cost - 200.0).abs() < 1e-9);
        assert!((summary.overtime.overtime_hours - 0.5).abs() < 1e-9);
        assert!((summary.overtime.overtime_cost - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_project_filter_keeps_multi_project_sessions() {
        let start = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let store = Arc::new(InMemoryTimeRecordStore::new());
        let directory =
            Arc::new(StaticUserDirectory::new().with_profile(profile("user-1", "Ada", 16_000.0)));
        store
            .create(completed_record("rec-1", "user-1", &["A", "B"], start, 60, false))
            .await
            .unwrap();
        store
            .create(completed_record("rec-2", "user-1", &["C"], start, 60, false))
            .await
            .unwrap();

        let engine = engine(store, directory, MockClock::at(start + Duration::days(1)));
        let summary = engine
            .cost_summary_privileged(start - Duration::hours(1), start + Duration::hours(1), Some("B"))
            .await
            .unwrap();

        // Only the session that includes B counts, still evenly split.
        assert_eq!(summary.record_count, 1);
        assert!((summary.total_cost - 100.0).abs() < 1e-9);
        let b = summary.projects.iter().find(|p| p.project == "B").unwrap();
        assert!((b.cost - 50.0).abs() < 1e-9);
    }
}
