//! Privilege view - safe projections of cost analytics
//!
//! Pure mappings from the privileged shapes to the safe ones. The safe
//! types have no rate or salary field anywhere in their tree, so a caller
//! routed through these functions cannot receive compensation data for
//! any input, including empty datasets.

use workledger_domain::{
    ActiveContributor, CostSummary, DeveloperCost, LiveCostReport, PerformerRanking,
    ProjectCostBreakdown, SafeActiveContributor, SafeCostSummary, SafeDeveloperCost,
    SafeLiveCostReport, SafePerformerRanking, SafeProjectCostBreakdown,
};

/// Strip compensation fields from a live cost report
pub fn safe_live_cost_report(report: LiveCostReport) -> SafeLiveCostReport {
    SafeLiveCostReport {
        generated_at: report.generated_at,
        total_live_cost: report.total_live_cost,
        total_burn_rate_per_hour: report.total_burn_rate_per_hour,
        active_contributor_count: report.active_contributor_count,
        projects: report.projects,
        contributors: report.contributors.into_iter().map(safe_contributor).collect(),
    }
}

/// Strip compensation fields from a historical cost summary
pub fn safe_cost_summary(summary: CostSummary) -> SafeCostSummary {
    SafeCostSummary {
        start: summary.start,
        end: summary.end,
        project: summary.project,
        total_cost: summary.total_cost,
        total_hours: summary.total_hours,
        record_count: summary.record_count,
        projects: summary.projects.into_iter().map(safe_project_breakdown).collect(),
        top_performers: summary.top_performers.into_iter().map(safe_performer).collect(),
        daily_costs: summary.daily_costs,
        monthly_costs: summary.monthly_costs,
        overtime: summary.overtime,
    }
}

fn safe_contributor(contributor: ActiveContributor) -> SafeActiveContributor {
    SafeActiveContributor {
        user_id: contributor.user_id,
        display_name: contributor.display_name,
        projects: contributor.projects,
        active_minutes: contributor.active_minutes,
        live_cost: contributor.live_cost,
    }
}

fn safe_project_breakdown(breakdown: ProjectCostBreakdown) -> SafeProjectCostBreakdown {
    SafeProjectCostBreakdown {
        project: breakdown.project,
        cost: breakdown.cost,
        hours: breakdown.hours,
        developers: breakdown.developers.into_iter().map(safe_developer).collect(),
    }
}

fn safe_developer(developer: DeveloperCost) -> SafeDeveloperCost {
    SafeDeveloperCost {
        user_id: developer.user_id,
        display_name: developer.display_name,
        hours: developer.hours,
        cost: developer.cost,
    }
}

fn safe_performer(performer: PerformerRanking) -> SafePerformerRanking {
    SafePerformerRanking {
        user_id: performer.user_id,
        display_name: performer.display_name,
        total_hours: performer.total_hours,
        total_cost: performer.total_cost,
    }
}
