use clap::Subcommand;
use habitroom_core::{Period, PeriodStats};
use serde::Serialize;

use super::{open_tracker, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's completion rate
    Today {
        /// Restrict to one habit
        #[arg(long)]
        habit: Option<String>,
    },
    /// This ISO week (Monday start)
    Week {
        /// Restrict to one habit
        #[arg(long)]
        habit: Option<String>,
    },
    /// This calendar month
    Month {
        /// Restrict to one habit
        #[arg(long)]
        habit: Option<String>,
    },
    /// Trailing window, with a per-day series
    Trailing {
        /// Restrict to one habit
        #[arg(long)]
        habit: Option<String>,
    },
    /// Done/total of today's due habits
    Progress,
    /// Weekly targets of "N times per week" habits
    Targets,
}

#[derive(Serialize)]
struct PeriodReport {
    period: Period,
    #[serde(flatten)]
    stats: PeriodStats,
}

pub fn run(action: StatsAction) -> CmdResult {
    let tracker = open_tracker()?;
    let today = habitroom_core::tracker::today();

    let (period, habit) = match action {
        StatsAction::Today { habit } => (Period::Today, habit),
        StatsAction::Week { habit } => (Period::Week, habit),
        StatsAction::Month { habit } => (Period::Month, habit),
        StatsAction::Trailing { habit } => {
            let stats = tracker.period_stats(Period::Trailing, habit.as_deref(), today);
            let series = tracker.trailing_series(habit.as_deref(), today);
            return print_json(&serde_json::json!({
                "period": Period::Trailing,
                "done": stats.done,
                "should_do": stats.should_do,
                "rate": stats.rate,
                "series": series,
            }));
        }
        StatsAction::Progress => {
            let progress = tracker.today_progress(today);
            return print_json(&serde_json::json!({
                "date": today,
                "done": progress.done,
                "total": progress.total,
                "all_done": progress.all_done(),
            }));
        }
        StatsAction::Targets => return print_json(&tracker.weekly_targets(today)),
    };

    let stats = tracker.period_stats(period, habit.as_deref(), today);
    print_json(&PeriodReport { period, stats })
}
