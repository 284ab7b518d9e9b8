//! Period completion statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{completion_rate, select};
use crate::checkin::CheckInIndex;
use crate::habit::Habit;
use crate::schedule::DateWindow;

/// Default length of the trailing daily series.
pub const DEFAULT_TRAILING_DAYS: u32 = 30;

/// Longest trailing window, about ten years.
pub const MAX_TRAILING_DAYS: u32 = 3650;

/// Calendar period a statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Just today.
    Today,
    /// ISO week (Monday start) containing today.
    Week,
    /// Calendar month containing today.
    Month,
    /// The trailing days ending today.
    Trailing,
}

/// Completion counts over a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStats {
    /// Due (habit, date) pairs done.
    pub done: u32,
    /// Due (habit, date) pairs in the period, up to today.
    pub should_do: u32,
    /// `round(done / should_do * 100)`, 0 when nothing was due.
    pub rate: u32,
}

impl PeriodStats {
    fn record(&mut self, done: bool) {
        self.should_do += 1;
        if done {
            self.done += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.rate = completion_rate(self.done, self.should_do);
        self
    }
}

/// One point of the trailing series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTally {
    pub date: NaiveDate,
    pub done: u32,
    pub total: u32,
}

/// Analyzer for completion statistics
#[derive(Debug, Clone)]
pub struct StatsAnalyzer {
    /// Length of the trailing window in days
    pub trailing_days: u32,
}

impl Default for StatsAnalyzer {
    fn default() -> Self {
        Self {
            trailing_days: DEFAULT_TRAILING_DAYS,
        }
    }
}

impl StatsAnalyzer {
    /// Create a new analyzer with the default trailing window
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new analyzer with a custom trailing window, capped at
    /// [`MAX_TRAILING_DAYS`]
    pub fn with_trailing_days(trailing_days: u32) -> Self {
        Self {
            trailing_days: trailing_days.min(MAX_TRAILING_DAYS),
        }
    }

    /// Date window covered by `period` as of `today`.
    pub fn window(&self, period: Period, today: NaiveDate) -> DateWindow {
        match period {
            Period::Today => DateWindow::day(today),
            Period::Week => DateWindow::iso_week(today),
            Period::Month => DateWindow::month(today),
            Period::Trailing => DateWindow::trailing(today, self.trailing_days),
        }
    }

    /// Count due and done (habit, date) pairs in `period`.
    ///
    /// Only dates up to `today` and on or after each habit's creation date
    /// are considered.
    ///
    /// # Arguments
    /// * `habits` - Active habits
    /// * `check_ins` - Check-in index
    /// * `habit_id` - Restrict to one habit, or `None` for all
    pub fn period(
        &self,
        habits: &[Habit],
        check_ins: &CheckInIndex,
        habit_id: Option<&str>,
        period: Period,
        today: NaiveDate,
    ) -> PeriodStats {
        let window = self.window(period, today);
        let mut stats = PeriodStats::default();

        for habit in select(habits, habit_id) {
            let due = habit.due_dates();
            for date in window.days().take_while(|d| *d <= today) {
                if !due.is_due(date) {
                    continue;
                }
                stats.record(check_ins.is_done(&habit.id, date));
            }
        }

        tracing::debug!(?period, done = stats.done, should_do = stats.should_do, "period stats");
        stats.finish()
    }

    /// Per-day done/total over the trailing window, oldest first.
    pub fn trailing_series(
        &self,
        habits: &[Habit],
        check_ins: &CheckInIndex,
        habit_id: Option<&str>,
        today: NaiveDate,
    ) -> Vec<DayTally> {
        let selected: Vec<_> = select(habits, habit_id)
            .map(|h| (h, h.due_dates()))
            .collect();
        DateWindow::trailing(today, self.trailing_days)
            .days()
            .map(|date| {
                let mut tally = DayTally {
                    date,
                    done: 0,
                    total: 0,
                };
                for (habit, _) in selected.iter().filter(|(_, due)| due.is_due(date)) {
                    tally.total += 1;
                    if check_ins.is_done(&habit.id, date) {
                        tally.done += 1;
                    }
                }
                tally
            })
            .collect()
    }
}
