//! Current and best streaks for a habit.
//!
//! A streak is a run of consecutive due days that were all checked in.
//! Days on which the habit is not due are skipped: they neither count nor
//! break a run. Days before the habit was created are never due.
//!
//! Streaks are recomputed from the check-in index on every call.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::checkin::CheckInIndex;
use crate::habit::Habit;
use crate::schedule::days_before;

/// Default number of days examined by both scans.
pub const DEFAULT_WINDOW_DAYS: u32 = 365;

/// Largest window either scan will walk, about ten years.
pub const MAX_WINDOW_DAYS: u32 = 3650;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Run ending today (or yesterday while today is still pending).
    pub current: u32,
    /// Longest run inside the window, never less than `current`.
    pub best: u32,
}

#[derive(Debug, Clone)]
pub struct StreakCalculator {
    /// How many days back from today either scan may look.
    pub window_days: u32,
}

impl Default for StreakCalculator {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl StreakCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator with a custom window, capped at [`MAX_WINDOW_DAYS`].
    pub fn with_window(window_days: u32) -> Self {
        Self {
            window_days: window_days.min(MAX_WINDOW_DAYS),
        }
    }

    /// Compute both streaks for `habit` as of `today`.
    pub fn calculate(&self, habit: &Habit, check_ins: &CheckInIndex, today: NaiveDate) -> Streak {
        let current = self.current(habit, check_ins, today);
        let best = self.best_closed(habit, check_ins, today).max(current);
        Streak { current, best }
    }

    /// Walk backwards from today. An unchecked today is pending rather than
    /// missed, so the walk starts at yesterday in that case.
    pub fn current(&self, habit: &Habit, check_ins: &CheckInIndex, today: NaiveDate) -> u32 {
        let done_today = check_ins.is_done(&habit.id, today);
        let offset = if done_today { 0 } else { 1 };
        let due = habit.due_dates();

        let mut current = 0;
        for i in 0..i64::from(self.window_days) {
            let day = days_before(today, i + offset);
            if day < due.created_on() {
                break;
            }
            if !due.is_due(day) {
                continue;
            }
            if check_ins.is_done(&habit.id, day) {
                current += 1;
            } else {
                break;
            }
        }
        current
    }

    /// Longest run found scanning the window oldest to newest.
    fn best_closed(&self, habit: &Habit, check_ins: &CheckInIndex, today: NaiveDate) -> u32 {
        if self.window_days == 0 {
            return 0;
        }
        let due = habit.due_dates();
        let oldest = days_before(today, i64::from(self.window_days) - 1).max(due.created_on());

        let mut run = 0;
        let mut best = 0;
        for day in oldest.iter_days().take_while(|d| *d <= today) {
            if !due.is_due(day) {
                continue;
            }
            if check_ins.is_done(&habit.id, day) {
                run += 1;
                best = best.max(run);
            } else {
                run = 0;
            }
        }
        best
    }
}
