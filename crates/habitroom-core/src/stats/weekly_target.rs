//! Progress of weekly habits toward their "N times per week" target.
//!
//! The target never affects whether a day is due or how streaks are
//! counted; it is reported alongside the other statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::select;
use crate::checkin::CheckInIndex;
use crate::habit::Habit;
use crate::schedule::DateWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTarget {
    pub habit_id: String,
    pub target: u8,
    /// Check-ins in the current ISO week up to today.
    pub done: u32,
    pub met: bool,
}

/// One entry per active weekly habit, in registry order.
pub fn weekly_targets(habits: &[Habit], check_ins: &CheckInIndex, today: NaiveDate) -> Vec<WeeklyTarget> {
    let week = DateWindow::iso_week(today);
    select(habits, None)
        .filter_map(|habit| {
            let target = habit.frequency.weekly_target()?;
            let created_on = habit.created_on();
            let done = check_ins
                .all_for_habit(&habit.id)
                .filter(|c| week.contains(c.date) && c.date <= today && c.date >= created_on)
                .count() as u32;
            Some(WeeklyTarget {
                habit_id: habit.id.clone(),
                target,
                done,
                met: done >= u32::from(target),
            })
        })
        .collect()
}
