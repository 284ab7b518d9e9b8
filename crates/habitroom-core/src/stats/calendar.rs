//! Per-day views: what is due, how much of it is done, and month grids.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::select;
use crate::checkin::CheckInIndex;
use crate::habit::{DueDates, Habit};
use crate::schedule::DateWindow;

/// Completion state of a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Nothing was due.
    None,
    /// Everything due was done.
    Complete,
    /// Some but not all of it was done.
    Partial,
    /// Something was due and nothing was done.
    Missed,
    /// The day is after today.
    Upcoming,
}

impl DayStatus {
    /// Classify `done` out of `due`.
    pub fn from_counts(done: u32, due: u32) -> Self {
        if due == 0 {
            DayStatus::None
        } else if done == due {
            DayStatus::Complete
        } else if done > 0 {
            DayStatus::Partial
        } else {
            DayStatus::Missed
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub done: u32,
    pub due: u32,
    pub status: DayStatus,
}

/// Done/total over the habits due on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayProgress {
    pub done: u32,
    pub total: u32,
}

impl TodayProgress {
    /// True when at least one habit is due and all of them are done.
    pub fn all_done(&self) -> bool {
        self.total > 0 && self.done == self.total
    }
}

/// Active habits due on `date`, in the order given.
pub fn due_on(habits: &[Habit], date: NaiveDate) -> Vec<&Habit> {
    select(habits, None).filter(|h| h.is_due_on(date)).collect()
}

/// Progress over the habits due on `date`.
pub fn today_progress(habits: &[Habit], check_ins: &CheckInIndex, date: NaiveDate) -> TodayProgress {
    let selected = resolve(habits, None);
    let (done, due) = count_day(&selected, check_ins, date);
    TodayProgress { done, total: due }
}

/// One entry per day of the month containing `month`.
///
/// Days after `today` are [`DayStatus::Upcoming`] with zero counts.
pub fn month_calendar(
    habits: &[Habit],
    check_ins: &CheckInIndex,
    habit_id: Option<&str>,
    month: NaiveDate,
    today: NaiveDate,
) -> Vec<CalendarDay> {
    let selected = resolve(habits, habit_id);
    DateWindow::month(month)
        .days()
        .map(|date| {
            if date > today {
                return CalendarDay {
                    date,
                    done: 0,
                    due: 0,
                    status: DayStatus::Upcoming,
                };
            }
            let (done, due) = count_day(&selected, check_ins, date);
            CalendarDay {
                date,
                done,
                due,
                status: DayStatus::from_counts(done, due),
            }
        })
        .collect()
}

fn resolve<'a>(habits: &'a [Habit], habit_id: Option<&'a str>) -> Vec<(&'a Habit, DueDates<'a>)> {
    select(habits, habit_id).map(|h| (h, h.due_dates())).collect()
}

fn count_day(selected: &[(&Habit, DueDates<'_>)], check_ins: &CheckInIndex, date: NaiveDate) -> (u32, u32) {
    let mut done = 0;
    let mut due = 0;
    for (habit, _) in selected.iter().filter(|(_, d)| d.is_due(date)) {
        due += 1;
        if check_ins.is_done(&habit.id, date) {
            done += 1;
        }
    }
    (done, due)
}
