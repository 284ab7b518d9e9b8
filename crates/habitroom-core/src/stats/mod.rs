//! Statistics module for Habitroom
//!
//! Completion counts and rates over calendar periods, the trailing daily
//! series used for charts, per-day calendar status and weekly targets.
//! Everything here is a pure function of the active habits, the check-in
//! index and the date passed in as "today".

mod calendar;
mod period;
mod weekly_target;

pub use calendar::{due_on, month_calendar, today_progress, CalendarDay, DayStatus, TodayProgress};
pub use period::{DayTally, Period, PeriodStats, StatsAnalyzer, DEFAULT_TRAILING_DAYS, MAX_TRAILING_DAYS};
pub use weekly_target::{weekly_targets, WeeklyTarget};

use crate::habit::Habit;

/// Habits selected by an optional single-habit filter.
pub(crate) fn select<'a>(
    habits: &'a [Habit],
    habit_id: Option<&'a str>,
) -> impl Iterator<Item = &'a Habit> + Clone + 'a {
    habits
        .iter()
        .filter(move |h| !h.archived && habit_id.map_or(true, |id| h.id == id))
}

/// `done / should_do` as a whole percentage, 0 when nothing was due.
pub fn completion_rate(done: u32, should_do: u32) -> u32 {
    if should_do == 0 {
        return 0;
    }
    ((f64::from(done) / f64::from(should_do)) * 100.0).round() as u32
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_rounds_to_nearest_percent() {
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(1, 2), 50);
        assert_eq!(completion_rate(1, 8), 13);
        assert_eq!(completion_rate(5, 5), 100);
    }

    #[test]
    fn rate_is_zero_when_nothing_due() {
        assert_eq!(completion_rate(0, 0), 0);
    }
}
