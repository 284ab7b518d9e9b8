//! Application state: the store plus its in-memory mirrors.
//!
//! [`Tracker`] is the single write path. Each mutation is persisted first
//! and mirrored only when the store accepts it, so a failed write leaves
//! the in-memory state at the last persisted version. Derived views
//! (streaks, statistics, calendars) are read-only and take `today`
//! explicitly.

use chrono::{DateTime, Local, NaiveDate, Utc};

use crate::checkin::{CheckIn, CheckInIndex};
use crate::error::{CoreError, Result};
use crate::habit::{Habit, HabitPatch, HabitRegistry, NewHabit};
use crate::settings::{Settings, ThemeMode};
use crate::stats::{
    self, CalendarDay, DayTally, Period, PeriodStats, StatsAnalyzer, TodayProgress, WeeklyTarget,
};
use crate::storage::Store;
use crate::streak::{Streak, StreakCalculator};

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct Tracker<S: Store> {
    store: S,
    habits: HabitRegistry,
    check_ins: CheckInIndex,
    settings: Settings,
    streaks: StreakCalculator,
    analyzer: StatsAnalyzer,
}

impl<S: Store> Tracker<S> {
    /// Load habits, check-ins and settings from `store`.
    pub fn open(store: S) -> Result<Self> {
        Self::open_with(store, StreakCalculator::default(), StatsAnalyzer::default())
    }

    /// Like [`Tracker::open`] with explicit streak/statistics settings.
    pub fn open_with(mut store: S, streaks: StreakCalculator, analyzer: StatsAnalyzer) -> Result<Self> {
        let mut habits = HabitRegistry::new();
        habits.load(&store)?;
        let mut check_ins = CheckInIndex::new();
        check_ins.load(&store)?;
        let settings = Settings::load_or_init(&mut store, Utc::now())?;
        tracing::debug!(
            habits = habits.len(),
            check_ins = check_ins.len(),
            "tracker opened"
        );
        Ok(Self {
            store,
            habits,
            check_ins,
            settings,
            streaks,
            analyzer,
        })
    }

    /// Re-read everything from the store.
    pub fn reload(&mut self) -> Result<()> {
        self.habits.load(&self.store)?;
        self.check_ins.load(&self.store)?;
        if let Some(settings) = self.store.get_settings()? {
            self.settings = settings;
        }
        Ok(())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn habits(&self) -> &[Habit] {
        self.habits.habits()
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.get(id)
    }

    pub fn registry(&self) -> &HabitRegistry {
        &self.habits
    }

    pub fn check_ins(&self) -> &CheckInIndex {
        &self.check_ins
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // === Mutations ===

    pub fn create_habit(&mut self, fields: NewHabit) -> Result<Habit> {
        self.create_habit_at(fields, Utc::now())
    }

    pub fn create_habit_at(&mut self, fields: NewHabit, now: DateTime<Utc>) -> Result<Habit> {
        self.habits.create(&mut self.store, fields, now)
    }

    /// Update an active habit. Returns `None` if there is no such habit.
    pub fn update_habit(&mut self, id: &str, patch: HabitPatch) -> Result<Option<Habit>> {
        match self.habits.update(&mut self.store, id, patch, Utc::now()) {
            Ok(habit) => Ok(Some(habit)),
            Err(e) => absorb_not_found(e, id, "update"),
        }
    }

    /// Archive a habit and delete its check-ins.
    ///
    /// Returns `false` if there is no such active habit. The two steps are
    /// not transactional: if the cascade fails the habit stays archived and
    /// its orphaned check-ins are left in the store, excluded from every
    /// computation because the habit is no longer active.
    pub fn delete_habit(&mut self, id: &str) -> Result<bool> {
        if let Err(e) = self.habits.archive(&mut self.store, id) {
            return absorb_not_found::<Habit>(e, id, "delete").map(|_| false);
        }
        match self.check_ins.remove_habit(&mut self.store, id) {
            Ok(deleted) => {
                tracing::info!(habit_id = id, deleted, "habit deleted");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(habit_id = id, error = %e, "habit archived but check-in cascade failed");
                Err(e)
            }
        }
    }

    /// Toggle today's check-in for a habit.
    pub fn toggle(&mut self, habit_id: &str) -> Result<Option<bool>> {
        self.toggle_on(habit_id, today())
    }

    /// Toggle a habit's check-in on `date`.
    ///
    /// Returns `Some(true)` when now done, `Some(false)` when undone, and
    /// `None` if the habit is not active.
    pub fn toggle_on(&mut self, habit_id: &str, date: NaiveDate) -> Result<Option<bool>> {
        if !self.habits.contains(habit_id) {
            tracing::warn!(habit_id, "toggle for unknown habit ignored");
            return Ok(None);
        }
        self.check_ins
            .toggle(&mut self.store, habit_id, date, Utc::now())
            .map(Some)
    }

    pub fn set_theme(&mut self, theme: ThemeMode) -> Result<()> {
        self.settings.set_theme(&mut self.store, theme)
    }

    pub fn set_notifications(&mut self, enabled: bool) -> Result<()> {
        self.settings.set_notifications(&mut self.store, enabled)
    }

    // === Derived views ===

    pub fn check_in(&self, habit_id: &str, date: NaiveDate) -> Option<&CheckIn> {
        self.check_ins.get(habit_id, date)
    }

    /// Streak of an active habit, `None` if unknown.
    pub fn streak(&self, habit_id: &str, today: NaiveDate) -> Option<Streak> {
        let habit = self.habits.get(habit_id)?;
        Some(self.streaks.calculate(habit, &self.check_ins, today))
    }

    pub fn period_stats(&self, period: Period, habit_id: Option<&str>, today: NaiveDate) -> PeriodStats {
        self.analyzer
            .period(self.habits.habits(), &self.check_ins, habit_id, period, today)
    }

    pub fn trailing_series(&self, habit_id: Option<&str>, today: NaiveDate) -> Vec<DayTally> {
        self.analyzer
            .trailing_series(self.habits.habits(), &self.check_ins, habit_id, today)
    }

    pub fn due_on(&self, date: NaiveDate) -> Vec<&Habit> {
        stats::due_on(self.habits.habits(), date)
    }

    pub fn today_progress(&self, today: NaiveDate) -> TodayProgress {
        stats::today_progress(self.habits.habits(), &self.check_ins, today)
    }

    pub fn month_calendar(&self, month: NaiveDate, habit_id: Option<&str>, today: NaiveDate) -> Vec<CalendarDay> {
        stats::month_calendar(self.habits.habits(), &self.check_ins, habit_id, month, today)
    }

    pub fn weekly_targets(&self, today: NaiveDate) -> Vec<WeeklyTarget> {
        stats::weekly_targets(self.habits.habits(), &self.check_ins, today)
    }
}

fn absorb_not_found<T>(err: CoreError, id: &str, action: &str) -> Result<Option<T>> {
    if err.is_not_found() {
        tracing::warn!(habit_id = id, action, "habit not found, nothing to do");
        Ok(None)
    } else {
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn open_initializes_settings() {
        let tracker = Tracker::open(MemoryStore::new()).unwrap();
        assert_eq!(tracker.settings().theme, ThemeMode::System);
        assert!(tracker.store().get_settings().unwrap().is_some());
    }

    #[test]
    fn unknown_habit_mutations_are_no_ops() {
        let mut tracker = Tracker::open(MemoryStore::new()).unwrap();
        assert_eq!(tracker.update_habit("ghost", HabitPatch::default()).unwrap(), None);
        assert!(!tracker.delete_habit("ghost").unwrap());
        assert_eq!(tracker.toggle_on("ghost", today()).unwrap(), None);
        assert!(tracker.check_ins().is_empty());
        assert!(tracker.streak("ghost", today()).is_none());
    }

    #[test]
    fn second_delete_is_a_no_op() {
        let mut tracker = Tracker::open(MemoryStore::new()).unwrap();
        let habit = tracker.create_habit(NewHabit::named("Walk")).unwrap();
        assert!(tracker.delete_habit(&habit.id).unwrap());
        assert!(!tracker.delete_habit(&habit.id).unwrap());
        assert!(tracker.habits().is_empty());
    }

    #[test]
    fn validation_errors_are_not_absorbed() {
        let mut tracker = Tracker::open(MemoryStore::new()).unwrap();
        let habit = tracker.create_habit(NewHabit::named("Read")).unwrap();
        let patch = HabitPatch {
            name: Some("".into()),
            ..HabitPatch::default()
        };
        assert!(matches!(
            tracker.update_habit(&habit.id, patch),
            Err(CoreError::Validation(_))
        ));
        assert_eq!(tracker.habit(&habit.id).unwrap().name, "Read");
    }

    #[test]
    fn delete_cascades_check_ins() {
        let mut tracker = Tracker::open(MemoryStore::new()).unwrap();
        let habit = tracker.create_habit(NewHabit::named("Read")).unwrap();
        let day = today();
        assert_eq!(tracker.toggle_on(&habit.id, day).unwrap(), Some(true));

        assert!(tracker.delete_habit(&habit.id).unwrap());
        assert!(tracker.habit(&habit.id).is_none());
        assert_eq!(tracker.check_ins().all_for_habit(&habit.id).count(), 0);
        assert!(tracker.store().check_ins_for_habit(&habit.id).unwrap().is_empty());
        assert!(tracker.store().get_habit(&habit.id).unwrap().unwrap().archived);
    }
}
